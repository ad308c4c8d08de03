//! Email service for customer notifications and marketing sends.
//!
//! Uses SMTP via lettre. Bodies are plain text; marketing templates carry
//! `{{placeholder}}` slots filled at send time.

use std::collections::HashMap;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Fill `{{name}}` slots in a template string.
///
/// Unknown placeholders are left in place so a typo is visible in the test
/// send rather than silently blank.
#[must_use]
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    let mut rendered = template.to_owned();
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }
    rendered
}

/// Email service for transactional and marketing sends.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a plain-text email.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` for unparsable addresses, `Smtp` for delivery
    /// failures.
    pub async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_owned()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(message).await?;
        Ok(())
    }

    /// Tell a customer their payment was verified.
    ///
    /// # Errors
    ///
    /// See [`EmailService::send`].
    pub async fn send_payment_verified(&self, to: &str, order_id: &str) -> Result<(), EmailError> {
        let body = format!(
            "Good news: we verified your payment for order {order_id}.\n\
             We are preparing your pieces now and will email you when they ship.\n\n\
             Aurelle"
        );
        self.send(to, "Your Aurelle payment is confirmed", body).await
    }

    /// Tell a customer their payment proof was rejected and how to fix it.
    ///
    /// # Errors
    ///
    /// See [`EmailService::send`].
    pub async fn send_payment_rejected(&self, to: &str, order_id: &str) -> Result<(), EmailError> {
        let body = format!(
            "We could not verify the payment proof on order {order_id}.\n\
             Please sign in and upload a new screenshot from the order page;\n\
             the order is held for you in the meantime.\n\n\
             Aurelle"
        );
        self.send(to, "Action needed on your Aurelle order", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_known_placeholders() {
        let mut values = HashMap::new();
        values.insert("name", "Ada".to_owned());
        values.insert("collection", "Luna".to_owned());

        let rendered = render_template(
            "Hi {{name}}, the {{collection}} collection just landed.",
            &values,
        );
        assert_eq!(rendered, "Hi Ada, the Luna collection just landed.");
    }

    #[test]
    fn unknown_placeholders_stay_visible() {
        let rendered = render_template("Hi {{nmae}}!", &HashMap::new());
        assert_eq!(rendered, "Hi {{nmae}}!");
    }

    #[test]
    fn repeated_placeholders_are_all_filled() {
        let mut values = HashMap::new();
        values.insert("code", "SPARKLE10".to_owned());

        let rendered = render_template("Use {{code}} today, {{code}} expires soon.", &values);
        assert_eq!(rendered, "Use SPARKLE10 today, SPARKLE10 expires soon.");
    }
}
