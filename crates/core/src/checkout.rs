//! The checkout step machine.
//!
//! A fixed sequence (Cart, Shipping, Payment, Review) with per-step gates
//! on the way forward and unconditional steps back. The machine holds the
//! evidence collected so far (shipping details, payment proof); it does not
//! perform I/O. Submission itself belongs to the caller, which resets the
//! machine only after the order is durably created.
//!
//! Step state is session-scoped and intentionally not persisted beyond it:
//! abandoning checkout mid-flow resets to Cart, which is safe because
//! nothing is committed before the final submit.

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// The checkout steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Cart,
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    /// Zero-based position in the flow, for progress displays.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Cart => 0,
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Review => 3,
        }
    }

    /// The step before this one; `Cart` has none.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Cart => None,
            Self::Shipping => Some(Self::Cart),
            Self::Payment => Some(Self::Shipping),
            Self::Review => Some(Self::Payment),
        }
    }
}

/// Shipping details collected at the Shipping step.
///
/// All seven fields are required; there is no cross-field validation
/// beyond non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

impl ShippingDetails {
    /// Names of required fields that are empty (after trimming).
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("zip_code", &self.zip_code),
        ];

        fields
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Parse the email field into a validated [`Email`].
    ///
    /// # Errors
    ///
    /// Returns the underlying [`crate::EmailError`] for a malformed address.
    pub fn parsed_email(&self) -> Result<Email, crate::EmailError> {
        Email::parse(self.email.trim())
    }
}

/// Reference to an uploaded proof-of-payment image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentEvidence(String);

impl PaymentEvidence {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.0
    }
}

/// Reasons a forward transition is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    /// One or more required shipping fields are empty.
    #[error("missing required shipping fields: {}", .0.join(", "))]
    MissingShippingFields(Vec<&'static str>),

    /// The shipping email is structurally invalid.
    #[error("invalid shipping email: {0}")]
    InvalidEmail(#[from] crate::EmailError),

    /// No payment proof has been uploaded yet.
    #[error("payment proof is required before review")]
    MissingPaymentEvidence,

    /// The operation does not apply to the current step.
    #[error("operation requires step {expected:?}, but checkout is at {actual:?}")]
    WrongStep {
        expected: CheckoutStep,
        actual: CheckoutStep,
    },
}

/// The checkout flow state: current step plus the evidence collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMachine {
    step: CheckoutStep,
    shipping: Option<ShippingDetails>,
    evidence: Option<PaymentEvidence>,
}

impl CheckoutMachine {
    /// A fresh machine at the Cart step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub fn shipping(&self) -> Option<&ShippingDetails> {
        self.shipping.as_ref()
    }

    #[must_use]
    pub fn evidence(&self) -> Option<&PaymentEvidence> {
        self.evidence.as_ref()
    }

    /// Cart → Shipping. Unconditional: the non-empty-cart gate lives with
    /// the caller, which is the only party that can see the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] unless at `Cart`.
    pub fn begin(&mut self) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Cart)?;
        self.step = CheckoutStep::Shipping;
        Ok(())
    }

    /// Shipping → Payment, gated on all seven fields being non-empty and
    /// the email being structurally valid. On failure the step does not
    /// move and previously stored details are kept.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::MissingShippingFields`] lists every empty field;
    /// [`CheckoutError::InvalidEmail`] reports a malformed address.
    pub fn submit_shipping(&mut self, details: ShippingDetails) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Shipping)?;

        let missing = details.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingShippingFields(missing));
        }
        details.parsed_email()?;

        self.shipping = Some(details);
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Payment → Review, gated on uploaded payment proof.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] unless at `Payment`.
    pub fn attach_evidence(&mut self, evidence: PaymentEvidence) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Payment)?;
        self.evidence = Some(evidence);
        self.step = CheckoutStep::Review;
        Ok(())
    }

    /// Step back one step. Unconditional; collected evidence is kept so the
    /// customer does not re-enter it on the way forward. A no-op at `Cart`.
    pub fn step_back(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
    }

    /// Everything submission needs, available only at the Review step.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::WrongStep`] before Review;
    /// [`CheckoutError::MissingShippingFields`] /
    /// [`CheckoutError::MissingPaymentEvidence`] if state was lost.
    pub fn review(&self) -> Result<(&ShippingDetails, &PaymentEvidence), CheckoutError> {
        self.expect_step(CheckoutStep::Review)?;

        let shipping = self
            .shipping
            .as_ref()
            .ok_or_else(|| CheckoutError::MissingShippingFields(vec!["first_name"]))?;
        let evidence = self
            .evidence
            .as_ref()
            .ok_or(CheckoutError::MissingPaymentEvidence)?;

        Ok((shipping, evidence))
    }

    /// Reset to Cart, dropping collected state. Called after a successful
    /// submission, and only then; a failed submission leaves the machine
    /// at Review so the customer can retry.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<(), CheckoutError> {
        if matches!(
            (self.step, expected),
            (CheckoutStep::Cart, CheckoutStep::Cart)
                | (CheckoutStep::Shipping, CheckoutStep::Shipping)
                | (CheckoutStep::Payment, CheckoutStep::Payment)
                | (CheckoutStep::Review, CheckoutStep::Review)
        ) {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_details() -> ShippingDetails {
        ShippingDetails {
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            email: "ada@example.com".into(),
            phone: "+1 555 0100".into(),
            address: "12 Jewel Lane".into(),
            city: "London".into(),
            zip_code: "E1 6AN".into(),
        }
    }

    #[test]
    fn happy_path_walks_all_four_steps() {
        let mut machine = CheckoutMachine::new();
        assert_eq!(machine.step(), CheckoutStep::Cart);

        machine.begin().expect("cart -> shipping");
        machine
            .submit_shipping(full_details())
            .expect("shipping -> payment");
        machine
            .attach_evidence(PaymentEvidence::new("https://cdn.example/proof.jpg"))
            .expect("payment -> review");

        assert_eq!(machine.step(), CheckoutStep::Review);
        let (shipping, evidence) = machine.review().expect("review state");
        assert_eq!(shipping.first_name, "Ada");
        assert_eq!(evidence.url(), "https://cdn.example/proof.jpg");
    }

    #[test]
    fn any_empty_shipping_field_blocks_the_gate() {
        for field in [
            "first_name",
            "last_name",
            "email",
            "phone",
            "address",
            "city",
            "zip_code",
        ] {
            let mut machine = CheckoutMachine::new();
            machine.begin().expect("begin");

            let mut details = full_details();
            match field {
                "first_name" => details.first_name.clear(),
                "last_name" => details.last_name.clear(),
                "email" => details.email.clear(),
                "phone" => details.phone.clear(),
                "address" => details.address.clear(),
                "city" => details.city.clear(),
                _ => details.zip_code.clear(),
            }

            let err = machine.submit_shipping(details).expect_err("gate holds");
            assert_eq!(err, CheckoutError::MissingShippingFields(vec![field]));
            assert_eq!(machine.step(), CheckoutStep::Shipping, "step must not move");
        }
    }

    #[test]
    fn whitespace_only_fields_count_as_empty() {
        let mut machine = CheckoutMachine::new();
        machine.begin().expect("begin");

        let mut details = full_details();
        details.city = "   ".into();

        assert!(matches!(
            machine.submit_shipping(details),
            Err(CheckoutError::MissingShippingFields(fields)) if fields == vec!["city"]
        ));
    }

    #[test]
    fn malformed_email_blocks_the_shipping_gate() {
        let mut machine = CheckoutMachine::new();
        machine.begin().expect("begin");

        let mut details = full_details();
        details.email = "not-an-email".into();

        assert!(matches!(
            machine.submit_shipping(details),
            Err(CheckoutError::InvalidEmail(_))
        ));
        assert_eq!(machine.step(), CheckoutStep::Shipping);
    }

    #[test]
    fn review_requires_evidence() {
        let machine = CheckoutMachine::new();
        assert!(matches!(
            machine.review(),
            Err(CheckoutError::WrongStep { .. })
        ));
    }

    #[test]
    fn stepping_back_keeps_collected_state() {
        let mut machine = CheckoutMachine::new();
        machine.begin().expect("begin");
        machine.submit_shipping(full_details()).expect("shipping");

        machine.step_back();
        assert_eq!(machine.step(), CheckoutStep::Shipping);
        assert!(machine.shipping().is_some(), "details survive going back");

        machine.step_back();
        machine.step_back();
        machine.step_back(); // already at Cart; stays there
        assert_eq!(machine.step(), CheckoutStep::Cart);
    }

    #[test]
    fn reset_returns_to_a_fresh_cart_step() {
        let mut machine = CheckoutMachine::new();
        machine.begin().expect("begin");
        machine.submit_shipping(full_details()).expect("shipping");
        machine
            .attach_evidence(PaymentEvidence::new("https://cdn.example/proof.jpg"))
            .expect("evidence");

        machine.reset();
        assert_eq!(machine.step(), CheckoutStep::Cart);
        assert!(machine.shipping().is_none());
        assert!(machine.evidence().is_none());
    }

    #[test]
    fn machine_survives_session_serialization() {
        let mut machine = CheckoutMachine::new();
        machine.begin().expect("begin");
        machine.submit_shipping(full_details()).expect("shipping");

        let json = serde_json::to_string(&machine).expect("serialize");
        let restored: CheckoutMachine = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, machine);
    }
}
