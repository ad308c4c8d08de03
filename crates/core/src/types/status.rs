//! Status enums for orders, payments, design requests, and admin roles.

use serde::{Deserialize, Serialize};

/// Fulfillment state of an order, driven by the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order received, payment not yet verified.
    #[default]
    Pending,
    /// Payment verified, order being prepared.
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Verification state of an order's payment evidence.
///
/// Orders are paid by manual bank transfer; the customer uploads a proof
/// screenshot and an administrator verifies or rejects it. Rejection
/// re-opens the customer's resubmission path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    AwaitingVerification,
    Verified,
    Rejected,
}

/// Lifecycle of a custom-design request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DesignRequestStatus {
    #[default]
    Received,
    InReview,
    Quoted,
    Closed,
}

/// Catalog visibility of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    /// Hidden from the storefront but kept for order history.
    Archived,
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin-user management.
    SuperAdmin,
    /// Full access to store management features.
    Admin,
    /// Read-only access to store data.
    Viewer,
}

macro_rules! impl_status_str {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $s)),+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($ty), ": {}"), s)),
                }
            }
        }
    };
}

impl_status_str!(OrderStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl_status_str!(PaymentStatus {
    AwaitingVerification => "awaiting_verification",
    Verified => "verified",
    Rejected => "rejected",
});

impl_status_str!(DesignRequestStatus {
    Received => "received",
    InReview => "in_review",
    Quoted => "quoted",
    Closed => "closed",
});

impl_status_str!(ProductStatus {
    Active => "active",
    Archived => "archived",
});

impl_status_str!(AdminRole {
    SuperAdmin => "super_admin",
    Admin => "admin",
    Viewer => "viewer",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_string_round_trips() {
        for status in [
            PaymentStatus::AwaitingVerification,
            PaymentStatus::Verified,
            PaymentStatus::Rejected,
        ] {
            let s = status.to_string();
            assert_eq!(PaymentStatus::from_str(&s).expect("parse"), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(OrderStatus::from_str("refunded").is_err());
        assert!(AdminRole::from_str("root").is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&PaymentStatus::AwaitingVerification).expect("serialize");
        assert_eq!(json, "\"awaiting_verification\"");
    }
}
