//! Session-stored types and keys.

use serde::{Deserialize, Serialize};

use aurelle_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the stable slot key naming this session's cart/wishlist slots.
    pub const SLOT_KEY: &str = "slot_key";

    /// Key for the serialized checkout step machine.
    pub const CHECKOUT: &str = "checkout";
}
