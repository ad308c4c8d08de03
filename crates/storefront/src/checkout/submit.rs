//! The order submission gateway.
//!
//! `submit_order` is the single exit of the checkout flow: it packages the
//! finalized cart, shipping details, and payment evidence into a draft,
//! invokes the gateway, and only on success clears the cart slot and resets
//! the machine. On failure every piece of local state is left exactly as it
//! was so the customer can retry.

use rust_decimal::Decimal;
use thiserror::Error;

use aurelle_core::{
    Cart, CheckoutError, CheckoutMachine, PaymentEvidence, PricingBreakdown, ShippingDetails,
    ShippingPolicy, UserId,
};

use crate::cart::{CartService, SlotStore, StoreError};
use crate::db::{NewOrder, Order, OrderRepository, RepositoryError};

/// Everything the gateway needs to create an order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub customer: ShippingDetails,
    pub items: Cart,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub payment_proof_url: String,
}

/// Errors from order submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The backing store refused the order; the message is customer-facing
    /// and surfaced verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The backing store could not be reached or failed internally.
    #[error("order store unavailable: {0}")]
    Unavailable(String),
}

/// Creates persisted orders from finalized drafts.
pub trait OrderGateway: Send + Sync {
    fn submit(&self, draft: OrderDraft) -> impl Future<Output = Result<Order, SubmitError>> + Send;
}

/// Gateway backed by the storefront's own order repository.
pub struct PgOrderGateway<'a> {
    repo: OrderRepository<'a>,
}

impl<'a> PgOrderGateway<'a> {
    #[must_use]
    pub const fn new(repo: OrderRepository<'a>) -> Self {
        Self { repo }
    }
}

impl OrderGateway for PgOrderGateway<'_> {
    async fn submit(&self, draft: OrderDraft) -> Result<Order, SubmitError> {
        let order = NewOrder {
            user_id: draft.user_id,
            customer: draft.customer,
            items: draft.items,
            subtotal: draft.subtotal,
            shipping: draft.shipping,
            total: draft.total,
            payment_proof_url: draft.payment_proof_url,
        };

        self.repo.create(order).await.map_err(|e| match e {
            RepositoryError::Conflict(msg) | RepositoryError::DataCorruption(msg) => {
                SubmitError::Rejected(msg)
            }
            RepositoryError::Database(e) => SubmitError::Unavailable(e.to_string()),
        })
    }
}

/// Errors from the whole submission flow.
#[derive(Debug, Error)]
pub enum SubmitFlowError {
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The cart emptied out from under the checkout (e.g. cleared in
    /// another component); nothing to submit.
    #[error("cart is empty")]
    EmptyCart,
}

/// Submit the order at the Review step.
///
/// On success: the cart slot is cleared, the machine resets to Cart, and the
/// created order is returned. On any failure the machine stays at Review and
/// the cart is untouched.
///
/// # Errors
///
/// [`SubmitFlowError::Checkout`] if the machine is not at Review or lost its
/// evidence, [`SubmitFlowError::EmptyCart`] for a vanished cart, and the
/// gateway/store errors otherwise.
pub async fn submit_order<S: SlotStore, G: OrderGateway>(
    machine: &mut CheckoutMachine,
    cart_service: &CartService<S>,
    gateway: &G,
    slot_key: &str,
    user_id: UserId,
    policy: &ShippingPolicy,
) -> Result<Order, SubmitFlowError> {
    let (shipping, evidence) = machine.review()?;

    let cart = cart_service.cart(slot_key).await?;
    if cart.is_empty() {
        return Err(SubmitFlowError::EmptyCart);
    }

    let pricing = PricingBreakdown::quote(&cart, policy);
    let draft = OrderDraft {
        user_id,
        customer: shipping.clone(),
        items: cart,
        subtotal: pricing.subtotal,
        shipping: pricing.shipping,
        total: pricing.total,
        payment_proof_url: evidence_url(evidence),
    };

    let order = gateway.submit(draft).await?;

    // Only after the order is durably created: clear local state.
    cart_service.clear(slot_key).await?;
    machine.reset();

    Ok(order)
}

fn evidence_url(evidence: &PaymentEvidence) -> String {
    evidence.url().to_owned()
}
