//! Checkout route handlers.
//!
//! The step machine lives in the session: each handler loads it, applies
//! one transition, and saves it back. Abandoning the session abandons the
//! checkout, which is safe: nothing is committed before the final submit.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, post},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use aurelle_core::{
    CheckoutMachine, CheckoutStep, PaymentEvidence, PricingBreakdown, ShippingDetails,
};

use crate::checkout::{PgOrderGateway, submit_order};
use crate::db::{Order, OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

use super::slot_key;

/// Destination folder on the media host for proof screenshots.
const PAYMENT_PROOF_FOLDER: &str = "payment-proofs";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", get(show))
        .route("/api/checkout/begin", post(begin))
        .route("/api/checkout/shipping", post(shipping))
        .route("/api/checkout/payment-proof", post(payment_proof))
        .route("/api/checkout/back", post(back))
        .route("/api/checkout/submit", post(submit))
}

async fn load_machine(session: &Session) -> Result<CheckoutMachine> {
    Ok(session
        .get::<CheckoutMachine>(session_keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

async fn save_machine(session: &Session, machine: &CheckoutMachine) -> Result<()> {
    session.insert(session_keys::CHECKOUT, machine).await?;
    Ok(())
}

/// Current checkout state as the client sees it.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub step_index: u8,
    /// Entered details, or a prefill derived from the saved profile.
    pub shipping: ShippingDetails,
    pub has_payment_proof: bool,
    pub pricing: PricingBreakdown,
    pub item_count: u32,
}

async fn view(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    machine: &CheckoutMachine,
) -> Result<CheckoutView> {
    let key = slot_key(session).await?;
    let cart = state.cart().cart(&key).await?;
    let policy = state.settings().shipping_policy().await;

    let shipping = match machine.shipping() {
        Some(details) => details.clone(),
        None => prefill(state, user).await?,
    };

    Ok(CheckoutView {
        step: machine.step(),
        step_index: machine.step().index(),
        shipping,
        has_payment_proof: machine.evidence().is_some(),
        pricing: PricingBreakdown::quote(&cart, &policy),
        item_count: cart.item_count(),
    })
}

/// Shipping details prefilled from the saved profile, where present.
async fn prefill(state: &AppState, user: &CurrentUser) -> Result<ShippingDetails> {
    let profile = UserRepository::new(state.pool())
        .profile(&user.id)
        .await?
        .unwrap_or_default();

    Ok(ShippingDetails {
        first_name: profile.first_name.unwrap_or_default(),
        last_name: profile.last_name.unwrap_or_default(),
        email: user.email.as_str().to_owned(),
        phone: profile.phone.unwrap_or_default(),
        address: profile.address.unwrap_or_default(),
        city: profile.city.unwrap_or_default(),
        zip_code: profile.zip_code.unwrap_or_default(),
    })
}

/// Current checkout state.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CheckoutView>> {
    let machine = load_machine(&session).await?;
    Ok(Json(view(&state, &session, &user, &machine).await?))
}

/// Cart to Shipping. The non-empty-cart gate lives here, at the surface that
/// can see the cart.
#[instrument(skip(state, session))]
pub async fn begin(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CheckoutView>> {
    let key = slot_key(&session).await?;
    if state.cart().cart(&key).await?.is_empty() {
        return Err(AppError::BadRequest("cart is empty".into()));
    }

    let mut machine = load_machine(&session).await?;
    machine.begin()?;
    save_machine(&session, &machine).await?;

    Ok(Json(view(&state, &session, &user, &machine).await?))
}

/// Shipping to Payment, gated on the seven required fields.
#[instrument(skip(state, session, details))]
pub async fn shipping(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(details): Json<ShippingDetails>,
) -> Result<Json<CheckoutView>> {
    let mut machine = load_machine(&session).await?;
    machine.submit_shipping(details)?;
    save_machine(&session, &machine).await?;

    Ok(Json(view(&state, &session, &user, &machine).await?))
}

/// Payment to Review: upload the proof screenshot, then attach it.
#[instrument(skip(state, session, multipart))]
pub async fn payment_proof(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<CheckoutView>> {
    let mut uploaded = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("payment-proof").to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?;

            uploaded = Some(
                state
                    .media()
                    .upload(&filename, &content_type, bytes.to_vec(), PAYMENT_PROOF_FOLDER)
                    .await?,
            );
        }
    }

    let uploaded =
        uploaded.ok_or_else(|| AppError::BadRequest("missing \"file\" field".into()))?;

    let mut machine = load_machine(&session).await?;
    machine.attach_evidence(PaymentEvidence::new(uploaded.url))?;
    save_machine(&session, &machine).await?;

    Ok(Json(view(&state, &session, &user, &machine).await?))
}

/// One step backwards. Unconditional.
#[instrument(skip(state, session))]
pub async fn back(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CheckoutView>> {
    let mut machine = load_machine(&session).await?;
    machine.step_back();
    save_machine(&session, &machine).await?;

    Ok(Json(view(&state, &session, &user, &machine).await?))
}

/// Review to submitted. On success the cart is cleared and the machine
/// resets; on failure both are left untouched for a retry.
#[instrument(skip(state, session))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Order>> {
    let key = slot_key(&session).await?;
    let mut machine = load_machine(&session).await?;
    let policy = state.settings().shipping_policy().await;

    let gateway = PgOrderGateway::new(OrderRepository::new(state.pool()));
    let order = submit_order(
        &mut machine,
        state.cart(),
        &gateway,
        &key,
        user.id,
        &policy,
    )
    .await?;

    // Persist the reset machine only after a successful submission.
    save_machine(&session, &machine).await?;

    Ok(Json(order))
}
