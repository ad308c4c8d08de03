//! Order repository.
//!
//! Orders are written once at checkout and owned by the back-office from
//! then on; the only customer-side mutation is replacing rejected payment
//! evidence. Document-shaped fields (customer, items) are stored as JSON
//! text and decoded into validated types at this boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use aurelle_core::{Cart, OrderId, OrderStatus, PaymentStatus, ShippingDetails, UserId};

use super::RepositoryError;

/// A persisted order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub customer: ShippingDetails,
    pub items: Cart,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub payment_proof_url: String,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub customer: ShippingDetails,
    pub items: Cart,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub payment_proof_url: String,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    customer: String,
    items: String,
    subtotal: Decimal,
    shipping: Decimal,
    total: Decimal,
    payment_proof_url: String,
    order_status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str = "id, user_id, customer, items, subtotal, shipping, total, \
     payment_proof_url, order_status, payment_status, created_at";

impl OrderRow {
    fn into_domain(self) -> Result<Order, RepositoryError> {
        let customer: ShippingDetails = serde_json::from_str(&self.customer).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer on order {}: {e}", self.id))
        })?;
        let items: Cart = serde_json::from_str(&self.items).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid items on order {}: {e}", self.id))
        })?;
        let order_status = self.order_status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("order {}: {e}", self.id))
        })?;
        let payment_status = self.payment_status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("order {}: {e}", self.id))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            customer,
            items,
            subtotal: self.subtotal,
            shipping: self.shipping,
            total: self.total,
            payment_proof_url: self.payment_proof_url,
            order_status,
            payment_status,
            created_at: self.created_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order. Status starts at `pending` / `awaiting_verification`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure and
    /// `DataCorruption` if the draft cannot be serialized.
    pub async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let customer = serde_json::to_string(&order.customer).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable customer: {e}"))
        })?;
        let items = serde_json::to_string(&order.items)
            .map_err(|e| RepositoryError::DataCorruption(format!("unserializable items: {e}")))?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders
                (id, user_id, customer, items, subtotal, shipping, total,
                 payment_proof_url, order_status, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ORDER_COLUMNS}
            ",
        ))
        .bind(&id)
        .bind(order.user_id.as_str())
        .bind(&customer)
        .bind(&items)
        .bind(order.subtotal)
        .bind(order.shipping)
        .bind(order.total)
        .bind(&order.payment_proof_url)
        .bind(OrderStatus::Pending.to_string())
        .bind(PaymentStatus::AwaitingVerification.to_string())
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        ))
        .bind(user_id.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    /// Fetch one of a user's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn get_for_user(
        &self,
        id: &OrderId,
        user_id: &UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2",
        ))
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    /// Replace rejected payment evidence and put the order back under
    /// verification. Only rejected orders accept resubmission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is not currently
    /// rejected (or does not belong to the user).
    pub async fn resubmit_payment_proof(
        &self,
        id: &OrderId,
        user_id: &UserId,
        proof_url: &str,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET payment_proof_url = $3, payment_status = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND payment_status = $5
            RETURNING {ORDER_COLUMNS}
            ",
        ))
        .bind(id.as_str())
        .bind(user_id.as_str())
        .bind(proof_url)
        .bind(PaymentStatus::AwaitingVerification.to_string())
        .bind(PaymentStatus::Rejected.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()?.ok_or_else(|| {
            RepositoryError::Conflict(
                "order is not awaiting a new payment proof".to_owned(),
            )
        })
    }
}
