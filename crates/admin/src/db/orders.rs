//! Order review: listing, status transitions, and payment verification.
//!
//! Orders are created by the storefront; the back-office owns them from
//! then on. Verifying or rejecting payment evidence is the transition the
//! customer-facing resubmission path hangs off.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelle_core::{Cart, OrderId, OrderStatus, PaymentStatus, ShippingDetails, UserId};

use super::RepositoryError;

/// An order as the back-office sees it.
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

/// Repository for back-office order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first, optionally filtered by payment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list(
        &self,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = match payment_status {
            Some(status) => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    r"
                    SELECT {ORDER_COLUMNS} FROM orders
                    WHERE payment_status = $1 ORDER BY created_at DESC
                    ",
                ))
                .bind(status.to_string())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC",
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    /// Fetch an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1",
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    /// Set the fulfillment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders SET order_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            ",
        ))
        .bind(id.as_str())
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }

    /// Resolve payment verification. Verification also confirms the order;
    /// rejection re-opens the customer's resubmission path.
    ///
    /// # Errors
    ///
    /// `Conflict` if the order is not awaiting verification.
    pub async fn resolve_payment(
        &self,
        id: &OrderId,
        verdict: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        let order_status = if verdict == PaymentStatus::Verified {
            OrderStatus::Confirmed
        } else {
            OrderStatus::Pending
        };

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET payment_status = $2, order_status = $3, updated_at = NOW()
            WHERE id = $1 AND payment_status = $4
            RETURNING {ORDER_COLUMNS}
            ",
        ))
        .bind(id.as_str())
        .bind(verdict.to_string())
        .bind(order_status.to_string())
        .bind(PaymentStatus::AwaitingVerification.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()?.ok_or_else(|| {
            RepositoryError::Conflict("order is not awaiting payment verification".to_owned())
        })
    }
}
