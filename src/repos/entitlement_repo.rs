//! Postgres-backed entitlement lookups.
//!
//! The entitlements table is written by the external billing webhook; this
//! side only ever runs a point SELECT. Column names are camelCase-quoted,
//! matching the rest of the schema.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::entitlement::{EntitlementError, EntitlementStore, SubscriptionStatus};

#[derive(Clone, Debug)]
pub struct PgEntitlementRepo {
    pool: PgPool,
}

impl PgEntitlementRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementStore for PgEntitlementRepo {
    async fn subscription_status(
        &self,
        user_id: Uuid,
    ) -> Result<SubscriptionStatus, EntitlementError> {
        let row: Option<String> = sqlx::query_scalar(
            r#"
            SELECT "subscriptionStatus"
            FROM entitlements
            WHERE "userId" = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EntitlementError::Unavailable(e.to_string()))?;

        // Zero rows is the normal "never billed" state.
        Ok(SubscriptionStatus::from_column(row.as_deref()))
    }
}
