/*
 * Responsibility
 * - Entitlement seam: billing standing the gate reads, nothing more
 * - Rows are written by the external billing webhook; this side is read-only
 */
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// A user's billing standing as stored in the entitlements table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// No billing relationship. Also the reading for an absent row:
    /// a user who never started checkout is a normal state, not a fault.
    None,
    Active,
    Cancelled,
    PastDue,
}

impl SubscriptionStatus {
    pub fn is_active(self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    /// Map the stored column value. An absent row or an unrecognized value
    /// reads as `None`; the gate must never fail open on bad data.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("active") => SubscriptionStatus::Active,
            Some("cancelled") => SubscriptionStatus::Cancelled,
            Some("past_due") => SubscriptionStatus::PastDue,
            _ => SubscriptionStatus::None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EntitlementError {
    /// The store could not answer (unreachable, timed out). Surfaced as a
    /// 503 by the gate, never treated as "no subscription".
    #[error("entitlement store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Point lookup of the user's subscription status. Zero rows is a valid
    /// answer and must come back as `SubscriptionStatus::None`.
    async fn subscription_status(
        &self,
        user_id: Uuid,
    ) -> Result<SubscriptionStatus, EntitlementError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_unknown_values_read_as_none() {
        assert_eq!(
            SubscriptionStatus::from_column(None),
            SubscriptionStatus::None
        );
        assert_eq!(
            SubscriptionStatus::from_column(Some("trialing")),
            SubscriptionStatus::None
        );
    }

    #[test]
    fn only_active_grants_access() {
        assert!(SubscriptionStatus::from_column(Some("active")).is_active());
        assert!(!SubscriptionStatus::from_column(Some("cancelled")).is_active());
        assert!(!SubscriptionStatus::from_column(Some("past_due")).is_active());
        assert!(!SubscriptionStatus::None.is_active());
    }
}
