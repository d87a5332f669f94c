//! Authorization gate.
//!
//! Every protected route and page runs this before any business logic:
//!
//! 1. resolve the request credential (credential.rs; no credential is a
//!    normal state, not an error)
//! 2. load the identity from the provider, with one refresh attempt when
//!    the access token is rejected and a refresh token is on hand
//! 3. check the entitlement: admins are entitled by definition (admin
//!    accounts are never billed and must not be locked out by a missing
//!    row); everyone else needs `subscriptionStatus = active`
//!
//! The outcome is exactly one of `Allow` or a `DenyReason`; translating a
//! denial into an HTTP response happens in respond.rs and nowhere else.
//! Upstream failures (provider or store unreachable) are a hard error,
//! never a denial: failing open would bypass the entitlement check.

use std::sync::Arc;

use thiserror::Error;

use crate::services::entitlement::EntitlementStore;
use crate::services::identity::{IdentityError, IdentityProvider, RefreshedSession, UserIdentity};

pub mod credential;
pub mod respond;

pub use credential::SessionCredential;

/// Entitlement standing attached to an allowed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementStatus {
    Active,
    Inactive,
}

/// Context handed to handlers once the gate has allowed a request.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user: UserIdentity,
    pub entitlement: EntitlementStatus,
}

/// Machine-checkable denial reasons. The caller can render the correct next
/// step (log in, pay, nothing) without guessing from a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No credential, or a credential the provider rejected.
    Unauthenticated,
    /// Authenticated non-admin without an active subscription.
    EntitlementRequired,
    /// Authenticated and entitled, but the wrong role for this resource.
    Forbidden,
}

impl DenyReason {
    pub fn code(self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "UNAUTHENTICATED",
            DenyReason::EntitlementRequired => "ENTITLEMENT_REQUIRED",
            DenyReason::Forbidden => "FORBIDDEN",
        }
    }
}

#[derive(Debug)]
pub enum GateOutcome {
    Allow(AuthCtx),
    Deny(DenyReason),
}

/// One gate run. `refreshed` is set when the credential was rotated during
/// evaluation; the middleware must write it back as cookies regardless of
/// the outcome, or the client's session silently expires mid-flow.
#[derive(Debug)]
pub struct Evaluation {
    pub outcome: GateOutcome,
    pub refreshed: Option<RefreshedSession>,
}

impl Evaluation {
    fn deny(reason: DenyReason) -> Self {
        Self {
            outcome: GateOutcome::Deny(reason),
            refreshed: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GateError {
    /// Identity provider or entitlement store unreachable/timed out.
    #[error("upstream dependency unavailable: {0}")]
    Upstream(String),
}

pub struct Gate {
    identity: Arc<dyn IdentityProvider>,
    entitlements: Arc<dyn EntitlementStore>,
}

impl Gate {
    pub fn new(identity: Arc<dyn IdentityProvider>, entitlements: Arc<dyn EntitlementStore>) -> Self {
        Self {
            identity,
            entitlements,
        }
    }

    /// Evaluate the gate for one request. Pure in (credential, upstream
    /// state): nothing is cached across calls.
    pub async fn evaluate(
        &self,
        credential: Option<SessionCredential>,
    ) -> Result<Evaluation, GateError> {
        let Some(credential) = credential else {
            return Ok(Evaluation::deny(DenyReason::Unauthenticated));
        };

        let (user, refreshed) = match self.load_identity(&credential).await? {
            Some(loaded) => loaded,
            None => return Ok(Evaluation::deny(DenyReason::Unauthenticated)),
        };

        let entitlement = if user.role.is_admin() {
            // No lookup for admins: they are never billed.
            EntitlementStatus::Active
        } else {
            let status = self
                .entitlements
                .subscription_status(user.id)
                .await
                .map_err(|e| GateError::Upstream(e.to_string()))?;
            if status.is_active() {
                EntitlementStatus::Active
            } else {
                EntitlementStatus::Inactive
            }
        };

        let outcome = match entitlement {
            EntitlementStatus::Active => GateOutcome::Allow(AuthCtx { user, entitlement }),
            EntitlementStatus::Inactive => GateOutcome::Deny(DenyReason::EntitlementRequired),
        };

        Ok(Evaluation { outcome, refreshed })
    }

    /// Identity resolution with a single refresh attempt.
    ///
    /// Returns Ok(None) when the credential is simply not valid anymore;
    /// upstream trouble propagates as an error so it is never mistaken for
    /// "not logged in".
    async fn load_identity(
        &self,
        credential: &SessionCredential,
    ) -> Result<Option<(UserIdentity, Option<RefreshedSession>)>, GateError> {
        match self.identity.get_user(&credential.access_token).await {
            Ok(user) => Ok(Some((user, None))),
            Err(IdentityError::Upstream(detail)) => Err(GateError::Upstream(detail)),
            Err(IdentityError::InvalidCredential) => {
                let Some(refresh_token) = credential.refresh_token.as_deref() else {
                    return Ok(None);
                };

                let renewed = match self.identity.refresh_session(refresh_token).await {
                    Ok(renewed) => renewed,
                    Err(IdentityError::InvalidCredential) => return Ok(None),
                    Err(IdentityError::Upstream(detail)) => return Err(GateError::Upstream(detail)),
                };

                match self.identity.get_user(&renewed.access_token).await {
                    Ok(user) => Ok(Some((user, Some(renewed)))),
                    Err(IdentityError::InvalidCredential) => Ok(None),
                    Err(IdentityError::Upstream(detail)) => Err(GateError::Upstream(detail)),
                }
            }
        }
    }
}

/// Admin-only sub-gate for provisioning endpoints, applied after the base
/// gate has allowed the request. Anonymous callers never reach this point,
/// so they get 401 upstream and the route's existence is not leaked.
pub fn require_admin(ctx: &AuthCtx) -> Result<(), DenyReason> {
    if ctx.user.role.is_admin() {
        Ok(())
    } else {
        Err(DenyReason::Forbidden)
    }
}
