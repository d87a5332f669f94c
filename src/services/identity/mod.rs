/*
 * Responsibility
 * - Identity-provider seam: the trait the gate and the admin handlers call
 * - Domain types for provider-owned records (UserIdentity, Role)
 * - HTTP client implementation lives in http.rs
 */
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod http;

pub use http::HttpIdentityProvider;

/// Account role as recorded by the identity provider.
///
/// Provider records without a role are plain users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Map the provider's `app_metadata.role` string. Anything unknown
    /// (or absent) is a plain user.
    pub fn from_metadata(value: Option<&str>) -> Self {
        match value {
            Some("admin") => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// A user record as the provider returns it. Owned by the provider;
/// this application only reads it.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Result of exchanging a refresh token for a new session.
///
/// The caller is responsible for writing the new tokens back onto the
/// outgoing response, otherwise the client keeps presenting the stale pair.
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds, as reported by the provider.
    pub expires_in: u64,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// A credential was offered but the provider rejected it
    /// (expired, revoked, malformed). Distinct from "no credential".
    #[error("credential rejected by identity provider")]
    InvalidCredential,

    /// The provider could not be reached, timed out, or answered 5xx.
    /// Never downgraded to InvalidCredential.
    #[error("identity provider unavailable: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an access token into the user it belongs to.
    /// One provider round-trip per call; no caching across requests.
    async fn get_user(&self, access_token: &str) -> Result<UserIdentity, IdentityError>;

    /// Exchange a refresh token for a new access/refresh pair.
    async fn refresh_session(&self, refresh_token: &str)
    -> Result<RefreshedSession, IdentityError>;

    /// Admin surface: list all user records.
    async fn list_users(&self) -> Result<Vec<UserIdentity>, IdentityError>;

    /// Admin surface: provision a new account with the given role.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserIdentity, IdentityError>;
}
