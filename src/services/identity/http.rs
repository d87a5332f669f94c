//! GoTrue-style HTTP client for the identity provider.
//!
//! Endpoints used:
//! - `GET  /auth/v1/user`                         (resolve access token)
//! - `POST /auth/v1/token?grant_type=refresh_token`
//! - `GET  /auth/v1/admin/users`                  (service-role key)
//! - `POST /auth/v1/admin/users`                  (service-role key)
//!
//! Every request carries the project `apikey` header; admin calls
//! authenticate with the service-role key instead of a user token.
//! The client has a hard per-request timeout so a slow provider surfaces
//! as `IdentityError::Upstream`, not a hung request.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::services::identity::{
    IdentityError, IdentityProvider, RefreshedSession, Role, UserIdentity,
};

#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: Url,
    public_key: String,
    service_role_key: String,
}

impl std::fmt::Debug for HttpIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keys are secrets; show only the origin.
        f.debug_struct("HttpIdentityProvider")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// User record as the provider serializes it.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_metadata: AppMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct AppMetadata {
    #[serde(default)]
    role: Option<String>,
}

impl From<ProviderUser> for UserIdentity {
    fn from(u: ProviderUser) -> Self {
        UserIdentity {
            id: u.id,
            email: u.email.unwrap_or_default(),
            role: Role::from_metadata(u.app_metadata.role.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<ProviderUser>,
}

impl HttpIdentityProvider {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.identity_base_url.clone(),
            public_key: config.identity_public_key.clone(),
            service_role_key: config.identity_service_role_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.base_url
            .join(path)
            .map_err(|e| IdentityError::Upstream(format!("bad endpoint {path}: {e}")))
    }

    fn transport(e: reqwest::Error) -> IdentityError {
        IdentityError::Upstream(e.to_string())
    }

    /// Map a non-success status. Auth-shaped rejections mean the credential
    /// is bad; everything else means the provider itself is unhealthy.
    fn rejection(status: StatusCode) -> IdentityError {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                IdentityError::InvalidCredential
            }
            other => IdentityError::Upstream(format!("identity provider answered {other}")),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn get_user(&self, access_token: &str) -> Result<UserIdentity, IdentityError> {
        let url = self.endpoint("/auth/v1/user")?;
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.public_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(Self::rejection(resp.status()));
        }

        let user: ProviderUser = resp.json().await.map_err(Self::transport)?;
        Ok(user.into())
    }

    async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshedSession, IdentityError> {
        let mut url = self.endpoint("/auth/v1/token")?;
        url.set_query(Some("grant_type=refresh_token"));

        let resp = self
            .client
            .post(url)
            .header("apikey", &self.public_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(Self::rejection(resp.status()));
        }

        let grant: TokenGrant = resp.json().await.map_err(Self::transport)?;
        Ok(RefreshedSession {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
        })
    }

    async fn list_users(&self) -> Result<Vec<UserIdentity>, IdentityError> {
        let url = self.endpoint("/auth/v1/admin/users")?;
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.public_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            // The service-role key is process config, not a user credential;
            // any rejection here is an operational problem.
            return Err(IdentityError::Upstream(format!(
                "admin user listing answered {}",
                resp.status()
            )));
        }

        let list: UserList = resp.json().await.map_err(Self::transport)?;
        Ok(list.users.into_iter().map(UserIdentity::from).collect())
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserIdentity, IdentityError> {
        let url = self.endpoint("/auth/v1/admin/users")?;
        let resp = self
            .client
            .post(url)
            .header("apikey", &self.public_key)
            .bearer_auth(&self.service_role_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": true,
                "app_metadata": { "role": role.as_str() },
            }))
            .send()
            .await
            .map_err(Self::transport)?;

        if !resp.status().is_success() {
            return Err(IdentityError::Upstream(format!(
                "admin user creation answered {}",
                resp.status()
            )));
        }

        let user: ProviderUser = resp.json().await.map_err(Self::transport)?;
        Ok(user.into())
    }
}
