/*
 * Responsibility
 * - Admin-provisioning request/response DTOs
 * - Responses expose only what the admin screens need; never tokens or
 *   provider metadata
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::identity::UserIdentity;

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
}

impl CreateAdminRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.email.contains('@') {
            return Err("email is not valid");
        }
        if self.password.chars().count() < 8 {
            return Err("password must be at least 8 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserSummaryResponse {
    pub id: Uuid,
    pub email: String,
    pub role: &'static str,
}

impl From<UserIdentity> for UserSummaryResponse {
    fn from(user: UserIdentity) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role.as_str(),
        }
    }
}
