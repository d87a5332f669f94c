/*
 * Responsibility
 * - Application-wide AppError and the single JSON error body shape
 * - IntoResponse mapping (status + machine-checkable code)
 * - Conversions from repo/identity/gate errors
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::gate::{DenyReason, GateError};
use crate::services::identity::IdentityError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("active subscription required")]
    EntitlementRequired,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("upstream dependency unavailable")]
    Upstream,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AppError::EntitlementRequired => (StatusCode::FORBIDDEN, "ENTITLEMENT_REQUIRED"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Upstream => (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(_) => AppError::Internal,
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidCredential => AppError::Unauthenticated,
            IdentityError::Upstream(_) => AppError::Upstream,
        }
    }
}

impl From<GateError> for AppError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::Upstream(_) => AppError::Upstream,
        }
    }
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => AppError::Unauthenticated,
            DenyReason::EntitlementRequired => AppError::EntitlementRequired,
            DenyReason::Forbidden => AppError::Forbidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_taxonomy() {
        assert_eq!(
            AppError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::EntitlementRequired.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Upstream.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn invalid_credential_surfaces_as_401_not_500() {
        let err: AppError = IdentityError::InvalidCredential.into();
        assert!(matches!(err, AppError::Unauthenticated));
    }
}
