/*
 * Responsibility
 * - Admin-provisioning handlers (list users, create admin)
 * - Base gate runs in middleware; the role sub-gate runs here, after
 *   identity resolution, so anonymous callers see 401 and never learn the
 *   route exists
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::dto::admin::{CreateAdminRequest, UserSummaryResponse},
    api::v1::extractors::AuthCtxExtractor,
    error::AppError,
    services::gate,
    services::identity::Role,
    state::AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<UserSummaryResponse>>, AppError> {
    gate::require_admin(&ctx)?;

    let users = state.identity.list_users().await?;
    Ok(Json(
        users.into_iter().map(UserSummaryResponse::from).collect(),
    ))
}

pub async fn create_admin(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<UserSummaryResponse>), AppError> {
    gate::require_admin(&ctx)?;

    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    tracing::info!(actor = %ctx.user.id, email = %req.email, "provisioning admin account");

    let created = state
        .identity
        .create_user(&req.email, &req.password, Role::Admin)
        .await?;

    Ok((StatusCode::CREATED, Json(UserSummaryResponse::from(created))))
}
