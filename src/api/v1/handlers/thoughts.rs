/*
 * Responsibility
 * - /thoughts CRUD handlers
 * - The gate already ran; handlers trust AuthCtx and only add per-row
 *   ownership scoping (the repo filters by the authenticated user id)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::dto::thoughts::{CreateThoughtRequest, ThoughtResponse, UpdateThoughtRequest},
    api::v1::extractors::AuthCtxExtractor,
    error::AppError,
    repos::thought_repo,
    state::AppState,
};

pub async fn list_thoughts(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<ThoughtResponse>>, AppError> {
    let rows = thought_repo::list_for_user(&state.db, ctx.user.id).await?;
    Ok(Json(rows.into_iter().map(ThoughtResponse::from).collect()))
}

pub async fn create_thought(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateThoughtRequest>,
) -> Result<(StatusCode, Json<ThoughtResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    let row = thought_repo::create(&state.db, ctx.user.id, req.content.trim()).await?;
    Ok((StatusCode::CREATED, Json(ThoughtResponse::from(row))))
}

pub async fn get_thought(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(thought_id): Path<Uuid>,
) -> Result<Json<ThoughtResponse>, AppError> {
    let row = thought_repo::get(&state.db, ctx.user.id, thought_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(ThoughtResponse::from(row)))
}

pub async fn update_thought(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(thought_id): Path<Uuid>,
    Json(req): Json<UpdateThoughtRequest>,
) -> Result<Json<ThoughtResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    // Another user's thought id reads as absent, not forbidden: ids are not
    // probeable across accounts.
    let row = thought_repo::update_content(&state.db, ctx.user.id, thought_id, req.content.trim())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(ThoughtResponse::from(row)))
}

pub async fn delete_thought(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(thought_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = thought_repo::delete(&state.db, ctx.user.id, thought_id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
