/*
 * Responsibility
 * - SQLx access to the thoughts table
 * - Every statement is scoped by "userId"; a row can only be read or
 *   mutated by its owner
 * - summary is written by the external summarization worker, read-only here
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct ThoughtRow {
    #[sqlx(rename = "thoughtId")]
    pub id: Uuid,
    #[sqlx(rename = "userId")]
    pub user_id: Uuid,
    pub content: String,
    pub summary: Option<String>,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<ThoughtRow>, RepoError> {
    let rows = sqlx::query_as::<_, ThoughtRow>(
        r#"
        SELECT "thoughtId", "userId", content, summary, "createdAt"
        FROM thoughts
        WHERE "userId" = $1
        ORDER BY "createdAt" DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn create(db: &PgPool, user_id: Uuid, content: &str) -> Result<ThoughtRow, RepoError> {
    let row = sqlx::query_as::<_, ThoughtRow>(
        r#"
        INSERT INTO thoughts ("userId", content)
        VALUES ($1, $2)
        RETURNING "thoughtId", "userId", content, summary, "createdAt"
        "#,
    )
    .bind(user_id)
    .bind(content)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn get(
    db: &PgPool,
    user_id: Uuid,
    thought_id: Uuid,
) -> Result<Option<ThoughtRow>, RepoError> {
    let row = sqlx::query_as::<_, ThoughtRow>(
        r#"
        SELECT "thoughtId", "userId", content, summary, "createdAt"
        FROM thoughts
        WHERE "thoughtId" = $1
            AND "userId" = $2
        "#,
    )
    .bind(thought_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn update_content(
    db: &PgPool,
    user_id: Uuid,
    thought_id: Uuid,
    content: &str,
) -> Result<Option<ThoughtRow>, RepoError> {
    // Editing the text invalidates any previous summary.
    let row = sqlx::query_as::<_, ThoughtRow>(
        r#"
        UPDATE thoughts
        SET content = $3,
            summary = NULL
        WHERE "thoughtId" = $1
            AND "userId" = $2
        RETURNING "thoughtId", "userId", content, summary, "createdAt"
        "#,
    )
    .bind(thought_id)
    .bind(user_id)
    .bind(content)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, thought_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM thoughts
        WHERE "thoughtId" = $1
            AND "userId" = $2
        "#,
    )
    .bind(thought_id)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
