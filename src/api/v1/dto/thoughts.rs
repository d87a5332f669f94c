/*
 * Responsibility
 * - Thoughts request/response DTOs + format validation
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::thought_repo::ThoughtRow;

const MAX_CONTENT_CHARS: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct CreateThoughtRequest {
    pub content: String,
}

impl CreateThoughtRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.content.trim().is_empty() {
            return Err("content is required");
        }
        if self.content.chars().count() > MAX_CONTENT_CHARS {
            return Err("content is too long");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateThoughtRequest {
    pub content: String,
}

impl UpdateThoughtRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.content.trim().is_empty() {
            return Err("content cannot be empty");
        }
        if self.content.chars().count() > MAX_CONTENT_CHARS {
            return Err("content is too long");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ThoughtResponse {
    pub id: Uuid,
    pub content: String,
    // Filled in asynchronously by the summarization worker.
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ThoughtRow> for ThoughtResponse {
    fn from(row: ThoughtRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            summary: row.summary,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_is_rejected() {
        let req = CreateThoughtRequest {
            content: "   ".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn oversized_content_is_rejected() {
        let req = CreateThoughtRequest {
            content: "x".repeat(MAX_CONTENT_CHARS + 1),
        };
        assert!(req.validate().is_err());
    }
}
