pub mod create;
pub mod delete;
pub mod get;
pub mod like;
pub mod patch;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, FieldError},
    feed::models::post_comment::PostComment,
};

pub const MAX_TEXT_LENGTH: usize = 5000;

pub const COMMENT_NOT_FOUND: &str = "Comment not found";
pub const NOT_OWNER: &str = "User not authorized";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Like {
    pub user: Uuid,
}

// The model that will be returned to the client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub user: Uuid,
    pub post: Uuid,
    pub name: String,
    pub avatar: String,
    /// Most recent first, one entry per user
    pub likes: Vec<Like>,
    #[serde(rename = "date")]
    pub created_at: chrono::NaiveDateTime,
}

impl Comment {
    pub fn from_row(row: PostComment, likes: Vec<Like>) -> Self {
        Comment {
            id: row.id,
            text: row.text,
            user: row.user_id,
            post: row.post_id,
            name: row.name,
            avatar: row.avatar,
            likes,
            created_at: row.created_at,
        }
    }

    pub fn is_owned_by(&self, user: Uuid) -> bool {
        self.user == user
    }

    pub fn is_liked_by(&self, user: Uuid) -> bool {
        self.likes.iter().any(|l| l.user == user)
    }
}

/// A post as far as comments are concerned: its id and the ids of its
/// comments in the order they were written.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub comments: Vec<Uuid>,
}

/// Trims the submitted text and checks it is present and not too long.
pub fn validate_text(text: Option<String>) -> Result<String, FieldError> {
    let text = text.unwrap_or_default().trim().to_string();

    if text.is_empty() {
        return Err(FieldError {
            param: "text",
            msg: "Text is required",
        });
    }

    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(FieldError {
            param: "text",
            msg: "Text too long (max 5000 characters)",
        });
    }

    Ok(text)
}

/// Ids come from the URL as plain strings. Anything that isn't a UUID can't
/// name an existing record, so it is reported as not found.
pub fn parse_id(raw: &str, not_found: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(not_found))
}
