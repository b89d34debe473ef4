use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, FieldError},
    identity::AuthUser,
    store::{NewComment, Store},
    App,
};

use super::{parse_id, validate_text, Comment};

pub const POST_NOT_FOUND: &str = "Post not found";
pub const USER_NOT_FOUND: &str = "User not found";

#[debug_handler]
pub async fn create_comment(
    State(ctx): State<App>,
    AuthUser(auth_user): AuthUser,
    crate::json::Json(submission): crate::json::Json<CommentSubmission>,
) -> Result<Json<Comment>, AppError> {
    let (text, post) = submission.validate()?;

    let comment = create(ctx.store.as_ref(), auth_user.id, text, &post).await?;

    Ok(Json(comment))
}

/// Writes a comment by `actor` on `post_id`, copying the author's name and
/// avatar onto it.
pub async fn create(
    store: &dyn Store,
    actor: Uuid,
    text: String,
    post_id: &str,
) -> Result<Comment, AppError> {
    let user = store
        .find_user(actor)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    let post_id = parse_id(post_id, POST_NOT_FOUND)?;
    let post = store
        .find_post(post_id)
        .await?
        .ok_or(AppError::NotFound(POST_NOT_FOUND))?;

    let comment = store
        .insert_comment(NewComment {
            text,
            user: user.id,
            post: post.id,
            name: user.name,
            avatar: user.avatar,
        })
        .await?;

    tracing::debug!(comment_id = %comment.id, post_id = %post.id, user_id = %actor, "Comment created");

    Ok(comment)
}

#[derive(Deserialize, Debug, Default)]
pub struct CommentSubmission {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    post: Option<String>,
}

impl CommentSubmission {
    /// Returns the trimmed text and post id, or every field that was rejected.
    fn validate(self) -> Result<(String, String), AppError> {
        let mut errors = vec![];

        let text = validate_text(self.text).map_err(|e| errors.push(e)).ok();

        let post = self.post.map(|p| p.trim().to_string()).unwrap_or_default();
        if post.is_empty() {
            errors.push(FieldError {
                param: "post",
                msg: "Post is required",
            });
        }

        match text {
            Some(text) if errors.is_empty() => Ok((text, post)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}
