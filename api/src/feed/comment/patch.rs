use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, identity::AuthUser, store::Store, App};

use super::{parse_id, validate_text, Comment, COMMENT_NOT_FOUND, NOT_OWNER};

#[debug_handler]
pub async fn patch_comment(
    State(ctx): State<App>,
    Path(id): Path<String>,
    AuthUser(auth_user): AuthUser,
    crate::json::Json(comment): crate::json::Json<CommentPatch>,
) -> Result<Json<Comment>, AppError> {
    let text = validate_text(comment.text).map_err(|e| AppError::Validation(vec![e]))?;
    let id = parse_id(&id, COMMENT_NOT_FOUND)?;

    Ok(Json(update(ctx.store.as_ref(), id, text, auth_user.id).await?))
}

/// Replaces the text of a comment. Only its author may do so.
pub async fn update(
    store: &dyn Store,
    id: Uuid,
    text: String,
    actor: Uuid,
) -> Result<Comment, AppError> {
    let comment = store
        .find_comment(id)
        .await?
        .ok_or(AppError::NotFound(COMMENT_NOT_FOUND))?;

    if !comment.is_owned_by(actor) {
        tracing::warn!(comment_id = %id, user_id = %actor, "Rejected edit by non-owner");
        return Err(AppError::Unauthorized(NOT_OWNER));
    }

    // the comment may have been deleted since we loaded it
    let updated = store
        .update_comment_text(id, &text)
        .await?
        .ok_or(AppError::NotFound(COMMENT_NOT_FOUND))?;

    tracing::debug!(comment_id = %id, "Comment updated");

    Ok(updated)
}

#[derive(Deserialize, Debug)]
pub struct CommentPatch {
    #[serde(default)]
    text: Option<String>,
}
