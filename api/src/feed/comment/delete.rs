use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, identity::AuthUser, store::Store, App};

use super::{parse_id, COMMENT_NOT_FOUND, NOT_OWNER};

#[derive(Serialize, Debug, PartialEq)]
pub struct Removed {
    msg: &'static str,
}

#[debug_handler]
pub async fn delete_comment(
    State(ctx): State<App>,
    Path(id): Path<String>,
    AuthUser(auth_user): AuthUser,
) -> Result<Json<Removed>, AppError> {
    let id = parse_id(&id, COMMENT_NOT_FOUND)?;

    remove(ctx.store.as_ref(), id, auth_user.id).await?;

    Ok(Json(Removed {
        msg: "Comment removed",
    }))
}

/// Deletes a comment written by `actor`.
pub async fn remove(store: &dyn Store, id: Uuid, actor: Uuid) -> Result<(), AppError> {
    let comment = store
        .find_comment(id)
        .await?
        .ok_or(AppError::NotFound(COMMENT_NOT_FOUND))?;

    if !comment.is_owned_by(actor) {
        tracing::warn!(comment_id = %id, user_id = %actor, "Rejected delete by non-owner");
        return Err(AppError::Unauthorized(NOT_OWNER));
    }

    if !store.delete_comment(id).await? {
        return Err(AppError::NotFound(COMMENT_NOT_FOUND));
    }

    tracing::debug!(comment_id = %id, post_id = %comment.post, "Comment removed");

    Ok(())
}
