use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    identity::AuthUser,
    store::{LikeOutcome, Store},
    App,
};

use super::{parse_id, Like, COMMENT_NOT_FOUND};

#[debug_handler]
pub async fn like_comment(
    State(ctx): State<App>,
    Path(id): Path<String>,
    AuthUser(auth_user): AuthUser,
) -> Result<Json<Vec<Like>>, AppError> {
    let id = parse_id(&id, COMMENT_NOT_FOUND)?;

    Ok(Json(like(ctx.store.as_ref(), id, auth_user.id).await?))
}

/// Adds `actor` to the front of the comment's likes and returns them. There
/// is no unlike, a second like by the same user is rejected.
pub async fn like(store: &dyn Store, id: Uuid, actor: Uuid) -> Result<Vec<Like>, AppError> {
    let comment = store
        .find_comment(id)
        .await?
        .ok_or(AppError::NotFound(COMMENT_NOT_FOUND))?;

    if comment.is_liked_by(actor) {
        return Err(AppError::AlreadyLiked);
    }

    // a concurrent like or delete may have landed in between
    match store.add_like(id, actor).await? {
        LikeOutcome::Added => {}
        LikeOutcome::AlreadyLiked => return Err(AppError::AlreadyLiked),
        LikeOutcome::CommentMissing => return Err(AppError::NotFound(COMMENT_NOT_FOUND)),
    }

    tracing::debug!(comment_id = %id, user_id = %actor, "Comment liked");

    Ok(store.list_likes(id).await?)
}
