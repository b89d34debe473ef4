use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{error::AppError, identity::AuthUser, store::Store, App};

use super::{parse_id, Comment, COMMENT_NOT_FOUND};

pub async fn get_comments(
    State(ctx): State<App>,
    AuthUser(_auth_user): AuthUser,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(list(ctx.store.as_ref()).await?))
}

pub async fn get_comment(
    State(ctx): State<App>,
    Path(id): Path<String>,
    AuthUser(_auth_user): AuthUser,
) -> Result<Json<Comment>, AppError> {
    let id = parse_id(&id, COMMENT_NOT_FOUND)?;

    Ok(Json(find(ctx.store.as_ref(), id).await?))
}

/// Every comment across all posts, newest first.
pub async fn list(store: &dyn Store) -> Result<Vec<Comment>, AppError> {
    Ok(store.list_comments().await?)
}

pub async fn find(store: &dyn Store, id: Uuid) -> Result<Comment, AppError> {
    store
        .find_comment(id)
        .await?
        .ok_or(AppError::NotFound(COMMENT_NOT_FOUND))
}
