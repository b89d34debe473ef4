use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    feed::comment::{Comment, Like, Post},
    identity::models::user::User,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("could not get a database connection: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

/// Fields of a comment that the caller decides. The id, timestamp and likes
/// are filled in by the store.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub user: Uuid,
    pub post: Uuid,
    pub name: String,
    pub avatar: String,
}

/// What became of a like request once it reached storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LikeOutcome {
    Added,
    AlreadyLiked,
    /// The comment is gone, possibly deleted after the caller looked it up.
    CommentMissing,
}

/// Persistence used by the comment routes and the auth extractor.
#[async_trait]
pub trait Store: Send + Sync {
    /// Resolves an active, unexpired session token to its user.
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Loads a post together with the ids of its comments, oldest first.
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError>;

    /// Every comment, newest first.
    async fn list_comments(&self) -> Result<Vec<Comment>, StoreError>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;

    /// Returns `None` when the comment no longer exists.
    async fn update_comment_text(&self, id: Uuid, text: &str)
    -> Result<Option<Comment>, StoreError>;

    /// Returns whether a comment was removed.
    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Records a like unless the user already liked the comment.
    async fn add_like(&self, comment_id: Uuid, user_id: Uuid)
    -> Result<LikeOutcome, StoreError>;

    /// Likes of a comment, most recent first.
    async fn list_likes(&self, comment_id: Uuid) -> Result<Vec<Like>, StoreError>;
}
