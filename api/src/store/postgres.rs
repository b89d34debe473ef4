use std::collections::HashMap;

use async_trait::async_trait;
use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_async::{
    pooled_connection::{
        deadpool::{BuildError, Pool},
        AsyncDieselConnectionManager,
    },
    AsyncPgConnection, RunQueryDsl,
};
use uuid::Uuid;

use super::{LikeOutcome, NewComment, Store, StoreError};
use crate::{
    feed::{
        comment::{Comment, Like, Post},
        models::{
            comment_like::NewCommentLike,
            post_comment::{NewPostComment, PostComment},
        },
    },
    identity::models::{session::Session, user::User},
    schema::{comment_likes, comments, posts, sessions, users},
};

pub type DieselPool = Pool<AsyncPgConnection>;

#[derive(Clone)]
pub struct PgStore {
    diesel: DieselPool,
}

impl PgStore {
    pub fn connect(database_url: &str, max_size: usize) -> Result<Self, BuildError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let diesel = Pool::builder(manager).max_size(max_size).build()?;

        Ok(PgStore { diesel })
    }

    /// Likes of the given comments grouped by comment, each group most
    /// recent first.
    async fn likes_of(
        conn: &mut AsyncPgConnection,
        comment_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Like>>, StoreError> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = comment_likes::table
            .filter(comment_likes::comment_id.eq_any(comment_ids.to_vec()))
            .order((comment_likes::created_at.desc(), comment_likes::id.desc()))
            .select((comment_likes::comment_id, comment_likes::user_id))
            .load::<(Uuid, Uuid)>(conn)
            .await?;

        let mut likes: HashMap<Uuid, Vec<Like>> = HashMap::new();
        for (comment_id, user_id) in rows {
            likes
                .entry(comment_id)
                .or_default()
                .push(Like { user: user_id });
        }

        Ok(likes)
    }

    async fn with_likes(
        conn: &mut AsyncPgConnection,
        row: PostComment,
    ) -> Result<Comment, StoreError> {
        let likes = Self::likes_of(conn, &[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();

        Ok(Comment::from_row(row, likes))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.diesel.get().await?;

        let found = sessions::table
            .inner_join(users::table)
            .filter(sessions::token.eq(token))
            .filter(sessions::active.eq(true))
            .select((Session::as_select(), User::as_select()))
            .first::<(Session, User)>(&mut conn)
            .await
            .optional()?;

        let now = chrono::Utc::now().naive_utc();
        Ok(found
            .filter(|(session, _)| session.is_valid_at(now))
            .map(|(_, user)| user))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut conn = self.diesel.get().await?;

        Ok(users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let mut conn = self.diesel.get().await?;

        let post_id = posts::table
            .find(id)
            .select(posts::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()?;

        let Some(post_id) = post_id else {
            return Ok(None);
        };

        let comment_ids = comments::table
            .filter(comments::post_id.eq(post_id))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(comments::id)
            .load::<Uuid>(&mut conn)
            .await?;

        Ok(Some(Post {
            id: post_id,
            comments: comment_ids,
        }))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let mut conn = self.diesel.get().await?;

        let row = diesel::insert_into(comments::table)
            .values(NewPostComment {
                id: Uuid::new_v4(),
                text: comment.text,
                user_id: comment.user,
                post_id: comment.post,
                name: comment.name,
                avatar: comment.avatar,
                created_at: chrono::Utc::now().naive_utc(),
            })
            .returning(PostComment::as_returning())
            .get_result::<PostComment>(&mut conn)
            .await?;

        Ok(Comment::from_row(row, vec![]))
    }

    async fn list_comments(&self) -> Result<Vec<Comment>, StoreError> {
        let mut conn = self.diesel.get().await?;

        let rows = comments::table
            .order((comments::created_at.desc(), comments::id.desc()))
            .select(PostComment::as_select())
            .load::<PostComment>(&mut conn)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut likes = Self::likes_of(&mut conn, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let comment_likes = likes.remove(&row.id).unwrap_or_default();
                Comment::from_row(row, comment_likes)
            })
            .collect())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let mut conn = self.diesel.get().await?;

        let row = comments::table
            .find(id)
            .select(PostComment::as_select())
            .first::<PostComment>(&mut conn)
            .await
            .optional()?;

        match row {
            Some(row) => Ok(Some(Self::with_likes(&mut conn, row).await?)),
            None => Ok(None),
        }
    }

    async fn update_comment_text(
        &self,
        id: Uuid,
        text: &str,
    ) -> Result<Option<Comment>, StoreError> {
        let mut conn = self.diesel.get().await?;

        let row = diesel::update(comments::table.find(id))
            .set(comments::text.eq(text))
            .returning(PostComment::as_returning())
            .get_result::<PostComment>(&mut conn)
            .await
            .optional()?;

        match row {
            Some(row) => Ok(Some(Self::with_likes(&mut conn, row).await?)),
            None => Ok(None),
        }
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.diesel.get().await?;

        // likes go with the comment through ON DELETE CASCADE
        let deleted = diesel::delete(comments::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(deleted > 0)
    }

    async fn add_like(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, StoreError> {
        let mut conn = self.diesel.get().await?;

        let inserted = diesel::insert_into(comment_likes::table)
            .values(NewCommentLike {
                comment_id,
                user_id,
                created_at: chrono::Utc::now().naive_utc(),
            })
            .on_conflict((comment_likes::comment_id, comment_likes::user_id))
            .do_nothing()
            .execute(&mut conn)
            .await;

        match inserted {
            Ok(1) => Ok(LikeOutcome::Added),
            Ok(_) => Ok(LikeOutcome::AlreadyLiked),
            // the comment was deleted after the caller looked it up
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Ok(LikeOutcome::CommentMissing)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_likes(&self, comment_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let mut conn = self.diesel.get().await?;

        Ok(Self::likes_of(&mut conn, &[comment_id])
            .await?
            .remove(&comment_id)
            .unwrap_or_default())
    }
}
