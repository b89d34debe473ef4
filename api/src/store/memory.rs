use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::{LikeOutcome, NewComment, Store, StoreError};
use crate::{
    feed::comment::{Comment, Like, Post},
    identity::models::{session::Session, user::User},
};

/// In-process store for tests. Timestamps come from a logical clock that
/// advances one second per write so orderings are deterministic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    failing: AtomicBool,
    delete_before_like: AtomicBool,
}

#[derive(Default)]
struct Inner {
    clock: i64,
    users: HashMap<Uuid, User>,
    sessions: Vec<(String, Uuid, Session)>,
    posts: HashSet<Uuid>,
    comments: Vec<Comment>,
}

impl Inner {
    fn tick(&mut self) -> NaiveDateTime {
        self.clock += 1;
        epoch() + Duration::seconds(self.clock)
    }
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, name: &str, avatar: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            avatar: avatar.into(),
        };
        self.inner
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
        user
    }

    /// Opens a session for `user_id` that stays valid for a day of real time.
    pub fn add_session(&self, user_id: Uuid, token: &str) {
        let now = chrono::Utc::now().naive_utc();
        self.inner.lock().unwrap().sessions.push((
            token.into(),
            user_id,
            Session {
                active: true,
                issued_at: now - Duration::minutes(1),
                expires_at: now + Duration::days(1),
            },
        ));
    }

    pub fn add_post(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().posts.insert(id);
        id
    }

    /// Makes every following call fail like a lost database connection.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Deletes the target comment right before the next like is written,
    /// as a concurrent delete would.
    pub fn delete_before_like(&self) {
        self.delete_before_like.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Query(
                diesel::result::Error::BrokenTransactionManager,
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        let now = chrono::Utc::now().naive_utc();
        Ok(inner
            .sessions
            .iter()
            .find(|(t, _, s)| t == token && s.is_valid_at(now))
            .and_then(|(_, user_id, _)| inner.users.get(user_id).cloned()))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.check()?;
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        if !inner.posts.contains(&id) {
            return Ok(None);
        }

        let mut comments: Vec<&Comment> = inner.comments.iter().filter(|c| c.post == id).collect();
        comments.sort_by_key(|c| (c.created_at, c.id));

        Ok(Some(Post {
            id,
            comments: comments.into_iter().map(|c| c.id).collect(),
        }))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        let created = Comment {
            id: Uuid::new_v4(),
            text: comment.text,
            user: comment.user,
            post: comment.post,
            name: comment.name,
            avatar: comment.avatar,
            likes: vec![],
            created_at: inner.tick(),
        };
        inner.comments.push(created.clone());
        Ok(created)
    }

    async fn list_comments(&self) -> Result<Vec<Comment>, StoreError> {
        self.check()?;
        let mut comments = self.inner.lock().unwrap().comments.clone();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(comments)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_comment_text(
        &self,
        id: Uuid,
        text: &str,
    ) -> Result<Option<Comment>, StoreError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.text = text.to_string();
            c.clone()
        }))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.comments.len();
        inner.comments.retain(|c| c.id != id);
        Ok(inner.comments.len() < before)
    }

    async fn add_like(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, StoreError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        if self.delete_before_like.swap(false, Ordering::SeqCst) {
            inner.comments.retain(|c| c.id != comment_id);
        }

        match inner.comments.iter_mut().find(|c| c.id == comment_id) {
            None => Ok(LikeOutcome::CommentMissing),
            Some(c) if c.is_liked_by(user_id) => Ok(LikeOutcome::AlreadyLiked),
            Some(c) => {
                c.likes.insert(0, Like { user: user_id });
                Ok(LikeOutcome::Added)
            }
        }
    }

    async fn list_likes(&self, comment_id: Uuid) -> Result<Vec<Like>, StoreError> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .map(|c| c.likes.clone())
            .unwrap_or_default())
    }
}
