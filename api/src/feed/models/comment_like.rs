use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::comment_likes)]
pub struct NewCommentLike {
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub created_at: NaiveDateTime,
}
