use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostComment {
    pub id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub avatar: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewPostComment {
    pub id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub avatar: String,
    pub created_at: NaiveDateTime,
}
