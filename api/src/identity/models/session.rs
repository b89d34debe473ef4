use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Session {
    pub active: bool,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl Session {
    /// A session authenticates requests while it is active and `now` falls in
    /// `[issued_at, expires_at)`.
    pub fn is_valid_at(&self, now: NaiveDateTime) -> bool {
        self.active && self.issued_at <= now && now < self.expires_at
    }
}
