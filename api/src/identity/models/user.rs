use diesel::prelude::*;
use uuid::Uuid;

/// A registered user as seen by this service. Profiles are managed
/// elsewhere, we only read them.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}
