use axum::{
    routing::{get, put},
    Router,
};

use crate::App;

use super::comment::{
    create::create_comment,
    delete::delete_comment,
    get::{get_comment, get_comments},
    like::like_comment,
    patch::patch_comment,
};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/", get(get_comments).post(create_comment))
        .route("/like/{id}", put(like_comment))
        .route(
            "/{id}",
            get(get_comment).put(patch_comment).delete(delete_comment),
        )
}
