pub mod comment_like;
pub mod post_comment;
