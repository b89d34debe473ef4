use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::store::StoreError;

pub const SERVER_ERROR_MSG: &str = "Server error";

/// A single rejected input field, reported back to the client as part of a
/// validation error.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FieldError {
    pub param: &'static str,
    pub msg: &'static str,
}

#[derive(Debug)]
pub enum AppError {
    Validation(Vec<FieldError>),
    NotFound(&'static str),
    Unauthorized(&'static str),
    AlreadyLiked,
    BadRequest(String),
    ServerError {
        error: StoreError,
        backtrace: backtrace::Backtrace,
    },
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl ErrorResponse {
    fn new(code: &'static str, msg: impl Into<String>) -> Self {
        ErrorResponse {
            code,
            msg: Some(msg.into()),
            errors: vec![],
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::AlreadyLiked | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        let error_response = match self {
            AppError::Validation(errors) => ErrorResponse {
                code: "VALIDATION_ERR",
                msg: None,
                errors,
            },
            AppError::NotFound(msg) => ErrorResponse::new("NOT_FOUND", msg),
            AppError::Unauthorized(msg) => ErrorResponse::new("UNAUTHORIZED", msg),
            AppError::AlreadyLiked => ErrorResponse::new("ALREADY_LIKED", "Comment already liked"),
            AppError::BadRequest(msg) => ErrorResponse::new("BAD_REQUEST", msg),
            AppError::ServerError { error, backtrace } => {
                // The detail stays in the logs, the client only gets the fixed message
                let frames = filter_backtrace(&backtrace);
                tracing::error!(%error, ?frames, "Unhandled server error");
                ErrorResponse::new("SERVER_ERR", SERVER_ERROR_MSG)
            }
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::ServerError {
            error: e,
            backtrace: backtrace::Backtrace::new(),
        }
    }
}

#[derive(Debug)]
#[allow(dead_code)]
struct FrameInfo {
    name: String,
    loc: String,
}

fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
    let mut frames_info: Vec<FrameInfo> = Vec::new();

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            if let (Some(name), Some(filename), Some(lineno)) = (
                symbol.name().map(|n| n.to_string()),
                symbol.filename().map(|f| f.to_owned()),
                symbol.lineno(),
            ) {
                if name.contains(MODULE_PREFIX) {
                    frames_info.push(FrameInfo {
                        name,
                        loc: format!("{}:{}", filename.display(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_server_error_hides_detail() {
        let err: AppError = StoreError::Query(diesel::result::Error::NotFound).into();
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["msg"], SERVER_ERROR_MSG);
        assert!(!body.to_string().contains("Record not found"));
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let err = AppError::Validation(vec![
            FieldError {
                param: "text",
                msg: "Text is required",
            },
            FieldError {
                param: "post",
                msg: "Post is required",
            },
        ]);
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERR");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][1]["param"], "post");
        assert!(body.get("msg").is_none());
    }

    #[tokio::test]
    async fn test_already_liked_is_bad_request() {
        let (status, body) = body_json(AppError::AlreadyLiked).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["msg"], "Comment already liked");
    }
}
