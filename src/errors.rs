use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

pub type Result<T> = core::result::Result<T, Error>;

pub const INVALID_INPUT: &str = "Invalid input.";

const GENERIC_FAILURE: &str = "Unable to process your request at this time. Please try again later.";

#[derive(Debug)]
pub enum Error {
    NotFound,
    /// The post addressed by the request does not exist.
    PostNotFound,
    /// The user referenced by a create payload does not exist. Reported with
    /// the same status class as a validation failure.
    UserNotFound,
    Unauthorized,
    BadRequest(String),
    InternalServerError,
    DatabaseError(sqlx::Error),
    Migration(sqlx::migrate::MigrateError),
    Config(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
            Self::PostNotFound => (StatusCode::NOT_FOUND, "Post not found."),
            Self::UserNotFound => (StatusCode::BAD_REQUEST, "User not found."),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            Self::InternalServerError => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE),
            Self::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE),
            Self::Migration(ref err) => {
                error!("Migration error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
            }
            Self::Config(ref msg) => {
                error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
            }
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        Self::DatabaseError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        warn!("Rejected payload: {}", err);
        Self::BadRequest(INVALID_INPUT.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(err: JsonRejection) -> Self {
        warn!("Malformed payload: {}", err.body_text());
        Self::BadRequest(INVALID_INPUT.to_string())
    }
}

impl From<QueryRejection> for Error {
    fn from(err: QueryRejection) -> Self {
        warn!("Malformed query string: {}", err.body_text());
        Self::BadRequest(INVALID_INPUT.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "resource not found"),
            Self::PostNotFound => write!(f, "post not found"),
            Self::UserNotFound => write!(f, "user not found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::BadRequest(msg) => write!(f, "bad request: {msg}"),
            Self::InternalServerError => write!(f, "internal server error"),
            Self::DatabaseError(err) => write!(f, "database error: {err}"),
            Self::Migration(err) => write!(f, "migration error: {err}"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
