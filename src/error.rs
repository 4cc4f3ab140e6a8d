use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error as ThisError;

use crate::forms::FieldErrors;
use crate::response::redirect;
use crate::routes::LOGIN_URL;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(sqlx::Error),

    /// Postgres `23505`, carrying the constraint name.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("jwt error: {0}")]
    JWTError(#[from] jsonwebtoken::errors::Error),

    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("multipart error: {0}")]
    MultipartError(#[from] MultipartError),

    #[error("invalid configuration: {0}")]
    ConfigError(String),

    #[error("invalid form")]
    Validation(FieldErrors),

    #[error("business error: {0}")]
    BusinessError(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some("23505") {
                return Error::UniqueViolation(db.constraint().unwrap_or_default().to_owned());
            }
        }
        Error::DatabaseError(e)
    }
}

impl Error {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Error::UniqueViolation(_))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BusinessError(_) | Error::MultipartError(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) | Error::UniqueViolation(_) => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::SEE_OTHER,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            Error::Unauthorized => redirect(LOGIN_URL),
            Error::Validation(fields) => HttpResponse::build(status).json(ErrorBody {
                error: "invalid form",
                fields: Some(fields),
            }),
            _ if status.is_server_error() => {
                log::error!("{}", self);
                HttpResponse::build(status).json(ErrorBody {
                    error: "internal server error",
                    fields: None,
                })
            }
            _ => HttpResponse::build(status).json(ErrorBody {
                error: &self.to_string(),
                fields: None,
            }),
        }
    }
}
