use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::Json;

/// Failure classes surfaced by the attendance core.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("export failed: {0}")]
    Export(String),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn invalid_range(start: &str, end: &str) -> Self {
        Self::BadRequest(format!("startDate {start} must not be after endDate {end}"))
    }

    pub fn overnight_shift(check_in: &str, check_out: &str) -> Self {
        Self::BadRequest(format!(
            "check-out {check_out} is earlier than check-in {check_in}; overnight shifts are not supported"
        ))
    }

    pub fn duplicate_key(date: &str, name: &str, slot: Option<u8>) -> Self {
        let slot = slot.map_or_else(|| "none".to_string(), |s| s.to_string());
        Self::Conflict(format!(
            "duplicate attendance record for {name} on {date} (slot {slot})"
        ))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

macro_rules! bad_request_from_rejection {
    ($($rejection:ty),+) => {
        $(impl From<$rejection> for AppError {
            fn from(rejection: $rejection) -> Self {
                Self {
                    status: StatusCode::BAD_REQUEST,
                    message: rejection.body_text(),
                }
            }
        })+
    };
}

bad_request_from_rejection!(JsonRejection, QueryRejection, PathRejection);

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
