use std::collections::HashMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use diesel_async::pooled_connection::deadpool::PoolError;
use serde::Serialize;
use serde_json::Value;

/// Failures of the storage collaborators. These never reach the client
/// verbatim outside of debug builds.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("could not get a database connection: {0}")]
    PoolError(#[from] PoolError),
}

impl Serialize for ServerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            ServerError::DatabaseError(e) => {
                map.serialize_entry("kind", "database")?;
                map.serialize_entry("message", &e.to_string())?;
            }
            ServerError::PoolError(e) => {
                map.serialize_entry("kind", "pool")?;
                map.serialize_entry("message", &e.to_string())?;
            }
        }
        map.end()
    }
}

/// Errors caused by the request itself. They carry their own status code and
/// a stable machine readable code.
pub trait ApiRequestError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            _ => "ERR",
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RequestError {
    #[error("Invalid parameter value detected: {0}")]
    InvalidParameter(String),

    /// Carries the message key of the thing that could not be found, e.g.
    /// `invalidcomment`.
    #[error("{0}")]
    NotFound(&'static str),

    #[error("Sorry, but you do not currently have permissions to do that ({0})")]
    Forbidden(&'static str),
}

impl RequestError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RequestError::InvalidParameter(msg.into())
    }
}

impl ApiRequestError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RequestError::InvalidParameter(_) => "INVALID_PARAMETER",
            RequestError::NotFound(_) => "NOT_FOUND",
            RequestError::Forbidden(_) => "FORBIDDEN",
        }
    }
}

#[derive(Serialize)]
pub enum AppError {
    ServerError {
        error: ServerError,

        #[serde(skip_serializing)]
        #[cfg(debug_assertions)]
        backtrace: Option<backtrace::Backtrace>,
    },
    ApiRequest {
        #[serde(skip_serializing)]
        status: StatusCode,
        code: &'static str,
        msg: String,
    },
}

impl AppError {
    fn from_request_error(e: &dyn ApiRequestError) -> Self {
        AppError::ApiRequest {
            status: e.status_code(),
            code: e.code(),
            msg: e.to_string(),
        }
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::ServerError { error, .. } => write!(f, "ServerError({error:?})"),
            AppError::ApiRequest { status, code, msg } => {
                write!(f, "ApiRequest({status}, {code}, {msg})")
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,

    #[cfg(debug_assertions)]
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_info: Option<HashMap<&'static str, Value>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, error_response) = match self {
            AppError::ServerError {
                error,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                tracing::error!(%error, "request failed on a storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    #[cfg(debug_assertions)]
                    {
                        let frames_info = backtrace
                            .as_ref()
                            .map(filter_backtrace)
                            .unwrap_or_default();
                        ErrorResponse {
                            code: "SERVER_ERR".into(),
                            msg: Some("Internal server error".into()),
                            debug_info: Some(HashMap::from([
                                (
                                    "backtrace",
                                    serde_json::to_value(&frames_info).unwrap_or_default(),
                                ),
                                ("error", serde_json::to_value(&error).unwrap_or_default()),
                            ])),
                        }
                    },
                    #[cfg(not(debug_assertions))]
                    ErrorResponse {
                        code: "SERVER_ERR".into(),
                        msg: Some("Internal server error".into()),
                    },
                )
            }
            AppError::ApiRequest { status, code, msg } => (
                status,
                ErrorResponse {
                    code: code.into(),
                    msg: Some(msg),
                    #[cfg(debug_assertions)]
                    debug_info: None,
                },
            ),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<ServerError> for AppError {
    fn from(e: ServerError) -> Self {
        AppError::ServerError {
            error: e,

            #[cfg(debug_assertions)]
            backtrace: Some(backtrace::Backtrace::new()),
        }
    }
}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        AppError::from_request_error(&e)
    }
}

impl From<crate::identity::AuthenticationError> for AppError {
    fn from(e: crate::identity::AuthenticationError) -> Self {
        AppError::from_request_error(&e)
    }
}

#[derive(Serialize, Debug)]
struct FrameInfo {
    name: String,
    loc: String,
}

fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = concat!(env!("CARGO_PKG_NAME"), "::");
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
                        loc: format!("{}:{}", filename.to_string_lossy(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}
