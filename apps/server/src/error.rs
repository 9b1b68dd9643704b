use std::io::Error as IoError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use siteup::{CheckError, ConfigError, StartupError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Startup(#[from] StartupError),
}

/// Check failure as seen by an HTTP client.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CheckError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            CheckError::SiteNotFound(_) => StatusCode::NOT_FOUND,
            CheckError::ProbeUnavailable { .. } => StatusCode::BAD_GATEWAY,
            CheckError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CheckError::Directory(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody { error: self.to_string() })
    }
}
