use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::types::sport::Sport;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Cannot read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot stat {path:?}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot read file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Cannot open archive {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid archive {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: zip::result::ZipError,
    },
    #[error("Cannot extract {entry} from {path:?}: {source}")]
    Extract {
        path: PathBuf,
        entry: String,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid GPX: {0}")]
    InvalidGpx(String),
    #[error("Invalid TCX: {0}")]
    InvalidTcx(String),
    #[error("Invalid FIT: {0}")]
    InvalidFit(String),
    #[error("No activity found in file")]
    EmptyFile,
    #[error("Invalid activity duration: {0} s")]
    InvalidDuration(f64),
}

/// Precondition failures of the derived metrics engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("{stream} stream cannot be empty to calculate {metric}")]
    EmptyStream {
        stream: &'static str,
        metric: &'static str,
    },
    #[error("Cannot compute {metric} on activity type: {sport}. {requirement}")]
    UnsupportedSport {
        metric: &'static str,
        sport: Sport,
        requirement: &'static str,
    },
    #[error("Cannot compute estimated cycling power with a rider weight of {0} kg")]
    InvalidRiderWeight(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Activity store unavailable: {0}")]
    Unavailable(String),
    #[error("Activity {0} already saved")]
    Conflict(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Sync already started")]
    AlreadyStarted,
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("Failed to parse {path:?}: {source}")]
    Parse { path: PathBuf, source: ParseError },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Cannot delete synced file {path:?}: {source}")]
    DeleteSource {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Sync(SyncError::AlreadyStarted) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Sync(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
