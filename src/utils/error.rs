use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Falhas de uma execução de job (Extract → Upsert → Project → Commit)
///
/// `MalformedRecord` é tratado registro a registro e nunca aborta o job;
/// as demais abortam a execução e viram status `erro`.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Destination unavailable: {0}")]
    DestinationUnavailable(String),

    #[error("Malformed record {key}: {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("Job timed out after {0}s")]
    Timeout(u64),

    #[error("Job panicked: {0}")]
    Panicked(String),
}

impl From<jira::JiraError> for SyncError {
    fn from(err: jira::JiraError) -> Self {
        SyncError::SourceUnavailable(err.to_string())
    }
}

impl From<sheets::SheetsError> for SyncError {
    fn from(err: sheets::SheetsError) -> Self {
        SyncError::DestinationUnavailable(err.to_string())
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        SyncError::StoreUnavailable(err.to_string())
    }
}

/// Recusa de um disparo de job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("Job already running: {0}")]
    AlreadyRunning(String),
}

/// Erro devolvido pelas rotas REST do painel
#[derive(Debug)]
pub enum AppError {
    Trigger(TriggerError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Trigger(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<TriggerError> for AppError {
    fn from(err: TriggerError) -> Self {
        AppError::Trigger(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Trigger(err @ TriggerError::UnknownJob(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Trigger(err @ TriggerError::AlreadyRunning(_)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
        };

        let body = json!({
            "error": error_message,
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
