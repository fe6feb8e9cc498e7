//! Tipos de erro para o crate sheets

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    /// Erro de requisição HTTP (transporte, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Erro da API do Google Sheets (status code não-2xx)
    #[error("Sheets API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha ao obter token da service account
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SheetsError>;
