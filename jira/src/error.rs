//! Tipos de erro para o crate jira

use thiserror::Error;

/// Erros do cliente Jira
#[derive(Debug, Error)]
pub enum JiraError {
    /// Erro de requisição HTTP (transporte, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Erro da API do Jira (status code não-2xx)
    #[error("Jira API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Resposta sem o formato esperado
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Erro de configuração
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, JiraError>;
