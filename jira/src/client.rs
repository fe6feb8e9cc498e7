//! Cliente HTTP para a API REST v3 do Jira Cloud

use crate::error::{JiraError, Result};
use base64::Engine;
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Cliente para a API do Jira
///
/// Autentica com HTTP Basic (`email:api_token`), que é o modo suportado
/// pelo Jira Cloud para tokens de API.
///
/// # Timeouts
///
/// - Total: 30s
/// - Connect: 5s
///
/// Sem timeout uma chamada travada prenderia o job em `executando` para sempre.
#[derive(Clone, Debug)]
pub struct JiraClient {
    http_client: HttpClient,
    base_url: String,
    auth_header: String,
}

impl JiraClient {
    /// Cria um novo cliente Jira
    ///
    /// # Argumentos
    ///
    /// * `base_url` - URL da instância, ex: `https://empresa.atlassian.net`
    /// * `email` - E-mail do usuário dono do token
    /// * `api_token` - Token de API
    pub fn new(
        base_url: impl Into<String>,
        email: impl AsRef<str>,
        api_token: impl AsRef<str>,
    ) -> Result<Self> {
        Self::with_timeouts(base_url, email, api_token, 30, 5)
    }

    /// Cria um novo cliente com timeouts customizados
    pub fn with_timeouts(
        base_url: impl Into<String>,
        email: impl AsRef<str>,
        api_token: impl AsRef<str>,
        total_timeout_secs: u64,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(JiraError::ConfigError("Jira base URL is empty".to_string()));
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(total_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()
            .map_err(|e| JiraError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let credentials = format!("{}:{}", email.as_ref(), api_token.as_ref());
        let auth_header = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        );

        Ok(Self {
            http_client,
            base_url,
            auth_header,
        })
    }

    /// Executa um GET com query string e parseia JSON
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Processa a resposta HTTP e trata erros
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!("Jira API error ({}): {}", status_code, error_body);

        // O Jira devolve {"errorMessages": [...], "errors": {...}}
        let message = serde_json::from_str::<Value>(&error_body)
            .ok()
            .and_then(|json| {
                json.get("errorMessages")
                    .and_then(|v| v.as_array())
                    .and_then(|msgs| msgs.first())
                    .and_then(|m| m.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or(error_body);

        Err(JiraError::ApiError {
            status: status_code,
            message,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
