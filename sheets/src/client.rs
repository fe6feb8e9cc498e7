//! Cliente HTTP para a API Google Sheets v4 (recurso `values`)

use crate::a1;
use crate::error::{Result, SheetsError};
use gcp_auth::TokenProvider;
use reqwest::{Client as HttpClient, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const SHEETS_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];
const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Uma célula a escrever (linha e coluna 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: String,
}

impl Cell {
    pub fn new(row: u32, col: u32, value: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: value.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    total_updated_cells: u32,
}

#[derive(Clone)]
enum Auth {
    ServiceAccount(Arc<dyn TokenProvider>),
    /// Token fixo (testes, proxies autenticados)
    Static(String),
}

/// Cliente de uma planilha específica
#[derive(Clone)]
pub struct SheetsClient {
    http_client: HttpClient,
    base_url: String,
    spreadsheet_id: String,
    auth: Auth,
}

// TokenProvider não implementa Debug
impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("base_url", &self.base_url)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    /// Cria um cliente autenticado pelo arquivo JSON da service account
    ///
    /// Falha imediatamente se o arquivo não existir ou for inválido.
    pub fn from_service_account_file(
        spreadsheet_id: impl Into<String>,
        credentials_file: impl AsRef<Path>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let path = credentials_file.as_ref();
        let account = gcp_auth::CustomServiceAccount::from_file(path).map_err(|e| {
            SheetsError::ConfigError(format!(
                "Failed to load service account '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::build(
            DEFAULT_BASE_URL,
            spreadsheet_id,
            Auth::ServiceAccount(Arc::new(account)),
            timeout_secs,
        )
    }

    /// Cria um cliente com token fixo e URL base customizada
    pub fn with_static_token(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        token: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        Self::build(base_url, spreadsheet_id, Auth::Static(token.into()), timeout_secs)
    }

    fn build(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        auth: Auth,
        timeout_secs: u64,
    ) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id.into();
        if spreadsheet_id.is_empty() {
            return Err(SheetsError::ConfigError("spreadsheet id is empty".to_string()));
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| SheetsError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            spreadsheet_id,
            auth,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn bearer(&self) -> Result<String> {
        match &self.auth {
            Auth::Static(token) => Ok(format!("Bearer {}", token)),
            Auth::ServiceAccount(provider) => {
                let token = provider
                    .token(SHEETS_SCOPES)
                    .await
                    .map_err(|e| SheetsError::AuthError(e.to_string()))?;
                Ok(format!("Bearer {}", token.as_str()))
            }
        }
    }

    /// Lê todas as linhas preenchidas de uma aba
    ///
    /// Linhas na ordem da planilha, a primeira é o cabeçalho. Células vazias
    /// no fim de uma linha não são retornadas pela API.
    pub async fn get_all_values(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let range = urlencoding::encode(&a1::quote_sheet_name(sheet)).into_owned();
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        );

        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.bearer().await?)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        let body: ValueRange = serde_json::from_str(&response.text().await?)?;
        Ok(body.values)
    }

    /// Escreve um lote de células numa única chamada `values:batchUpdate`
    ///
    /// Retorna o total de células atualizadas informado pela API.
    /// Lote vazio não faz requisição.
    pub async fn update_cells(&self, sheet: &str, cells: &[Cell]) -> Result<u32> {
        if cells.is_empty() {
            return Ok(0);
        }

        let data: Vec<Value> = cells
            .iter()
            .map(|cell| {
                json!({
                    "range": a1::cell_range(sheet, cell.row, cell.col),
                    "values": [[cell.value]]
                })
            })
            .collect();

        let body = json!({
            "valueInputOption": "RAW",
            "data": data
        });

        let url = format!(
            "{}/spreadsheets/{}/values:batchUpdate",
            self.base_url, self.spreadsheet_id
        );

        tracing::debug!("POST {} ({} células)", url, cells.len());

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.bearer().await?)
            .json(&body)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        let result: BatchUpdateResponse = serde_json::from_str(&response.text().await?)?;
        Ok(result.total_updated_cells)
    }

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

        tracing::error!("Sheets API error ({}): {}", status_code, error_body);

        // {"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT"}}
        let message = serde_json::from_str::<Value>(&error_body)
            .ok()
            .and_then(|json| {
                json.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or(error_body);

        Err(SheetsError::ApiError {
            status: status_code,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> SheetsClient {
        SheetsClient::with_static_token(server.url("/v4"), "sheet-123", "test-token", 5).unwrap()
    }

    #[tokio::test]
    async fn test_get_all_values() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("/v4/spreadsheets/sheet-123/values/")
                    .header("Authorization", "Bearer test-token");
                then.status(200).json_body(json!({
                    "range": "'CONSULTA JURÍDICA'!A1:Z1000",
                    "majorDimension": "ROWS",
                    "values": [["Chave", "Cliente"], ["LCSD-1", "ACME"]]
                }));
            })
            .await;

        let rows = client(&server).get_all_values("CONSULTA JURÍDICA").await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "LCSD-1");
    }

    #[tokio::test]
    async fn test_get_all_values_empty_sheet() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200)
                    .json_body(json!({ "range": "'CONTRATOS'!A1:Z1000", "majorDimension": "ROWS" }));
            })
            .await;

        let rows = client(&server).get_all_values("CONTRATOS").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_update_cells_batches_ranges() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v4/spreadsheets/sheet-123/values:batchUpdate")
                    .json_body(json!({
                        "valueInputOption": "RAW",
                        "data": [
                            { "range": "'CONTRATOS'!J3", "values": [["Concluído"]] },
                            { "range": "'CONTRATOS'!E3", "values": [["Ana"]] }
                        ]
                    }));
                then.status(200).json_body(json!({
                    "spreadsheetId": "sheet-123",
                    "totalUpdatedCells": 2
                }));
            })
            .await;

        let cells = vec![Cell::new(3, 10, "Concluído"), Cell::new(3, 5, "Ana")];
        let updated = client(&server).update_cells("CONTRATOS", &cells).await.unwrap();

        mock.assert_async().await;
        assert_eq!(updated, 2);
    }

    #[tokio::test]
    async fn test_update_cells_empty_is_noop() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(500);
            })
            .await;

        let updated = client(&server).update_cells("CONTRATOS", &[]).await.unwrap();

        assert_eq!(updated, 0);
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(400).json_body(json!({
                    "error": { "code": 400, "message": "Unable to parse range: 'X'", "status": "INVALID_ARGUMENT" }
                }));
            })
            .await;

        let err = client(&server).get_all_values("X").await.unwrap_err();
        match err {
            SheetsError::ApiError { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Unable to parse range: 'X'");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_success_body_is_json_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("<html>login</html>");
            })
            .await;

        let err = client(&server).get_all_values("CONTRATOS").await.unwrap_err();
        assert!(matches!(err, SheetsError::JsonError(_)));
    }

    #[test]
    fn test_missing_credentials_file_fails_fast() {
        let result = SheetsClient::from_service_account_file("sheet-123", "/nao/existe.json", 30);
        assert!(matches!(result, Err(SheetsError::ConfigError(_))));
    }

    #[test]
    fn test_empty_spreadsheet_id_is_rejected() {
        let result = SheetsClient::with_static_token("http://localhost", "", "t", 5);
        assert!(matches!(result, Err(SheetsError::ConfigError(_))));
    }
}
