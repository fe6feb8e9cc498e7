//! Busca paginada de issues (`/rest/api/3/search`)

use crate::client::JiraClient;
use crate::error::{JiraError, Result};
use crate::types::SearchPage;
use serde_json::Value;

const SEARCH_ENDPOINT: &str = "/rest/api/3/search";

/// Parâmetros de uma busca JQL
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub jql: String,
    pub fields: Vec<String>,
    pub page_size: u32,
}

impl SearchRequest {
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            fields: crate::types::DEFAULT_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            page_size: 100,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

impl JiraClient {
    /// Busca uma única página a partir de `start_at`
    pub async fn search_page(&self, request: &SearchRequest, start_at: u32) -> Result<SearchPage> {
        let query = [
            ("jql", request.jql.clone()),
            ("fields", request.fields.join(",")),
            ("startAt", start_at.to_string()),
            ("maxResults", request.page_size.to_string()),
        ];

        self.get_json(SEARCH_ENDPOINT, &query).await
    }

    /// Busca todas as issues que casam com a JQL, seguindo a paginação
    ///
    /// As issues voltam em JSON bruto; a conversão é feita uma a uma com
    /// [`crate::Issue::from_value`].
    ///
    /// Para quando `startAt + issues` alcança `total` ou quando uma página
    /// vem vazia (o Jira pode reduzir `maxResults` por conta própria).
    ///
    /// # Erros
    ///
    /// - `ApiError` para qualquer status não-2xx
    /// - `UnexpectedResponse` se a resposta não contiver `issues`
    pub async fn search_all(&self, request: &SearchRequest) -> Result<Vec<Value>> {
        let mut all = Vec::new();
        let mut start_at = 0u32;

        loop {
            let page = self.search_page(request, start_at).await?;
            let issues = page.issues.ok_or_else(|| {
                JiraError::UnexpectedResponse("'issues' not found in search response".to_string())
            })?;

            let fetched = issues.len() as u32;
            all.extend(issues);
            start_at += fetched;

            tracing::debug!(
                "Jira search page: {} issues (acumulado {}/{})",
                fetched,
                start_at,
                page.total
            );

            if fetched == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(all)
    }
}
