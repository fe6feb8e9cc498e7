//! Estruturas tipadas da API de busca do Jira
//!
//! Todos os campos de uma issue são opcionais: quem consome decide o que é
//! obrigatório. A página guarda as issues em JSON bruto e cada uma é
//! convertida separadamente com [`Issue::from_value`]: uma issue com campo de
//! tipo errado não invalida a página inteira.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Campos pedidos na busca (`fields=`)
pub const DEFAULT_FIELDS: &[&str] = &["summary", "created", "assignee", "reporter", "status"];

/// Uma página de resultados de `/rest/api/3/search`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    /// `None` quando a resposta não traz a chave `issues`
    pub issues: Option<Vec<Value>>,
}

/// Issue retornada pela busca
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    /// ISO-8601 com offset, ex: `2024-01-15T10:30:00.000-0300`
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub reporter: Option<User>,
    #[serde(default)]
    pub status: Option<IssueStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueStatus {
    #[serde(default)]
    pub name: Option<String>,
}

impl Issue {
    /// Converte uma issue bruta da página de busca
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.fields
            .assignee
            .as_ref()
            .and_then(|u| u.display_name.as_deref())
    }

    pub fn reporter_name(&self) -> Option<&str> {
        self.fields
            .reporter
            .as_ref()
            .and_then(|u| u.display_name.as_deref())
    }

    pub fn status_name(&self) -> Option<&str> {
        self.fields.status.as_ref().and_then(|s| s.name.as_deref())
    }
}
