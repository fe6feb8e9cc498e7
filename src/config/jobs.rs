//! Definições dos jobs de sincronização
//!
//! Cada job extrai as issues do projeto, grava no banco e projeta status e
//! responsável numa aba da planilha. As três definições embutidas
//! reproduzem as abas usadas pelo jurídico; `[[jobs]]` na configuração
//! substitui a lista inteira.

use serde::{Deserialize, Serialize};

/// Campo do registro que pode ser escrito numa coluna
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectedField {
    Status,
    Assignee,
    Reporter,
    Summary,
    Created,
}

/// Campo → coluna (1-based, A = 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub field: ProjectedField,
    pub column: u32,
}

impl ColumnMapping {
    pub fn new(field: ProjectedField, column: u32) -> Self {
        Self { field, column }
    }
}

/// Regra de uma aba de destino
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRule {
    /// Nome da aba na planilha
    pub tab: String,
    /// O registro pertence à aba se o resumo contiver qualquer um destes
    /// marcadores (sem diferenciar maiúsculas/minúsculas)
    pub markers: Vec<String>,
    /// Colunas escritas, na ordem em que as células são emitidas
    pub columns: Vec<ColumnMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub name: String,
    /// JQL da extração; sem valor usa `project = {jira.project}`
    #[serde(default)]
    pub jql: Option<String>,
    #[serde(flatten)]
    pub rule: TabRule,
}

impl JobDefinition {
    pub fn jql_for(&self, project: &str) -> String {
        self.jql
            .clone()
            .unwrap_or_else(|| format!("project = {}", project))
    }

    /// Jobs `elaboracao`, `lgpd` e `consulta`
    pub fn builtin() -> Vec<JobDefinition> {
        use ProjectedField::{Assignee, Status};

        vec![
            JobDefinition {
                name: "elaboracao".to_string(),
                jql: None,
                rule: TabRule {
                    tab: "CONTRATOS".to_string(),
                    markers: vec!["ELABORAÇÃO".to_string()],
                    columns: vec![ColumnMapping::new(Status, 10), ColumnMapping::new(Assignee, 5)],
                },
            },
            JobDefinition {
                name: "lgpd".to_string(),
                jql: None,
                rule: TabRule {
                    tab: "COMPLIANCE & LGPD".to_string(),
                    markers: vec!["COMPLIANCE".to_string(), "LGPD".to_string()],
                    columns: vec![ColumnMapping::new(Status, 8), ColumnMapping::new(Assignee, 5)],
                },
            },
            JobDefinition {
                name: "consulta".to_string(),
                jql: None,
                rule: TabRule {
                    tab: "CONSULTA JURÍDICA".to_string(),
                    markers: vec!["CONSULTA JURÍDICA".to_string()],
                    columns: vec![ColumnMapping::new(Assignee, 4), ColumnMapping::new(Status, 7)],
                },
            },
        ]
    }
}
