use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Valor gravado quando a issue não tem responsável
pub const UNASSIGNED: &str = "Não atribuído";

/// Tarefa do Jira, unidade de sincronização
///
/// Identidade: `key` (chave da issue). Os demais campos são sobrescritos a
/// cada nova extração.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub key: String,
    pub created: DateTime<FixedOffset>,
    pub summary: String,
    /// Nome de exibição do responsável ou [`UNASSIGNED`]
    pub assignee: String,
    pub reporter: String,
    pub status: String,
}

/// Registro como está no banco, com o carimbo da última sincronização
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTask {
    pub record: TaskRecord,
    pub synced_at: DateTime<Utc>,
}
