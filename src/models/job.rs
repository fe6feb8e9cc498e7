use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status de um job no painel
///
/// Transições de uma execução: `idle|sucesso|erro → iniciando → executando → sucesso|erro`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Iniciando,
    Executando,
    Sucesso,
    Erro,
}

impl JobStatus {
    /// `iniciando` ou `executando`
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Iniciando | JobStatus::Executando)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Iniciando => "iniciando",
            JobStatus::Executando => "executando",
            JobStatus::Sucesso => "sucesso",
            JobStatus::Erro => "erro",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Par status + última execução, sempre lido e escrito junto
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobState {
    pub status: JobStatus,
    pub last_run: Option<DateTime<Utc>>,
}

impl Default for JobState {
    fn default() -> Self {
        Self {
            status: JobStatus::Idle,
            last_run: None,
        }
    }
}

/// Contadores de uma execução bem-sucedida
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Issues válidas extraídas da fonte
    pub extracted: usize,
    /// Issues ignoradas por falta de campo obrigatório
    pub malformed: usize,
    pub upserted: usize,
    /// Registros que casaram com a regra da aba
    pub matched: usize,
    pub updated_rows: usize,
    /// Casaram com a regra mas a chave não existe na aba
    pub skipped_no_row: usize,
    pub cells_written: usize,
}
