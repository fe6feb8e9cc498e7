//! Pipeline de sincronização de um job
//!
//! Extract (Jira) → Upsert (PostgreSQL) → Project (regras da aba + mapa de
//! linhas) → Commit (uma escrita em lote na planilha).
//!
//! Etapas estritamente sequenciais. Qualquer falha de etapa aborta a
//! execução; upserts já feitos ficam gravados.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::JobDefinition;
use crate::jobs::JobPipeline;
use crate::models::{CellUpdate, SyncReport};
use crate::services::jira_source::IssueSource;
use crate::services::projector::FieldProjector;
use crate::services::row_map::RowKeyMap;
use crate::services::sheets_destination::SheetDestination;
use crate::services::store::TaskStore;
use crate::utils::logging::log_row_not_found;
use crate::utils::SyncError;

pub struct SyncPipeline {
    definition: JobDefinition,
    jql: String,
    projector: FieldProjector,
    source: Arc<dyn IssueSource>,
    store: Arc<dyn TaskStore>,
    destination: Arc<dyn SheetDestination>,
}

impl SyncPipeline {
    pub fn new(
        definition: JobDefinition,
        project: &str,
        source: Arc<dyn IssueSource>,
        store: Arc<dyn TaskStore>,
        destination: Arc<dyn SheetDestination>,
    ) -> Self {
        let jql = definition.jql_for(project);
        let projector = FieldProjector::new([definition.rule.clone()]);
        Self {
            definition,
            jql,
            projector,
            source,
            store,
            destination,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn tab(&self) -> &str {
        &self.definition.rule.tab
    }

    /// Executa o pipeline completo uma vez
    pub async fn execute(&self, run_id: Uuid) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        let tab = self.tab();

        // Extract
        let extraction = self.source.fetch(&self.jql).await?;
        report.extracted = extraction.records.len();
        report.malformed = extraction.malformed;
        tracing::info!(
            "📥 [{}] {} tarefas extraídas do Jira ({} ignoradas) run_id={}",
            self.name(),
            report.extracted,
            report.malformed,
            run_id
        );

        // Upsert
        for record in &extraction.records {
            self.store.upsert(record).await?;
            report.upserted += 1;
        }
        tracing::info!(
            "💾 [{}] {} tarefas inseridas/atualizadas no banco run_id={}",
            self.name(),
            report.upserted,
            run_id
        );

        // Project
        let rows = self.destination.read_rows(tab).await?;
        let row_map = RowKeyMap::build(&rows);
        let mut updates: Vec<CellUpdate> = Vec::new();

        for record in &extraction.records {
            if !self.projector.matches(record, tab) {
                continue;
            }
            report.matched += 1;

            match self.projector.project(record, tab, &row_map) {
                Some(cells) => {
                    updates.extend(cells);
                    report.updated_rows += 1;
                }
                None => {
                    log_row_not_found(tab, &record.key);
                    report.skipped_no_row += 1;
                }
            }
        }

        // Commit
        if !updates.is_empty() {
            self.destination.write_cells(tab, &updates).await?;
            report.cells_written = updates.len();
        }

        tracing::info!(
            "🔄 [{}] aba '{}': {} linhas atualizadas, {} sem linha na planilha, {} células run_id={}",
            self.name(),
            tab,
            report.updated_rows,
            report.skipped_no_row,
            report.cells_written,
            run_id
        );

        Ok(report)
    }
}

#[async_trait]
impl JobPipeline for SyncPipeline {
    async fn run(&self, run_id: Uuid) -> Result<SyncReport, SyncError> {
        self.execute(run_id).await
    }
}
