//! Classificação de registros por aba e projeção de campos em células
//!
//! A regra é textual: o resumo da issue em maiúsculas contém algum dos
//! marcadores da aba. Um registro pode cair em nenhuma, uma ou várias abas;
//! não existe precedência entre elas.

use std::collections::BTreeSet;

use crate::config::{ProjectedField, TabRule};
use crate::models::{CellUpdate, TaskRecord};
use crate::services::row_map::RowKeyMap;

#[derive(Debug, Clone)]
pub struct FieldProjector {
    rules: Vec<NormalizedRule>,
}

#[derive(Debug, Clone)]
struct NormalizedRule {
    rule: TabRule,
    upper_markers: Vec<String>,
}

impl NormalizedRule {
    fn new(rule: TabRule) -> Self {
        let upper_markers = rule
            .markers
            .iter()
            .map(|m| m.trim().to_uppercase())
            .filter(|m| !m.is_empty())
            .collect();
        Self {
            rule,
            upper_markers,
        }
    }

    fn matches_summary(&self, upper_summary: &str) -> bool {
        self.upper_markers
            .iter()
            .any(|marker| upper_summary.contains(marker.as_str()))
    }
}

impl FieldProjector {
    pub fn new(rules: impl IntoIterator<Item = TabRule>) -> Self {
        Self {
            rules: rules.into_iter().map(NormalizedRule::new).collect(),
        }
    }

    /// Abas às quais o registro pertence (cada aba no máximo uma vez)
    pub fn classify(&self, record: &TaskRecord) -> BTreeSet<String> {
        let upper = record.summary.to_uppercase();
        self.rules
            .iter()
            .filter(|r| r.matches_summary(&upper))
            .map(|r| r.rule.tab.clone())
            .collect()
    }

    /// O registro pertence à aba `tab`?
    pub fn matches(&self, record: &TaskRecord, tab: &str) -> bool {
        let upper = record.summary.to_uppercase();
        self.rules
            .iter()
            .any(|r| r.rule.tab == tab && r.matches_summary(&upper))
    }

    /// Células do registro para a aba, uma por coluna configurada
    ///
    /// `None` quando o registro não casa com a aba ou quando a chave não
    /// existe na aba (registro contado como "não atualizado", sem erro).
    pub fn project(
        &self,
        record: &TaskRecord,
        tab: &str,
        rows: &RowKeyMap,
    ) -> Option<Vec<CellUpdate>> {
        let upper = record.summary.to_uppercase();
        let rule = self
            .rules
            .iter()
            .find(|r| r.rule.tab == tab && r.matches_summary(&upper))?;
        let row = rows.row_of(&record.key)?;

        Some(
            rule.rule
                .columns
                .iter()
                .map(|mapping| CellUpdate::new(row, mapping.column, field_value(record, mapping.field)))
                .collect(),
        )
    }
}

fn field_value(record: &TaskRecord, field: ProjectedField) -> String {
    match field {
        ProjectedField::Status => record.status.clone(),
        ProjectedField::Assignee => record.assignee.clone(),
        ProjectedField::Reporter => record.reporter.clone(),
        ProjectedField::Summary => record.summary.clone(),
        ProjectedField::Created => record.created.format("%d/%m/%Y %H:%M").to_string(),
    }
}
