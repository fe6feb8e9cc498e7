//! Extração das tarefas do Jira
//!
//! Transforma cada issue em [`TaskRecord`]. Uma issue sem campo obrigatório,
//! ou com campo de tipo inesperado, é registrada no log e descartada sem
//! interromper a extração.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use jira::{Issue, JiraClient, SearchRequest};
use serde_json::Value;

use crate::models::{TaskRecord, UNASSIGNED};
use crate::utils::logging::log_record_skipped;
use crate::utils::SyncError;

/// Resultado de uma extração
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<TaskRecord>,
    /// Issues descartadas por `MalformedRecord`
    pub malformed: usize,
}

/// Sistema de origem das tarefas
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Busca todas as tarefas que casam com a JQL
    ///
    /// Falhas de transporte, autenticação ou resposta não-2xx viram
    /// `SourceUnavailable`.
    async fn fetch(&self, jql: &str) -> Result<Extraction, SyncError>;
}

#[derive(Clone, Debug)]
pub struct JiraIssueSource {
    client: JiraClient,
    page_size: u32,
}

impl JiraIssueSource {
    pub fn new(client: JiraClient, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl IssueSource for JiraIssueSource {
    async fn fetch(&self, jql: &str) -> Result<Extraction, SyncError> {
        let request = SearchRequest::new(jql).with_page_size(self.page_size);
        let issues = self.client.search_all(&request).await?;
        Ok(extract_records(&issues))
    }
}

/// Converte as issues brutas, descartando as malformadas
pub fn extract_records(issues: &[Value]) -> Extraction {
    let mut extraction = Extraction::default();

    for raw in issues {
        match record_from_value(raw) {
            Ok(record) => extraction.records.push(record),
            Err(SyncError::MalformedRecord { key, reason }) => {
                log_record_skipped(&key, &reason);
                extraction.malformed += 1;
            }
            Err(other) => {
                log_record_skipped(raw_key(raw), &other.to_string());
                extraction.malformed += 1;
            }
        }
    }

    extraction
}

fn record_from_value(raw: &Value) -> Result<TaskRecord, SyncError> {
    let issue = Issue::from_value(raw.clone())
        .map_err(|e| malformed(raw_key(raw), &format!("invalid issue: {}", e)))?;
    task_from_issue(&issue)
}

fn raw_key(raw: &Value) -> &str {
    raw.get("key").and_then(Value::as_str).unwrap_or("?")
}

pub fn task_from_issue(issue: &Issue) -> Result<TaskRecord, SyncError> {
    let key = issue
        .key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| malformed("?", "missing key"))?;

    let summary = issue
        .fields
        .summary
        .clone()
        .ok_or_else(|| malformed(&key, "missing summary"))?;

    let created_raw = issue
        .fields
        .created
        .as_deref()
        .ok_or_else(|| malformed(&key, "missing created"))?;
    let created = parse_created(created_raw)
        .ok_or_else(|| malformed(&key, &format!("invalid created '{}'", created_raw)))?;

    let reporter = issue
        .reporter_name()
        .ok_or_else(|| malformed(&key, "missing reporter"))?
        .to_string();

    let status = issue
        .status_name()
        .ok_or_else(|| malformed(&key, "missing status"))?
        .to_string();

    let assignee = issue.assignee_name().unwrap_or(UNASSIGNED).to_string();

    Ok(TaskRecord {
        key,
        created,
        summary,
        assignee,
        reporter,
        status,
    })
}

/// `2024-01-15T10:30:00.000-0300` (formato do Jira) ou RFC 3339
pub fn parse_created(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

fn malformed(key: &str, reason: &str) -> SyncError {
    SyncError::MalformedRecord {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
