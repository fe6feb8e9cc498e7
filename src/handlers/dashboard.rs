//! Painel dos jobs de sincronização
//!
//! O painel só lê o snapshot do registro e pede disparos. Falhas de execução
//! aparecem apenas como status `erro`; a causa fica no log do servidor.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Json, Redirect},
};
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::JobState;
use crate::utils::logging::*;
use crate::utils::{AppResult, TriggerError};
use crate::AppState;

/// Aviso exibido depois de um disparo pelo formulário
#[derive(Debug, Deserialize, Default)]
pub struct DashboardQuery {
    pub aviso: Option<String>,
    pub job: Option<String>,
}

pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    log_request_received("/", "GET");

    let snapshot = state.registry.snapshot();
    let notice = notice_for(&query);
    Html(render_dashboard(state.registry.names(), &snapshot, notice.as_deref()))
}

/// Disparo pelo formulário: sempre redireciona para o painel com um aviso
pub async fn run_job_form(
    State(state): State<Arc<AppState>>,
    Path(job): Path<String>,
) -> Redirect {
    log_request_received(&format!("/run/{}", job), "POST");

    let aviso = match state.registry.trigger(&job) {
        Ok(()) => "started",
        Err(err) => {
            log_job_rejected(&job, &err.to_string());
            match err {
                TriggerError::UnknownJob(_) => "invalid_job",
                TriggerError::AlreadyRunning(_) => "already_running",
            }
        }
    };

    Redirect::to(&format!(
        "/?aviso={}&job={}",
        aviso,
        urlencoding::encode(&job)
    ))
}

/// Disparo REST: 202, 404 para job desconhecido, 409 se já estiver rodando
pub async fn run_job_api(
    State(state): State<Arc<AppState>>,
    Path(job): Path<String>,
) -> AppResult<(StatusCode, Json<Value>)> {
    log_request_received(&format!("/api/jobs/{}/run", job), "POST");

    if let Err(err) = state.registry.trigger(&job) {
        log_job_rejected(&job, &err.to_string());
        return Err(err.into());
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "job": job,
            "status": "iniciando"
        })),
    ))
}

pub async fn jobs_status(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, JobState>> {
    Json(state.registry.snapshot())
}

fn notice_for(query: &DashboardQuery) -> Option<String> {
    let job = query.job.as_deref().unwrap_or_default();
    let text = match query.aviso.as_deref()? {
        "invalid_job" => "❌ Job inválido.".to_string(),
        "already_running" => format!("⚠️ O job '{}' já está em execução.", job),
        "started" => format!("⏳ Atualização '{}' iniciada...", job),
        _ => return None,
    };
    Some(text)
}

/// `dd/mm/YYYY HH:MM` no fuso local
pub fn format_last_run(last_run: Option<DateTime<Utc>>) -> String {
    match last_run {
        Some(at) => at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn render_dashboard(
    names: &[String],
    snapshot: &BTreeMap<String, JobState>,
    notice: Option<&str>,
) -> String {
    let mut rows = String::new();
    for name in names {
        let Some(state) = snapshot.get(name) else {
            continue;
        };
        let disabled = if state.status.is_active() { " disabled" } else { "" };
        rows.push_str(&format!(
            "<tr><td>{name}</td><td class=\"status-{status}\">{status}</td><td>{last_run}</td>\
             <td><form method=\"post\" action=\"/run/{name}\"><button type=\"submit\"{disabled}>Executar</button></form></td></tr>\n",
            name = escape_html(name),
            status = state.status,
            last_run = format_last_run(state.last_run),
            disabled = disabled,
        ));
    }

    let notice_html = notice
        .map(|text| format!("<p class=\"aviso\">{}</p>\n", escape_html(text)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"10\">\n<title>Atualizações Jira → Planilha</title>\n</head>\n<body>\n\
         <h1>Atualizações Jira → Planilha</h1>\n{notice_html}\
         <table>\n<thead><tr><th>Job</th><th>Status</th><th>Última execução</th><th></th></tr></thead>\n\
         <tbody>\n{rows}</tbody>\n</table>\n</body>\n</html>\n"
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
