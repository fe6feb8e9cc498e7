use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(addr: &str) {
    info!("🚀 Jira → Sheets sync dashboard starting on {}", addr);
}

pub fn log_server_ready(addr: &str) {
    info!("✅ Server ready and listening on http://{}", addr);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_job_triggered(job: &str) {
    info!("⏳ Atualização '{}' iniciada", job);
}

pub fn log_job_rejected(job: &str, reason: &str) {
    warn!("⚠️ Disparo do job '{}' recusado: {}", job, reason);
}

pub fn log_job_started(job: &str, run_id: &Uuid) {
    info!("▶️ Iniciando job {} (run_id: {})", job, run_id);
}

pub fn log_job_succeeded(job: &str, run_id: &Uuid, duration_ms: u64) {
    info!(
        "✅ Job {} executado com sucesso (run_id: {}, {}ms)",
        job, run_id, duration_ms
    );
}

pub fn log_job_failed(job: &str, run_id: &Uuid, error: &str) {
    error!("❌ Erro na execução do job {} (run_id: {}): {}", job, run_id, error);
}

pub fn log_record_skipped(key: &str, reason: &str) {
    warn!("Registro {} ignorado: {}", key, reason);
}

pub fn log_row_not_found(tab: &str, key: &str) {
    info!("Chave {} não encontrada na aba '{}', nada atualizado", key, tab);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}
