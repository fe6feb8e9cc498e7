/// Main Application: painel de sincronização Jira → PostgreSQL → Google Sheets
///
/// Arquitetura:
/// - Painel web recebe o disparo e responde na hora
/// - Cada job roda numa task própria: Jira → upsert no banco → escrita em lote na aba
/// - Registro de jobs impede execuções sobrepostas do mesmo job
///
/// Configuração inválida derruba o processo antes de qualquer job rodar.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use jira_sheets_sync::config::Settings;
use jira_sheets_sync::handlers::router;
use jira_sheets_sync::jobs::JobRegistry;
use jira_sheets_sync::services::{
    GoogleSheetsDestination, IssueSource, JiraIssueSource, PgTaskStore, SheetDestination,
    SyncPipeline, TaskStore,
};
use jira_sheets_sync::utils::logging::*;
use jira_sheets_sync::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if dotenv_loaded {
        tracing::info!("✅ Arquivo .env carregado com sucesso");
    } else {
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    // Carregar e validar configurações
    let settings = Settings::new().context("Failed to load settings")?;
    settings.validate().context("Invalid settings")?;

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    // Banco
    let store = PgTaskStore::connect(&settings.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    store
        .ensure_schema()
        .await
        .context("Failed to create tarefas_jira table")?;
    log_info(&format!(
        "🐘 PostgreSQL conectado em {}:{}/{}",
        settings.database.host, settings.database.port, settings.database.database
    ));

    // Jira
    let jira_client = jira::JiraClient::with_timeouts(
        settings.jira.base_url.as_str(),
        &settings.jira.email,
        &settings.jira.token,
        settings.jira.timeout_secs,
        settings.jira.connect_timeout_secs,
    )
    .context("Failed to create Jira client")?;
    log_info(&format!("🔗 Jira: {} (projeto {})", jira_client.base_url(), settings.jira.project));

    // Google Sheets
    let sheets_client = sheets::SheetsClient::from_service_account_file(
        settings.sheets.spreadsheet_id.as_str(),
        &settings.sheets.credentials_file,
        settings.sheets.timeout_secs,
    )
    .context("Failed to create Google Sheets client")?;
    log_info(&format!("📄 Planilha: {}", sheets_client.spreadsheet_id()));

    let source: Arc<dyn IssueSource> =
        Arc::new(JiraIssueSource::new(jira_client, settings.jira.page_size));
    let store: Arc<dyn TaskStore> = Arc::new(store);
    let destination: Arc<dyn SheetDestination> =
        Arc::new(GoogleSheetsDestination::new(sheets_client));

    // Registro dos jobs
    let mut registry = JobRegistry::new(Duration::from_secs(settings.runner.job_timeout_secs));
    for definition in settings.jobs.iter().cloned() {
        let name = definition.name.clone();
        let pipeline = SyncPipeline::new(
            definition,
            &settings.jira.project,
            source.clone(),
            store.clone(),
            destination.clone(),
        );
        log_info(&format!("📋 Job '{}' → aba '{}'", name, pipeline.tab()));
        registry.register(name, Arc::new(pipeline));
    }
    let registry = Arc::new(registry);

    let app_state = Arc::new(AppState {
        registry: registry.clone(),
    });
    let app = router(app_state);

    // Iniciar servidor
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    log_server_startup(&addr);
    log_server_ready(&addr);

    // Graceful shutdown com signal handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("⏳ Aguardando jobs em execução...");
    registry.drain().await;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
