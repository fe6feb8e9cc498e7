// Sincronização Jira → PostgreSQL → Google Sheets
// Expõe os módulos para o binário e para os testes

pub mod config;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

/// Estado compartilhado pelas rotas do painel
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<jobs::JobRegistry>,
}
