//! Registro e execução dos jobs de sincronização

pub mod registry;

pub use registry::JobRegistry;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::SyncReport;
use crate::utils::SyncError;

/// Trabalho executado por um job nomeado
#[async_trait]
pub trait JobPipeline: Send + Sync {
    async fn run(&self, run_id: Uuid) -> Result<SyncReport, SyncError>;
}
