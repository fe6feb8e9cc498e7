//! Persistência das tarefas do Jira no PostgreSQL
//!
//! Tabela `tarefas_jira`, compatível com a base já em produção:
//!
//! | coluna        | campo       |
//! |---------------|-------------|
//! | `chave`       | `key` (PK)  |
//! | `criado`      | `created`   |
//! | `responsavel` | `assignee`  |
//! | `relator`     | `reporter`  |
//! | `status`      | `status`    |
//! | `resumo`      | `summary`   |
//! | `updated_at`  | `synced_at` |
//!
//! Cada upsert é um statement autocommit. Não há transação envolvendo a
//! extração inteira: uma falha no meio deixa gravados os registros
//! anteriores, e a próxima execução converge porque o upsert é idempotente.

use async_trait::async_trait;
use chrono::Local;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::settings::DatabaseSettings;
use crate::models::TaskRecord;
use crate::utils::SyncError;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS tarefas_jira (
        chave VARCHAR(20) PRIMARY KEY,
        criado TIMESTAMP NOT NULL,
        responsavel VARCHAR(100),
        relator VARCHAR(100),
        status VARCHAR(50),
        resumo TEXT,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

const UPSERT_TASK: &str = r#"
    INSERT INTO tarefas_jira (chave, criado, resumo, responsavel, relator, status, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, CURRENT_TIMESTAMP)
    ON CONFLICT (chave) DO UPDATE SET
        criado = EXCLUDED.criado,
        resumo = EXCLUDED.resumo,
        responsavel = EXCLUDED.responsavel,
        relator = EXCLUDED.relator,
        status = EXCLUDED.status,
        updated_at = CURRENT_TIMESTAMP
"#;

/// Armazenamento durável chaveado pela chave da issue
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insere ou sobrescreve todos os campos mutáveis e renova `synced_at`
    async fn upsert(&self, record: &TaskRecord) -> Result<(), SyncError>;
}

#[derive(Clone, Debug)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Abre o pool e valida a conexão imediatamente
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, SyncError> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.database);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> Result<(), SyncError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn upsert(&self, record: &TaskRecord) -> Result<(), SyncError> {
        // `criado` é TIMESTAMP sem fuso: grava o horário local
        let created = record.created.with_timezone(&Local).naive_local();

        sqlx::query(UPSERT_TASK)
            .bind(&record.key)
            .bind(created)
            .bind(&record.summary)
            .bind(&record.assignee)
            .bind(&record.reporter)
            .bind(&record.status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
