use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::jobs::JobDefinition;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub jira: JiraSettings,
    pub database: DatabaseSettings,
    pub sheets: SheetsSettings,
    pub runner: RunnerSettings,
    #[serde(default = "JobDefinition::builtin")]
    pub jobs: Vec<JobDefinition>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JiraSettings {
    pub base_url: String,
    pub email: String,
    pub token: String,
    pub project: String,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SheetsSettings {
    pub spreadsheet_id: String,
    /// JSON da service account do Google
    pub credentials_file: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunnerSettings {
    /// Tempo máximo de uma execução completa de job
    pub job_timeout_secs: u64,
}

/// Nomes de variáveis já usados no `.env` de produção
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("JIRA_URL", "jira.base_url"),
    ("JIRA_EMAIL", "jira.email"),
    ("JIRA_TOKEN", "jira.token"),
    ("PG_HOST", "database.host"),
    ("PG_PORT", "database.port"),
    ("PG_USER", "database.user"),
    ("PG_PASSWORD", "database.password"),
    ("PG_DATABASE", "database.database"),
    ("SHEET_ID", "sheets.spreadsheet_id"),
    ("GOOGLE_CREDENTIALS_FILE", "sheets.credentials_file"),
    ("PORT", "server.port"),
];

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Self::defaults()?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SYNC__JIRA__PROJECT, SYNC__RUNNER__JOB_TIMEOUT_SECS, ...
            .add_source(Environment::with_prefix("SYNC").separator("__"));

        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Valores padrão da implantação atual
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("jira.base_url", "")?
            .set_default("jira.email", "")?
            .set_default("jira.token", "")?
            .set_default("jira.project", "LCSD")?
            .set_default("jira.page_size", 100)?
            .set_default("jira.timeout_secs", 30)?
            .set_default("jira.connect_timeout_secs", 5)?
            .set_default("database.host", "")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "")?
            .set_default("database.password", "")?
            .set_default("database.database", "")?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_secs", 10)?
            .set_default(
                "sheets.spreadsheet_id",
                "1aj2jk71FoC_wvzsEu3-mcdzKahpi6TdnUjdSoiQsYlk",
            )?
            .set_default("sheets.credentials_file", "credenciais.json")?
            .set_default("sheets.timeout_secs", 30)?
            .set_default("runner.job_timeout_secs", 600)
    }

    /// Falha cedo, antes de qualquer job poder rodar
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("jira.base_url", &self.jira.base_url),
            ("jira.email", &self.jira.email),
            ("jira.token", &self.jira.token),
            ("jira.project", &self.jira.project),
            ("database.host", &self.database.host),
            ("database.user", &self.database.user),
            ("database.database", &self.database.database),
            ("sheets.spreadsheet_id", &self.sheets.spreadsheet_id),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Message(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.jira.timeout_secs == 0
            || self.jira.connect_timeout_secs == 0
            || self.sheets.timeout_secs == 0
            || self.database.acquire_timeout_secs == 0
            || self.runner.job_timeout_secs == 0
        {
            return Err(ConfigError::Message("timeouts must be greater than zero".into()));
        }

        if self.jobs.is_empty() {
            return Err(ConfigError::Message("no jobs configured".into()));
        }

        let mut names: Vec<&str> = self.jobs.iter().map(|j| j.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.jobs.len() {
            return Err(ConfigError::Message("duplicated job names".into()));
        }

        if !Path::new(&self.sheets.credentials_file).is_file() {
            return Err(ConfigError::Message(format!(
                "credentials file not found: {}",
                self.sheets.credentials_file
            )));
        }

        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults_only() -> Settings {
        Settings::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    fn complete() -> Settings {
        let mut settings = defaults_only();
        settings.jira.base_url = "https://empresa.atlassian.net".into();
        settings.jira.email = "bot@empresa.com".into();
        settings.jira.token = "tok".into();
        settings.database.host = "localhost".into();
        settings.database.user = "sync".into();
        settings.database.database = "juridico".into();
        // Qualquer arquivo existente serve para a checagem
        settings.sheets.credentials_file = "Cargo.toml".into();
        settings
    }

    #[test]
    fn test_defaults() {
        let settings = defaults_only();
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.jira.project, "LCSD");
        assert_eq!(settings.database.port, 5432);
        assert_eq!(settings.sheets.credentials_file, "credenciais.json");
        assert_eq!(settings.jobs.len(), 3);
        assert_eq!(settings.server_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_validate_reports_missing_credentials() {
        let err = defaults_only().validate().unwrap_err().to_string();
        assert!(err.contains("jira.token"));
        assert!(err.contains("database.host"));
    }

    #[test]
    fn test_validate_complete_settings() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_credentials_file() {
        let mut settings = complete();
        settings.sheets.credentials_file = "/nao/existe/credenciais.json".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut settings = complete();
        settings.runner.job_timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_duplicated_job_names() {
        let mut settings = complete();
        let first = settings.jobs[0].clone();
        settings.jobs.push(first);
        assert!(settings.validate().is_err());
    }
}
