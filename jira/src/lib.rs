//! Cliente da API REST do Jira Cloud
//!
//! Cobre apenas o que a sincronização precisa: busca JQL paginada
//! retornando issues com campos opcionais.
//!
//! # Exemplo
//!
//! ```rust,ignore
//! use jira::{JiraClient, search::SearchRequest};
//!
//! let client = JiraClient::new(jira_url, jira_email, jira_token)?;
//! let issues = client
//!     .search_all(&SearchRequest::new("project = LCSD"))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod search;
pub mod types;

pub use client::JiraClient;
pub use error::{JiraError, Result};
pub use search::SearchRequest;
pub use types::{Issue, IssueFields, IssueStatus, SearchPage, User};
