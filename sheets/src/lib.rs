//! Cliente mínimo da API Google Sheets v4
//!
//! Duas operações:
//!
//! - `get_all_values(aba)`: todas as linhas de uma aba
//! - `update_cells(aba, células)`: escrita em lote numa única requisição
//!
//! Autenticação por service account (`gcp_auth`) com escopo de planilhas.

pub mod a1;
pub mod client;
pub mod error;

pub use client::{Cell, SheetsClient, SHEETS_SCOPES};
pub use error::{Result, SheetsError};
