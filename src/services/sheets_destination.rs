use async_trait::async_trait;
use sheets::SheetsClient;

use crate::models::CellUpdate;
use crate::utils::SyncError;

/// Planilha de destino com abas nomeadas
#[async_trait]
pub trait SheetDestination: Send + Sync {
    /// Todas as linhas atuais da aba, cabeçalho incluído
    async fn read_rows(&self, tab: &str) -> Result<Vec<Vec<String>>, SyncError>;

    /// Escreve o lote numa única chamada; retorna o número de células escritas
    async fn write_cells(&self, tab: &str, cells: &[CellUpdate]) -> Result<usize, SyncError>;
}

#[derive(Clone, Debug)]
pub struct GoogleSheetsDestination {
    client: SheetsClient,
}

impl GoogleSheetsDestination {
    pub fn new(client: SheetsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SheetDestination for GoogleSheetsDestination {
    async fn read_rows(&self, tab: &str) -> Result<Vec<Vec<String>>, SyncError> {
        Ok(self.client.get_all_values(tab).await?)
    }

    async fn write_cells(&self, tab: &str, cells: &[CellUpdate]) -> Result<usize, SyncError> {
        let written = self.client.update_cells(tab, cells).await?;
        Ok(written as usize)
    }
}
