//! Mapa chave da issue → linha da planilha
//!
//! Reconstruído a cada execução a partir do conteúdo atual da aba, que pode
//! ter sido editada à mão entre uma execução e outra.
//!
//! Aritmética de linhas: o índice `i` (0-based) de uma linha de dados em
//! `rows[1..]` vira a linha `i + 2` da planilha (+1 do cabeçalho, +1 porque a
//! API é 1-based). Equivale à posição 1-based da linha dentro de `rows`.

use std::collections::HashMap;

/// Linha do cabeçalho na planilha
const HEADER_ROWS: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowKeyMap {
    rows: HashMap<String, u32>,
}

impl RowKeyMap {
    /// Monta o mapa a partir de todas as linhas da aba (a primeira é o cabeçalho)
    ///
    /// - Linhas sem primeira célula ou com ela vazia são ignoradas
    /// - Chave repetida: a última ocorrência vence
    pub fn build(sheet_rows: &[Vec<String>]) -> Self {
        let mut rows = HashMap::new();

        for (idx, row) in sheet_rows.iter().enumerate().skip(HEADER_ROWS as usize) {
            let Some(key) = row.first().map(|cell| cell.trim()) else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            rows.insert(key.to_string(), idx as u32 + 1);
        }

        Self { rows }
    }

    /// Linha 1-based onde está a chave
    pub fn row_of(&self, key: &str) -> Option<u32> {
        self.rows.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
