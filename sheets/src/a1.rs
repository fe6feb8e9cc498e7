//! Conversão de coordenadas (linha, coluna) 1-based para notação A1

/// Converte o número da coluna (1-based) em letras: 1 → A, 26 → Z, 27 → AA
pub fn column_letters(column: u32) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Nome da aba entre aspas simples, com `'` escapado como `''`
pub fn quote_sheet_name(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// Range de uma célula: `'ABA'!J5`
pub fn cell_range(sheet: &str, row: u32, column: u32) -> String {
    format!("{}!{}{}", quote_sheet_name(sheet), column_letters(column), row)
}
