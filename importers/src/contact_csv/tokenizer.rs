use crate::error::ImportError;
use csv::{ReaderBuilder, Trim};

/// Header row plus data rows, every row padded to the header width
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }
}

pub struct CsvTokenizer {
    delimiter: u8,
}

impl CsvTokenizer {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tokenize(&self, content: &str) -> Result<CsvTable, ImportError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Err(ImportError::EmptyInput);
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(clean_cell).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            // whitespace-only line; rows of empty cells like `,` still count
            if record.len() == 1 && record[0].trim().is_empty() {
                continue;
            }

            let mut row: Vec<String> = record.iter().take(width).map(clean_cell).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(CsvTable { headers, rows })
    }
}

impl Default for CsvTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Trims a field. A quote only opens a quoted field at its very first byte, so
/// `a,  "b"` reaches us with the quotes still in place; strip that one pair.
/// Fields the reader already unquoted keep any literal quotes they contain.
fn clean_cell(raw: &str) -> String {
    let cell = raw.trim();
    let padded = raw.len() != raw.trim_start().len();
    if padded && cell.len() >= 2 && cell.starts_with('"') && cell.ends_with('"') {
        cell[1..cell.len() - 1].replace("\"\"", "\"").trim().to_string()
    } else {
        cell.to_string()
    }
}
