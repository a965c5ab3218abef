use std::fmt::Write as _;

use ::csv::ReaderBuilder;

use super::tabular::{Cell, Table};
use super::FormatExtractor;
use crate::models::UploadedFile;
use crate::types::{ExtractError, ExtractionResult, FormatKind};

/// Comma-separated table with a header row.
pub struct CsvExtractor {
    pub preview_rows: usize,
    pub max_rows: Option<usize>,
}

impl FormatExtractor for CsvExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Csv
    }

    fn try_extract(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractError> {
        let (table, capped) = self.read_table(&file.bytes)?;

        let mut content = format!("CSV file: {}\n", file.name);
        table.write_summary(
            &mut content,
            &format!("Data Preview (first {} rows):", self.preview_rows),
            self.preview_rows,
        );
        if let Some(missing) = table.render_missing() {
            content.push_str("\nMissing Values:\n");
            content.push_str(&missing);
        }
        if let Some(limit) = capped {
            let _ = writeln!(content, "\nNote: only the first {limit} rows were analyzed.");
        }
        Ok(ExtractionResult::Text(content))
    }
}

impl CsvExtractor {
    /// Parse the buffer into a table; also reports the row cap if it was hit
    fn read_table(&self, bytes: &[u8]) -> Result<(Table, Option<usize>), ExtractError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| ExtractError::decode(FormatKind::Csv, e))?
            .clone();
        if headers.is_empty() {
            return Err(ExtractError::decode(
                FormatKind::Csv,
                "No columns to parse from file",
            ));
        }
        let width = headers.len();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| Table::column_name(name, idx))
            .collect();

        let limit = self.max_rows.unwrap_or(usize::MAX);
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        let mut capped = None;
        for record in reader.records() {
            if rows.len() == limit {
                capped = Some(limit);
                break;
            }
            let record = record.map_err(|e| ExtractError::decode(FormatKind::Csv, e))?;
            // Short rows are padded with nulls; long rows have nowhere to go
            if record.len() > width {
                let line = record.position().map_or(rows.len() as u64 + 2, |pos| pos.line());
                return Err(ExtractError::decode(
                    FormatKind::Csv,
                    format!(
                        "Error tokenizing data. Expected {width} fields in line {line}, saw {}",
                        record.len()
                    ),
                ));
            }
            rows.push(record.iter().map(Cell::parse).collect());
        }
        Ok((Table::new(columns, rows), capped))
    }
}
