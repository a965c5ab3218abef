use std::fmt::Write as _;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::debug;

use super::tabular::{Cell, Table};
use super::FormatExtractor;
use crate::models::UploadedFile;
use crate::types::{ExtractError, ExtractionResult, FormatKind};

/// Every sheet of an `.xls`/`.xlsx` workbook, summarised like a CSV table.
pub struct ExcelExtractor {
    pub preview_rows: usize,
    pub max_rows: Option<usize>,
}

impl FormatExtractor for ExcelExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Excel
    }

    fn try_extract(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(file.bytes.as_slice()))
            .map_err(|e| ExtractError::decode(FormatKind::Excel, e))?;
        let sheet_names = workbook.sheet_names();
        debug!(file = %file.name, sheets = sheet_names.len(), "Extracting workbook");

        let mut content = format!(
            "Excel file: {}\nNumber of sheets: {}\n\n",
            file.name,
            sheet_names.len()
        );
        for name in &sheet_names {
            let range = workbook
                .worksheet_range(name)
                .map_err(|e| ExtractError::decode(FormatKind::Excel, format!("sheet '{name}': {e}")))?;
            let (table, capped) = table_from_range(&range, self.max_rows);
            self.write_sheet(&mut content, name, &table, capped);
        }
        Ok(ExtractionResult::Text(content))
    }
}

impl ExcelExtractor {
    fn write_sheet(&self, out: &mut String, name: &str, table: &Table, capped: Option<usize>) {
        let _ = writeln!(out, "--- Sheet: {name} ---");
        table.write_summary(out, "Data Preview:", self.preview_rows);
        if let Some(limit) = capped {
            let _ = writeln!(out, "\nNote: only the first {limit} rows were analyzed.");
        }
        let _ = write!(out, "\n{}\n\n", "=".repeat(50));
    }
}

/// First row is the header; cap applies to data rows only and is reported when hit
fn table_from_range(range: &Range<Data>, max_rows: Option<usize>) -> (Table, Option<usize>) {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return (Table::default(), None);
    };
    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| Table::column_name(&cell.to_string(), idx))
        .collect();
    let data_rows = range.height().saturating_sub(1);
    let capped = max_rows.filter(|limit| data_rows > *limit);
    let body = rows
        .take(max_rows.unwrap_or(usize::MAX))
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    (Table::new(columns, body), capped)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Null,
        Data::Int(value) => Cell::Int(*value),
        // Workbooks store whole numbers as floats
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => Cell::Int(*value as i64),
        Data::Float(value) if value.is_nan() => Cell::Null,
        Data::Float(value) => Cell::Float(*value),
        Data::Bool(value) => Cell::Bool(*value),
        Data::String(value) if value.trim().is_empty() => Cell::Null,
        Data::String(value) => Cell::Text(value.clone()),
        other => Cell::Text(other.to_string()),
    }
}
