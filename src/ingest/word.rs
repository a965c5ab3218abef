use std::fmt::Write as _;

use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};

use super::FormatExtractor;
use crate::models::UploadedFile;
use crate::types::{ExtractError, ExtractionResult, FormatKind};

/// `.docx` body paragraphs in document order, followed by every table.
pub struct WordExtractor;

impl FormatExtractor for WordExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Word
    }

    fn try_extract(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractError> {
        let docx = read_docx(&file.bytes).map_err(|e| ExtractError::decode(FormatKind::Word, e))?;

        let mut content = String::new();
        let mut tables: Vec<&Table> = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(paragraph) => {
                    let text = paragraph_text(paragraph);
                    if !text.trim().is_empty() {
                        content.push_str(&text);
                        content.push('\n');
                    }
                }
                DocumentChild::Table(table) => tables.push(table),
                _ => {}
            }
        }

        if !tables.is_empty() {
            content.push_str("\n--- Tables in Document ---\n");
            for (table_num, table) in tables.iter().enumerate() {
                let _ = writeln!(content, "\nTable {}:", table_num + 1);
                for row in table_rows(table) {
                    content.push_str(&row.join(" | "));
                    content.push('\n');
                }
            }
        }

        if content.trim().is_empty() {
            return Err(ExtractError::EmptyContent { kind: FormatKind::Word });
        }
        Ok(ExtractionResult::Text(content))
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            _ => {}
        }
    }
}

/// Trimmed cell text per row; multi-paragraph cells are joined by newlines
fn table_rows(table: &Table) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for table_child in &table.rows {
        if let TableChild::TableRow(row) = table_child {
            let mut cells = Vec::new();
            for row_child in &row.cells {
                if let TableRowChild::TableCell(cell) = row_child {
                    let paragraphs: Vec<String> = cell
                        .children
                        .iter()
                        .filter_map(|content| match content {
                            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                            _ => None,
                        })
                        .collect();
                    cells.push(paragraphs.join("\n").trim().to_string());
                }
            }
            rows.push(cells);
        }
    }
    rows
}
