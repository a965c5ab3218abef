//! In-memory table shared by the CSV and Excel extractors.
//!
//! Renders the same sections for both formats: shape, a row preview,
//! descriptive statistics over numeric columns and per-column type info.

use std::fmt::Write as _;

/// Markers read as missing values in delimited text
const NA_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Infer a typed cell from raw delimited text
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if NA_MARKERS.contains(&trimmed) {
            return Cell::Null;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Cell::Int(value);
        }
        match trimmed.parse::<f64>() {
            // Any NaN spelling the float parser accepts is a missing value
            Ok(value) if value.is_nan() => return Cell::Null,
            Ok(value) => return Cell::Float(value),
            Err(_) => {}
        }
        match trimmed {
            "True" | "TRUE" | "true" => Cell::Bool(true),
            "False" | "FALSE" | "false" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(value) => value.is_nan(),
            _ => false,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(value) => Some(*value as f64),
            Cell::Float(value) if !value.is_nan() => Some(*value),
            _ => None,
        }
    }

    /// Display form within a column of `dtype`; ints widen in float columns
    fn render(&self, dtype: DType) -> String {
        match self {
            Cell::Null => "NaN".to_string(),
            Cell::Int(value) if dtype == DType::Float64 => format_float(*value as f64),
            Cell::Int(value) => value.to_string(),
            Cell::Float(value) => format_float(*value),
            Cell::Bool(value) => value.to_string(),
            Cell::Text(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Object,
}

impl DType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DType::Int64 => write!(f, "int64"),
            DType::Float64 => write!(f, "float64"),
            DType::Bool => write!(f, "bool"),
            DType::Object => write!(f, "object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Stats over the non-null values of a column; empty input yields NaN everywhere but `count`.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let count = sorted.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }
        let mean = sorted.iter().sum::<f64>() / count as f64;
        Self {
            count,
            mean,
            std: std_dev(&sorted, mean),
            min: sorted[0],
            q25: percentile(&sorted, 0.25),
            q50: percentile(&sorted, 0.50),
            q75: percentile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Sample standard deviation (n - 1); undefined below two values
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    variance.sqrt()
}

/// Linear interpolation between closest ranks over sorted input
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.6}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Rows shorter than the header are padded with nulls, longer ones cut.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Header name for position `idx`, substituting a placeholder for blanks
    pub fn column_name(raw: &str, idx: usize) -> String {
        if raw.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            raw.to_string()
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[idx])
    }

    pub fn non_null(&self, idx: usize) -> usize {
        self.column(idx).filter(|cell| !cell.is_null()).count()
    }

    pub fn null_count(&self, idx: usize) -> usize {
        self.rows.len() - self.non_null(idx)
    }

    pub fn dtype(&self, idx: usize) -> DType {
        let mut has_null = false;
        let mut all_int = true;
        let mut all_numeric = true;
        let mut all_bool = true;
        let mut seen = 0usize;

        for cell in self.column(idx) {
            match cell {
                Cell::Null => {
                    has_null = true;
                    continue;
                }
                Cell::Float(value) if value.is_nan() => {
                    has_null = true;
                    continue;
                }
                Cell::Int(_) => all_bool = false,
                Cell::Float(_) => {
                    all_int = false;
                    all_bool = false;
                }
                Cell::Bool(_) => {
                    all_int = false;
                    all_numeric = false;
                }
                Cell::Text(_) => return DType::Object,
            }
            seen += 1;
        }

        match seen {
            0 => DType::Float64,
            _ if all_int && !has_null => DType::Int64,
            _ if all_numeric => DType::Float64,
            _ if all_bool && !has_null => DType::Bool,
            _ => DType::Object,
        }
    }

    /// Columns whose every non-null value is numeric
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|idx| self.dtype(*idx).is_numeric())
            .collect()
    }

    pub fn column_stats(&self, idx: usize) -> ColumnStats {
        let values: Vec<f64> = self.column(idx).filter_map(Cell::as_f64).collect();
        ColumnStats::from_values(&values)
    }

    /// First `limit` rows with a row index, columns right-aligned
    pub fn render_preview(&self, limit: usize) -> String {
        if self.rows.is_empty() {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.columns.join(", ")
            );
        }
        let dtypes: Vec<DType> = (0..self.columns.len()).map(|idx| self.dtype(idx)).collect();
        let index: Vec<String> = (0..self.rows.len().min(limit)).map(|i| i.to_string()).collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(limit)
            .map(|row| row.iter().zip(&dtypes).map(|(cell, dtype)| cell.render(*dtype)).collect())
            .collect();
        render_grid(&self.columns, &index, &body)
    }

    /// Descriptive statistics table, or `None` when no column is numeric
    pub fn render_describe(&self) -> Option<String> {
        let numeric = self.numeric_columns();
        if numeric.is_empty() {
            return None;
        }
        let stats: Vec<ColumnStats> = numeric.iter().map(|idx| self.column_stats(*idx)).collect();
        let header: Vec<String> = numeric.iter().map(|idx| self.columns[*idx].clone()).collect();
        let labels = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
        let index: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let body: Vec<Vec<String>> = (0..labels.len())
            .map(|row| stats.iter().map(|s| format_stat(s.rows()[row].1)).collect())
            .collect();
        Some(render_grid(&header, &index, &body))
    }

    pub fn render_column_info(&self) -> String {
        let total = self.rows.len();
        let mut out = String::new();
        for (idx, name) in self.columns.iter().enumerate() {
            let _ = writeln!(
                out,
                "- {}: {} (Non-null: {}/{})",
                name,
                self.dtype(idx),
                self.non_null(idx),
                total
            );
        }
        out
    }

    /// Missing-value lines for columns with at least one null
    pub fn render_missing(&self) -> Option<String> {
        let mut out = String::new();
        for (idx, name) in self.columns.iter().enumerate() {
            let missing = self.null_count(idx);
            if missing > 0 {
                let _ = writeln!(out, "- {name}: {missing} missing values");
            }
        }
        (!out.is_empty()).then_some(out)
    }

    /// Shape, preview, numeric summary and column info, in that order
    pub fn write_summary(&self, out: &mut String, preview_title: &str, preview_rows: usize) {
        let (rows, cols) = self.shape();
        let _ = writeln!(out, "Shape: {rows} rows, {cols} columns\n");
        let _ = writeln!(out, "{preview_title}");
        let _ = writeln!(out, "{}\n", self.render_preview(preview_rows));
        if let Some(describe) = self.render_describe() {
            let _ = writeln!(out, "Numeric Columns Summary:");
            let _ = writeln!(out, "{describe}\n");
        }
        out.push_str("Column Information:\n");
        out.push_str(&self.render_column_info());
    }
}

fn render_grid(header: &[String], index: &[String], body: &[Vec<String>]) -> String {
    let index_width = index.iter().map(|s| s.chars().count()).max().unwrap_or(0);
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(col, name)| {
            body.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(body.len() + 1);
    let mut line = " ".repeat(index_width);
    for (name, width) in header.iter().zip(&widths) {
        let _ = write!(line, "  {name:>width$}");
    }
    lines.push(line);

    for (label, row) in index.iter().zip(body) {
        let mut line = format!("{label:<index_width$}");
        for (value, width) in row.iter().zip(&widths) {
            let _ = write!(line, "  {value:>width$}");
        }
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|raw| Cell::parse(raw)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse("42"), Cell::Int(42));
        assert_eq!(Cell::parse("2.5"), Cell::Float(2.5));
        assert_eq!(Cell::parse("TRUE"), Cell::Bool(true));
        assert_eq!(Cell::parse(""), Cell::Null);
        assert_eq!(Cell::parse("NA"), Cell::Null);
        assert_eq!(Cell::parse("two"), Cell::Text("two".to_string()));
    }

    #[test]
    fn test_nan_spellings_are_null() {
        for raw in ["NAN", "Nan", "+nan", "-nan", "NaN"] {
            assert_eq!(Cell::parse(raw), Cell::Null, "{raw}");
        }
        assert!(Cell::Float(f64::NAN).is_null());

        let t = table(&["v"], &[&["1"], &["NAN"], &["3"]]);
        assert_eq!(t.non_null(0), 2);
        assert_eq!(t.dtype(0), DType::Float64);
        assert_eq!(t.render_column_info(), "- v: float64 (Non-null: 2/3)\n");

        let stats = t.column_stats(0);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.q50, 2.0);
    }

    #[test]
    fn test_nan_float_cells_skipped_in_stats() {
        let t = Table::new(
            vec!["v".to_string()],
            vec![vec![Cell::Float(1.0)], vec![Cell::Float(f64::NAN)], vec![Cell::Float(3.0)]],
        );
        assert_eq!(t.column_stats(0).count, 2);
        assert_eq!(t.null_count(0), 1);
    }

    #[test]
    fn test_dtype_inference() {
        let t = table(
            &["ints", "floats", "gappy", "mixed", "flags", "empty"],
            &[&["1", "1.5", "1", "1", "true", ""], &["2", "2.5", "", "two", "false", ""]],
        );
        assert_eq!(t.dtype(0), DType::Int64);
        assert_eq!(t.dtype(1), DType::Float64);
        assert_eq!(t.dtype(2), DType::Float64);
        assert_eq!(t.dtype(3), DType::Object);
        assert_eq!(t.dtype(4), DType::Bool);
        assert_eq!(t.dtype(5), DType::Float64);
    }

    #[test]
    fn test_mixed_column_excluded_from_stats() {
        let t = table(&["value", "mixed"], &[&["1", "1"], &["2", "two"], &["3", "3"]]);
        assert_eq!(t.numeric_columns(), vec![0]);
        let describe = t.render_describe().unwrap();
        assert!(describe.contains("value"));
        assert!(!describe.contains("mixed"));
    }

    #[test]
    fn test_column_stats() {
        let stats = ColumnStats::from_values(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.q50, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert!((stats.std - 1.2909944487358056).abs() < 1e-12);

        let single = ColumnStats::from_values(&[7.0]);
        assert!(single.std.is_nan());
        assert_eq!(single.q75, 7.0);
    }

    #[test]
    fn test_no_numeric_columns_omits_describe() {
        let t = table(&["name"], &[&["alice"], &["bob"]]);
        assert!(t.render_describe().is_none());
    }

    #[test]
    fn test_preview_layout() {
        let t = table(&["a", "name"], &[&["1", "x"], &["22", "longer"]]);
        assert_eq!(
            t.render_preview(10),
            "    a    name\n0   1       x\n1  22  longer"
        );
    }

    #[test]
    fn test_preview_widens_ints_in_float_columns() {
        let t = table(&["n", "m"], &[&["1", "1"], &["", "2"], &["3", "3"]]);
        assert_eq!(t.dtype(0), DType::Float64);
        assert_eq!(
            t.render_preview(10),
            "     n  m\n0  1.0  1\n1  NaN  2\n2  3.0  3"
        );
    }

    #[test]
    fn test_preview_respects_limit() {
        let rows: Vec<Vec<String>> = (0..15).map(|i| vec![i.to_string()]).collect();
        let row_refs: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
        let slices: Vec<&[&str]> = row_refs.iter().map(Vec::as_slice).collect();
        let t = table(&["n"], &slices);
        let preview = t.render_preview(10);
        assert_eq!(preview.lines().count(), 11);
        assert!(!preview.contains("14"));
    }

    #[test]
    fn test_missing_values() {
        let t = table(&["a", "b"], &[&["1", ""], &["2", ""]]);
        assert_eq!(t.render_missing().unwrap(), "- b: 2 missing values\n");

        let full = table(&["a"], &[&["1"]]);
        assert!(full.render_missing().is_none());
    }

    #[test]
    fn test_short_rows_padded() {
        let t = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Int(1)]],
        );
        assert_eq!(t.rows[0], vec![Cell::Int(1), Cell::Null]);
        assert_eq!(t.null_count(1), 1);
    }

    #[test]
    fn test_empty_table_preview() {
        let t = table(&["a", "b"], &[]);
        assert_eq!(t.render_preview(10), "Empty DataFrame\nColumns: [a, b]\nIndex: []");
        assert_eq!(t.render_column_info(), "- a: float64 (Non-null: 0/0)\n- b: float64 (Non-null: 0/0)\n");
    }
}
