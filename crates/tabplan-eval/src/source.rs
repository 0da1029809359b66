//! Table sources for `load-table` steps.
//!
//! The engine reads source tables through the [`TableSource`] trait.
//! [`CsvSource`] reads CSV files from disk; [`MemorySource`] serves tables
//! registered in memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tabplan_types::{Cell, Column, PlanError, Table};

/// Field values read as missing.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "N/A", "NA", "NULL", "NaN", "-NaN", "None", "n/a", "nan", "-nan",
    "null",
];

/// Provider of source tables, addressed by a path-like string.
pub trait TableSource {
    /// Load a whole table.
    ///
    /// Missing, unparseable or empty sources fail with
    /// [`PlanError::SourceUnavailable`].
    fn load(&self, path: &str) -> Result<Table, PlanError>;

    /// Column names of a source, without its rows.
    fn columns(&self, path: &str) -> Result<Vec<String>, PlanError> {
        Ok(self.load(path)?.column_names().map(str::to_string).collect())
    }
}

/// Reads CSV files with a header row.
///
/// Relative paths resolve against the base directory when one is set.
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    base_dir: Option<PathBuf>,
}

impl CsvSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, PlanError> {
        if path.trim().is_empty() {
            return Err(PlanError::invalid("empty 'filepath' for load-table"));
        }
        let p = Path::new(path);
        let full = match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        };
        if !full.is_file() {
            return Err(PlanError::SourceUnavailable(format!(
                "CSV file not found at '{path}'"
            )));
        }
        Ok(full)
    }

    fn reader(&self, path: &str) -> Result<csv::Reader<std::fs::File>, PlanError> {
        let full = self.resolve(path)?;
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&full)
            .map_err(|e| PlanError::SourceUnavailable(format!("cannot open '{path}': {e}")))
    }

    fn headers(reader: &mut csv::Reader<std::fs::File>, path: &str) -> Result<Vec<String>, PlanError> {
        let headers = reader.headers().map_err(|e| parse_error(path, &e))?;
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(PlanError::SourceUnavailable(format!(
                "CSV file '{path}' is empty or has no data"
            )));
        }
        Ok(dedupe_headers(headers.iter()))
    }
}

impl TableSource for CsvSource {
    fn load(&self, path: &str) -> Result<Table, PlanError> {
        let mut reader = self.reader(path)?;
        let names = Self::headers(&mut reader, path)?;

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record.map_err(|e| parse_error(path, &e))?;
            for (col, field) in raw.iter_mut().zip(record.iter()) {
                col.push(field.to_string());
            }
        }
        if raw.first().map_or(true, Vec::is_empty) {
            return Err(PlanError::SourceUnavailable(format!(
                "CSV file '{path}' is empty or has no data"
            )));
        }

        let columns = names
            .into_iter()
            .zip(raw)
            .map(|(name, fields)| Column::new(name, infer_cells(fields)))
            .collect();
        let table = Table::new(columns)
            .map_err(|e| PlanError::SourceUnavailable(format!("failed to parse '{path}': {e}")))?;
        tracing::debug!(path, rows = table.row_count(), columns = table.column_count(), "loaded CSV");
        Ok(table)
    }

    fn columns(&self, path: &str) -> Result<Vec<String>, PlanError> {
        let mut reader = self.reader(path)?;
        Self::headers(&mut reader, path)
    }
}

fn parse_error(path: &str, err: &csv::Error) -> PlanError {
    PlanError::SourceUnavailable(format!(
        "failed to parse CSV file '{path}'. Check file format: {err}"
    ))
}

/// Repeated header names get `.1`, `.2`, ... suffixes.
fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for h in headers {
        let mut name = h.to_string();
        let mut n = 1;
        while out.contains(&name) {
            name = format!("{h}.{n}");
            n += 1;
        }
        out.push(name);
    }
    out
}

/// Type a column of raw CSV fields.
///
/// All fields parse as `i64` → Int; else all parse as `f64` → Float; else
/// all are `true`/`false` → Bool; else strings. Missing markers become
/// `Null` in every case.
fn infer_cells(fields: Vec<String>) -> Vec<Cell> {
    let present = || {
        fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !NA_VALUES.contains(f))
    };

    if present().all(|f| f.parse::<i64>().is_ok()) {
        return map_fields(fields, |f| f.trim().parse().ok().map(Cell::Int));
    }
    if present().all(|f| f.parse::<f64>().is_ok()) {
        return map_fields(fields, |f| f.trim().parse().ok().map(Cell::Float));
    }
    if present().all(|f| f.eq_ignore_ascii_case("true") || f.eq_ignore_ascii_case("false")) {
        return map_fields(fields, |f| Some(Cell::Bool(f.trim().eq_ignore_ascii_case("true"))));
    }
    map_fields(fields, |f| Some(Cell::Str(f.to_string())))
}

fn map_fields(fields: Vec<String>, parse: impl Fn(&str) -> Option<Cell>) -> Vec<Cell> {
    fields
        .iter()
        .map(|f| {
            if NA_VALUES.contains(&f.trim()) {
                Cell::Null
            } else {
                parse(f).unwrap_or(Cell::Null)
            }
        })
        .collect()
}

/// Tables registered by name, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, Table>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, table: Table) {
        self.tables.insert(path.into(), table);
    }

    pub fn with(mut self, path: impl Into<String>, table: Table) -> Self {
        self.insert(path, table);
        self
    }
}

impl TableSource for MemorySource {
    fn load(&self, path: &str) -> Result<Table, PlanError> {
        let table = self
            .tables
            .get(path)
            .ok_or_else(|| PlanError::SourceUnavailable(format!("no table registered at '{path}'")))?;
        if table.column_count() == 0 || table.row_count() == 0 {
            return Err(PlanError::SourceUnavailable(format!(
                "table '{path}' is empty or has no data"
            )));
        }
        Ok(table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tabplan_types::{ColumnType, ErrorKind};

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) {
        let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn infers_column_types() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            &dir,
            "t.csv",
            "id,price,flag,name\n1,2.5,true,a\n2,,False,b\n3,4,true,\n",
        );
        let t = CsvSource::with_base_dir(dir.path()).load("t.csv").unwrap();
        assert_eq!(t.shape(), (3, 4));
        assert_eq!(t.column("id").unwrap().inferred_type(), ColumnType::Int);
        assert_eq!(t.column("price").unwrap().inferred_type(), ColumnType::Float);
        assert_eq!(t.column("price").unwrap().cells[1], Cell::Null);
        assert_eq!(t.column("flag").unwrap().inferred_type(), ColumnType::Bool);
        assert_eq!(t.column("name").unwrap().cells[2], Cell::Null);
    }

    #[test]
    fn mixed_column_stays_text() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(&dir, "t.csv", "code\n1\nA7\n");
        let t = CsvSource::with_base_dir(dir.path()).load("t.csv").unwrap();
        assert_eq!(t.column("code").unwrap().cells[0], Cell::from("1"));
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvSource::with_base_dir(dir.path())
            .load("nope.csv")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    }

    #[test]
    fn empty_and_header_only_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(&dir, "empty.csv", "");
        write_csv(&dir, "header.csv", "a,b\n");
        let src = CsvSource::with_base_dir(dir.path());
        assert_eq!(src.load("empty.csv").unwrap_err().kind(), ErrorKind::SourceUnavailable);
        assert_eq!(src.load("header.csv").unwrap_err().kind(), ErrorKind::SourceUnavailable);
    }

    #[test]
    fn ragged_rows_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(&dir, "bad.csv", "a,b\n1,2\n3\n");
        let err = CsvSource::with_base_dir(dir.path()).load("bad.csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        assert_eq!(
            dedupe_headers(["a", "b", "a", "a"].into_iter()),
            vec!["a", "b", "a.1", "a.2"]
        );
    }

    #[test]
    fn columns_reads_only_header() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(&dir, "t.csv", "x,y\n1,2\n");
        let cols = CsvSource::with_base_dir(dir.path()).columns("t.csv").unwrap();
        assert_eq!(cols, vec!["x", "y"]);
    }
}
