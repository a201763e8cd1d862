//! Dataset loading module for zuluai
//!
//! This module loads the comma-separated input file into an in-memory table.
//! It provides:
//!
//! - Distinguished failures for a missing, empty or malformed file
//! - Column type inference in the style of a data-frame reader
//! - The one-time fill of missing cells with zero
//! - A Markdown preview of the first rows for agent prompts
//!
//! After loading, the dataset is read-only.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AgentError, AgentResult};

/// Tokens that a data-frame reader treats as a missing value
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Represents a value in a table cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Represents a missing value (never present after loading)
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 text
    Text(String),
}

/// Integers and floats compare by numeric value, so a filled `0.0` equals `0`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) => *a as f64 == *b,
            (Value::Float(a), Value::Integer(b)) => *a == *b as f64,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NaN"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Inferred type of a whole column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    /// Column declaration used when the dataset is mirrored into SQLite
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "FLOAT",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Represents a row in the dataset
pub type Row = Vec<Value>;

/// In-memory representation of the input file
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Name derived from the file stem
    name: String,
    /// Column names in file order
    columns: Vec<String>,
    /// Inferred type per column
    column_types: Vec<ColumnType>,
    /// Rows of data, one value per column
    rows: Vec<Row>,
}

impl Dataset {
    /// Name of the dataset (the file stem)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Inferred type of each column, parallel to [`Dataset::columns`]
    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    /// All rows of the dataset
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows (the header is not counted)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Render the first `n` rows as a Markdown table
    pub fn preview(&self, n: usize) -> String {
        let mut out = String::new();
        out.push_str(&format!("| {} |\n", self.columns.join(" | ")));
        out.push_str(&format!(
            "|{}\n",
            self.columns.iter().map(|_| ":---|").collect::<String>()
        ));
        for row in self.rows.iter().take(n) {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}

/// Load a comma-separated file into a [`Dataset`]
///
/// Missing cells are replaced with zero before the dataset is returned.
/// The replacement makes "missing" and "zero" indistinguishable for numeric
/// pay fields; the number of filled cells is logged so the loss is visible.
///
/// # Errors
/// * [`AgentError::DatasetNotFound`] - the path does not exist
/// * [`AgentError::DatasetEmpty`] - the file has no header line
/// * [`AgentError::DatasetMalformed`] - a record cannot be parsed or has
///   more fields than the header
pub fn load_dataset(path: impl AsRef<Path>) -> AgentResult<Dataset> {
    let path = path.as_ref();

    if !path.exists() {
        let cwd = std::env::current_dir().unwrap_or_default();
        return Err(AgentError::DatasetNotFound {
            path: path.to_path_buf(),
            cwd,
        });
    }

    let bytes = fs::read(path)?;
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(AgentError::DatasetEmpty(path.to_path_buf()));
    }

    let malformed = |detail: String| AgentError::DatasetMalformed {
        path: path.to_path_buf(),
        detail,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // Raw cells first: the type of a column is only known once every row is read.
    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| malformed(e.to_string()))?;
        if record.len() > columns.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(malformed(format!(
                "Expected {} fields in line {}, saw {}",
                columns.len(),
                line,
                record.len()
            )));
        }

        let mut row: Vec<Option<String>> = record.iter().map(parse_raw_cell).collect();
        row.resize(columns.len(), None);
        raw_rows.push(row);
    }

    let column_types: Vec<ColumnType> = (0..columns.len())
        .map(|index| infer_column_type(raw_rows.iter().map(|row| row[index].as_deref())))
        .collect();

    let mut filled = 0usize;
    let rows: Vec<Row> = raw_rows
        .into_iter()
        .map(|raw| {
            raw.into_iter()
                .zip(&column_types)
                .map(|(cell, column_type)| {
                    if cell.is_none() {
                        filled += 1;
                    }
                    typed_value(cell.as_deref(), *column_type)
                })
                .collect()
        })
        .collect();

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "df".to_string());

    info!(
        "Loaded '{}' with {} rows and {} columns",
        path.display(),
        rows.len(),
        columns.len()
    );
    if filled > 0 {
        info!("Filled {filled} missing cells with 0; missing and zero are now indistinguishable");
    }
    debug!("Column types: {:?}", column_types);

    Ok(Dataset {
        name,
        columns,
        column_types,
        rows,
    })
}

/// `None` for missing-value tokens, otherwise the field as written.
/// Tokens match the whole field exactly; padded fields such as `" NA"` are kept.
fn parse_raw_cell(field: &str) -> Option<String> {
    if NA_TOKENS.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

/// Column typing of a data-frame reader: integers with gaps become floats.
fn infer_column_type<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> ColumnType {
    let mut has_missing = false;
    let mut has_float = false;

    for cell in cells {
        match cell {
            None => has_missing = true,
            Some(text) => {
                let text = text.trim();
                if text.parse::<i64>().is_ok() {
                    continue;
                }
                if text.parse::<f64>().is_ok() {
                    has_float = true;
                    continue;
                }
                return ColumnType::Text;
            }
        }
    }

    if has_float || has_missing {
        ColumnType::Float
    } else {
        ColumnType::Integer
    }
}

fn typed_value(cell: Option<&str>, column_type: ColumnType) -> Value {
    match (cell, column_type) {
        (None, ColumnType::Float) => Value::Float(0.0),
        (None, _) => Value::Integer(0),
        (Some(text), ColumnType::Integer) => text
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(text.to_string())),
        (Some(text), ColumnType::Float) => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(text.to_string())),
        (Some(text), ColumnType::Text) => Value::Text(text.to_string()),
    }
}
