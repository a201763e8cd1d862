//! Relational store module for zuluai
//!
//! This module mirrors a [`Dataset`] into SQLite and runs statements on behalf
//! of the agents. The on-disk store backs the SQL agent; an in-memory store
//! backs the tabular agent's statement tool.
//!
//! Materialization always drops and recreates the target table, so the store
//! reflects exactly the latest source file and never a union of runs.

use std::fs;
use std::path::Path;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql};
use tracing::{debug, info};

use crate::dataset::{Dataset, Value};
use crate::error::{AgentError, AgentResult};

/// Number of sample rows shown with each table schema
const SAMPLE_ROWS: usize = 3;

/// Cells in sample rows are cut to this many characters
const SAMPLE_CELL_WIDTH: usize = 100;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// A SQLite database holding mirrored datasets
pub struct RelationalStore {
    conn: Connection,
}

impl RelationalStore {
    /// Open (or create) the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> AgentResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Ok(Self { conn })
    }

    /// Create a private in-memory database
    pub fn in_memory() -> AgentResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Write `dataset` into the database file at `path` as `table`
    ///
    /// The parent directory is created when missing. Any existing table of
    /// the same name is replaced.
    pub fn materialize(
        path: impl AsRef<Path>,
        dataset: &Dataset,
        table: &str,
    ) -> AgentResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut store = Self::open(path)?;
        store.replace_table(dataset, table)?;
        info!(
            "Wrote {} rows to table '{}' in {}",
            dataset.row_count(),
            table,
            path.display()
        );
        Ok(store)
    }

    /// Drop `table` if it exists and recreate it from `dataset`
    ///
    /// Runs in a single transaction.
    pub fn replace_table(&mut self, dataset: &Dataset, table: &str) -> AgentResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)), [])?;

        let column_defs: Vec<String> = dataset
            .columns()
            .iter()
            .zip(dataset.column_types())
            .map(|(name, column_type)| format!("{} {}", quote_ident(name), column_type.sql_type()))
            .collect();
        let create = format!("CREATE TABLE {} ({})", quote_ident(table), column_defs.join(", "));
        debug!("{}", create);
        tx.execute(&create, [])?;

        {
            let placeholders: Vec<String> =
                (1..=dataset.columns().len()).map(|i| format!("?{i}")).collect();
            let insert = format!(
                "INSERT INTO {} VALUES ({})",
                quote_ident(table),
                placeholders.join(", ")
            );
            let mut stmt = tx.prepare(&insert)?;
            for row in dataset.rows() {
                stmt.execute(rusqlite::params_from_iter(row.iter()))?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Names of all user tables, sorted
    pub fn table_names(&self) -> AgentResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Number of rows currently in `table`
    pub fn row_count(&self, table: &str) -> AgentResult<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Schema and sample rows for each named table
    ///
    /// Each entry holds the `CREATE TABLE` statement followed by a comment
    /// block with the column names and up to three tab-separated rows.
    pub fn table_info(&self, tables: &[&str]) -> AgentResult<String> {
        let known = self.table_names()?;
        let mut sections = Vec::new();

        for &table in tables {
            if !known.iter().any(|k| k == table) {
                return Err(AgentError::UnknownTable(table.to_string()));
            }

            let create: String = self.conn.query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )?;

            let mut stmt = self.conn.prepare(&format!(
                "SELECT * FROM {} LIMIT {}",
                quote_ident(table),
                SAMPLE_ROWS
            ))?;
            let header = stmt.column_names().join("\t");
            let column_count = stmt.column_count();
            let mut rows = stmt.query([])?;
            let mut samples = Vec::new();
            while let Some(row) = rows.next()? {
                let cells: Vec<String> = (0..column_count)
                    .map(|i| {
                        row.get_ref(i)
                            .map(|v| truncate(&plain_value(v), SAMPLE_CELL_WIDTH))
                            .unwrap_or_default()
                    })
                    .collect();
                samples.push(cells.join("\t"));
            }

            sections.push(format!(
                "{}\n\n/*\n{} rows from {} table:\n{}\n{}\n*/",
                create.trim(),
                SAMPLE_ROWS,
                table,
                header,
                samples.join("\n")
            ));
        }

        Ok(sections.join("\n\n"))
    }

    /// Run one statement and render its outcome
    ///
    /// Queries render as a list of tuples, e.g. `[(27437.0,), (27088.0,)]`;
    /// an empty result renders as an empty string. Statements without a
    /// result set render the number of affected rows.
    pub fn run(&self, sql: &str) -> AgentResult<String> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();

        if column_count == 0 {
            let changed = stmt.execute([])?;
            return Ok(format!("{changed} rows affected"));
        }

        let mut rows = stmt.query([])?;
        let mut tuples = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(repr_value(row.get_ref(i)?));
            }
            tuples.push(if cells.len() == 1 {
                format!("({},)", cells[0])
            } else {
                format!("({})", cells.join(", "))
            });
        }

        if tuples.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("[{}]", tuples.join(", ")))
        }
    }
}

/// Double-quote an identifier for SQLite
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Tuple-style rendering of a result cell
fn repr_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format!("{:?}", f),
        ValueRef::Text(t) => {
            let text = String::from_utf8_lossy(t);
            format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
        }
        ValueRef::Blob(b) => format!("<{} byte blob>", b.len()),
    }
}

/// Unquoted rendering used in sample rows
fn plain_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        other => repr_value(other),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        text.chars().take(width).collect()
    }
}
