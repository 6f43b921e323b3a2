use anyhow::{anyhow, Context};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Value};

/// Read access to whole tables, one call per table.
pub trait TableStore {
    /// Every row of `table` in insertion order, each as a JSON object keyed by column name.
    fn read_rows(&self, table: &str) -> anyhow::Result<Vec<Value>>;

    fn count_rows(&self, table: &str) -> anyhow::Result<u64>;
}

pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

// Table names are interpolated into SQL, so only plain identifiers get through.
fn checked_table_name(table: &str) -> anyhow::Result<&str> {
    if table.is_empty() || !table.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
        return Err(anyhow!("invalid table name: {:?}", table));
    }
    Ok(table)
}

fn json_from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(STANDARD.encode(b)),
    }
}

impl TableStore for SqliteStore<'_> {
    fn read_rows(&self, table: &str) -> anyhow::Result<Vec<Value>> {
        let table = checked_table_name(table)?;
        let sql = format!("SELECT * FROM {} ORDER BY rowid", table);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("failed to prepare read of {}", table))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut out = Vec::new();
        let mut rows = stmt
            .query([])
            .with_context(|| format!("failed to query {}", table))?;
        while let Some(row) = rows.next()? {
            let mut obj = Map::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                obj.insert(name.clone(), json_from_sql(row.get_ref(i)?));
            }
            out.push(Value::Object(obj));
        }
        Ok(out)
    }

    fn count_rows(&self, table: &str) -> anyhow::Result<u64> {
        let table = checked_table_name(table)?;
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("failed to count {}", table))?;
        Ok(n.max(0) as u64)
    }
}
