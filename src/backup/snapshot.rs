use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::catalog::{TableGroup, TABLES};
use super::error::BackupError;
use crate::store::TableStore;

pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    Data,
    Full,
}

impl BackupKind {
    fn description(self) -> &'static str {
        match self {
            BackupKind::Data => "Full data backup of all application tables",
            BackupKind::Full => "Full backup of all application tables and referenced assets",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub version: &'static str,
    pub created_at: String,
    pub backup_type: BackupKind,
    pub total_records: usize,
    pub description: &'static str,
    pub tables_included: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRows {
    pub key: &'static str,
    pub rows: Vec<Value>,
}

/// Per-table rows, kept in catalogue order. Serializes as a JSON object whose
/// key order matches that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotData(Vec<TableRows>);

impl SnapshotData {
    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.0
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.rows.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableRows> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|t| t.key)
    }

    pub fn total_records(&self) -> usize {
        self.iter().map(|t| t.rows.len()).sum()
    }
}

impl Serialize for SnapshotData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for t in &self.0 {
            map.serialize_entry(t.key, &t.rows)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDocument {
    metadata: SnapshotMetadata,
    data: SnapshotData,
}

impl SnapshotDocument {
    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn data(&self) -> &SnapshotData {
        &self.data
    }

    pub fn to_pretty_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize snapshot")
    }

    /// Size of the compact JSON encoding, in bytes.
    pub fn serialized_len(&self) -> anyhow::Result<usize> {
        Ok(serde_json::to_vec(self)
            .context("failed to serialize snapshot")?
            .len())
    }
}

/// Reads every catalogue table and assembles a snapshot. Any failed read
/// aborts the build and nothing is returned.
pub fn build_snapshot(
    store: &dyn TableStore,
    kind: BackupKind,
) -> Result<SnapshotDocument, BackupError> {
    build_snapshot_at(store, kind, Utc::now())
}

/// Same as [`build_snapshot`], stamped with `created_at`.
pub fn build_snapshot_at(
    store: &dyn TableStore,
    kind: BackupKind,
    created_at: DateTime<Utc>,
) -> Result<SnapshotDocument, BackupError> {
    let started = Instant::now();
    let mut tables = Vec::with_capacity(TABLES.len());

    for spec in TABLES {
        let rows = match store
            .read_rows(spec.table)
            .with_context(|| format!("failed to read table {}", spec.key))
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!(table = spec.key, error = %format!("{e:#}"), "snapshot aborted");
                return Err(BackupError::Failed(e));
            }
        };
        debug!(table = spec.key, rows = rows.len(), "table read");
        tables.push(TableRows {
            key: spec.key,
            rows,
        });
    }

    let data = SnapshotData(tables);
    let total_records = data.total_records();
    let metadata = SnapshotMetadata {
        version: SNAPSHOT_VERSION,
        created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        backup_type: kind,
        total_records,
        description: kind.description(),
        tables_included: data.keys().collect(),
    };

    info!(
        kind = ?kind,
        tables = metadata.tables_included.len(),
        total_records,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "snapshot built"
    );

    Ok(SnapshotDocument { metadata, data })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub key: &'static str,
    pub table: &'static str,
    pub group: TableGroup,
    pub row_count: u64,
}

pub fn describe_tables(store: &dyn TableStore) -> Result<Vec<TableSummary>, BackupError> {
    let mut out = Vec::with_capacity(TABLES.len());
    for spec in TABLES {
        let row_count = store
            .count_rows(spec.table)
            .with_context(|| format!("failed to count table {}", spec.key))?;
        out.push(TableSummary {
            key: spec.key,
            table: spec.table,
            group: spec.group,
            row_count,
        });
    }
    Ok(out)
}

/// Human-readable size: bytes below 1 KB, then KB and MB with two decimals.
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < MB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{:.2} MB", b / MB)
    }
}
