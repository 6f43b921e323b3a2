use anyhow::{anyhow, Context};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::catalog::TABLES;
use super::error::BackupError;
use super::snapshot::{build_snapshot_at, BackupKind, SnapshotDocument};
use crate::store::TableStore;

pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const DATA_ENTRY: &str = "backup-data.json";
pub const REMOTE_ASSETS_ENTRY: &str = "assets/remote-assets.json";
const ASSET_PREFIX: &str = "assets/";

pub const ARCHIVE_FORMAT_V1: &str = "course-backup-v1";
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";
pub const ARCHIVE_FILE_PREFIX: &str = "backup-full";

/// A finished zip archive held in memory, ready to send as a download.
#[derive(Debug, Clone)]
pub struct Archive {
    bytes: Vec<u8>,
    file_name: String,
    entry_count: usize,
    total_records: usize,
}

impl Archive {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &'static str {
        ARCHIVE_CONTENT_TYPE
    }

    pub fn content_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }
}

pub fn archive_file_name(date: NaiveDate) -> String {
    format!("{}-{}.zip", ARCHIVE_FILE_PREFIX, date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub table: &'static str,
    pub column: &'static str,
    pub reference: String,
}

impl AssetRef {
    /// Protocol-relative (`//host/...`) and scheme-qualified (`https:`, `data:`)
    /// references are remote. Single-letter schemes are read as drive letters.
    pub fn is_remote(&self) -> bool {
        let r = self.reference.as_str();
        if r.starts_with("//") {
            return true;
        }
        let Some(colon) = r.find(':') else {
            return false;
        };
        let scheme = &r[..colon];
        scheme.len() > 1
            && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    }
}

/// Asset references found in the catalogue's asset columns, first occurrence
/// wins. Returns `(local, remote)`.
pub fn collect_asset_refs(doc: &SnapshotDocument) -> (Vec<AssetRef>, Vec<AssetRef>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut local = Vec::new();
    let mut remote = Vec::new();

    for spec in TABLES.iter().filter(|t| !t.asset_columns.is_empty()) {
        let Some(rows) = doc.data().get(spec.key) else {
            continue;
        };
        for row in rows {
            for &column in spec.asset_columns {
                let Some(reference) = row.get(column).and_then(|v| v.as_str()) else {
                    continue;
                };
                let reference = reference.trim();
                if reference.is_empty() || !seen.insert(reference.to_string()) {
                    continue;
                }
                let asset = AssetRef {
                    table: spec.key,
                    column,
                    reference: reference.to_string(),
                };
                if asset.is_remote() {
                    remote.push(asset);
                } else {
                    local.push(asset);
                }
            }
        }
    }
    (local, remote)
}

/// Maps a local reference like `/uploads/a.png?v=2` or `gallery/b.jpg` onto the
/// asset root, dropping any query or fragment. Returns the archive-relative
/// path and the file on disk.
fn resolve_local_asset(root: &Path, reference: &str) -> anyhow::Result<(String, PathBuf)> {
    let path_part = reference
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let trimmed = path_part.trim_start_matches(|c: char| c == '/' || c == '\\');
    let mut parts: Vec<String> = Vec::new();
    for comp in Path::new(trimmed).components() {
        match comp {
            Component::Normal(p) => parts.push(p.to_string_lossy().to_string()),
            Component::CurDir => {}
            _ => return Err(anyhow!("asset reference escapes asset root: {}", reference)),
        }
    }
    if parts.is_empty() {
        return Err(anyhow!("empty asset reference: {:?}", reference));
    }
    let rel = parts.join("/");
    let path = parts.iter().fold(root.to_path_buf(), |acc, p| acc.join(p));
    Ok((rel, path))
}

/// Builds a full snapshot and packs it, with every referenced asset, into a
/// zip archive. A missing or unreadable local asset aborts the archive.
pub fn build_full_archive(
    store: &dyn TableStore,
    asset_root: &Path,
) -> Result<Archive, BackupError> {
    let now = Utc::now();
    let doc = build_snapshot_at(store, BackupKind::Full, now)?;
    let (bytes, entry_count) = write_archive(&doc, asset_root)?;

    let archive = Archive {
        bytes,
        file_name: archive_file_name(now.date_naive()),
        entry_count,
        total_records: doc.metadata().total_records,
    };
    info!(
        file_name = archive.file_name(),
        bytes = archive.content_length(),
        entries = archive.entry_count(),
        "archive built"
    );
    Ok(archive)
}

fn write_archive(
    doc: &SnapshotDocument,
    asset_root: &Path,
) -> anyhow::Result<(Vec<u8>, usize)> {
    let data_text = doc.to_pretty_json()?;
    let data_sha256 = format!("{:x}", Sha256::digest(data_text.as_bytes()));
    let (local, remote) = collect_asset_refs(doc);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entry_count = 0usize;

    zip.start_file(DATA_ENTRY, opts)
        .context("failed to start data entry")?;
    zip.write_all(data_text.as_bytes())
        .context("failed to write data entry")?;
    entry_count += 1;

    let mut asset_entries = Vec::with_capacity(local.len());
    let mut canonical_root: Option<PathBuf> = None;
    for asset in &local {
        let (rel, path) = resolve_local_asset(asset_root, &asset.reference)?;
        let entry = format!("{}{}", ASSET_PREFIX, rel);
        // `/a.png` and `a.png` name the same file.
        if asset_entries.contains(&entry) {
            continue;
        }
        if !path.is_file() {
            return Err(anyhow!(
                "local asset not found: {} ({}.{})",
                path.to_string_lossy(),
                asset.table,
                asset.column
            ));
        }
        if canonical_root.is_none() {
            let root = asset_root.canonicalize().with_context(|| {
                format!("failed to resolve asset root {}", asset_root.to_string_lossy())
            })?;
            canonical_root = Some(root);
        }
        let real = path
            .canonicalize()
            .with_context(|| format!("failed to resolve asset {}", path.to_string_lossy()))?;
        // A symlink under the root can still point outside it.
        if !canonical_root.as_ref().map_or(false, |root| real.starts_with(root)) {
            return Err(anyhow!(
                "asset reference escapes asset root: {}",
                asset.reference
            ));
        }
        let content = std::fs::read(&real)
            .with_context(|| format!("failed to read asset {}", real.to_string_lossy()))?;
        zip.start_file(entry.as_str(), opts)
            .with_context(|| format!("failed to start asset entry {}", entry))?;
        zip.write_all(&content)
            .with_context(|| format!("failed to write asset entry {}", entry))?;
        debug!(entry = entry.as_str(), bytes = content.len(), "asset added");
        asset_entries.push(entry);
        entry_count += 1;
    }

    if !remote.is_empty() {
        zip.start_file(REMOTE_ASSETS_ENTRY, opts)
            .context("failed to start remote assets entry")?;
        zip.write_all(
            serde_json::to_string_pretty(&remote)
                .context("failed to serialize remote assets")?
                .as_bytes(),
        )
        .context("failed to write remote assets entry")?;
        entry_count += 1;
    }

    let manifest = json!({
        "format": ARCHIVE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": doc.metadata().created_at,
        "backupType": BackupKind::Full,
        "dataEntry": DATA_ENTRY,
        "dataSha256": data_sha256,
        "totalRecords": doc.metadata().total_records,
        "tablesIncluded": doc.metadata().tables_included,
        "assets": {
            "local": asset_entries,
            "remoteCount": remote.len(),
        },
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;
    entry_count += 1;

    let cursor = zip.finish().context("failed to finalize zip archive")?;
    Ok((cursor.into_inner(), entry_count))
}
