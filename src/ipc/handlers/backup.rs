use crate::auth::Authenticator;
use crate::backup::{self, format_size, Archive, BackupError};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::SqliteStore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rusqlite::Connection;
use serde_json::json;
use std::path::{Path, PathBuf};

fn credential(req: &Request) -> Option<&str> {
    req.params.get("token").and_then(|v| v.as_str())
}

fn backup_err(id: &str, e: BackupError) -> serde_json::Value {
    match e {
        BackupError::Unauthorized => err(id, e.code(), "unauthorized", None),
        BackupError::Failed(ref cause) => err(id, e.code(), format!("{cause:#}"), None),
    }
}

/// The open store, or the response to send instead. An unauthenticated caller
/// is told so even when no workspace is open.
fn require_db<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    match state.db.as_ref() {
        Some(conn) => Ok(conn),
        None if !state.auth.verify(credential(req)) => {
            Err(backup_err(&req.id, BackupError::Unauthorized))
        }
        None => Err(err(&req.id, "no_workspace", "select a workspace first", None)),
    }
}

fn handle_tables(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_db(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let store = SqliteStore::new(conn);
    match backup::tables_for(&state.auth, credential(req), &store) {
        Ok(tables) => ok(&req.id, json!({ "tables": tables })),
        Err(e) => backup_err(&req.id, e),
    }
}

fn handle_snapshot(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_db(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let store = SqliteStore::new(conn);
    let doc = match backup::snapshot_for(&state.auth, credential(req), &store) {
        Ok(doc) => doc,
        Err(e) => return backup_err(&req.id, e),
    };
    let size = match doc.serialized_len() {
        Ok(n) => n,
        Err(e) => return backup_err(&req.id, BackupError::Failed(e)),
    };
    ok(
        &req.id,
        json!({
            "backup": doc,
            "size": format_size(size),
            "totalRecords": doc.metadata().total_records,
        }),
    )
}

fn write_archive_file(archive: &Archive, out_dir: &Path) -> anyhow::Result<PathBuf> {
    use anyhow::Context;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.to_string_lossy()))?;
    let out_path = out_dir.join(archive.file_name());
    std::fs::write(&out_path, archive.bytes())
        .with_context(|| format!("failed to write archive {}", out_path.to_string_lossy()))?;
    Ok(out_path)
}

fn handle_archive(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_db(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(workspace) = state.workspace.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let out_dir = req
        .params
        .get("outDir")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);

    let asset_root = state.config.asset_root(workspace);
    let store = SqliteStore::new(conn);
    let archive = match backup::archive_for(&state.auth, credential(req), &store, &asset_root) {
        Ok(a) => a,
        Err(e) => return backup_err(&req.id, e),
    };

    let mut result = json!({
        "fileName": archive.file_name(),
        "contentType": archive.content_type(),
        "contentDisposition": archive.content_disposition(),
        "contentLength": archive.content_length(),
        "totalRecords": archive.total_records(),
        "entryCount": archive.entry_count(),
    });
    match out_dir {
        Some(dir) => match write_archive_file(&archive, &dir) {
            Ok(path) => result["path"] = json!(path.to_string_lossy()),
            Err(e) => return err(&req.id, "io_failed", format!("{e:#}"), None),
        },
        None => result["dataBase64"] = json!(STANDARD.encode(archive.bytes())),
    }
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.tables" => Some(handle_tables(state, req)),
        "backup.snapshot" => Some(handle_snapshot(state, req)),
        "backup.archive" => Some(handle_archive(state, req)),
        _ => None,
    }
}
