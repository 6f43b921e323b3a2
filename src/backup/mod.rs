//! Full-data export: every application table as one JSON snapshot, or the
//! snapshot plus referenced assets as a zip archive.
//!
//! Entry points check the caller's credential before the store is read.

pub mod archive;
pub mod catalog;
pub mod error;
pub mod snapshot;

use std::path::Path;

use tracing::warn;

use crate::auth::Authenticator;
use crate::store::TableStore;

pub use archive::{build_full_archive, Archive};
pub use error::BackupError;
pub use snapshot::{
    build_snapshot, describe_tables, format_size, BackupKind, SnapshotDocument, TableSummary,
};

fn authorize(auth: &dyn Authenticator, credential: Option<&str>) -> Result<(), BackupError> {
    if auth.verify(credential) {
        return Ok(());
    }
    warn!("backup request rejected: invalid or missing credential");
    Err(BackupError::Unauthorized)
}

pub fn snapshot_for(
    auth: &dyn Authenticator,
    credential: Option<&str>,
    store: &dyn TableStore,
) -> Result<SnapshotDocument, BackupError> {
    authorize(auth, credential)?;
    build_snapshot(store, BackupKind::Data)
}

pub fn archive_for(
    auth: &dyn Authenticator,
    credential: Option<&str>,
    store: &dyn TableStore,
    asset_root: &Path,
) -> Result<Archive, BackupError> {
    authorize(auth, credential)?;
    build_full_archive(store, asset_root)
}

pub fn tables_for(
    auth: &dyn Authenticator,
    credential: Option<&str>,
    store: &dyn TableStore,
) -> Result<Vec<TableSummary>, BackupError> {
    authorize(auth, credential)?;
    describe_tables(store)
}
