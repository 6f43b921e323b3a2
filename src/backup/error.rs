use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    /// Raised before the store is touched.
    #[error("unauthorized")]
    Unauthorized,
    #[error("backup failed: {0:#}")]
    Failed(#[from] anyhow::Error),
}

impl BackupError {
    pub fn code(&self) -> &'static str {
        match self {
            BackupError::Unauthorized => "unauthorized",
            BackupError::Failed(_) => "backup_failed",
        }
    }
}
