use std::path::PathBuf;

pub const ENV_WORKSPACE: &str = "COURSED_WORKSPACE";
pub const ENV_ADMIN_TOKEN: &str = "COURSED_ADMIN_TOKEN";
pub const ENV_ASSET_DIR: &str = "COURSED_ASSET_DIR";
pub const ENV_LOG: &str = "COURSED_LOG";

const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_ASSET_SUBDIR: &str = "public";

/// Startup settings, read once from the environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub workspace: Option<PathBuf>,
    pub admin_token: Option<String>,
    pub asset_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Empty values count as unset.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            workspace: get(ENV_WORKSPACE).map(PathBuf::from),
            admin_token: get(ENV_ADMIN_TOKEN),
            asset_dir: get(ENV_ASSET_DIR).map(PathBuf::from),
            log_filter: get(ENV_LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Root against which local asset references are resolved for a given workspace.
    pub fn asset_root(&self, workspace: &std::path::Path) -> PathBuf {
        self.asset_dir
            .clone()
            .unwrap_or_else(|| workspace.join(DEFAULT_ASSET_SUBDIR))
    }
}
