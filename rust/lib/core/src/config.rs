use std::path::PathBuf;

/// Storage settings shared by service binaries.
///
/// Binaries fill this from their own config file, then hand the resolved
/// paths to the store constructors.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Base directory for all on-disk state.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database holding org directory records.
    /// Defaults to `{data_dir}/directory.redb`.
    pub db_path: Option<PathBuf>,

    /// Path to the SQLite database holding batches and audit logs.
    /// Defaults to `{data_dir}/academics.sqlite`.
    pub sqlite_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve the redb path, falling back to `{data_dir}/directory.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("directory.redb"))
    }

    /// Resolve the SQLite path, falling back to `{data_dir}/academics.sqlite`.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("academics.sqlite"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}
