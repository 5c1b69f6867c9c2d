//! Startup checks and directory seeding.

use std::net::SocketAddr;
use std::path::Path;

use tracing::info;

use academics::model::DirectorySeed;
use academics::service::directory::KvOrgDirectory;

use crate::config::ServerConfig;

/// Refuse to start on a config that cannot work.
pub fn verify_config(config: &ServerConfig, listen: &str) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    listen
        .parse::<SocketAddr>()
        .map_err(|e| anyhow::anyhow!("invalid listen address '{}': {}", listen, e))?;
    Ok(())
}

/// Load a JSON seed file into the org directory.
pub fn seed_directory(directory: &KvOrgDirectory, path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read seed file {}: {}", path.display(), e))?;
    let seed: DirectorySeed = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("invalid seed file {}: {}", path.display(), e))?;
    directory
        .seed(&seed)
        .map_err(|e| anyhow::anyhow!("failed to seed directory: {}", e))?;
    info!("Directory seeded from {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use academics::service::directory::OrgDirectory;
    use campus_kv::{KVStore, RedbStore};

    fn config(data_dir: &str) -> ServerConfig {
        ServerConfig::parse(&format!("[storage]\ndata_dir = \"{}\"\n", data_dir)).unwrap()
    }

    #[test]
    fn test_verify_config() {
        assert!(verify_config(&config("/tmp"), "0.0.0.0:8080").is_ok());
        assert!(verify_config(&config(""), "0.0.0.0:8080").is_err());
        assert!(verify_config(&config("/tmp"), "localhost").is_err());
    }

    #[test]
    fn test_seed_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let kv: Arc<dyn KVStore> = Arc::new(RedbStore::open(&tmp.path().join("d.redb")).unwrap());
        let directory = KvOrgDirectory::new(kv);

        let seed = tmp.path().join("seed.json");
        std::fs::write(
            &seed,
            r#"{"faculties":[{"id":"f1"}],"departments":[{"id":"d1","faculty_id":"f1"}],
               "degrees":[{"id":"g1","department_id":"d1"}]}"#,
        )
        .unwrap();
        seed_directory(&directory, &seed).unwrap();
        assert_eq!(directory.degree("g1").unwrap().unwrap().department_id, "d1");

        std::fs::write(&seed, "not json").unwrap();
        assert!(seed_directory(&directory, &seed).is_err());
        assert!(seed_directory(&directory, &tmp.path().join("missing.json")).is_err());
    }
}
