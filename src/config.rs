use crate::contract::DATABASE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BookstoreConfig {
    pub database: Option<String>,
    pub authority: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("bookstore.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".bookstore").join(DATABASE_NAME)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BookstoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BookstoreConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &BookstoreConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Flag first, then config file, then `.bookstore/bstore.db` under `base`
pub fn resolve_database_path(flag: Option<&Path>, config: Option<&BookstoreConfig>, base: &Path) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    config
        .and_then(|c| c.database.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(|| default_database_path_in(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookstore.toml");
        let config = BookstoreConfig {
            database: Some("inventory.db".to_string()),
            authority: None,
        };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), Some(config));
        assert_eq!(load_config(Some(&dir.path().join("missing.toml"))).unwrap(), None);
    }

    #[test]
    fn test_database_resolution_order() {
        let base = Path::new("/srv/shop");
        let config = BookstoreConfig {
            database: Some("from-config.db".to_string()),
            authority: None,
        };

        assert_eq!(
            resolve_database_path(Some(Path::new("flag.db")), Some(&config), base),
            PathBuf::from("flag.db")
        );
        assert_eq!(
            resolve_database_path(None, Some(&config), base),
            PathBuf::from("from-config.db")
        );
        assert_eq!(
            resolve_database_path(None, None, base),
            PathBuf::from("/srv/shop/.bookstore/bstore.db")
        );
    }
}
