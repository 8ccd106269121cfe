use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoreConfig {
    /// Replaces the platform config directory as the parent of application directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// How long SQLite waits on a locked database before failing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy_timeout_ms: Option<u64>,
}

impl StoreConfig {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("kraken.toml")
}

/// Read the store settings at `path`, or `./kraken.toml` when no path is given
///
/// A missing file yields the defaults. A relative `base_dir` is taken relative
/// to the directory holding the file.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<StoreConfig> {
    let path = path.map_or_else(default_config_path, Path::to_path_buf);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(StoreConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("cannot read {}", path.display()));
        }
    };

    let mut config: StoreConfig = toml::from_str(&contents)
        .with_context(|| format!("{} is not a valid store config", path.display()))?;
    config.base_dir = config.base_dir.map(|base_dir| match path.parent() {
        Some(config_dir) if base_dir.is_relative() => config_dir.join(base_dir),
        _ => base_dir,
    });
    Ok(config)
}

/// Write `config` as TOML; an existing file is only replaced when `overwrite` is set
pub fn write_config(path: &Path, config: &StoreConfig, overwrite: bool) -> anyhow::Result<()> {
    let body = toml::to_string_pretty(config)?;

    let mut options = OpenOptions::new();
    if overwrite {
        options.write(true).create(true).truncate(true);
    } else {
        options.write(true).create_new(true);
    }
    let mut file = options.open(path).map_err(|err| match err.kind() {
        ErrorKind::AlreadyExists => {
            anyhow::anyhow!("{} already exists; pass --force to replace it", path.display())
        }
        _ => anyhow::Error::new(err).context(format!("cannot write {}", path.display())),
    })?;
    file.write_all(body.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_config() {
        let tmp = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&tmp.path().join("kraken.toml"))).unwrap();
        assert_eq!(loaded, StoreConfig::default());
    }

    #[test]
    fn test_relative_base_dir_follows_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kraken.toml");
        std::fs::write(&path, "base_dir = \"stores\"\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.base_dir, Some(tmp.path().join("stores")));
    }

    #[test]
    fn test_invalid_config_names_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kraken.toml");
        std::fs::write(&path, "busy_timeout_ms = \"soon\"").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("kraken.toml"));
    }

    #[test]
    fn test_write_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kraken.toml");
        let config = StoreConfig {
            base_dir: Some(tmp.path().join("data")),
            busy_timeout_ms: Some(2500),
        };

        write_config(&path, &config, false).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.busy_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kraken.toml");
        write_config(&path, &StoreConfig::default(), false).unwrap();

        let err = write_config(&path, &StoreConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(write_config(&path, &StoreConfig::default(), true).is_ok());
    }

    #[test]
    fn test_partial_config() {
        let config: StoreConfig = toml::from_str("busy_timeout_ms = 100").unwrap();
        assert!(config.base_dir.is_none());
        assert_eq!(config.busy_timeout_ms, Some(100));
    }
}
