use crate::error::{CoreError, CoreResult, IoContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_VERSION: &str = "0.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Player,
    Server,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Player => f.write_str("player"),
            Mode::Server => f.write_str("server"),
        }
    }
}

/// The persisted `config.json` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(rename = "tes3mp_path")]
    pub install_path: String,
    #[serde(rename = "version")]
    pub installed_version: String,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

impl ApplicationConfig {
    pub fn is_installed(&self) -> bool {
        !self.install_path.trim().is_empty()
    }

    pub fn install_dir(&self) -> PathBuf {
        PathBuf::from(&self.install_path)
    }
}

/// Whole-file read-modify-write access to `config.json`. Holds no cached
/// state; every call hits the disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> CoreResult<Option<ApplicationConfig>> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no config file found");
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).io_context("read config file", &self.path)?;
        let config: ApplicationConfig = serde_json::from_str(&content)?;
        tracing::info!(version = %config.installed_version, "loaded application config");
        Ok(Some(config))
    }

    /// Like [`load`](Self::load) but treats a missing record as "not installed".
    pub fn require(&self) -> CoreResult<ApplicationConfig> {
        self.load()?.ok_or_else(|| {
            CoreError::not_found("application config (install TES3MP first)", &self.path)
        })
    }

    pub fn save(&self, config: &ApplicationConfig) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).io_context("create config directory", parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json).io_context("write config file", &self.path)?;
        Ok(())
    }

    /// Records a fresh installation. An existing record keeps its mode; a new
    /// one starts in player mode.
    pub fn upsert_install(
        &self,
        install_path: &Path,
        version: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<ApplicationConfig> {
        let version = if version.trim().is_empty() {
            DEFAULT_VERSION
        } else {
            version
        };
        let install_path = install_path.to_string_lossy().to_string();
        let last_updated = now.to_rfc3339();

        let config = match self.load()? {
            Some(mut existing) => {
                existing.install_path = install_path;
                existing.installed_version = version.to_string();
                existing.last_updated = last_updated;
                if existing.mode.is_none() {
                    existing.mode = Some(Mode::Player);
                }
                existing
            }
            None => ApplicationConfig {
                install_path,
                installed_version: version.to_string(),
                last_updated,
                mode: Some(Mode::Player),
            },
        };

        self.save(&config)?;
        tracing::info!(
            path = %self.path.display(),
            version = %config.installed_version,
            "application config updated"
        );
        Ok(config)
    }

    pub fn set_mode(&self, mode: Mode) -> CoreResult<ApplicationConfig> {
        let mut config = self.require()?;
        config.mode = Some(mode);
        self.save(&config)?;
        tracing::info!(%mode, "updated mode");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(tmp.path().join("config.json"));
        (tmp, store)
    }

    #[test]
    fn missing_file_loads_as_none() {
        let (_tmp, store) = store();
        assert!(store.load().unwrap().is_none());
        assert!(matches!(store.require(), Err(CoreError::NotFound { .. })));
    }

    #[test]
    fn first_upsert_defaults_to_player() {
        let (_tmp, store) = store();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let cfg = store
            .upsert_install(Path::new("/games/TES3MP"), "0.8.1", now)
            .unwrap();
        assert_eq!(cfg.mode, Some(Mode::Player));
        assert_eq!(cfg.installed_version, "0.8.1");
        assert_eq!(cfg.last_updated, "2024-05-01T12:00:00+00:00");
        assert_eq!(store.load().unwrap(), Some(cfg));
    }

    #[test]
    fn upsert_preserves_server_mode() {
        let (_tmp, store) = store();
        std::fs::write(
            store.path(),
            concat!(
                r#"{"tes3mp_path":"/old","version":"0.7.0","#,
                r#""last_updated":"2023-01-01T00:00:00+00:00","mode":"server"}"#,
            ),
        )
        .unwrap();

        let cfg = store
            .upsert_install(Path::new("/new"), "0.8.1", Utc::now())
            .unwrap();
        assert_eq!(cfg.mode, Some(Mode::Server));
        assert_eq!(cfg.install_path, "/new");

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["mode"], "server");
        assert_eq!(raw["version"], "0.8.1");
        assert_eq!(raw["tes3mp_path"], "/new");
    }

    #[test]
    fn blank_version_falls_back() {
        let (_tmp, store) = store();
        let cfg = store.upsert_install(Path::new("/x"), "", Utc::now()).unwrap();
        assert_eq!(cfg.installed_version, DEFAULT_VERSION);
    }

    #[test]
    fn set_mode_requires_existing_record() {
        let (_tmp, store) = store();
        assert!(store.set_mode(Mode::Server).is_err());

        store.upsert_install(Path::new("/x"), "1.0.0", Utc::now()).unwrap();
        let cfg = store.set_mode(Mode::Server).unwrap();
        assert_eq!(cfg.mode, Some(Mode::Server));
        assert_eq!(cfg.installed_version, "1.0.0");
    }
}
