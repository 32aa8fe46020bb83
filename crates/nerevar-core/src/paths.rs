use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, IoContext};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "Nerevar";
const INSTALL_DIR_NAME: &str = "TES3MP";

/// Fixed on-disk locations, all derived from one data root.
#[derive(Debug, Clone)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `%APPDATA%\Nerevar` on Windows, the XDG/macOS config dir elsewhere.
    pub fn resolve(cfg: &CoreConfig) -> CoreResult<Self> {
        if let Some(dir) = &cfg.paths.data_dir {
            return Ok(Self::new(dir.clone()));
        }
        let base = dirs::config_dir().ok_or_else(|| {
            CoreError::Config("failed to locate the per-user config directory".to_string())
        })?;
        Ok(Self::new(base.join(APP_DIR_NAME)))
    }

    pub fn ensure(&self) -> CoreResult<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).io_context("create data directory", &self.root)?;
            tracing::info!(path = %self.root.display(), "created data directory");
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn install_dir(&self) -> PathBuf {
        self.root.join(INSTALL_DIR_NAME)
    }

    pub fn client_config(&self) -> PathBuf {
        self.install_dir().join("tes3mp-client-default.cfg")
    }

    pub fn server_config(&self) -> PathBuf {
        self.install_dir().join("tes3mp-server-default.cfg")
    }

    pub fn server_settings(&self) -> PathBuf {
        self.install_dir()
            .join("server")
            .join("scripts")
            .join("config.lua")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}

/// `Documents/My Games/OpenMW/openmw.cfg`, if a documents dir exists.
pub fn openmw_config_file() -> Option<PathBuf> {
    dirs::document_dir().map(|docs| docs.join("My Games").join("OpenMW").join("openmw.cfg"))
}

/// Hands `path` to the desktop's default handler: a file manager for
/// directories, the associated editor for files.
pub fn open_in_file_manager(path: &Path) -> CoreResult<()> {
    if !path.exists() {
        return Err(CoreError::not_found("path", path));
    }
    open::that(path).io_context("open in file manager", path)?;
    tracing::info!(path = %path.display(), "opened in file manager");
    Ok(())
}
