use crate::error::{CoreResult, IoContext};
use std::path::{Path, PathBuf};

/// Throwaway locations for downloads and extraction. Nothing here survives a
/// successful install.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl Default for ScratchSpace {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl ScratchSpace {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join("tes3mp_latest.zip")
    }

    pub fn extract_dir(&self) -> PathBuf {
        self.root.join("tes3mp_extracted")
    }

    pub fn update_binary(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("nerevar_update.exe")
        } else {
            self.root.join("nerevar_update")
        }
    }

    pub fn update_script(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("nerevar_update.bat")
        } else {
            self.root.join("nerevar_update.sh")
        }
    }

    /// Removes a stale extraction directory left by an earlier run.
    pub fn purge_extract_dir(&self) -> CoreResult<()> {
        let dir = self.extract_dir();
        if dir.exists() {
            tracing::info!(path = %dir.display(), "removing existing extraction directory");
            std::fs::remove_dir_all(&dir).io_context("remove extraction directory", &dir)?;
        }
        Ok(())
    }
}
