use crate::app_config::{ConfigStore, DEFAULT_VERSION};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, IoContext};
use crate::release::{ReleaseClient, ReleaseInfo};
use crate::scratch::ScratchSpace;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCheck {
    pub update_available: bool,
    pub version: String,
    pub url: Option<String>,
}

impl UpdateCheck {
    fn compare(current: &str, release: ReleaseInfo) -> Self {
        let version = if release.version.trim().is_empty() {
            DEFAULT_VERSION.to_string()
        } else {
            release.version
        };
        tracing::info!(current, latest = %version, "compared versions");
        Self {
            update_available: is_newer(current, &version),
            version,
            url: Some(release.url).filter(|u| !u.trim().is_empty()),
        }
    }
}

fn parse_version(raw: &str) -> Option<semver::Version> {
    let raw = raw.trim();
    semver::Version::parse(raw.strip_prefix('v').unwrap_or(raw)).ok()
}

/// True when `latest` is a newer release than `current`. Versions that are
/// not semver fall back to plain inequality.
pub fn is_newer(current: &str, latest: &str) -> bool {
    match (parse_version(current), parse_version(latest)) {
        (Some(current), Some(latest)) => latest > current,
        _ => !latest.trim().is_empty() && current.trim() != latest.trim(),
    }
}

/// Flavour of helper script to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptTarget {
    Windows,
    Posix,
}

impl ScriptTarget {
    pub fn host() -> Self {
        if cfg!(windows) {
            ScriptTarget::Windows
        } else {
            ScriptTarget::Posix
        }
    }
}

fn sh_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Script that waits for this process to exit, swaps `new` over `current`
/// and restarts it, or restores `backup` when the copy fails.
pub fn render_update_script(
    target: ScriptTarget,
    new: &Path,
    current: &Path,
    backup: &Path,
) -> String {
    match target {
        ScriptTarget::Windows => {
            let (new, current, backup) = (new.display(), current.display(), backup.display());
            format!(
                r#"@echo off
timeout /t 2 /nobreak >nul
copy "{new}" "{current}"
if %errorlevel% equ 0 (
    del "{new}"
    del "%~f0"
    start "" "{current}"
) else (
    echo Update failed, restoring backup...
    copy "{backup}" "{current}"
    del "{backup}"
    del "%~f0"
)
"#
            )
        }
        ScriptTarget::Posix => {
            let (new, current, backup) = (sh_quote(new), sh_quote(current), sh_quote(backup));
            format!(
                r#"#!/bin/sh
sleep 2
if cp {new} {current}; then
    rm -f {new}
    rm -f "$0"
    {current} >/dev/null 2>&1 &
else
    echo "Update failed, restoring backup..."
    cp {backup} {current}
    rm -f {backup}
    rm -f "$0"
fi
"#
            )
        }
    }
}

/// Files written before handing over to the helper script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpdate {
    pub script: PathBuf,
    pub backup: PathBuf,
}

pub struct Updater {
    releases: ReleaseClient,
    scratch: ScratchSpace,
    app_channel: String,
    payload_channel: String,
}

impl Updater {
    pub fn new(cfg: &CoreConfig, scratch: ScratchSpace) -> CoreResult<Self> {
        Ok(Self {
            releases: ReleaseClient::new(cfg)?,
            scratch,
            app_channel: cfg.update.app_channel.clone(),
            payload_channel: cfg.update.payload_channel.clone(),
        })
    }

    pub async fn check_app_update(&self) -> CoreResult<UpdateCheck> {
        let release = self.releases.fetch(&self.app_channel).await?;
        Ok(UpdateCheck::compare(crate::app_version(), release))
    }

    pub async fn check_payload_update(&self, store: &ConfigStore) -> CoreResult<UpdateCheck> {
        let installed = store.require()?;
        let release = self.releases.fetch(&self.payload_channel).await?;
        Ok(UpdateCheck::compare(&installed.installed_version, release))
    }

    pub async fn download_update(&self, url: &str) -> CoreResult<PathBuf> {
        let dest = self.scratch.update_binary();
        self.releases.download_to(url, &dest).await?;
        Ok(dest)
    }

    /// Backs up `current_exe` next to itself and writes the helper script.
    pub fn stage_update(&self, new_binary: &Path, current_exe: &Path) -> CoreResult<StagedUpdate> {
        if !new_binary.is_file() {
            return Err(CoreError::not_found("downloaded update", new_binary));
        }
        let mut backup = current_exe.as_os_str().to_owned();
        backup.push(".backup");
        let backup = PathBuf::from(backup);
        fs::copy(current_exe, &backup).io_context("create backup of", current_exe)?;
        tracing::info!(path = %backup.display(), "created backup");

        let script = self.scratch.update_script();
        let body = render_update_script(ScriptTarget::host(), new_binary, current_exe, &backup);
        fs::write(&script, body).io_context("write update script", &script)?;
        tracing::info!(path = %script.display(), "created update script");
        Ok(StagedUpdate { script, backup })
    }

    /// Hands the swap to a detached helper and exits this process.
    pub fn apply_update(&self, new_binary: &Path) -> CoreResult<Infallible> {
        let current_exe = std::env::current_exe().map_err(|e| {
            CoreError::Process(format!("failed to get current executable path: {e}"))
        })?;
        let staged = self.stage_update(new_binary, &current_exe)?;
        spawn_detached(&staged.script)?;
        tracing::info!("update script started, exiting");
        std::process::exit(0)
    }
}

fn spawn_detached(script: &Path) -> CoreResult<()> {
    let mut cmd = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/c").arg(script);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg(script);
        cmd
    };
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0008;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }

    cmd.spawn()
        .map_err(|e| CoreError::Process(format!("failed to start update script: {e}")))?;
    Ok(())
}
