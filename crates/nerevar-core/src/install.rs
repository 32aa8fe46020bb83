use crate::app_config::{ConfigStore, DEFAULT_VERSION};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, IoContext};
use crate::paths::AppPaths;
use crate::release::ReleaseClient;
use crate::scratch::ScratchSpace;
use chrono::Utc;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// The executable that marks a directory as a TES3MP installation.
pub const PAYLOAD_EXE: &str = "tes3mp.exe";
const PAYLOAD_DIR_PREFIX: &str = "tes3mp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Downloaded, extracted and moved into place.
    Installed { path: PathBuf, version: String },
    /// An installation was already on disk without a config record; only the
    /// record was written.
    Recovered { path: PathBuf, version: String },
}

impl InstallOutcome {
    pub fn path(&self) -> &Path {
        match self {
            InstallOutcome::Installed { path, .. } | InstallOutcome::Recovered { path, .. } => path,
        }
    }
}

pub struct Installer {
    paths: AppPaths,
    scratch: ScratchSpace,
    releases: ReleaseClient,
    channel: String,
}

impl Installer {
    pub fn new(cfg: &CoreConfig, paths: AppPaths, scratch: ScratchSpace) -> CoreResult<Self> {
        Ok(Self {
            paths,
            scratch,
            releases: ReleaseClient::new(cfg)?,
            channel: cfg.update.payload_channel.clone(),
        })
    }

    fn store(&self) -> ConfigStore {
        ConfigStore::new(self.paths.config_file())
    }

    pub async fn install(&self) -> CoreResult<InstallOutcome> {
        self.paths.ensure()?;
        let target = self.paths.install_dir();
        let store = self.store();

        if let Some(outcome) = self.recover_orphan(&store, &target)? {
            return Ok(outcome);
        }

        let release = self.releases.fetch_lenient(&self.channel).await;
        tracing::info!(version = %release.version, "installing TES3MP");

        let archive = self.scratch.archive_path();
        self.releases.download_to(&release.url, &archive).await?;

        self.scratch.purge_extract_dir()?;
        let extract_dir = self.scratch.extract_dir();
        {
            let archive = archive.clone();
            let extract_dir = extract_dir.clone();
            tokio::task::spawn_blocking(move || extract_archive(&archive, &extract_dir))
                .await
                .map_err(|e| CoreError::Archive(format!("extraction task failed: {e}")))??;
        }

        let payload = locate_payload_dir(&extract_dir)?;
        tracing::info!(path = %payload.display(), "located TES3MP folder");

        fs::remove_file(&archive).io_context("remove downloaded archive", &archive)?;

        if target.exists() {
            tracing::info!(path = %target.display(), "removing existing installation");
            fs::remove_dir_all(&target).io_context("remove existing installation", &target)?;
        }
        move_dir(&payload, &target)?;
        self.scratch.purge_extract_dir()?;

        store.upsert_install(&target, &release.version, Utc::now())?;
        tracing::info!(path = %target.display(), "TES3MP installed");
        Ok(InstallOutcome::Installed {
            path: target,
            version: nonblank_version(&release.version),
        })
    }

    /// A previous run may have moved the folder into place and then failed
    /// before the config record was written.
    fn recover_orphan(
        &self,
        store: &ConfigStore,
        target: &Path,
    ) -> CoreResult<Option<InstallOutcome>> {
        if !target.join(PAYLOAD_EXE).is_file() {
            return Ok(None);
        }
        let existing = store.load()?;
        if existing.as_ref().is_some_and(|c| c.is_installed()) {
            return Ok(None);
        }
        tracing::warn!(
            path = %target.display(),
            "found installation without a config record, recovering"
        );
        let version = existing
            .map(|c| c.installed_version)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        store.upsert_install(target, &version, Utc::now())?;
        Ok(Some(InstallOutcome::Recovered {
            path: target.to_path_buf(),
            version,
        }))
    }
}

fn nonblank_version(version: &str) -> String {
    if version.trim().is_empty() {
        DEFAULT_VERSION.to_string()
    } else {
        version.to_string()
    }
}

/// Unpacks `archive` into `dest`. Entries whose names escape `dest` are
/// skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> CoreResult<()> {
    let file = File::open(archive).io_context("open archive", archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    fs::create_dir_all(dest).io_context("create extraction directory", dest)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                tracing::warn!(
                    name = entry.name(),
                    "skipping archive entry outside extraction root"
                );
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath).io_context("create directory", &outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).io_context("create directory", parent)?;
            }
            let mut outfile = File::create(&outpath).io_context("create file", &outpath)?;
            io::copy(&mut entry, &mut outfile).io_context("extract file", &outpath)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))
                    .io_context("set permissions on", &outpath)?;
            }
        }
    }
    tracing::info!(entries = zip.len(), dest = %dest.display(), "archive extracted");
    Ok(())
}

/// Finds the folder holding the payload: the extraction root itself, or the
/// first immediate subdirectory whose name starts with `tes3mp` in any case.
pub fn locate_payload_dir(root: &Path) -> CoreResult<PathBuf> {
    if root.join(PAYLOAD_EXE).is_file() {
        return Ok(root.to_path_buf());
    }

    let mut folders = Vec::new();
    for entry in fs::read_dir(root).io_context("read extraction directory", root)? {
        let entry = entry.io_context("read extraction directory", root)?;
        if entry.path().is_dir() {
            folders.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    folders.sort();

    let Some(name) = folders
        .iter()
        .find(|name| name.to_lowercase().starts_with(PAYLOAD_DIR_PREFIX))
    else {
        return Err(CoreError::Archive(format!(
            "could not find TES3MP folder in extracted files; found folders: {folders:?}"
        )));
    };

    let dir = root.join(name);
    if !dir.join(PAYLOAD_EXE).is_file() {
        return Err(CoreError::not_found(PAYLOAD_EXE, dir.join(PAYLOAD_EXE)));
    }
    Ok(dir)
}

/// Renames `from` to `to`, copying instead when they sit on different
/// filesystems.
fn move_dir(from: &Path, to: &Path) -> CoreResult<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).io_context("create directory", parent)?;
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::debug!(error = %err, "rename failed, copying instead");
            copy_dir(from, to)?;
            fs::remove_dir_all(from).io_context("remove extracted folder", from)
        }
    }
}

fn copy_dir(from: &Path, to: &Path) -> CoreResult<()> {
    fs::create_dir_all(to).io_context("create directory", to)?;
    for entry in fs::read_dir(from).io_context("read directory", from)? {
        let entry = entry.io_context("read directory", from)?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        if src.is_dir() {
            copy_dir(&src, &dst)?;
        } else {
            fs::copy(&src, &dst).io_context("copy file", &src)?;
        }
    }
    Ok(())
}
