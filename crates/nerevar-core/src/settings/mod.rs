//! Codec for the server's `config.lua` settings script: `config.<key> = value`
//! statements, some of them brace tables spanning several lines.

mod lua;
mod model;
mod parse;
mod serialize;

pub use model::{
    NamedSetting, RankColors, RespawnLocation, ServerSettings, SettingValue, SpawnLocation,
    TimeTable,
};
pub use parse::parse_server_settings;
pub use serialize::serialize_server_settings;

use crate::error::{CoreError, CoreResult, IoContext};
use crate::paths::AppPaths;
use std::fs;

pub fn read_settings(paths: &AppPaths) -> CoreResult<ServerSettings> {
    let path = paths.server_settings();
    if !path.exists() {
        return Err(CoreError::not_found("TES3MP server settings file", path));
    }
    let content = fs::read_to_string(&path).io_context("read TES3MP server settings", &path)?;
    parse_server_settings(&content)
}

/// Replaces the whole script. The installation must already ship one; this
/// never creates the scripts directory.
pub fn write_settings(paths: &AppPaths, settings: &ServerSettings) -> CoreResult<()> {
    let path = paths.server_settings();
    if !path.exists() {
        return Err(CoreError::not_found("TES3MP server settings file", path));
    }
    fs::write(&path, serialize_server_settings(settings))
        .io_context("write TES3MP server settings", &path)?;
    tracing::info!(path = %path.display(), "saved TES3MP server settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_through_install_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(dir.path());
        let script = paths.server_settings();

        let missing = read_settings(&paths).unwrap_err();
        assert!(matches!(missing, CoreError::NotFound { .. }));
        assert!(write_settings(&paths, &ServerSettings::default()).is_err());

        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(&script, "config = {}\nconfig.loginTime = 5\nreturn config\n").unwrap();
        assert_eq!(read_settings(&paths).unwrap().login_time, 5);

        let mut settings = ServerSettings::default();
        settings.forbidden_cells.push("Mournhold".into());
        write_settings(&paths, &settings).unwrap();
        assert_eq!(read_settings(&paths).unwrap(), settings);
    }
}
