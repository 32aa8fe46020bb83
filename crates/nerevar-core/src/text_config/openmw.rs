use super::classify;
use super::Line;
use crate::error::{CoreResult, IoContext};
use crate::settings::SettingValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Flat view of `openmw.cfg`. Repeated keys (`data=`, `content=`) collapse to
/// the last occurrence.
pub type OpenMwConfig = BTreeMap<String, SettingValue>;

pub fn parse_openmw_config(content: &str) -> OpenMwConfig {
    let mut config = OpenMwConfig::new();
    for line in content.lines() {
        if let Line::Entry { key, value } = classify(line) {
            let clean = value.trim_matches('"').trim_matches('\'');
            config.insert(key.to_string(), SettingValue::infer(clean));
        }
    }
    config
}

pub fn load_openmw_config(path: &Path) -> CoreResult<Option<OpenMwConfig>> {
    tracing::info!(path = %path.display(), "checking for openmw.cfg");
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).io_context("read openmw.cfg", path)?;
    let config = parse_openmw_config(&content);
    tracing::info!(settings = config.len(), "loaded OpenMW config");
    Ok(Some(config))
}
