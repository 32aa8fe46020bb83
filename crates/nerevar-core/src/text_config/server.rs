use super::{for_each_entry, rewrite_values};
use crate::error::{CoreError, CoreResult, IoContext};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerTextConfig {
    pub general: GeneralConfig,
    pub plugins: PluginsConfig,
    pub master_server: MasterServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConfig {
    pub local_address: String,
    pub port: u16,
    pub maximum_players: u16,
    pub hostname: String,
    pub log_level: u8,
    pub password: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            local_address: "0.0.0.0".to_string(),
            port: 25565,
            maximum_players: 64,
            hostname: "TES3MP server".to_string(),
            log_level: 1,
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginsConfig {
    pub home: String,
    pub plugins: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            home: "./server".to_string(),
            plugins: "serverCore.lua".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterServerConfig {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
    pub rate: u32,
}

impl Default for MasterServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            address: "master.tes3mp.com".to_string(),
            port: 25561,
            rate: 10000,
        }
    }
}

/// A partial update. Absent fields leave the file line as it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfigPatch {
    pub general: Option<GeneralPatch>,
    pub plugins: Option<PluginsPatch>,
    pub master_server: Option<MasterServerPatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralPatch {
    pub local_address: Option<String>,
    pub port: Option<u16>,
    pub maximum_players: Option<u16>,
    pub hostname: Option<String>,
    pub log_level: Option<u8>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginsPatch {
    pub home: Option<String>,
    pub plugins: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MasterServerPatch {
    pub enabled: Option<bool>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub rate: Option<u32>,
}

impl From<ServerTextConfig> for ServerConfigPatch {
    fn from(cfg: ServerTextConfig) -> Self {
        Self {
            general: Some(GeneralPatch {
                local_address: Some(cfg.general.local_address),
                port: Some(cfg.general.port),
                maximum_players: Some(cfg.general.maximum_players),
                hostname: Some(cfg.general.hostname),
                log_level: Some(cfg.general.log_level),
                password: Some(cfg.general.password),
            }),
            plugins: Some(PluginsPatch {
                home: Some(cfg.plugins.home),
                plugins: Some(cfg.plugins.plugins),
            }),
            master_server: Some(MasterServerPatch {
                enabled: Some(cfg.master_server.enabled),
                address: Some(cfg.master_server.address),
                port: Some(cfg.master_server.port),
                rate: Some(cfg.master_server.rate),
            }),
        }
    }
}

fn overlay<T: FromStr>(slot: &mut T, section: &str, key: &str, value: &str) {
    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => tracing::warn!(section, key, value, "malformed value, keeping default"),
    }
}

/// Starts from the stock defaults and overlays whatever the file defines.
pub fn parse_server_config(content: &str) -> ServerTextConfig {
    let mut cfg = ServerTextConfig::default();
    for_each_entry(content, |section, key, value| match section {
        "General" => {
            let g = &mut cfg.general;
            match key {
                "localAddress" => g.local_address = value.to_string(),
                "port" => overlay(&mut g.port, section, key, value),
                "maximumPlayers" => overlay(&mut g.maximum_players, section, key, value),
                "hostname" => g.hostname = value.to_string(),
                "logLevel" => overlay(&mut g.log_level, section, key, value),
                "password" => g.password = value.to_string(),
                _ => {}
            }
        }
        "Plugins" => match key {
            "home" => cfg.plugins.home = value.to_string(),
            "plugins" => cfg.plugins.plugins = value.to_string(),
            _ => {}
        },
        "MasterServer" => {
            let m = &mut cfg.master_server;
            match key {
                "enabled" => overlay(&mut m.enabled, section, key, value),
                "address" => m.address = value.to_string(),
                "port" => overlay(&mut m.port, section, key, value),
                "rate" => overlay(&mut m.rate, section, key, value),
                _ => {}
            }
        }
        _ => {}
    });
    cfg
}

pub fn update_server_config_values(content: &str, patch: &ServerConfigPatch) -> CoreResult<String> {
    rewrite_values(content, |section, key| match section {
        "General" => {
            let g = patch.general.as_ref()?;
            match key {
                "localAddress" => g.local_address.clone(),
                "port" => g.port.map(|v| v.to_string()),
                "maximumPlayers" => g.maximum_players.map(|v| v.to_string()),
                "hostname" => g.hostname.clone(),
                "logLevel" => g.log_level.map(|v| v.to_string()),
                "password" => g.password.clone(),
                _ => None,
            }
        }
        "Plugins" => {
            let p = patch.plugins.as_ref()?;
            match key {
                "home" => p.home.clone(),
                "plugins" => p.plugins.clone(),
                _ => None,
            }
        }
        "MasterServer" => {
            let m = patch.master_server.as_ref()?;
            match key {
                "enabled" => m.enabled.map(|v| v.to_string()),
                "address" => m.address.clone(),
                "port" => m.port.map(|v| v.to_string()),
                "rate" => m.rate.map(|v| v.to_string()),
                _ => None,
            }
        }
        _ => None,
    })
}

pub fn read_server_config(paths: &AppPaths) -> CoreResult<ServerTextConfig> {
    let path = paths.server_config();
    if !path.exists() {
        return Err(CoreError::not_found("TES3MP server config file", path));
    }
    let content = fs::read_to_string(&path).io_context("read TES3MP server config", &path)?;
    Ok(parse_server_config(&content))
}

pub fn write_server_config(paths: &AppPaths, patch: &ServerConfigPatch) -> CoreResult<()> {
    let path = paths.server_config();
    if !path.exists() {
        return Err(CoreError::not_found("TES3MP server config file", path));
    }
    let content = fs::read_to_string(&path).io_context("read TES3MP server config", &path)?;
    let updated = update_server_config_values(&content, patch)?;
    fs::write(&path, updated).io_context("write TES3MP server config", &path)?;
    tracing::info!(path = %path.display(), "updated TES3MP server config");
    Ok(())
}
