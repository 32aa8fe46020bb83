use crate::error_handling::to_command_result;
use crate::AppState;
use nerevar_core::settings::{read_settings, write_settings, ServerSettings};
use nerevar_core::text_config::{client, openmw, server, ClientConnection, OpenMwConfig};
use nerevar_core::text_config::{ServerConfigPatch, ServerTextConfig};
use nerevar_core::update::UpdateCheck;
use nerevar_core::{
    paths, ApplicationConfig, ConfigStore, CoreResult, InstallOutcome, Installer, LaunchHandle,
    Mode, Tool, Updater,
};
use std::path::PathBuf;
use tauri::State;

fn store(state: &AppState) -> ConfigStore {
    ConfigStore::new(state.paths.config_file())
}

fn updater(state: &AppState) -> CoreResult<Updater> {
    Updater::new(&state.cfg, state.scratch.clone())
}

async fn install(state: &AppState) -> CoreResult<InstallOutcome> {
    let installer = Installer::new(&state.cfg, state.paths.clone(), state.scratch.clone())?;
    installer.install().await
}

#[tauri::command]
pub fn get_app_version() -> String {
    nerevar_core::app_version().to_string()
}

#[tauri::command]
pub fn get_nerevar_config(state: State<'_, AppState>) -> Result<Option<ApplicationConfig>, String> {
    to_command_result("get_nerevar_config", store(&state).load())
}

#[tauri::command]
pub fn set_mode(state: State<'_, AppState>, mode: Mode) -> Result<ApplicationConfig, String> {
    to_command_result("set_mode", store(&state).set_mode(mode))
}

/// Returns the install directory.
#[tauri::command]
pub async fn install_tes3mp(state: State<'_, AppState>) -> Result<String, String> {
    let outcome = to_command_result("install_tes3mp", install(&state).await)?;
    Ok(outcome.path().to_string_lossy().to_string())
}

#[tauri::command]
pub async fn check_for_tes3mp_update(state: State<'_, AppState>) -> Result<UpdateCheck, String> {
    let result = match updater(&state) {
        Ok(updater) => updater.check_payload_update(&store(&state)).await,
        Err(e) => Err(e),
    };
    to_command_result("check_for_tes3mp_update", result)
}

#[tauri::command]
pub async fn check_for_app_update(state: State<'_, AppState>) -> Result<UpdateCheck, String> {
    let result = match updater(&state) {
        Ok(updater) => updater.check_app_update().await,
        Err(e) => Err(e),
    };
    to_command_result("check_for_app_update", result)
}

#[tauri::command]
pub async fn download_app_update(
    state: State<'_, AppState>,
    download_url: String,
) -> Result<String, String> {
    let result = match updater(&state) {
        Ok(updater) => updater.download_update(&download_url).await,
        Err(e) => Err(e),
    };
    let path = to_command_result("download_app_update", result)?;
    Ok(path.to_string_lossy().to_string())
}

/// Does not return on success: the process exits so the helper can swap
/// the binary.
#[tauri::command]
pub fn apply_app_update(state: State<'_, AppState>, temp_file_path: String) -> Result<(), String> {
    let updater = to_command_result("apply_app_update", updater(&state))?;
    match to_command_result(
        "apply_app_update",
        updater.apply_update(&PathBuf::from(temp_file_path)),
    )? {}
}

#[tauri::command]
pub fn get_tes3mp_client_config(state: State<'_, AppState>) -> Result<ClientConnection, String> {
    to_command_result(
        "get_tes3mp_client_config",
        client::read_client_config(&state.paths),
    )
}

#[tauri::command]
pub fn set_tes3mp_client_config(
    state: State<'_, AppState>,
    config: ClientConnection,
) -> Result<(), String> {
    to_command_result(
        "set_tes3mp_client_config",
        client::write_client_config(&state.paths, &config),
    )
}

#[tauri::command]
pub fn get_tes3mp_server_config(state: State<'_, AppState>) -> Result<ServerTextConfig, String> {
    to_command_result(
        "get_tes3mp_server_config",
        server::read_server_config(&state.paths),
    )
}

#[tauri::command]
pub fn set_tes3mp_server_config(
    state: State<'_, AppState>,
    patch: ServerConfigPatch,
) -> Result<(), String> {
    to_command_result(
        "set_tes3mp_server_config",
        server::write_server_config(&state.paths, &patch),
    )
}

#[tauri::command]
pub fn get_tes3mp_server_settings(state: State<'_, AppState>) -> Result<ServerSettings, String> {
    to_command_result(
        "get_tes3mp_server_settings",
        read_settings(&state.paths),
    )
}

#[tauri::command]
pub fn set_tes3mp_server_settings(
    state: State<'_, AppState>,
    settings: ServerSettings,
) -> Result<(), String> {
    to_command_result(
        "set_tes3mp_server_settings",
        write_settings(&state.paths, &settings),
    )
}

#[tauri::command]
pub fn get_openmw_config() -> Result<Option<OpenMwConfig>, String> {
    let Some(path) = paths::openmw_config_file() else {
        return Ok(None);
    };
    to_command_result("get_openmw_config", openmw::load_openmw_config(&path))
}

#[tauri::command]
pub fn open_config_lua_in_explorer(state: State<'_, AppState>) -> Result<(), String> {
    to_command_result(
        "open_config_lua_in_explorer",
        paths::open_in_file_manager(&state.paths.server_settings()),
    )
}

#[tauri::command]
pub fn open_nerevar_appdata_dir_in_explorer(state: State<'_, AppState>) -> Result<(), String> {
    to_command_result(
        "open_nerevar_appdata_dir_in_explorer",
        paths::open_in_file_manager(state.paths.root()),
    )
}

/// Async so the supervisor's monitor task lands on the Tauri runtime.
#[tauri::command]
pub async fn launch_tool(state: State<'_, AppState>, tool: Tool) -> Result<LaunchHandle, String> {
    to_command_result(
        "launch_tool",
        state.supervisor.launch_installed(&store(&state), tool),
    )
}

#[tauri::command]
pub async fn ping_server(host: String, port: u16) -> Option<u128> {
    nerevar_core::net::ping(&host, port).await
}
