#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod error_handling;
mod events;

use anyhow::Context;
use nerevar_core::logging::{init_file_logging, init_logging};
use nerevar_core::{AppPaths, CoreConfig, ProcessSupervisor, ScratchSpace};

pub struct AppState {
    pub cfg: CoreConfig,
    pub paths: AppPaths,
    pub scratch: ScratchSpace,
    pub supervisor: ProcessSupervisor,
}

fn resolve_paths(cfg: &CoreConfig) -> anyhow::Result<AppPaths> {
    let paths = AppPaths::resolve(cfg).context("failed to resolve data directory")?;
    paths.ensure().context("failed to create data directory")?;
    Ok(paths)
}

fn main() -> anyhow::Result<()> {
    let cfg = CoreConfig::from_env();
    let paths = resolve_paths(&cfg)?;

    let _log_guard = match init_file_logging(&paths.logs_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            init_logging();
            tracing::warn!(error = %e, "file logging unavailable, logging to stderr");
            None
        }
    };
    tracing::info!(
        version = nerevar_core::app_version(),
        data_dir = %paths.root().display(),
        "starting Nerevar"
    );

    let (supervisor, process_events) = ProcessSupervisor::new();
    let state = AppState {
        cfg,
        paths,
        scratch: ScratchSpace::default(),
        supervisor,
    };

    tauri::Builder::default()
        .manage(state)
        .setup(move |app| {
            events::forward_process_events(app.handle().clone(), process_events);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_app_version,
            commands::get_nerevar_config,
            commands::set_mode,
            commands::install_tes3mp,
            commands::check_for_tes3mp_update,
            commands::check_for_app_update,
            commands::download_app_update,
            commands::apply_app_update,
            commands::get_tes3mp_client_config,
            commands::set_tes3mp_client_config,
            commands::get_tes3mp_server_config,
            commands::set_tes3mp_server_config,
            commands::get_tes3mp_server_settings,
            commands::set_tes3mp_server_settings,
            commands::get_openmw_config,
            commands::open_config_lua_in_explorer,
            commands::open_nerevar_appdata_dir_in_explorer,
            commands::launch_tool,
            commands::ping_server,
        ])
        .run(tauri::generate_context!())
        .context("error while running tauri application")?;
    Ok(())
}
