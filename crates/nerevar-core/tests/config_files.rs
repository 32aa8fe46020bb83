use nerevar_core::settings::{read_settings, write_settings};
use nerevar_core::text_config::client::{read_client_config, write_client_config};
use nerevar_core::text_config::server::{read_server_config, write_server_config};
use nerevar_core::text_config::{ClientConnection, GeneralPatch, ServerConfigPatch};
use nerevar_core::{AppPaths, CoreError};
use std::fs;

const CLIENT_CFG: &str = "\
[General]
# Address of the server to connect to
destinationAddress = localhost
port = 25565
password =
customKey = keep me
[Chat]
keySay = Y
";

const SERVER_CFG: &str = "\
[General]
localAddress = 0.0.0.0
port = 25565
maximumPlayers = 64
hostname = My TES3MP server
logLevel = 1
password =

[Plugins]
home = ./server
plugins = serverCore.lua

[MasterServer]
enabled = true
address = master.tes3mp.com
port = 25561
rate = 10000
";

fn installed() -> (tempfile::TempDir, AppPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = AppPaths::new(dir.path());
    fs::create_dir_all(paths.server_settings().parent().unwrap()).unwrap();
    fs::write(paths.client_config(), CLIENT_CFG).unwrap();
    fs::write(paths.server_config(), SERVER_CFG).unwrap();
    fs::write(paths.server_settings(), "config = {}\nreturn config\n").unwrap();
    (dir, paths)
}

#[test]
fn client_edit_touches_only_connection_lines() {
    let (_dir, paths) = installed();
    write_client_config(
        &paths,
        &ClientConnection {
            destination_address: "203.0.113.9".into(),
            port: 25566,
            password: "hunter2".into(),
        },
    )
    .unwrap();

    let written = fs::read_to_string(paths.client_config()).unwrap();
    let expected = CLIENT_CFG
        .replace("destinationAddress = localhost", "destinationAddress = 203.0.113.9")
        .replace("port = 25565", "port = 25566")
        .replace("password =\n", "password = hunter2\n");
    assert_eq!(written, expected);
    assert_eq!(read_client_config(&paths).unwrap().password, "hunter2");
}

#[test]
fn server_patch_leaves_unpatched_keys() {
    let (_dir, paths) = installed();
    let patch = ServerConfigPatch {
        general: Some(GeneralPatch {
            hostname: Some("Vvardenfell RP".into()),
            maximum_players: Some(16),
            ..GeneralPatch::default()
        }),
        ..ServerConfigPatch::default()
    };
    write_server_config(&paths, &patch).unwrap();

    let cfg = read_server_config(&paths).unwrap();
    assert_eq!(cfg.general.hostname, "Vvardenfell RP");
    assert_eq!(cfg.general.maximum_players, 16);
    assert_eq!(cfg.general.port, 25565);
    assert_eq!(cfg.master_server.address, "master.tes3mp.com");

    let written = fs::read_to_string(paths.server_config()).unwrap();
    assert!(written.contains("\n\n[Plugins]\n"));
}

#[test]
fn empty_patch_reports_no_keys_updated() {
    let (_dir, paths) = installed();
    let err = write_server_config(&paths, &ServerConfigPatch::default()).unwrap_err();
    assert!(matches!(err, CoreError::NoKeysUpdated));
    assert_eq!(fs::read_to_string(paths.server_config()).unwrap(), SERVER_CFG);
}

#[test]
fn settings_script_is_regenerated_completely() {
    let (_dir, paths) = installed();
    let mut settings = read_settings(&paths).unwrap();
    settings.player_startup_scripts = vec!["WelcomeMessage".into()];
    settings.night_start_hour = 19;
    write_settings(&paths, &settings).unwrap();

    let script = fs::read_to_string(paths.server_settings()).unwrap();
    assert!(script.contains("config.nightStartHour = 19"));
    assert!(script.contains("config.enforceDataFiles = false"));
    assert_eq!(read_settings(&paths).unwrap(), settings);
}

#[test]
fn missing_files_report_their_path() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AppPaths::new(dir.path());
    let err = read_client_config(&paths).unwrap_err().to_string();
    assert!(err.contains("tes3mp-client-default.cfg"), "{err}");
    let err = read_server_config(&paths).unwrap_err().to_string();
    assert!(err.contains("tes3mp-server-default.cfg"), "{err}");
}
