use super::{for_each_entry, rewrite_values};
use crate::error::{CoreError, CoreResult, IoContext};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::fs;

const SECTION: &str = "General";

/// The three client settings the launcher is allowed to touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConnection {
    pub destination_address: String,
    pub port: u16,
    pub password: String,
}

impl Default for ClientConnection {
    fn default() -> Self {
        Self {
            destination_address: "localhost".to_string(),
            port: 25565,
            password: String::new(),
        }
    }
}

pub fn parse_client_config(content: &str) -> ClientConnection {
    let mut conn = ClientConnection::default();
    for_each_entry(content, |section, key, value| {
        if section != SECTION {
            return;
        }
        match key {
            "destinationAddress" => conn.destination_address = value.to_string(),
            "port" => match value.parse() {
                Ok(port) => conn.port = port,
                Err(_) => tracing::warn!(value, "ignoring malformed client port"),
            },
            "password" => conn.password = value.to_string(),
            _ => {}
        }
    });
    conn
}

pub fn update_client_values(
    content: &str,
    address: &str,
    port: u16,
    password: &str,
) -> CoreResult<String> {
    rewrite_values(content, |section, key| {
        if section != SECTION {
            return None;
        }
        match key {
            "destinationAddress" => Some(address.to_string()),
            "port" => Some(port.to_string()),
            "password" => Some(password.to_string()),
            _ => None,
        }
    })
}

pub fn read_client_config(paths: &AppPaths) -> CoreResult<ClientConnection> {
    let path = paths.client_config();
    if !path.exists() {
        return Err(CoreError::not_found("TES3MP client config file", path));
    }
    let content = fs::read_to_string(&path).io_context("read TES3MP client config", &path)?;
    Ok(parse_client_config(&content))
}

pub fn write_client_config(paths: &AppPaths, conn: &ClientConnection) -> CoreResult<()> {
    let path = paths.client_config();
    if !path.exists() {
        return Err(CoreError::not_found("TES3MP client config file", path));
    }
    let content = fs::read_to_string(&path).io_context("read TES3MP client config", &path)?;
    let updated = update_client_values(
        &content,
        &conn.destination_address,
        conn.port,
        &conn.password,
    )?;
    fs::write(&path, updated).io_context("write TES3MP client config", &path)?;
    tracing::info!(
        address = %conn.destination_address,
        port = conn.port,
        password = if conn.password.is_empty() { "empty" } else { "set" },
        "updated TES3MP client config"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[General]
# custom comment kept by hand
destinationAddress = localhost
port = 25565
myCustomKey = keep me
password =

[Chat]
password = do-not-touch
";

    #[test]
    fn update_changes_only_the_three_general_lines() {
        let out = update_client_values(SAMPLE, "203.0.113.7", 25566, "hunter2").unwrap();
        let before: Vec<&str> = SAMPLE.lines().collect();
        let after: Vec<&str> = out.lines().collect();
        assert_eq!(before.len(), after.len());

        for (i, (old, new)) in before.iter().zip(&after).enumerate() {
            match i {
                2 => assert_eq!(*new, "destinationAddress = 203.0.113.7"),
                3 => assert_eq!(*new, "port = 25566"),
                5 => assert_eq!(*new, "password = hunter2"),
                _ => assert_eq!(old, new, "line {i} changed"),
            }
        }
        assert!(out.ends_with("password = do-not-touch\n"));
    }

    #[test]
    fn update_without_general_section_fails() {
        let content = "[Chat]\ndestinationAddress = x\nport = 1\n";
        let err = update_client_values(content, "a", 1, "").unwrap_err();
        assert!(matches!(err, CoreError::NoKeysUpdated));
    }

    #[test]
    fn update_with_general_but_no_target_keys_fails() {
        let content = "[General]\n# nothing here\nfoo = bar\n";
        assert!(update_client_values(content, "a", 1, "").is_err());
    }

    #[test]
    fn multi_line_address_cannot_inject_sections() {
        let err = update_client_values(SAMPLE, "localhost\n[Evil]\nfoo = bar", 25565, "pw")
            .unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref key, .. } if key == "destinationAddress"));

        let err = update_client_values(SAMPLE, "localhost", 25565, "pw\nport = 1").unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref key, .. } if key == "password"));
    }

    #[test]
    fn parse_reads_back_updated_values() {
        let out = update_client_values(SAMPLE, "example.org", 30000, "").unwrap();
        let conn = parse_client_config(&out);
        assert_eq!(
            conn,
            ClientConnection {
                destination_address: "example.org".to_string(),
                port: 30000,
                password: String::new(),
            }
        );
    }

    #[test]
    fn write_reports_missing_file_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(tmp.path());
        let err = write_client_config(&paths, &ClientConnection::default()).unwrap_err();
        assert!(err.to_string().contains("tes3mp-client-default.cfg"));
    }

    #[test]
    fn write_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(tmp.path());
        fs::create_dir_all(paths.install_dir()).unwrap();
        fs::write(paths.client_config(), SAMPLE).unwrap();

        let conn = ClientConnection {
            destination_address: "10.0.0.2".to_string(),
            port: 4000,
            password: "pw".to_string(),
        };
        write_client_config(&paths, &conn).unwrap();
        assert_eq!(read_client_config(&paths).unwrap(), conn);
    }
}
