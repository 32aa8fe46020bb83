#![cfg(unix)]

use nerevar_core::process::{ExitPayload, ProcessEvent, ProcessSupervisor, Tool};
use nerevar_core::{ConfigStore, CoreError};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn fake_tool(dir: &Path, tool: Tool, exit_code: i32) {
    let path = dir.join(tool.executable());
    fs::write(&path, format!("#!/bin/sh\nsleep 0.2\nexit {exit_code}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

async fn next(rx: &mut UnboundedReceiver<ProcessEvent>) -> ProcessEvent {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("event within timeout")
        .expect("channel open")
}

#[tokio::test]
async fn started_precedes_exited_with_status() {
    let dir = tempfile::tempdir().unwrap();
    fake_tool(dir.path(), Tool::Wizard, 0);
    fake_tool(dir.path(), Tool::Server, 3);
    let (supervisor, mut rx) = ProcessSupervisor::new();

    let handle = supervisor.launch(dir.path(), Tool::Wizard).unwrap();
    assert_eq!(handle.tool, Tool::Wizard);
    assert_eq!(
        next(&mut rx).await,
        ProcessEvent::Started { tool: Tool::Wizard, pid: handle.pid }
    );
    let exited = next(&mut rx).await;
    assert_eq!(exited.channel(), "openmw-wizard-exited");
    assert_eq!(
        exited,
        ProcessEvent::Exited {
            tool: Tool::Wizard,
            payload: ExitPayload {
                pid: handle.pid,
                success: true,
                exit_code: Some(0),
                message: "OpenMW wizard completed successfully".to_string(),
            },
        }
    );

    let handle = supervisor.launch(dir.path(), Tool::Server).unwrap();
    assert_eq!(next(&mut rx).await.channel(), "tes3mp-server-started");
    match next(&mut rx).await {
        ProcessEvent::Exited { tool, payload } => {
            assert_eq!(tool, Tool::Server);
            assert_eq!(payload.pid, handle.pid);
            assert!(!payload.success);
            assert_eq!(payload.exit_code, Some(3));
            assert_eq!(payload.message, "TES3MP server exited with an error");
        }
        other => panic!("expected exit, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_launches_each_report_once() {
    let dir = tempfile::tempdir().unwrap();
    for tool in [Tool::Client, Tool::Browser, Tool::Launcher] {
        fake_tool(dir.path(), tool, 0);
    }
    let (supervisor, mut rx) = ProcessSupervisor::new();
    let mut pids = Vec::new();
    for tool in [Tool::Client, Tool::Browser, Tool::Launcher] {
        pids.push(supervisor.launch(dir.path(), tool).unwrap().pid);
    }

    let mut seen = Vec::new();
    for _ in 0..6 {
        seen.push(next(&mut rx).await);
    }
    for pid in pids {
        let started = seen
            .iter()
            .position(|e| matches!(e, ProcessEvent::Started { pid: p, .. } if *p == pid))
            .expect("started event");
        let exited: Vec<usize> = seen
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                matches!(e, ProcessEvent::Exited { payload, .. } if payload.pid == pid)
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(exited.len(), 1);
        assert!(started < exited[0]);
    }
}

#[tokio::test]
async fn launch_installed_requires_a_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    let (supervisor, _rx) = ProcessSupervisor::new();

    let err = supervisor.launch_installed(&store, Tool::Client).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    let install = dir.path().join("TES3MP");
    fs::create_dir_all(&install).unwrap();
    store.upsert_install(&install, "0.8.1", chrono::Utc::now()).unwrap();
    let err = supervisor.launch_installed(&store, Tool::Client).unwrap_err();
    assert!(err.to_string().contains("tes3mp.exe"), "{err}");
}
