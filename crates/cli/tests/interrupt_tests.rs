//! Ctrl-C against the real binary.

#![cfg(unix)]

use std::io::Read;
use std::process::{Command, Stdio};

fn read_until(stdout: &mut impl Read, marker: &str) -> String {
    let mut seen = Vec::new();
    let mut buffer = [0_u8; 256];
    while !String::from_utf8_lossy(&seen).contains(marker) {
        let read = stdout.read(&mut buffer).unwrap();
        assert!(read > 0, "gvm exited before printing `{marker}`");
        seen.extend_from_slice(&buffer[..read]);
    }
    String::from_utf8_lossy(&seen).to_string()
}

#[test]
fn test_interrupt_at_main_menu_says_goodbye_and_exits_cleanly() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");

    let mut child = Command::new(env!("CARGO_BIN_EXE_gvm"))
        .args(["--no-color", "--gcloud", "false", "--config"])
        .arg(&config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let mut stdout = child.stdout.take().unwrap();

    let before = read_until(&mut stdout, "Enter your choice (0-3): ");
    assert!(!before.contains("Goodbye!"));

    let pid = libc::pid_t::try_from(child.id()).unwrap();
    // SAFETY: plain kill(2) on a child we spawned and have not reaped.
    assert_eq!(unsafe { libc::kill(pid, libc::SIGINT) }, 0);

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    let status = child.wait().unwrap();

    assert!(rest.contains("Goodbye!"));
    assert_eq!(status.code(), Some(0));
}
