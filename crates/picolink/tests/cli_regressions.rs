#![cfg(all(unix, feature = "cli"))]

use std::process::Command;

fn picolink() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_picolink"));
    cmd.env_remove("PICOLINK_PORT")
        .arg("--log-level")
        .arg("error");
    cmd
}

#[test]
fn version_prints_crate_version() {
    let output = picolink()
        .arg("version")
        .output()
        .expect("version command should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("picolink {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_reports_protocol_defaults() {
    let output = picolink()
        .args(["version", "--extended"])
        .output()
        .expect("version command should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("firmware_version: 0x010a0006"));
    assert!(stdout.contains("chunk_limits: tx=600 rx=900"));
}

#[test]
fn missing_port_is_transport_error() {
    let output = picolink()
        .args(["--port", "/nonexistent/ttyACM0", "read", "0x10"])
        .output()
        .expect("read command should run");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("open failed"));
}

#[test]
fn bad_hex_payload_fails_before_opening() {
    let output = picolink()
        .args(["--port", "/nonexistent/ttyACM0", "load", "0", "--hex", "0g"])
        .output()
        .expect("load command should run");

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--hex"));
    assert!(!stderr.contains("open failed"));
}
