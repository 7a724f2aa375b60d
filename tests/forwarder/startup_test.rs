use pihole_influx_forwarder::config::{Config, ConfigError};
use serial_test::serial;
use std::process::Command;
use std::time::Duration;

use crate::common::closed_url;

// =============================================================================
// INTEGRATION TESTS - STARTUP VALIDATION
// =============================================================================

const REQUIRED: [&str; 3] = ["SINK_TOKEN", "SINK_ORG", "UPSTREAM_URL"];

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pihole-influx-forwarder"));
    // Run away from the workspace so no developer `.env` is picked up
    cmd.env_clear()
        .env("RUST_LOG", "pihole_influx_forwarder=debug")
        .current_dir(std::env::temp_dir());
    cmd
}

#[serial]
#[test]
fn test_from_env_reads_process_environment() {
    std::env::set_var("SINK_TOKEN", "secret");
    std::env::set_var("SINK_ORG", "home");
    std::env::set_var("UPSTREAM_URL", "http://pi.hole/admin/api.php?summaryRaw");
    std::env::set_var("SCRAPE_INTERVAL", "5000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.sink_token, "secret");
    assert_eq!(config.scrape_interval, Duration::from_secs(5));

    std::env::set_var("SINK_TOKEN", "");
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Missing(ref m) if m.len() == 1 && m[0].name == "SINK_TOKEN"));

    for key in REQUIRED.iter().chain(["SCRAPE_INTERVAL"].iter()) {
        std::env::remove_var(key);
    }
}

#[test]
fn test_missing_variables_exit_with_status_1() {
    let output = binary().output().expect("Failed to run binary");

    assert_eq!(output.status.code(), Some(1));

    let logs = String::from_utf8_lossy(&output.stdout);
    for key in REQUIRED {
        assert!(logs.contains(key), "expected a log line for {key}:\n{logs}");
    }
    assert!(!logs.contains("started"));
}

#[test]
fn test_each_required_variable_is_fatal() {
    for missing in REQUIRED {
        let mut cmd = binary();
        for key in REQUIRED.iter().filter(|k| **k != missing) {
            cmd.env(key, "value");
        }

        let output = cmd.output().expect("Failed to run binary");
        assert_eq!(output.status.code(), Some(1), "{missing} unset should be fatal");
    }
}

#[cfg(unix)]
#[test]
fn test_sigterm_exits_cleanly() {
    let mut child = binary()
        .env("SINK_TOKEN", "secret")
        .env("SINK_ORG", "home")
        .env("UPSTREAM_URL", closed_url())
        .env("SCRAPE_INTERVAL", "3600000")
        .spawn()
        .expect("Failed to spawn binary");

    std::thread::sleep(Duration::from_secs(1));

    let killed = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .expect("Failed to run kill");
    assert!(killed.success());

    let status = child.wait().expect("Failed to wait for binary");
    assert_eq!(status.code(), Some(0));
}
