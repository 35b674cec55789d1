//! Speed Test CLI Runner
//!
//! Runs the Ookla `speedtest` binary with JSON output and converts its
//! bandwidth figures (bytes per second) to megabits per second.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::SpeedTestSettings;
use crate::domain::{SpeedTestError, SpeedTestResult, SpeedTestRunner};

/// Subset of `speedtest --format=json` output that is used.
#[derive(Debug, Deserialize)]
struct CliOutput {
    download: CliBandwidth,
    upload: CliBandwidth,
    ping: CliPing,
}

#[derive(Debug, Deserialize)]
struct CliBandwidth {
    /// Bytes per second
    bandwidth: f64,
}

#[derive(Debug, Deserialize)]
struct CliPing {
    /// Milliseconds
    latency: f64,
}

/// Bytes per second to megabits per second.
fn to_mbps(bytes_per_second: f64) -> f64 {
    bytes_per_second * 8.0 / 1_000_000.0
}

/// Parse the JSON document printed by the CLI.
pub fn parse_cli_output(stdout: &str) -> Result<SpeedTestResult, SpeedTestError> {
    let output: CliOutput =
        serde_json::from_str(stdout).map_err(|e| SpeedTestError::InvalidOutput(e.to_string()))?;

    Ok(SpeedTestResult {
        download_mbps: to_mbps(output.download.bandwidth),
        upload_mbps: to_mbps(output.upload.bandwidth),
        ping_ms: output.ping.latency,
    })
}

/// [`SpeedTestRunner`] backed by the Ookla command line client.
#[derive(Debug, Clone)]
pub struct CliSpeedTestRunner {
    enabled: bool,
    executable: String,
    accept_license: bool,
    timeout: Duration,
}

impl CliSpeedTestRunner {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self {
            enabled: true,
            executable: executable.into(),
            accept_license: false,
            timeout,
        }
    }

    pub fn from_settings(settings: &SpeedTestSettings) -> Self {
        Self {
            enabled: settings.enabled,
            executable: settings.executable.clone(),
            accept_license: settings.accept_license,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command.arg("--format=json").kill_on_drop(true);
        if self.accept_license {
            command.arg("--accept-license").arg("--accept-gdpr");
        }
        command
    }
}

#[async_trait]
impl SpeedTestRunner for CliSpeedTestRunner {
    async fn run(&self) -> Result<SpeedTestResult, SpeedTestError> {
        if !self.enabled {
            return Err(SpeedTestError::Disabled);
        }

        tracing::info!(executable = %self.executable, "Running speed test");

        let output = tokio::time::timeout(self.timeout, self.command().output())
            .await
            .map_err(|_| SpeedTestError::TimedOut(self.timeout.as_secs()))?
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SpeedTestError::NotInstalled(self.executable.clone()),
                _ => SpeedTestError::Io(e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SpeedTestError::NoOutput(stderr));
        }

        let result = parse_cli_output(&stdout)?;
        tracing::info!(
            download_mbps = result.download_mbps,
            upload_mbps = result.upload_mbps,
            ping_ms = result.ping_ms,
            "Speed test completed"
        );
        Ok(result)
    }
}
