//! Configuration reading and data directory paths.

pub mod paths;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use paths::get_data_dir;

/// Headroom over one second per echo request for `ping -c`.
const PING_SLACK_SECS: u64 = 5;

/// dispatch_config.json shape.
///
/// Every field is optional in the file; anything missing takes the default
/// below. The loaded value is immutable and handed to the command table and
/// the action runner at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Hosts the recognizer should expect after "ping".
    pub ping_hosts: Vec<String>,
    /// Echo requests sent per ping (`ping -c`).
    pub ping_count: u32,
    /// Raised to `ping_count + 5` when set lower.
    pub ping_timeout_secs: u64,
    /// Upper bound for every other shell command.
    pub command_timeout_secs: u64,
    pub shutdown_command: String,
    pub reboot_command: String,
    /// Prints the host's addresses separated by whitespace.
    pub ip_command: String,
    /// Checkout pulled by the "update" command.
    pub update_dir: String,
    pub update_timeout_secs: u64,
    pub retorts: Vec<String>,
    /// "engine" (host renders speech) or "command" (local TTS program).
    pub tts_adapter: String,
    /// Program used by the "command" adapter, e.g. `espeak-ng`.
    pub tts_command: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            ping_hosts: Vec::new(),
            ping_count: 4,
            ping_timeout_secs: 15,
            command_timeout_secs: 10,
            shutdown_command: "sudo shutdown now".to_string(),
            reboot_command: "sudo reboot".to_string(),
            ip_command: "hostname -I".to_string(),
            update_dir: "/home/pi/AIY-voice-kit-python/src".to_string(),
            update_timeout_secs: 120,
            retorts: default_retorts(),
            tts_adapter: "engine".to_string(),
            tts_command: None,
        }
    }
}

fn default_retorts() -> Vec<String> {
    [
        "Oh, bother.",
        "Fiddlesticks!",
        "Blast and botheration.",
        "Well, that's just rubbish.",
        "Crikey!",
        "Son of a biscuit.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl DispatchConfig {
    pub fn ping_count(&self) -> u32 {
        self.ping_count.max(1)
    }

    /// `ping -c N` needs about N seconds against a responsive host.
    pub fn ping_timeout(&self) -> Duration {
        let floor = u64::from(self.ping_count()) + PING_SLACK_SECS;
        Duration::from_secs(self.ping_timeout_secs.max(floor))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_secs.max(1))
    }
}

/// Read dispatch_config.json from the data directory.
///
/// A missing or unparsable file yields the defaults.
pub fn read_dispatch_config() -> DispatchConfig {
    let path = get_config_path();
    read_json_file(&path).unwrap_or_default()
}

/// Parse a config document. Unknown keys are ignored.
pub fn parse_config(contents: &str) -> anyhow::Result<DispatchConfig> {
    Ok(serde_json::from_str(contents)?)
}

/// Path to dispatch_config.json.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("dispatch_config.json")
}

fn read_json_file(path: &Path) -> Option<DispatchConfig> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_config(&contents) {
            Ok(val) => Some(val),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read {}: {}", path.display(), e);
            }
            None
        }
    }
}
