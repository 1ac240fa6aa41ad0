//! Built-in voice commands, in match priority order.

use crate::config::DispatchConfig;

use super::{Action, CommandRule, CommandTable};

/// Ping target. Whitespace is allowed because the recognizer splits
/// hostnames into words; the action strips it again.
pub const PING_PATTERN: &str = r"ping (?P<hostname>[\w\s]+)";

/// Build the built-in command table.
pub fn builtin_table(config: &DispatchConfig) -> anyhow::Result<CommandTable> {
    let ping_phrases = config
        .ping_hosts
        .iter()
        .map(|host| format!("ping {}", host))
        .collect();

    CommandTable::new(vec![
        CommandRule::new("power off", Action::PowerOff, None)?,
        CommandRule::new("reboot", Action::Reboot, None)?,
        CommandRule::new("ip address", Action::SayIp, None)?,
        CommandRule::new("update", Action::Update, None)?,
        CommandRule::new("swear", Action::Retort, None)?,
        CommandRule::new(PING_PATTERN, Action::Ping, Some(ping_phrases))?,
    ])
}
