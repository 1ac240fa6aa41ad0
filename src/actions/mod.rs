//! Local actions behind the voice commands.
//!
//! Each action speaks through a `Speaker` and touches the OS only through a
//! `Shell`, so every command has a timeout and an explicit result.

use std::net::Ipv4Addr;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::commands::{Action, Intent};
use crate::config::DispatchConfig;
use crate::shell::{quote, Shell};
use crate::tts::Speaker;

const FAREWELL: &str = "Good bye!";
const SEE_YOU: &str = "See you in a bit!";

/// Executes the action of a matched intent.
#[allow(async_fn_in_trait)]
pub trait ActionHandler {
    async fn handle(&self, intent: &Intent) -> anyhow::Result<()>;
}

/// Runs the built-in actions against the host.
pub struct ActionRunner<S, T> {
    config: DispatchConfig,
    shell: S,
    speaker: T,
}

impl<S: Shell, T: Speaker> ActionRunner<S, T> {
    pub fn new(config: DispatchConfig, shell: S, speaker: T) -> Self {
        Self {
            config,
            shell,
            speaker,
        }
    }

    async fn power_off(&self) -> anyhow::Result<()> {
        self.say_best_effort(FAREWELL).await;
        self.run_unchecked(&self.config.shutdown_command, self.config.command_timeout())
            .await;
        Ok(())
    }

    async fn reboot(&self) -> anyhow::Result<()> {
        self.say_best_effort(SEE_YOU).await;
        self.run_unchecked(&self.config.reboot_command, self.config.command_timeout())
            .await;
        Ok(())
    }

    async fn say_ip(&self) -> anyhow::Result<()> {
        let result = self
            .shell
            .run(&self.config.ip_command, self.config.command_timeout())
            .await?;
        if !result.success() {
            anyhow::bail!(
                "IP query failed (exit {}, timed out: {}): {}",
                result.exit_code,
                result.timed_out,
                result.stderr.trim()
            );
        }
        let ip = first_ipv4(&result.stdout)
            .ok_or_else(|| anyhow::anyhow!("No IPv4 address in {:?}", result.stdout.trim()))?;
        self.speaker.say(&format!("My IP address is {}", ip)).await
    }

    async fn update(&self) -> anyhow::Result<()> {
        let command = format!(
            "cd {} && git pull --rebase && {}",
            quote(&self.config.update_dir),
            self.config.reboot_command
        );
        self.run_unchecked(&command, self.config.update_timeout()).await;
        Ok(())
    }

    async fn retort(&self) -> anyhow::Result<()> {
        let pick = pick_retort(&self.config.retorts, &mut rand::thread_rng()).map(str::to_string);
        match pick {
            Some(line) => self.speaker.say(&line).await,
            None => {
                info!("No retorts configured");
                Ok(())
            }
        }
    }

    async fn ping(&self, intent: &Intent) -> anyhow::Result<()> {
        let host = intent
            .capture("hostname")
            .map(normalize_hostname)
            .unwrap_or_default();
        if host.is_empty() {
            return Ok(());
        }

        let spoken = format!("ping {}", host);
        info!(command = %spoken, "Pinging");
        self.speaker.say(&spoken).await?;

        let command = format!("ping -c {} {}", self.config.ping_count(), quote(&host));
        let result = self.shell.run(&command, self.config.ping_timeout()).await?;
        if result.timed_out {
            return self
                .speaker
                .say(&format!("No answer from {} in time", host))
                .await;
        }

        let output = if result.stdout.trim().is_empty() {
            result.stderr.trim()
        } else {
            result.stdout.trim()
        };
        info!(output, "Ping finished");
        self.speaker.say(output).await
    }

    async fn say_best_effort(&self, text: &str) {
        if let Err(e) = self.speaker.say(text).await {
            warn!("Failed to speak {:?}: {}", text, e);
        }
    }

    /// Run a command whose outcome does not change what happens next.
    async fn run_unchecked(&self, command: &str, timeout: Duration) {
        match self.shell.run(command, timeout).await {
            Ok(result) if result.success() => {}
            Ok(result) => warn!(
                command,
                exit_code = result.exit_code,
                timed_out = result.timed_out,
                stderr = %result.stderr.trim(),
                "Command failed"
            ),
            Err(e) => warn!(command, "Command could not run: {}", e),
        }
    }
}

impl<S: Shell, T: Speaker> ActionHandler for ActionRunner<S, T> {
    async fn handle(&self, intent: &Intent) -> anyhow::Result<()> {
        info!(action = %intent.action, "Running action");
        match intent.action {
            Action::PowerOff => self.power_off().await,
            Action::Reboot => self.reboot().await,
            Action::SayIp => self.say_ip().await,
            Action::Update => self.update().await,
            Action::Retort => self.retort().await,
            Action::Ping => self.ping(intent).await,
        }
    }
}

/// Remove the spaces the recognizer inserts inside hostnames.
pub fn normalize_hostname(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// First whitespace-separated token that is an IPv4 address.
pub fn first_ipv4(output: &str) -> Option<Ipv4Addr> {
    output.split_whitespace().find_map(|token| token.parse().ok())
}

/// Uniformly random entry of `retorts`, or `None` when there are none.
pub fn pick_retort<'a, R: Rng + ?Sized>(retorts: &'a [String], rng: &mut R) -> Option<&'a str> {
    retorts.choose(rng).map(String::as_str)
}
