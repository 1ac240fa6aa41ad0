//! Speech output adapters.
//!
//! Rendering speech is the engine's job; this module only decides where a
//! sentence goes:
//! - `engine`: a `say` command back to the engine host
//! - `command`: a local TTS program (e.g. `espeak-ng`) with the text as argument

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::ipc::bridge::emit_command;
use crate::ipc::EngineCommand;

/// Longest a local TTS program may take for one sentence.
const SPEAK_TIMEOUT: Duration = Duration::from_secs(60);

/// Common trait for speech outputs.
#[allow(async_fn_in_trait)]
pub trait Speaker {
    /// Speak `text`, returning once the request has been handled.
    async fn say(&self, text: &str) -> anyhow::Result<()>;
}

/// Sends `say` commands to the engine host over stdout.
pub struct EngineSpeaker;

impl Speaker for EngineSpeaker {
    async fn say(&self, text: &str) -> anyhow::Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        info!(text, "Speaking");
        emit_command(&EngineCommand::Say {
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Runs a local TTS program once per sentence.
pub struct CommandSpeaker {
    program: String,
}

impl CommandSpeaker {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Speaker for CommandSpeaker {
    async fn say(&self, text: &str) -> anyhow::Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        info!(text, program = %self.program, "Speaking");

        let child = Command::new(&self.program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to spawn '{}': {}", self.program, e))?;

        match tokio::time::timeout(SPEAK_TIMEOUT, child.wait_with_output()).await {
            Ok(output) => {
                let status = output?.status;
                if !status.success() {
                    anyhow::bail!("{} exited with {}", self.program, status);
                }
                Ok(())
            }
            Err(_) => {
                warn!(program = %self.program, "Speech timed out");
                anyhow::bail!("{} timed out", self.program)
            }
        }
    }
}

/// Enum-dispatch wrapper over all speech outputs.
pub enum SpeakerAdapter {
    Engine(EngineSpeaker),
    Command(CommandSpeaker),
}

impl Speaker for SpeakerAdapter {
    async fn say(&self, text: &str) -> anyhow::Result<()> {
        match self {
            Self::Engine(s) => s.say(text).await,
            Self::Command(s) => s.say(text).await,
        }
    }
}

/// Create a speech output from config values.
///
/// `adapter` is one of: "engine", "command".
pub fn create_speaker(adapter: &str, program: Option<&str>) -> anyhow::Result<SpeakerAdapter> {
    match adapter {
        "engine" => Ok(SpeakerAdapter::Engine(EngineSpeaker)),
        "command" => {
            let program = program
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("Command speech requires tts_command"))?;
            Ok(SpeakerAdapter::Command(CommandSpeaker::new(program)))
        }
        other => anyhow::bail!("Unknown TTS adapter: {}", other),
    }
}
