//! IPC protocol types for communication with the assistant engine host.
//!
//! Events use `{"event": "<name>", ...}` format (engine -> dispatcher, stdin).
//! Commands use `{"command": "<name>", ...}` format (dispatcher -> engine, stdout).

pub mod bridge;

use serde::{Deserialize, Serialize};

use crate::session::Status;

// ---------------------------------------------------------------------------
// Events: engine -> dispatcher (stdin)
// ---------------------------------------------------------------------------

/// Lifecycle events delivered by the assistant engine, one per JSON line.
///
/// Deserialized from `{"event": "<variant>", ...}`. An unknown event name is
/// a deserialization error, not a silently ignored line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    /// The engine finished starting and is waiting for the hot word.
    StartFinished {},
    ConversationTurnStarted {},
    /// Final transcript of the user's utterance.
    RecognizingSpeechFinished {
        text: String,
        /// Any other fields the engine attaches (confidence, language, ...).
        #[serde(flatten)]
        metadata: serde_json::Map<String, serde_json::Value>,
    },
    EndOfUtterance {},
    ConversationTurnFinished {
        #[serde(default)]
        with_follow_on_turn: bool,
    },
    AssistantError {
        #[serde(default)]
        is_fatal: bool,
    },
}

impl EngineEvent {
    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartFinished {} => "start_finished",
            Self::ConversationTurnStarted {} => "conversation_turn_started",
            Self::RecognizingSpeechFinished { .. } => "recognizing_speech_finished",
            Self::EndOfUtterance {} => "end_of_utterance",
            Self::ConversationTurnFinished { .. } => "conversation_turn_finished",
            Self::AssistantError { .. } => "assistant_error",
        }
    }
}

// ---------------------------------------------------------------------------
// Commands: dispatcher -> engine (stdout)
// ---------------------------------------------------------------------------

/// Commands emitted to the engine host via stdout as JSON lines.
///
/// Serialized as `{"command": "<variant>", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
#[serde(rename_all = "snake_case")]
pub enum EngineCommand {
    /// End the current turn early and suppress the engine's own response.
    StopConversation {},
    /// Phrases that bias the recognizer towards the local commands.
    RegisterVocabulary { phrases: Vec<String> },
    Status { status: Status },
    /// Ask the engine to synthesize and play `text`.
    Say { text: String },
    Error { message: String },
}
