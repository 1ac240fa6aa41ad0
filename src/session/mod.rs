//! Assistant session: event handling and the control surface back to the
//! engine.

pub mod status;

pub use status::Status;

use std::io::IsTerminal;

use tracing::{debug, error, info, warn};

use crate::actions::ActionHandler;
use crate::commands::dispatch::Dispatcher;
use crate::commands::IntentMatcher;
use crate::ipc::bridge::{emit_command, emit_error};
use crate::ipc::{EngineCommand, EngineEvent};

/// Handle to the active conversation session.
pub trait Session {
    /// End the current turn and suppress the engine's default response.
    fn stop_conversation(&self);

    /// Bias the recognizer towards `phrases`.
    fn register_vocabulary(&self, phrases: &[String]);

    fn set_status(&self, status: Status);

    fn report_error(&self, message: &str);
}

/// Session backed by JSON-line commands on stdout.
pub struct IpcSession;

impl Session for IpcSession {
    fn stop_conversation(&self) {
        emit_command(&EngineCommand::StopConversation {});
    }

    fn register_vocabulary(&self, phrases: &[String]) {
        emit_command(&EngineCommand::RegisterVocabulary {
            phrases: phrases.to_vec(),
        });
    }

    fn set_status(&self, status: Status) {
        emit_command(&EngineCommand::Status { status });
    }

    fn report_error(&self, message: &str) {
        emit_error(message);
    }
}

/// Whether the main loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

/// True when stdout is a terminal rather than the engine host's pipe.
pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal()
}

/// Consumes engine events one at a time.
pub struct EventHandler<M, H> {
    dispatcher: Dispatcher<M, H>,
    /// Print the "say OK Google" hint once the engine is ready.
    interactive: bool,
}

impl<M: IntentMatcher, H: ActionHandler> EventHandler<M, H> {
    pub fn new(dispatcher: Dispatcher<M, H>, interactive: bool) -> Self {
        Self {
            dispatcher,
            interactive,
        }
    }

    /// Register the recognizer vocabulary. Called once, before the first event.
    pub fn start<S: Session>(&self, session: &S) {
        session.set_status(Status::Starting);
        let phrases = self.dispatcher.vocabulary();
        info!(count = phrases.len(), "Registering vocabulary");
        session.register_vocabulary(&phrases);
    }

    pub async fn handle_event<S: Session>(&self, event: EngineEvent, session: &S) -> Flow {
        debug!(event = event.kind(), "Engine event");
        match event {
            EngineEvent::StartFinished {} => {
                session.set_status(Status::Ready);
                if self.interactive {
                    eprintln!("Say \"OK, Google\" then speak, or press Ctrl+C to quit...");
                }
            }

            EngineEvent::ConversationTurnStarted {} => {
                session.set_status(Status::Listening);
            }

            EngineEvent::RecognizingSpeechFinished { text, metadata } => {
                debug!(?metadata, "Recognition payload");
                let text = text.to_lowercase();
                info!(text = %text, "Recognized");
                self.dispatcher.dispatch(&text, session).await;
            }

            EngineEvent::EndOfUtterance {} => {
                session.set_status(Status::Thinking);
            }

            EngineEvent::ConversationTurnFinished { with_follow_on_turn } => {
                debug!(with_follow_on_turn, "Turn finished");
                session.set_status(Status::Ready);
            }

            EngineEvent::AssistantError { is_fatal } => {
                if is_fatal {
                    error!("Fatal assistant error");
                    return Flow::Exit(1);
                }
                warn!("Assistant reported a non-fatal error");
            }
        }

        Flow::Continue
    }
}
