//! Cosmetic session status shown by the host (LED, tray icon, ...).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Process is up but the engine has not finished starting.
    Starting,
    /// Waiting for the hot word.
    Ready,
    /// A conversation turn is open and the user is speaking.
    Listening,
    /// The utterance ended; waiting for recognition and the response.
    Thinking,
    Stopping,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Ready => write!(f, "ready"),
            Self::Listening => write!(f, "listening"),
            Self::Thinking => write!(f, "thinking"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}
