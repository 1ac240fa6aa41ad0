//! IPC bridge: stdin event reader and stdout command emitter.
//!
//! A blocking reader thread deserializes engine events and sends them
//! through an mpsc channel, plus a helper to emit JSON-line commands to
//! stdout.

use std::io::{self, BufRead, Write};

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{EngineCommand, EngineEvent};

/// Emit an `EngineCommand` as a JSON line on stdout and flush.
pub fn emit_command(command: &EngineCommand) {
    let json = match serde_json::to_string(command) {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to serialize command: {}", e);
            return;
        }
    };
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Ignore write/flush errors; the pipe may be closed.
    let _ = writeln!(handle, "{}", json);
    let _ = handle.flush();
}

/// Convenience helper for reporting errors to the host.
pub fn emit_error(message: &str) {
    emit_command(&EngineCommand::Error {
        message: message.to_string(),
    });
}

/// Normalize incoming JSON so serde can deserialize it with the `event` tag:
///
/// - a `"type"` field stands in for a missing `"event"` field;
/// - library-style names such as `ON_END_OF_UTTERANCE` become
///   `end_of_utterance`.
fn normalize_event_json(input: &str) -> String {
    let Ok(mut obj) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(input)
    else {
        return input.to_string();
    };

    if !obj.contains_key("event") {
        if let Some(type_val) = obj.remove("type") {
            obj.insert("event".to_string(), type_val);
        }
    }

    if let Some(serde_json::Value::String(name)) = obj.get_mut("event") {
        let lower = name.to_ascii_lowercase();
        *name = lower.strip_prefix("on_").unwrap_or(&lower).to_string();
    }

    serde_json::to_string(&obj).unwrap_or_else(|_| input.to_string())
}

/// Parse one line of engine output. Blank lines yield `Ok(None)`.
pub fn parse_event_line(line: &str) -> anyhow::Result<Option<EngineEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let normalized = normalize_event_json(trimmed);
    let event = serde_json::from_str::<EngineEvent>(&normalized)
        .map_err(|e| anyhow::anyhow!("Invalid engine event: {}", e))?;
    Ok(Some(event))
}

/// Spawn a blocking thread that reads JSON lines from `reader`, deserializes
/// them into `EngineEvent`, and forwards them through the returned channel.
///
/// Malformed lines are rejected: logged, reported to the host as an `error`
/// command, and not forwarded. The thread exits when the input is closed.
pub fn spawn_event_reader<R>(reader: R) -> mpsc::UnboundedReceiver<EngineEvent>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(text) => match parse_event_line(&text) {
                    Ok(Some(event)) => {
                        debug!(?event, "Received event from engine");
                        if tx.send(event).is_err() {
                            break; // receiver dropped, main task is gone
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!("{} (input: {})", e, text.trim());
                        emit_error(&e.to_string());
                    }
                },
                Err(e) => {
                    error!("stdin read error: {}", e);
                    break;
                }
            }
        }
        debug!("event reader thread exiting");
    });

    rx
}

/// Read engine events from this process's stdin.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<EngineEvent> {
    // `StdinLock` is not `Send`; the reader thread owns a buffered `Stdin`.
    spawn_event_reader(io::BufReader::new(io::stdin()))
}
