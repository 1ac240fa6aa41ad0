//! Test doubles for the session, shell, speech and action seams.

use std::sync::Mutex;
use std::time::Duration;

use crate::commands::{Action, Intent};
use crate::actions::ActionHandler;
use crate::session::{Session, Status};
use crate::shell::{ExecResult, Shell};
use crate::tts::Speaker;

pub fn ok(stdout: &str) -> ExecResult {
    ExecResult {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: 0,
        timed_out: false,
    }
}

pub fn failed(exit_code: i32, stderr: &str) -> ExecResult {
    ExecResult {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code,
        timed_out: false,
    }
}

/// Records every command and answers from a script keyed by command prefix.
#[derive(Default)]
pub struct FakeShell {
    script: Vec<(String, ExecResult)>,
    pub calls: Mutex<Vec<(String, Duration)>>,
}

impl FakeShell {
    pub fn respond(mut self, prefix: &str, result: ExecResult) -> Self {
        self.script.push((prefix.to_string(), result));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }
}

impl Shell for FakeShell {
    async fn run(&self, command: &str, timeout: Duration) -> anyhow::Result<ExecResult> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), timeout));
        Ok(self
            .script
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| ok("")))
    }
}

#[derive(Default)]
pub struct RecordingSpeaker {
    pub spoken: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl Speaker for RecordingSpeaker {
    async fn say(&self, text: &str) -> anyhow::Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSession {
    pub stops: Mutex<usize>,
    pub vocabulary: Mutex<Vec<Vec<String>>>,
    pub statuses: Mutex<Vec<Status>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingSession {
    pub fn stop_count(&self) -> usize {
        *self.stops.lock().unwrap()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.statuses.lock().unwrap().clone()
    }
}

impl Session for RecordingSession {
    fn stop_conversation(&self) {
        *self.stops.lock().unwrap() += 1;
    }

    fn register_vocabulary(&self, phrases: &[String]) {
        self.vocabulary.lock().unwrap().push(phrases.to_vec());
    }

    fn set_status(&self, status: Status) {
        self.statuses.lock().unwrap().push(status);
    }

    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Records which actions were dispatched; optionally fails them.
#[derive(Default)]
pub struct RecordingHandler {
    pub handled: Mutex<Vec<Intent>>,
    pub fail: bool,
}

impl RecordingHandler {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn actions(&self) -> Vec<Action> {
        self.handled.lock().unwrap().iter().map(|i| i.action).collect()
    }
}

impl ActionHandler for RecordingHandler {
    async fn handle(&self, intent: &Intent) -> anyhow::Result<()> {
        self.handled.lock().unwrap().push(intent.clone());
        if self.fail {
            anyhow::bail!("{} failed", intent.action);
        }
        Ok(())
    }
}
