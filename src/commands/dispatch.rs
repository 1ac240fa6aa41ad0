//! Route one recognized utterance to at most one local action.

use tracing::{debug, error, info};

use crate::actions::ActionHandler;
use crate::session::Session;

use super::{Action, IntentMatcher};

/// What happened to an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A local command matched; the engine's own response was stopped.
    Handled(Action),
    /// No command matched; the engine answers as usual.
    Deferred,
}

pub struct Dispatcher<M, H> {
    matcher: M,
    handler: H,
}

impl<M: IntentMatcher, H: ActionHandler> Dispatcher<M, H> {
    pub fn new(matcher: M, handler: H) -> Self {
        Self { matcher, handler }
    }

    pub fn vocabulary(&self) -> Vec<String> {
        self.matcher.vocabulary()
    }

    #[cfg(test)]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Dispatch a lowercased utterance.
    ///
    /// Only the first matching command runs. Its failure is logged and
    /// reported to the host; it never ends the session.
    pub async fn dispatch<S: Session>(&self, text: &str, session: &S) -> Dispatch {
        let Some(intent) = self.matcher.match_intent(text) else {
            debug!(text, "No local command, deferring to engine");
            return Dispatch::Deferred;
        };

        info!(action = %intent.action, pattern = %intent.pattern, "Command matched");
        session.stop_conversation();

        if let Err(e) = self.handler.handle(&intent).await {
            error!(action = %intent.action, "Action failed: {:#}", e);
            session.report_error(&format!("{} failed: {}", intent.action, e));
        }

        Dispatch::Handled(intent.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::registry::builtin_table;
    use crate::commands::{CommandRule, CommandTable};
    use crate::config::DispatchConfig;
    use crate::testing::{RecordingHandler, RecordingSession};

    fn dispatcher() -> Dispatcher<CommandTable, RecordingHandler> {
        let table = builtin_table(&DispatchConfig::default()).unwrap();
        Dispatcher::new(table, RecordingHandler::default())
    }

    #[tokio::test]
    async fn test_match_stops_conversation_and_runs_action() {
        let dispatcher = dispatcher();
        let session = RecordingSession::default();
        let outcome = dispatcher.dispatch("reboot now", &session).await;
        assert_eq!(outcome, Dispatch::Handled(Action::Reboot));
        assert_eq!(session.stop_count(), 1);
        assert_eq!(dispatcher.handler.actions(), vec![Action::Reboot]);
    }

    #[tokio::test]
    async fn test_no_match_touches_nothing() {
        let dispatcher = dispatcher();
        let session = RecordingSession::default();
        let outcome = dispatcher.dispatch("what time is it", &session).await;
        assert_eq!(outcome, Dispatch::Deferred);
        assert_eq!(session.stop_count(), 0);
        assert!(dispatcher.handler.actions().is_empty());
    }

    #[tokio::test]
    async fn test_only_first_of_overlapping_rules_fires() {
        let table = CommandTable::new(vec![
            CommandRule::new("update", Action::Update, None).unwrap(),
            CommandRule::new("update|upgrade", Action::Reboot, None).unwrap(),
        ])
        .unwrap();
        let dispatcher = Dispatcher::new(table, RecordingHandler::default());
        let session = RecordingSession::default();

        dispatcher.dispatch("update", &session).await;
        assert_eq!(dispatcher.handler.actions(), vec![Action::Update]);
        assert_eq!(session.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_ping_intent_carries_hostname() {
        let dispatcher = dispatcher();
        let session = RecordingSession::default();
        dispatcher.dispatch("ping andrew desktop", &session).await;
        let handled = dispatcher.handler.handled.lock().unwrap();
        assert_eq!(handled[0].capture("hostname"), Some("andrew desktop"));
    }

    #[tokio::test]
    async fn test_action_failure_is_reported_not_fatal() {
        let table = builtin_table(&DispatchConfig::default()).unwrap();
        let dispatcher = Dispatcher::new(table, RecordingHandler::failing());
        let session = RecordingSession::default();

        let outcome = dispatcher.dispatch("ip address", &session).await;
        assert_eq!(outcome, Dispatch::Handled(Action::SayIp));
        let errors = session.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("say_ip failed"));
    }
}
