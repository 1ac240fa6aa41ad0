//! Voice command table and intent matching.
//!
//! A `CommandTable` is an ordered list of `CommandRule`s, each a
//! case-insensitive regex anchored at the start of the utterance. The first
//! rule that matches decides the `Intent`. Matching sits behind the
//! `IntentMatcher` trait so the dispatcher does not depend on regexes.

pub mod dispatch;
pub mod registry;

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Context;
use regex::{Regex, RegexBuilder};

/// Local actions a voice command can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    PowerOff,
    Reboot,
    SayIp,
    Update,
    Retort,
    Ping,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerOff => write!(f, "power_off"),
            Self::Reboot => write!(f, "reboot"),
            Self::SayIp => write!(f, "say_ip"),
            Self::Update => write!(f, "update"),
            Self::Retort => write!(f, "retort"),
            Self::Ping => write!(f, "ping"),
        }
    }
}

/// A matched command: which action to run and the named captures it saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub action: Action,
    /// Source pattern of the rule that matched.
    pub pattern: String,
    pub captures: BTreeMap<String, String>,
}

impl Intent {
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }
}

/// Turns recognized text into at most one intent.
pub trait IntentMatcher {
    /// Return the intent for `text`, or `None` to defer to the engine.
    fn match_intent(&self, text: &str) -> Option<Intent>;

    /// Phrases to register with the recognizer, in priority order.
    fn vocabulary(&self) -> Vec<String>;
}

/// One entry of the command table.
#[derive(Debug, Clone)]
pub struct CommandRule {
    pattern: String,
    regex: Regex,
    action: Action,
    display_phrases: Vec<String>,
}

impl CommandRule {
    /// Compile a rule. Without explicit display phrases the pattern itself
    /// is the only phrase hinted to the recognizer.
    pub fn new(
        pattern: &str,
        action: Action,
        display_phrases: Option<Vec<String>>,
    ) -> anyhow::Result<Self> {
        // Prefix match: anchored at the start only, like a plain `match`.
        let regex = RegexBuilder::new(&format!("^(?:{})", pattern))
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid command pattern {:?}", pattern))?;

        let display_phrases = match display_phrases {
            Some(phrases) if !phrases.is_empty() => phrases,
            _ => vec![pattern.to_string()],
        };

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            action,
            display_phrases,
        })
    }

    /// Try this rule against `text`.
    pub fn try_match(&self, text: &str) -> Option<Intent> {
        let caps = self.regex.captures(text)?;
        let captures = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Some(Intent {
            action: self.action,
            pattern: self.pattern.clone(),
            captures,
        })
    }
}

/// Ordered, immutable set of command rules.
#[derive(Debug, Clone)]
pub struct CommandTable {
    rules: Vec<CommandRule>,
}

impl CommandTable {
    pub fn new(rules: Vec<CommandRule>) -> anyhow::Result<Self> {
        if rules.is_empty() {
            anyhow::bail!("Command table must contain at least one rule");
        }
        Ok(Self { rules })
    }
}

impl IntentMatcher for CommandTable {
    fn match_intent(&self, text: &str) -> Option<Intent> {
        self.rules.iter().find_map(|rule| rule.try_match(text))
    }

    fn vocabulary(&self) -> Vec<String> {
        self.rules
            .iter()
            .flat_map(|rule| rule.display_phrases.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, action: Action) -> CommandRule {
        CommandRule::new(pattern, action, None).unwrap()
    }

    #[test]
    fn test_malformed_pattern_fails_fast() {
        let err = CommandRule::new("ping (?P<hostname>[\\w]+", Action::Ping, None).unwrap_err();
        assert!(err.to_string().contains("Invalid command pattern"));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert!(CommandTable::new(vec![]).is_err());
    }

    #[test]
    fn test_match_is_prefix_anchored() {
        let r = rule("ip address", Action::SayIp);
        assert!(r.try_match("ip address please").is_some());
        assert!(r.try_match("what is my ip address").is_none());
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let r = rule("reboot", Action::Reboot);
        assert_eq!(r.try_match("REBOOT").unwrap().action, Action::Reboot);
        assert_eq!(r.try_match("Reboot").unwrap().action, Action::Reboot);
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let r = rule("reboot|restart", Action::Reboot);
        assert!(r.try_match("restart now").is_some());
        assert!(r.try_match("please restart").is_none());
    }

    #[test]
    fn test_named_captures_are_collected() {
        let r = rule("ping (?P<hostname>[\\w\\s]+)", Action::Ping);
        let intent = r.try_match("ping andrew desktop").unwrap();
        assert_eq!(intent.capture("hostname"), Some("andrew desktop"));
        assert_eq!(intent.capture("missing"), None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let table = CommandTable::new(vec![
            rule("power", Action::PowerOff),
            rule("power off", Action::Reboot),
        ])
        .unwrap();
        assert_eq!(
            table.match_intent("power off").unwrap().action,
            Action::PowerOff
        );
    }

    #[test]
    fn test_display_phrases_default_to_pattern() {
        let table = CommandTable::new(vec![
            rule("reboot", Action::Reboot),
            CommandRule::new(
                "swear",
                Action::Retort,
                Some(vec!["swear".into(), "curse".into()]),
            )
            .unwrap(),
            CommandRule::new("update", Action::Update, Some(vec![])).unwrap(),
        ])
        .unwrap();
        assert_eq!(table.vocabulary(), vec!["reboot", "swear", "curse", "update"]);
    }

    #[test]
    fn test_no_match() {
        let table = CommandTable::new(vec![rule("reboot", Action::Reboot)]).unwrap();
        assert!(table.match_intent("what time is it").is_none());
    }
}
