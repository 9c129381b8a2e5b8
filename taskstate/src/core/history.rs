//! In-memory event history bounded by `start_id`/`end_id` cursors.
//!
//! Only the cursors are persisted with a session. Events themselves live in the
//! controller's event stream and are re-fed into a fresh history after restore.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    User,
    Agent,
    Environment,
}

/// Events the run state inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Message {
        source: EventSource,
        content: String,
    },
    AgentFinish {
        #[serde(default)]
        outputs: serde_json::Map<String, Value>,
    },
    Observation {
        content: String,
    },
}

impl Event {
    pub fn user_message(content: impl Into<String>) -> Self {
        Event::Message {
            source: EventSource::User,
            content: content.into(),
        }
    }

    pub fn agent_message(content: impl Into<String>) -> Self {
        Event::Message {
            source: EventSource::Agent,
            content: content.into(),
        }
    }

    pub fn finish() -> Self {
        Event::AgentFinish {
            outputs: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub start_id: i64,
    pub end_id: i64,
    #[serde(skip)]
    events: Vec<Event>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            start_id: -1,
            end_id: -1,
            events: Vec::new(),
        }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh, empty history positioned at the given cursors.
    pub fn with_cursors(start_id: i64, end_id: i64) -> Self {
        Self {
            start_id,
            end_id,
            events: Vec::new(),
        }
    }

    /// Append an event and advance `end_id` to its id.
    pub fn push(&mut self, event: Event) -> i64 {
        if self.start_id < 0 {
            self.start_id = 0;
        }
        self.end_id = if self.end_id < self.start_id {
            self.start_id
        } else {
            self.end_id + 1
        };
        self.events.push(event);
        self.end_id
    }

    /// Events in insertion order, or most recent first when `reverse` is set.
    pub fn events(&self, reverse: bool) -> Box<dyn Iterator<Item = &Event> + '_> {
        if reverse {
            Box::new(self.events.iter().rev())
        } else {
            Box::new(self.events.iter())
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_advances_cursors_from_unset() {
        let mut history = History::new();
        assert_eq!((history.start_id, history.end_id), (-1, -1));
        assert_eq!(history.push(Event::user_message("hi")), 0);
        assert_eq!(history.push(Event::finish()), 1);
        assert_eq!((history.start_id, history.end_id), (0, 1));
    }

    #[test]
    fn push_continues_from_seeded_cursors() {
        let mut history = History::with_cursors(4, 9);
        assert_eq!(history.push(Event::agent_message("next")), 10);
        assert_eq!(history.start_id, 4);
    }

    #[test]
    fn events_can_be_read_in_reverse() {
        let mut history = History::new();
        history.push(Event::user_message("a"));
        history.push(Event::user_message("b"));
        let reversed: Vec<_> = history.events(true).cloned().collect();
        assert_eq!(
            reversed,
            vec![Event::user_message("b"), Event::user_message("a")]
        );
    }

    #[test]
    fn only_cursors_are_serialized() {
        let mut history = History::new();
        history.push(Event::user_message("secret"));
        let json = serde_json::to_string(&history).expect("json");
        assert_eq!(json, r#"{"start_id":0,"end_id":0}"#);

        let restored: History = serde_json::from_str(&json).expect("parse");
        assert!(restored.is_empty());
        assert_eq!(restored.end_id, 0);
    }

    #[test]
    fn event_json_is_tagged_by_kind() {
        let json = serde_json::to_string(&Event::user_message("x")).expect("json");
        assert_eq!(json, r#"{"kind":"message","source":"user","content":"x"}"#);
    }
}
