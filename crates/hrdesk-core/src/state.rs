// ABOUTME: ConversationState, the value threaded through the orchestration graph for one turn.
// ABOUTME: History is append-only; the routing slot is written by the supervisor step alone.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::message::Message;
use crate::route::{RouteDecision, WorkerId};

/// The state of a single user turn.
///
/// Created fresh for every incoming request and discarded once the answer
/// has been read. Messages can be appended but never edited or removed, so
/// insertion order is the only order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    turn_id: Ulid,
    messages: Vec<Message>,
    next: Option<RouteDecision>,
}

impl ConversationState {
    /// Start a turn from the user's message.
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            turn_id: Ulid::new(),
            messages: vec![Message::user(user_message)],
            next: None,
        }
    }

    pub fn turn_id(&self) -> Ulid {
        self.turn_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append a message to the end of the history.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent routing decision, if the supervisor has run.
    pub fn next(&self) -> Option<RouteDecision> {
        self.next
    }

    pub fn set_next(&mut self, decision: RouteDecision) {
        self.next = Some(decision);
    }

    /// The worker that authored the last message, if any.
    pub fn last_worker_author(&self) -> Option<WorkerId> {
        self.last_message().and_then(Message::worker_author)
    }

    /// True once any worker has appended an answer to this turn.
    pub fn worker_has_answered(&self) -> bool {
        self.messages.iter().any(|m| m.worker_author().is_some())
    }

    /// The text of the last message, which is the turn's answer once the
    /// graph has finished.
    pub fn answer(&self) -> &str {
        self.last_message().map(|m| m.content.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_turn_holds_only_the_user_message() {
        let state = ConversationState::new("What is the sick leave policy?");
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0], Message::user("What is the sick leave policy?"));
        assert!(state.next().is_none());
        assert!(!state.worker_has_answered());
        assert_eq!(state.last_worker_author(), None);
    }

    #[test]
    fn worker_answer_becomes_the_answer() {
        let mut state = ConversationState::new("EMP001 balance?");
        state.append(Message::from_worker(WorkerId::DataAgent, "8 sick days"));

        assert_eq!(state.last_worker_author(), Some(WorkerId::DataAgent));
        assert!(state.worker_has_answered());
        assert_eq!(state.answer(), "8 sick days");
        assert_eq!(state.messages()[0], Message::user("EMP001 balance?"));
        assert_eq!(state.messages().len(), 2);
    }

    #[test]
    fn turns_get_distinct_ids() {
        let a = ConversationState::new("a");
        let b = ConversationState::new("a");
        assert_ne!(a.turn_id(), b.turn_id());
    }
}
