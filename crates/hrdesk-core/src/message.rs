// ABOUTME: Defines the Message type that makes up a conversation's history.
// ABOUTME: Assistant messages emitted by a worker carry that worker as their author.

use serde::{Deserialize, Serialize};

use crate::route::WorkerId;

/// Who a message is attributed to in the chat-completion sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<WorkerId>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            author: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            author: None,
        }
    }

    /// An assistant message not attributed to any worker.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            author: None,
        }
    }

    /// An assistant message produced by the given worker.
    pub fn from_worker(worker: WorkerId, content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            author: Some(worker),
        }
    }

    /// The worker that produced this message, if it is a worker answer.
    pub fn worker_author(&self) -> Option<WorkerId> {
        match self.role {
            Role::Assistant => self.author,
            _ => None,
        }
    }
}
