use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::interface::Message;

/// One agent invocation: a short label describing the input and the full
/// output text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub input: String,
    pub output: String,
}

/// Append-only transcript shared by every agent in a pipeline run.
///
/// Turns are kept in append order and are never removed or edited. Appends
/// from concurrently running agents land in completion order.
#[derive(Debug, Default)]
pub struct SharedMemory {
    turns: RwLock<Vec<ConversationTurn>>,
}

impl SharedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn and return the number of turns recorded so far
    pub fn append(&self, input: impl Into<String>, output: impl Into<String>) -> usize {
        let turn = ConversationTurn {
            input: input.into(),
            output: output.into(),
        };
        let mut turns = self.turns.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Shared memory: recording turn '{}'", turn.input);
        turns.push(turn);
        turns.len()
    }

    /// Snapshot of all turns in order
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.turns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// History rendered as alternating user/assistant messages, ready to be
    /// spliced into a chat completion request.
    pub fn to_messages(&self) -> Vec<Message> {
        let turns = self.turns.read().unwrap_or_else(PoisonError::into_inner);
        let mut messages = Vec::with_capacity(turns.len() * 2);
        for turn in turns.iter() {
            messages.push(Message::user(turn.input.clone()));
            messages.push(Message::assistant(turn.output.clone()));
        }
        messages
    }

    pub fn len(&self) -> usize {
        self.turns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
