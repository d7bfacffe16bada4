use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::context::AgentContext;
use crate::agent::input_types::AgentRequest;
use crate::agent::interface::Message;
use crate::error::AgentError;

/// Upper bound, in characters, on the input label recorded in shared memory
pub const INPUT_LABEL_MAX_CHARS: usize = 160;

/// Report prefix length used in the symptom agent's label
pub const REPORT_SNIPPET_CHARS: usize = 120;

/// The four agent variants, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Symptom,
    Lifestyle,
    Diet,
    Fitness,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Symptom,
        AgentKind::Lifestyle,
        AgentKind::Diet,
        AgentKind::Fitness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Symptom => "symptom",
            AgentKind::Lifestyle => "lifestyle",
            AgentKind::Diet => "diet",
            AgentKind::Fitness => "fitness",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let name = name.strip_suffix("_agent").unwrap_or(&name);
        AgentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| anyhow::anyhow!("Unknown agent: {}", s))
    }
}

/// Cut `text` to at most `max` characters, respecting char boundaries
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Shared protocol of all agents.
///
/// A variant only supplies its fixed system instruction and the task message
/// built from the request. Reading shared memory, calling the model through
/// the key pool with retry, and recording the turn are common to every
/// variant and live in the provided methods.
#[async_trait]
pub trait AgentInterface: Send + Sync {
    fn kind(&self) -> AgentKind;

    /// Fixed role and safety instruction
    fn system_prompt(&self) -> &'static str;

    /// Task message for this request. `knowledge` is empty unless the agent
    /// uses the knowledge base.
    fn task_prompt(&self, request: &AgentRequest, knowledge: &str) -> String;

    /// Whether the agent looks up knowledge snippets keyed by the symptoms
    fn uses_knowledge(&self) -> bool {
        false
    }

    /// Text describing the input in the recorded turn, before truncation
    fn input_summary(&self, _request: &AgentRequest, task_prompt: &str) -> String {
        task_prompt.to_string()
    }

    /// Machine-readable label for the recorded turn, at most
    /// [`INPUT_LABEL_MAX_CHARS`] characters
    fn input_label(&self, request: &AgentRequest, task_prompt: &str) -> String {
        let label = format!(
            "[{}_agent] {}",
            self.kind(),
            self.input_summary(request, task_prompt)
        );
        truncate_chars(&label, INPUT_LABEL_MAX_CHARS)
    }

    /// Build the task message, fetching knowledge first when the agent needs it
    fn build_task(&self, ctx: &AgentContext, request: &AgentRequest) -> String {
        let knowledge = if self.uses_knowledge() {
            match &request.knowledge {
                Some(supplied) => supplied.clone(),
                None => ctx.retriever.retrieve(&request.symptoms),
            }
        } else {
            String::new()
        };
        self.task_prompt(request, &knowledge)
    }

    /// System instruction, then the shared history, then the task
    fn compose_messages(&self, ctx: &AgentContext, task_prompt: &str) -> Vec<Message> {
        let mut messages = vec![Message::system(self.system_prompt())];
        messages.extend(ctx.memory.to_messages());
        messages.push(Message::user(task_prompt));
        messages
    }

    /// Run the agent and record its turn in shared memory.
    ///
    /// Nothing is recorded when the call fails.
    async fn run(&self, ctx: &AgentContext, request: &AgentRequest) -> Result<String, AgentError> {
        let task = self.build_task(ctx, request);
        let messages = self.compose_messages(ctx, &task);
        debug!(
            agent = %self.kind(),
            history_turns = ctx.memory.len(),
            "Composed {} messages",
            messages.len()
        );

        let text = ctx.complete_with_retry(self.kind(), &messages).await?;

        let turns = ctx.memory.append(self.input_label(request, &task), text.clone());
        info!(agent = %self.kind(), turns, "Agent finished");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn parses_agent_names() {
        assert_eq!("diet".parse::<AgentKind>().unwrap(), AgentKind::Diet);
        assert_eq!("Fitness_Agent".parse::<AgentKind>().unwrap(), AgentKind::Fitness);
        assert!("cardio".parse::<AgentKind>().is_err());
    }
}
