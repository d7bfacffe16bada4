use super::agent_interface::{AgentInterface, AgentKind};
use crate::agent::input_types::AgentRequest;

const SYSTEM_PROMPT: &str = "You are a cautious fitness coach. \
You design simple, low-intensity plans that are generally safe. \
Always recommend consulting a doctor before heavy exercise.";

/// Recommends gentle activities that respect the symptoms and the diet
/// agent's constraints
#[derive(Debug, Default, Clone, Copy)]
pub struct FitnessAgent;

impl AgentInterface for FitnessAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Fitness
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn task_prompt(&self, request: &AgentRequest, _knowledge: &str) -> String {
        format!(
            "User symptoms:\n{}\n\n\
             Diet constraints from diet_agent:\n{}\n\n\
             Recommend only low-risk, gentle physical activities, and clearly tell the \
             user to stop if they feel pain or discomfort. Always remind them to talk \
             to their doctor before starting or intensifying exercise.",
            request.symptoms,
            request.diet_notes.as_deref().unwrap_or("")
        )
    }
}
