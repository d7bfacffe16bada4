use super::agent_interface::{AgentInterface, AgentKind};
use crate::agent::input_types::AgentRequest;

const SYSTEM_PROMPT: &str = "You are a dietician collaborating with other agents to give \
general diet guidance. Never claim to cure diseases or override a doctor's advice. \
Do not name prescription medicines or doses.";

/// Proposes a balanced diet plan from the symptoms, the lifestyle agent's
/// notes and knowledge base snippets.
#[derive(Debug, Default, Clone, Copy)]
pub struct DietAgent;

impl AgentInterface for DietAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Diet
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn uses_knowledge(&self) -> bool {
        true
    }

    fn task_prompt(&self, request: &AgentRequest, knowledge: &str) -> String {
        format!(
            "User symptoms:\n{}\n\n\
             Relevant medical report text (may be empty):\n{}\n\n\
             Lifestyle information from lifestyle_agent:\n{}\n\n\
             Evidence / knowledge base snippets:\n{}\n\n\
             Suggest a safe, balanced diet plan. Mention foods to prefer and foods to avoid. \
             Highlight that this is not a replacement for a dietician or doctor.",
            request.symptoms,
            request.report_text(),
            request.lifestyle_notes.as_deref().unwrap_or(""),
            knowledge
        )
    }
}
