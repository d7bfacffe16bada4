use super::agent_interface::{AgentInterface, AgentKind};
use crate::agent::input_types::AgentRequest;

const SYSTEM_PROMPT: &str = "You are a lifestyle coach collaborating with other agents. \
Suggest simple lifestyle habits, sleep hygiene, stress management, \
and daily routine tips. Keep suggestions safe and generic.\n\n\
If lab values or diagnoses are mentioned in the report, you may \
reference them in very general language (for example 'elevated \
blood sugar'), but do NOT add new diagnoses or change treatment.";

/// Suggests sleep, stress and routine adjustments
#[derive(Debug, Default, Clone, Copy)]
pub struct LifestyleAgent;

impl AgentInterface for LifestyleAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Lifestyle
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn task_prompt(&self, request: &AgentRequest, _knowledge: &str) -> String {
        format!(
            "Given the conversation so far, the user's symptoms, and any available \
             medical report text, suggest lifestyle changes and constraints.\n\n\
             Symptoms:\n{}\n\n\
             Medical report text (may be empty):\n{}",
            request.symptoms,
            request.report_text()
        )
    }
}
