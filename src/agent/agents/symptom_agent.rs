use super::agent_interface::{truncate_chars, AgentInterface, AgentKind, REPORT_SNIPPET_CHARS};
use crate::agent::input_types::AgentRequest;

const SYSTEM_PROMPT: &str = "You are a safe medical triage assistant. \
You only assess severity and suggest if the user should see a doctor. \
Do not provide diagnoses or prescriptions.\n\n\
You may consider structured information from a lab/medical report \
if it is provided, but still MUST NOT diagnose or prescribe.";

/// Assesses severity and urgency of the raw symptoms. Never diagnoses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymptomAgent;

impl AgentInterface for SymptomAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Symptom
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn task_prompt(&self, request: &AgentRequest, _knowledge: &str) -> String {
        format!(
            "Analyze these symptoms and their possible severity.\n\n\
             Symptoms:\n{}\n\n\
             Medical report text (may be empty):\n{}",
            request.symptoms,
            request.report_text()
        )
    }

    fn input_summary(&self, request: &AgentRequest, _task_prompt: &str) -> String {
        format!(
            "symptoms={} report_snippet={}",
            request.symptoms,
            truncate_chars(request.report_text(), REPORT_SNIPPET_CHARS)
        )
    }
}
