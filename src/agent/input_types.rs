use serde::{Deserialize, Serialize};

/// Inputs to one agent call.
///
/// Every agent receives the same request shape; each variant reads only the
/// fields it needs. Upstream notes are filled in by the pipeline driver when
/// chaining (lifestyle notes for the diet agent, diet notes for the fitness
/// agent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Free-text description of the user's symptoms
    pub symptoms: String,
    /// Text extracted from a lab or medical report, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    /// Output of the lifestyle agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle_notes: Option<String>,
    /// Output of the diet agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_notes: Option<String>,
    /// Knowledge snippets supplied by the caller instead of a retriever lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge: Option<String>,
}

impl AgentRequest {
    pub fn new(symptoms: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            ..Self::default()
        }
    }

    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }

    pub fn with_lifestyle_notes(mut self, notes: impl Into<String>) -> Self {
        self.lifestyle_notes = Some(notes.into());
        self
    }

    pub fn with_diet_notes(mut self, notes: impl Into<String>) -> Self {
        self.diet_notes = Some(notes.into());
        self
    }

    pub fn with_knowledge(mut self, knowledge: impl Into<String>) -> Self {
        self.knowledge = Some(knowledge.into());
        self
    }

    /// Report text, or an empty string when none was provided
    pub fn report_text(&self) -> &str {
        self.report.as_deref().unwrap_or("")
    }
}
