use tracing::info;
use anyhow::Result;

use crate::agent::agents::{
    AgentInterface, AgentKind, DietAgent, FitnessAgent, LifestyleAgent, SymptomAgent,
};

/// Factory for creating agent instances
pub struct AgentFactory;

impl AgentFactory {
    pub fn create(kind: AgentKind) -> Box<dyn AgentInterface> {
        match kind {
            AgentKind::Symptom => Box::new(SymptomAgent),
            AgentKind::Lifestyle => Box::new(LifestyleAgent),
            AgentKind::Diet => Box::new(DietAgent),
            AgentKind::Fitness => Box::new(FitnessAgent),
        }
    }

    /// Create an agent from its configured name, e.g. `diet` or `diet_agent`.
    pub fn create_agent(name: &str) -> Result<Box<dyn AgentInterface>> {
        let kind: AgentKind = name.parse()?;
        info!("Initializing agent: {}", kind);
        Ok(Self::create(kind))
    }
}
