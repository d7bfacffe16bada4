pub mod agent_interface;
pub mod diet_agent;
pub mod fitness_agent;
pub mod lifestyle_agent;
pub mod symptom_agent;

pub use agent_interface::*;
pub use diet_agent::DietAgent;
pub use fitness_agent::FitnessAgent;
pub use lifestyle_agent::LifestyleAgent;
pub use symptom_agent::SymptomAgent;
