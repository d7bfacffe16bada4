pub mod agent;
pub mod main;
pub mod stateless_llm;
pub mod system;
pub mod utils;

pub use agent::PipelineConfig;
pub use main::Config;
pub use stateless_llm::{LLMConfig, RetryPolicy};
pub use system::SystemConfig;
