pub mod agent;
pub mod config_manager;
pub mod error;
pub mod handlers;
pub mod history_store;
pub mod knowledge;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod user_store;

pub use agent::{
    AgentContext, AgentFactory, AgentInterface, AgentKind, AgentRequest, ConversationTurn,
    Credential, KeyPool, Message, Role, SharedMemory, StatelessLLMInterface,
};
pub use config_manager::{Config, LLMConfig, PipelineConfig, RetryPolicy, SystemConfig};
pub use error::{AgentError, CompletionError, KeyPoolError, StoreError};
pub use pipeline::{Pipeline, PipelineInput, PipelineReport};
pub use state::AppState;
