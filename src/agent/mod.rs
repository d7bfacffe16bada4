pub mod agent_factory;
pub mod context;
pub mod input_types;
pub mod interface;
pub mod key_pool;
pub mod shared_memory;
pub mod stateless_llm_factory;

pub mod agents;
pub mod stateless_llm;

pub use agent_factory::*;
pub use context::*;
pub use input_types::*;
pub use interface::*;
pub use key_pool::*;
pub use shared_memory::*;
pub use stateless_llm_factory::*;
pub use agents::*;
pub use stateless_llm::*;
