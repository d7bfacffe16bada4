use std::sync::Arc;

use tracing::info;

use crate::agent::{AgentContext, KeyPool, StatelessLLMFactory, StatelessLLMInterface};
use crate::config_manager::Config;
use crate::history_store::HistoryStore;
use crate::knowledge::{DirectoryRetriever, KnowledgeRetriever};
use crate::pipeline::Pipeline;
use crate::user_store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub key_pool: Arc<KeyPool>,
    pub pipeline: Pipeline,
    pub history: Arc<HistoryStore>,
    pub users: Arc<UserStore>,
}

impl AppState {
    /// Build the state from configuration: key pool, LLM client, knowledge
    /// base and the flat-file stores.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let llm = StatelessLLMFactory::create_llm(&config.llm_config)?;
        let retriever: Arc<dyn KnowledgeRetriever> = Arc::new(DirectoryRetriever::load(
            config.system_config.knowledge_path(),
            config.pipeline_config.knowledge_top_k,
        )?);
        let history = Arc::new(HistoryStore::open(config.system_config.history_path())?);
        let users = Arc::new(UserStore::open(config.system_config.users_path())?);
        Self::with_parts(config, llm, retriever, history, users)
    }

    /// Assemble the state around an existing LLM client and stores
    pub fn with_parts(
        config: Config,
        llm: Arc<dyn StatelessLLMInterface>,
        retriever: Arc<dyn KnowledgeRetriever>,
        history: Arc<HistoryStore>,
        users: Arc<UserStore>,
    ) -> anyhow::Result<Self> {
        let llm_config = &config.llm_config;
        let mut pool = KeyPool::new(llm_config.credentials())?;
        if let Some(cooldown) = llm_config.key_cooldown() {
            pool = pool.with_cooldown(cooldown);
        }
        let key_pool = Arc::new(pool);

        let context = AgentContext::new(key_pool.clone(), llm)
            .with_retriever(retriever)
            .with_retry_policy(llm_config.retry_policy)
            .with_timeout(llm_config.request_timeout());
        let pipeline = Pipeline::new(context)
            .parallel_independent_agents(config.pipeline_config.parallel_independent_agents);

        info!(
            keys = key_pool.len(),
            policy = ?llm_config.retry_policy,
            "Initialized app state"
        );

        Ok(Self {
            config,
            key_pool,
            pipeline,
            history,
            users,
        })
    }
}
