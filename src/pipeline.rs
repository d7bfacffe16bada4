//! Pipeline driver: runs the four agents in dependency order and chains
//! their outputs.

use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::agent::{
    AgentContext, AgentInterface, AgentRequest, ConversationTurn, DietAgent, FitnessAgent,
    LifestyleAgent, SymptomAgent,
};
use crate::error::AgentError;

/// User input for one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineInput {
    pub symptoms: String,
    #[serde(default)]
    pub report: Option<String>,
}

/// Outputs of every agent for one run, plus the transcript they shared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub symptom: String,
    pub lifestyle: String,
    pub diet: String,
    pub fitness: String,
    pub turns: Vec<ConversationTurn>,
}

/// Sequences Symptom → Lifestyle → Diet → Fitness.
///
/// The lifestyle output feeds the diet agent and the diet output feeds the
/// fitness agent. Symptom and lifestyle depend on nothing upstream and may
/// run concurrently.
#[derive(Clone)]
pub struct Pipeline {
    context: AgentContext,
    parallel_independent_agents: bool,
}

impl Pipeline {
    pub fn new(context: AgentContext) -> Self {
        Self {
            context,
            parallel_independent_agents: false,
        }
    }

    pub fn parallel_independent_agents(mut self, enabled: bool) -> Self {
        self.parallel_independent_agents = enabled;
        self
    }

    /// Run all four agents. Each run gets its own shared memory; the key pool
    /// is shared with every other run of this pipeline.
    ///
    /// The first agent failure aborts the run.
    pub async fn run(&self, input: PipelineInput) -> Result<PipelineReport, AgentError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", run_id = %run_id);
        self.run_inner(run_id, input).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        input: PipelineInput,
    ) -> Result<PipelineReport, AgentError> {
        let ctx = self.context.fresh_run();
        let base = AgentRequest {
            symptoms: input.symptoms,
            report: input.report,
            ..AgentRequest::default()
        };
        info!("Starting pipeline run");

        let (symptom, lifestyle) = if self.parallel_independent_agents {
            let (symptom, lifestyle) =
                futures::join!(SymptomAgent.run(&ctx, &base), LifestyleAgent.run(&ctx, &base));
            (symptom?, lifestyle?)
        } else {
            let symptom = SymptomAgent.run(&ctx, &base).await?;
            let lifestyle = LifestyleAgent.run(&ctx, &base).await?;
            (symptom, lifestyle)
        };

        let diet_request = base.clone().with_lifestyle_notes(lifestyle.clone());
        let diet = DietAgent.run(&ctx, &diet_request).await?;

        let fitness_request = base.with_diet_notes(diet.clone());
        let fitness = FitnessAgent.run(&ctx, &fitness_request).await?;

        info!(turns = ctx.memory.len(), "Pipeline run finished");
        Ok(PipelineReport {
            run_id,
            symptom,
            lifestyle,
            diet,
            fitness,
            turns: ctx.memory.history(),
        })
    }

    pub fn context(&self) -> &AgentContext {
        &self.context
    }
}
