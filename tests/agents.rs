//! Agent invocation contract: composition, retry-once, recording.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{key, pool, Step, StubLLM};
use health_agents_backend::agent::{
    DietAgent, FitnessAgent, LifestyleAgent, SymptomAgent, INPUT_LABEL_MAX_CHARS,
};
use health_agents_backend::knowledge::DirectoryRetriever;
use health_agents_backend::{
    AgentContext, AgentError, AgentFactory, AgentInterface, AgentKind, AgentRequest,
    CompletionError, RetryPolicy, Role,
};

fn context(keys: &[&str], llm: Arc<StubLLM>) -> AgentContext {
    AgentContext::new(pool(keys), llm)
}

fn request() -> AgentRequest {
    AgentRequest::new("headache and fatigue for three days").with_report("HbA1c 6.1%")
}

#[tokio::test]
async fn success_records_one_turn() {
    let llm = StubLLM::scripted([Step::Reply("see a doctor if it worsens".into())]);
    let ctx = context(&["k1", "k2"], llm.clone());

    let text = SymptomAgent.run(&ctx, &request()).await.unwrap();
    assert_eq!(text, "see a doctor if it worsens");
    assert_eq!(llm.call_count(), 1);
    assert_eq!(ctx.memory.len(), 1);
    assert_eq!(ctx.memory.history()[0].output, text);
    assert_eq!(ctx.key_pool.available_count(), 2);
}

#[tokio::test]
async fn first_failure_rotates_key_and_retries_once() {
    let llm = StubLLM::scripted([Step::RateLimited, Step::Reply("recovered".into())]);
    let ctx = context(&["k1", "k2", "k3"], llm.clone());

    let text = LifestyleAgent.run(&ctx, &request()).await.unwrap();
    assert_eq!(text, "recovered");

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].credential, key("k1"));
    assert_eq!(calls[1].credential, key("k2"));
    assert_eq!(calls[0].messages, calls[1].messages);

    assert!(ctx.key_pool.is_exhausted(&key("k1")));
    assert_eq!(ctx.key_pool.available_count(), 2);
    assert_eq!(ctx.memory.len(), 1);
}

#[tokio::test]
async fn non_quota_failure_is_retried_under_uniform_policy() {
    let llm = StubLLM::scripted([Step::Fail, Step::Reply("ok".into())]);
    let ctx = context(&["k1", "k2"], llm.clone());

    assert_eq!(SymptomAgent.run(&ctx, &request()).await.unwrap(), "ok");
    assert!(ctx.key_pool.is_exhausted(&key("k1")));
    assert_eq!(ctx.memory.len(), 1);
}

#[tokio::test]
async fn second_failure_is_fatal_and_records_nothing() {
    let llm = StubLLM::scripted([Step::RateLimited, Step::Fail, Step::Reply("late".into())]);
    let ctx = context(&["k1", "k2", "k3"], llm.clone());

    let err = DietAgent
        .run(&ctx, &request().with_lifestyle_notes("sleep more"))
        .await
        .unwrap_err();

    match &err {
        AgentError::RetryExhausted {
            agent,
            first,
            second,
        } => {
            assert_eq!(*agent, AgentKind::Diet);
            assert!(matches!(first, CompletionError::RateLimited(_)));
            assert!(matches!(second, CompletionError::Http { status: 400, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }

    // no third attempt
    assert_eq!(llm.call_count(), 2);
    assert!(ctx.key_pool.is_exhausted(&key("k1")));
    assert!(ctx.key_pool.is_exhausted(&key("k2")));
    assert_eq!(ctx.key_pool.available_count(), 1);
    assert!(ctx.memory.is_empty());
}

#[tokio::test]
async fn single_key_pool_retries_in_degraded_mode() {
    let llm = StubLLM::scripted([Step::RateLimited, Step::Reply("second try".into())]);
    let ctx = context(&["only"], llm.clone());

    let text = FitnessAgent.run(&ctx, &request()).await.unwrap();
    assert_eq!(text, "second try");
    let calls = llm.calls();
    assert_eq!(calls[0].credential, key("only"));
    assert_eq!(calls[1].credential, key("only"));
}

#[tokio::test]
async fn classified_policy_does_not_retry_permanent_failures() {
    let llm = StubLLM::scripted([Step::Fail]);
    let ctx = context(&["k1", "k2"], llm.clone()).with_retry_policy(RetryPolicy::Classified);

    let err = SymptomAgent.run(&ctx, &request()).await.unwrap_err();
    assert!(matches!(err, AgentError::NotRetried { agent: AgentKind::Symptom, .. }));
    assert_eq!(llm.call_count(), 1);
    assert_eq!(ctx.key_pool.available_count(), 2);
    assert!(ctx.memory.is_empty());
}

#[tokio::test]
async fn classified_policy_still_rotates_on_rate_limit() {
    let llm = StubLLM::scripted([Step::RateLimited, Step::Reply("ok".into())]);
    let ctx = context(&["k1", "k2"], llm.clone()).with_retry_policy(RetryPolicy::Classified);

    assert_eq!(SymptomAgent.run(&ctx, &request()).await.unwrap(), "ok");
    assert!(ctx.key_pool.is_exhausted(&key("k1")));
}

#[tokio::test]
async fn hung_call_times_out_into_retry() {
    let llm = StubLLM::scripted([Step::Hang, Step::Reply("fast".into())]);
    let ctx = context(&["k1", "k2"], llm.clone()).with_timeout(Some(Duration::from_millis(50)));

    let text = LifestyleAgent.run(&ctx, &request()).await.unwrap();
    assert_eq!(text, "fast");
    assert!(ctx.key_pool.is_exhausted(&key("k1")));
}

#[tokio::test]
async fn message_list_is_system_history_task() {
    let llm = StubLLM::new();
    let ctx = context(&["k1"], llm.clone());
    ctx.memory.append("[earlier] input", "earlier output");

    SymptomAgent.run(&ctx, &request()).await.unwrap();

    let calls = llm.calls();
    let messages = &calls[0].messages;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.contains("triage"));
    assert_eq!(messages[1].content, "[earlier] input");
    assert_eq!(messages[2].content, "earlier output");
    assert_eq!(messages[3].role, Role::User);
    assert!(messages[3].content.contains("headache and fatigue"));
    assert!(messages[3].content.contains("HbA1c 6.1%"));
}

#[tokio::test]
async fn later_agents_see_all_earlier_turns_in_order() {
    let llm = StubLLM::new();
    let ctx = context(&["k1", "k2"], llm.clone());
    let base = request();

    let symptom = SymptomAgent.run(&ctx, &base).await.unwrap();
    let lifestyle = LifestyleAgent.run(&ctx, &base).await.unwrap();
    DietAgent
        .run(&ctx, &base.clone().with_lifestyle_notes(lifestyle.clone()))
        .await
        .unwrap();

    let history = ctx.memory.history();
    assert_eq!(history.len(), 3);
    assert!(history[0].input.starts_with("[symptom_agent]"));
    assert!(history[1].input.starts_with("[lifestyle_agent]"));
    assert!(history[2].input.starts_with("[diet_agent]"));

    let calls = llm.calls();
    // system + 2 messages per earlier turn + task
    assert_eq!(calls[0].messages.len(), 2);
    assert_eq!(calls[1].messages.len(), 4);
    assert_eq!(calls[2].messages.len(), 6);
    assert_eq!(calls[1].messages[2].content, symptom);
    assert_eq!(calls[2].messages[2].content, symptom);
    assert_eq!(calls[2].messages[4].content, lifestyle);
}

#[tokio::test]
async fn diet_request_carries_lifestyle_notes_verbatim() {
    let llm = StubLLM::new();
    let ctx = context(&["k1"], llm.clone());
    let notes = "Lifestyle: keep a fixed bedtime; walk 20 minutes after dinner.";

    DietAgent
        .run(&ctx, &request().with_lifestyle_notes(notes))
        .await
        .unwrap();

    let calls = llm.calls();
    let task = &calls[0].messages.last().unwrap().content;
    assert!(task.contains(notes));
}

#[tokio::test]
async fn fitness_request_carries_diet_notes_verbatim() {
    let llm = StubLLM::new();
    let ctx = context(&["k1"], llm.clone());
    let notes = "Diet: prefer oats and lentils, avoid sugary drinks.";

    FitnessAgent
        .run(&ctx, &request().with_diet_notes(notes))
        .await
        .unwrap();

    let calls = llm.calls();
    let task = &calls[0].messages.last().unwrap().content;
    assert!(task.contains(notes));
}

#[tokio::test]
async fn only_diet_agent_consults_knowledge() {
    let retriever = Arc::new(DirectoryRetriever::from_documents(
        ["Fatigue can improve with iron rich foods such as spinach."],
        3,
    ));
    let llm = StubLLM::new();
    let ctx = context(&["k1"], llm.clone()).with_retriever(retriever);

    LifestyleAgent.run(&ctx, &request()).await.unwrap();
    DietAgent.run(&ctx, &request()).await.unwrap();

    let calls = llm.calls();
    let lifestyle_task = &calls[0].messages.last().unwrap().content;
    let diet_task = &calls[1].messages.last().unwrap().content;
    assert!(!lifestyle_task.contains("spinach"));
    assert!(diet_task.contains("spinach"));
}

#[tokio::test]
async fn supplied_knowledge_skips_lookup() {
    let retriever = Arc::new(DirectoryRetriever::from_documents(["fatigue spinach"], 3));
    let llm = StubLLM::new();
    let ctx = context(&["k1"], llm.clone()).with_retriever(retriever);

    DietAgent
        .run(&ctx, &request().with_knowledge("caller supplied snippet"))
        .await
        .unwrap();

    let calls = llm.calls();
    let task = &calls[0].messages.last().unwrap().content;
    assert!(task.contains("caller supplied snippet"));
    assert!(!task.contains("spinach"));
}

#[tokio::test]
async fn label_is_bounded_but_output_is_not() {
    let long_output = "x".repeat(10_000);
    let llm = StubLLM::scripted([
        Step::Reply(long_output.clone()),
        Step::Reply(long_output.clone()),
    ]);
    let ctx = context(&["k1"], llm);
    let long_request = AgentRequest::new("ache ".repeat(500)).with_report("r".repeat(2_000));

    SymptomAgent.run(&ctx, &long_request).await.unwrap();
    FitnessAgent
        .run(&ctx, &long_request.clone().with_diet_notes("d".repeat(2_000)))
        .await
        .unwrap();

    for turn in ctx.memory.history() {
        assert!(turn.input.chars().count() <= INPUT_LABEL_MAX_CHARS);
        assert_eq!(turn.output, long_output);
    }
}

#[tokio::test]
async fn symptom_label_uses_report_snippet() {
    let llm = StubLLM::new();
    let ctx = context(&["k1"], llm);
    let req = AgentRequest::new("cough").with_report("normal chest x-ray");

    SymptomAgent.run(&ctx, &req).await.unwrap();
    assert_eq!(
        ctx.memory.history()[0].input,
        "[symptom_agent] symptoms=cough report_snippet=normal chest x-ray"
    );
}

#[tokio::test]
async fn factory_builds_each_kind() {
    for kind in AgentKind::ALL {
        let agent = AgentFactory::create_agent(&format!("{kind}_agent")).unwrap();
        assert_eq!(agent.kind(), kind);
    }
    assert!(AgentFactory::create_agent("astrology").is_err());
}
