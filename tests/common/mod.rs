//! Shared fixtures: a scripted LLM stub that records every call.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use health_agents_backend::{CompletionError, Credential, KeyPool, Message, StatelessLLMInterface};

/// One recorded completion call
#[derive(Debug, Clone)]
pub struct Call {
    pub credential: Credential,
    pub messages: Vec<Message>,
}

/// Planned outcome of a call
pub enum Step {
    Reply(String),
    RateLimited,
    Fail,
    /// Never answers
    Hang,
}

/// Answers from a script; once the script runs out it replies
/// `reply #<n>` where n counts calls from 1.
#[derive(Default)]
pub struct StubLLM {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
}

impl StubLLM {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scripted(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl StatelessLLMInterface for StubLLM {
    async fn chat_completion(
        &self,
        credential: &Credential,
        messages: &[Message],
    ) -> Result<String, CompletionError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                credential: credential.clone(),
                messages: messages.to_vec(),
            });
            calls.len()
        };
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::RateLimited) => Err(CompletionError::RateLimited("429".into())),
            Some(Step::Fail) => Err(CompletionError::Http {
                status: 400,
                body: "bad request".into(),
            }),
            Some(Step::Hang) => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(format!("reply #{n}")),
        }
    }
}

pub fn pool(keys: &[&str]) -> Arc<KeyPool> {
    Arc::new(KeyPool::new(keys.iter().map(|k| Credential::from(*k))).unwrap())
}

pub fn key(k: &str) -> Credential {
    Credential::from(k)
}
