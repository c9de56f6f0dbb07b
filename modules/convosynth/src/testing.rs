// Test doubles for the generation loop.
//
// StubCompletion (ChatCompletion): deterministic answers, records every
// prompt it receives, optionally fails on the Nth call.

use std::sync::Mutex;

use ai_client::{ChatCompletion, Completion};
use anyhow::{bail, Result};
use async_trait::async_trait;

pub const STUB_MODEL: &str = "stub/model";
pub const STUB_LATENCY_MS: u64 = 42;

pub struct StubCompletion {
    answer: String,
    echo_prompt: bool,
    fail_on_call: Option<usize>,
    prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    /// Always answers `answer`.
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            echo_prompt: false,
            fail_on_call: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers with the first line of the user prompt, so each answer is
    /// traceable to its question.
    pub fn echo() -> Self {
        Self {
            echo_prompt: true,
            ..Self::new("")
        }
    }

    /// Fail the call with this zero-based index.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ChatCompletion for StubCompletion {
    fn model(&self) -> &str {
        STUB_MODEL
    }

    async fn complete(&self, _system: &str, user: &str, _temperature: f32) -> Result<Completion> {
        let call = {
            let mut prompts = self
                .prompts
                .lock()
                .map_err(|_| anyhow::anyhow!("StubCompletion: poisoned lock"))?;
            prompts.push(user.to_string());
            prompts.len() - 1
        };

        if self.fail_on_call == Some(call) {
            bail!("Connection error: stub refused call {call}");
        }

        let content = if self.echo_prompt {
            format!(
                "  Answer to: {}  ",
                user.lines().next().unwrap_or_default()
            )
        } else {
            self.answer.clone()
        };

        Ok(Completion {
            content,
            latency_ms: STUB_LATENCY_MS,
        })
    }
}
