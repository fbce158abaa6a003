use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{parse_score_reply, prompts, ScoreResult, Scorer, ScoringError};
use crate::config::ScorerConfig;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 600;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Scorer backed by the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct OpenAiScorer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiScorer {
    pub fn new(config: &ScorerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build scorer http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Scorer for OpenAiScorer {
    async fn score(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<ScoreResult, ScoringError> {
        let user_prompt = prompts::ats_user_prompt(resume_text, job_description);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompts::ATS_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timeout" } else { "transport" };
                ScoringError::Unavailable(format!("{kind}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "scorer returned non-success status");
            return Err(ScoringError::Unavailable(format!("status {status}: {body}")));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoringError::Unavailable(format!("undecodable completion: {e}")))?;

        if let Some(usage) = &completion.usage {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "scorer call succeeded"
            );
        }

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ScoringError::Malformed("completion has no content".into()))?;

        parse_score_reply(&content)
    }
}
