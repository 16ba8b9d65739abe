//! Blocking client for an OpenAI-compatible `/v1/completions` endpoint
//! (vLLM, llama.cpp server, LM Studio).
//!
//! Requests are sent with `echo: true` so the returned text starts with the
//! prompt, which [`crate::AnswerComposer`] then strips.
use anyhow::{anyhow, bail, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use lexrag_core::config::GenerationConfig;
use lexrag_core::{GenerationParams, Generator};

pub struct CompletionsGenerator {
    base_url: String,
    model: String,
    client: Client,
}

impl CompletionsGenerator {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        Self::new(
            &config.endpoint,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

pub fn request_body(model: &str, prompt: &str, params: &GenerationParams) -> Value {
    let temperature = if params.sample { params.temperature } else { 0.0 };
    let mut body = json!({
        "model": model,
        "prompt": prompt,
        "max_tokens": params.max_new_tokens,
        "temperature": temperature,
        "echo": true,
        "stream": false,
    });
    if let Some(obj) = body.as_object_mut() {
        if let Some(k) = params.top_k {
            obj.insert("top_k".to_string(), json!(k));
        }
        if let Some(s) = params.seed {
            obj.insert("seed".to_string(), json!(s));
        }
    }
    body
}

pub fn completion_text(payload: &Value) -> Result<String> {
    payload["choices"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("completion response has no choices[0].text"))
}

impl Generator for CompletionsGenerator {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let url = format!("{}/v1/completions", self.base_url);
        let start = Instant::now();
        let res = self
            .client
            .post(&url)
            .json(&request_body(&self.model, prompt, params))
            .send()?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().unwrap_or_default();
            bail!("completions endpoint {} returned {}: {}", url, status, text);
        }
        let payload: Value = res.json()?;
        let text = completion_text(&payload)?;
        info!(
            model = %self.model,
            elapsed = ?start.elapsed(),
            output_chars = text.chars().count(),
            "generation finished"
        );
        debug!(usage = %payload["usage"], "completion usage");
        Ok(text)
    }
}
