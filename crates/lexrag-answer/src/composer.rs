//! Prompt assembly and echo stripping around a [`Generator`].
use anyhow::Result;
use tracing::{debug, warn};

use lexrag_core::{GenerationParams, Generator};

pub fn build_prompt(query: &str, context: &str) -> String {
    format!("法律问题:{query}\n回答可能会用到的参考文献:{context}\n")
}

/// Remove the first verbatim occurrence of `prompt` from `raw` and trim.
/// Returns `None` when the prompt was not echoed.
pub fn strip_prompt(raw: &str, prompt: &str) -> Option<String> {
    if prompt.is_empty() || !raw.contains(prompt) {
        return None;
    }
    Some(raw.replacen(prompt, "", 1).trim().to_string())
}

pub struct AnswerComposer {
    generator: Box<dyn Generator>,
    params: GenerationParams,
}

impl AnswerComposer {
    pub fn new(generator: Box<dyn Generator>, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    pub fn compose(&self, context: &str, query: &str) -> Result<String> {
        let prompt = build_prompt(query, context);
        debug!(
            prompt_chars = prompt.chars().count(),
            max_new_tokens = self.params.max_new_tokens,
            "generating answer"
        );
        let raw = self.generator.generate(&prompt, &self.params)?;
        match strip_prompt(&raw, &prompt) {
            Some(answer) => Ok(answer),
            None => {
                warn!(
                    output_chars = raw.chars().count(),
                    "prompt not echoed by generator; returning raw output"
                );
                Ok(raw.trim().to_string())
            }
        }
    }
}
