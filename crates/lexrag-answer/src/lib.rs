//! lexrag-answer
//!
//! Turns retrieved context into an answer: prompt template, echo stripping,
//! the HTTP completions backend, and [`RagService`] tying retrieval and
//! generation together.
pub mod completions;
pub mod composer;
pub mod service;

pub use completions::CompletionsGenerator;
pub use composer::{build_prompt, strip_prompt, AnswerComposer};
pub use service::RagService;
