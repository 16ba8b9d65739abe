//! Front ends for the legal-question RAG service: a one-shot console tool,
//! an HTTP server and the offline index builder, sharing the wiring in
//! [`bootstrap`].
pub mod args;
pub mod bootstrap;
pub mod logging;
pub mod render;
pub mod server;
