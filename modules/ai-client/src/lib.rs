//! ai-client: thin client for OpenAI-compatible chat completion endpoints.
//!
//! Targets locally hosted servers (LM Studio, Ollama) as well as the hosted
//! OpenAI API. One request per call, no streaming, no retries.

pub mod openai;
pub mod traits;
pub mod util;

pub use openai::OpenAiCompat;
pub use traits::{ChatCompletion, Completion, Message, MessageRole};
