//! LLM domain — prompt selection and the vision inference client.
//!
//! External code should only use the items exported here.
//!
//!   - prompts.rs   — task mode → instruction text
//!   - provider.rs  — `InferenceClient` trait + request type
//!   - groq.rs      — Groq (OpenAI-compatible) implementation
//!   - streaming.rs — SSE framing
//!   - types.rs     — wire types

mod groq;
pub mod prompts;
mod provider;
pub mod streaming;
pub mod types;

pub use groq::GroqClient;
pub use prompts::{build_prompt, prompt_for, PromptMode, Task};
pub use provider::{InferenceClient, InferenceRequest};
