//! The minimal LLM contract the core depends on: a tool-dispatching chat
//! and a structured-output ask, both time-bounded.
//!
//! [`OpenAiCompatProvider`] talks to any OpenAI-compatible chat-completions
//! endpoint (OpenAI, Anthropic's and Gemini's compatibility surfaces).
//! [`mock::MockProvider`] scripts outcomes for tests.

pub mod mock;
pub mod openai;
pub mod provider;

pub use openai::OpenAiCompatProvider;
pub use provider::{
    ChatOptions, ChatOutcome, ChatProvider, ProviderError, Result, Tool, ToolDefinition,
    ToolError, ToolInvocation,
};
