//! Lane tools: the callables each agent exposes to its LLM chat.
//!
//! Tool business logic lives with the domain teams; the implementations
//! here are deliberately thin, carrying just enough fixture data to
//! exercise the execute contract. A tool's output mapping is surfaced to
//! the LLM; a `state_patch` key inside it is stripped and applied to the
//! session by the agent layer.

pub mod cart;
pub mod catalog;
pub mod faq;
pub mod hours;
pub mod locations;
pub mod orders;
pub mod products;
pub mod support;
