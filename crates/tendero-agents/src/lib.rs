//! The agent layer: one re-entrant agent per lane, executed through a
//! shared tool-enabled runner.
//!
//! Agents describe themselves (instructions, tools, hooks); the
//! [`AgentRunner`] owns the per-turn lifecycle — fresh tool instances over
//! a [`TurnContext`] snapshot, the provider chat, state-patch aggregation,
//! and the conversion of any failure into a polite error reply.

pub mod agent;
pub mod agents;
pub mod context;
pub mod registry;
pub mod runner;
pub mod tools;

pub use agent::LaneAgent;
pub use context::TurnContext;
pub use registry::AgentRegistry;
pub use runner::AgentRunner;
