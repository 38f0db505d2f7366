//! Shared types, configuration and telemetry for the tendero workspace.
//!
//! Everything the other crates exchange lives here: the canonical [`Turn`],
//! the closed [`Lane`] set, outgoing message shapes with their WhatsApp
//! limits, router/agent result types, and the figment-backed config.

pub mod config;
pub mod error;
pub mod message;
pub mod telemetry;
pub mod types;

pub use config::TenderoConfig;
pub use error::{CoreError, Result};
pub use message::{Button, ListRow, ListSection, MessageKind, MessageRecord, OutgoingMessage};
pub use types::{AgentResponse, Baton, Lane, RouterDecision, Turn, TurnResult};
