//! The turn controller: the one entry point that takes an inbound turn
//! through idempotency, locking, state hydration, routing, the agent baton
//! chain and persistence — and guarantees the user's words survive
//! whatever happens downstream.

pub mod builder;
pub mod controller;
pub mod error;
pub mod events;

pub use builder::build_turn;
pub use controller::TurnController;
pub use error::{Result, TurnError};
