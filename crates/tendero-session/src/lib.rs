//! The per-`(tenant_id, wa_id)` session: a flat field map, its defaults,
//! hydration from persisted JSON, and structural validation.
//!
//! Flatness is a design decision: patches are shallow overlays, field
//! access is one lookup, and there is no deep-merge ambiguity.

pub mod builder;
pub mod contract;
pub mod error;
pub mod session;
pub mod types;
pub mod validator;

pub use error::{Result, SessionError};
pub use session::Session;
pub use types::DialogueEntry;
