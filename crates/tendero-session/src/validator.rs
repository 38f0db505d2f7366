//! Structural session validation. Runs before and after patching; semantic
//! checks belong to the agents, not here.

use std::str::FromStr;

use tendero_core::Lane;

use crate::contract;
use crate::error::{Result, SessionError};
use crate::session::Session;

/// Enforce the structural invariants:
/// 1. required identity keys are present and non-empty strings,
/// 2. `current_lane` is one of the known lane tags.
///
/// Extra fields never fail validation.
pub fn validate(session: &Session) -> Result<()> {
    for field in [contract::TENANT_ID, contract::WA_ID] {
        match session.str_field(field) {
            Some(value) if !value.is_empty() => {}
            _ => {
                return Err(SessionError::StateInvalid(format!(
                    "required field missing: {}",
                    field
                )))
            }
        }
    }

    let Some(lane_tag) = session.str_field(contract::CURRENT_LANE) else {
        return Err(SessionError::StateInvalid(
            "required field missing: current_lane".to_string(),
        ));
    };
    if Lane::from_str(lane_tag).is_err() {
        return Err(SessionError::StateInvalid(format!(
            "unknown lane: {}",
            lane_tag
        )));
    }

    Ok(())
}
