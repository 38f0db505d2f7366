use serde_json::{Map, Value};
use tracing::warn;

use tendero_core::{Lane, OutgoingMessage};

use crate::contract;
use crate::error::Result;
use crate::types::DialogueEntry;

/// The flat, per-`(tenant_id, wa_id)` state map.
///
/// A thin newtype over a JSON object: typed accessors for the fields the
/// core reads on the hot path, raw access for everything else. Unknown
/// fields ride along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Session(Map<String, Value>);

impl Session {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn bool_field(&self, field: &str) -> bool {
        self.0
            .get(field)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn u64_field(&self, field: &str) -> u64 {
        self.0.get(field).and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.str_field(contract::TENANT_ID)
    }

    pub fn wa_id(&self) -> Option<&str> {
        self.str_field(contract::WA_ID)
    }

    pub fn current_lane(&self) -> Option<Lane> {
        self.str_field(contract::CURRENT_LANE)?.parse().ok()
    }

    pub fn set_current_lane(&mut self, lane: Lane) {
        self.set(contract::CURRENT_LANE, Value::String(lane.as_str().into()));
    }

    /// Number of dialogue entries, without deserialising them.
    pub fn turns_len(&self) -> usize {
        self.0
            .get(contract::TURNS)
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// All dialogue entries. Entries that fail to deserialise are skipped —
    /// history written by a newer build must not poison older readers.
    pub fn turns(&self) -> Vec<DialogueEntry> {
        self.0
            .get(contract::TURNS)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The last `n` dialogue entries, oldest first.
    pub fn recent_turns(&self, n: usize) -> Vec<DialogueEntry> {
        let turns = self.turns();
        let skip = turns.len().saturating_sub(n);
        turns.into_iter().skip(skip).collect()
    }

    /// Append a user dialogue entry and record its message id.
    pub fn push_user_entry(&mut self, text: &str, message_id: &str, timestamp: &str) -> Result<()> {
        let entry = DialogueEntry::User {
            text: text.to_string(),
            message_id: message_id.to_string(),
            timestamp: timestamp.to_string(),
        };
        self.push_entry(entry)?;
        self.set(
            contract::LAST_USER_MSG_ID,
            Value::String(message_id.to_string()),
        );
        Ok(())
    }

    /// Append an assistant dialogue entry for the given lane.
    pub fn push_assistant_entry(
        &mut self,
        lane: Lane,
        messages: &[OutgoingMessage],
        timestamp: &str,
    ) -> Result<()> {
        let entry = DialogueEntry::Assistant {
            lane,
            messages: messages.to_vec(),
            timestamp: timestamp.to_string(),
        };
        self.push_entry(entry)
    }

    fn push_entry(&mut self, entry: DialogueEntry) -> Result<()> {
        let value = serde_json::to_value(&entry)?;
        match self
            .0
            .entry(contract::TURNS.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(entries) => entries.push(value),
            other => {
                // A non-array turns field is corrupt; start over rather
                // than lose the new entry.
                *other = Value::Array(vec![value]);
            }
        }
        Ok(())
    }

    /// Shallow overlay: every patch key replaces the session's value.
    ///
    /// `turns` is append-only and cannot be rewritten through a patch;
    /// attempts are dropped.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key == contract::TURNS {
                warn!(event = "patch_rejected_turns", "patch tried to rewrite turns");
                continue;
            }
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Advance `updated_at`, keeping it monotonically non-decreasing even
    /// if the caller's clock briefly regresses.
    pub fn touch(&mut self, now_rfc3339: &str) {
        let advance = match self.str_field(contract::UPDATED_AT) {
            Some(current) => {
                match (
                    chrono::DateTime::parse_from_rfc3339(current),
                    chrono::DateTime::parse_from_rfc3339(now_rfc3339),
                ) {
                    (Ok(cur), Ok(new)) => new >= cur,
                    _ => true,
                }
            }
            None => true,
        };
        if advance {
            self.set(
                contract::UPDATED_AT,
                Value::String(now_rfc3339.to_string()),
            );
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&Value::Object(self.0.clone()))?)
    }
}
