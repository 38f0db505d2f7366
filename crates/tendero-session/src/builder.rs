//! Session construction: fresh sessions and hydration from persisted JSON.

use serde_json::Value;

use crate::contract;
use crate::session::Session;

/// A fresh session for a first-contact user: defaults plus identity.
pub fn new_session(
    tenant_id: &str,
    wa_id: &str,
    locale: Option<&str>,
    timezone: Option<&str>,
) -> Session {
    let mut map = contract::blank();
    map.insert(
        contract::TENANT_ID.to_string(),
        Value::String(tenant_id.to_string()),
    );
    map.insert(
        contract::WA_ID.to_string(),
        Value::String(wa_id.to_string()),
    );
    if let Some(locale) = locale {
        map.insert(contract::LOCALE.to_string(), Value::String(locale.to_string()));
    }
    if let Some(timezone) = timezone {
        map.insert(
            contract::TIMEZONE.to_string(),
            Value::String(timezone.to_string()),
        );
    }
    Session::from_map(map)
}

/// Hydrate a session from persisted bytes.
///
/// Degenerate input — nil, empty, malformed JSON, or a blob that is not a
/// mapping — yields `blank()`; the validator then routes the turn through
/// the self-healing reset path. For a mapping, stored scalars and arrays
/// replace defaults and unknown fields are kept verbatim.
pub fn from_json(bytes: Option<&[u8]>) -> Session {
    let Some(bytes) = bytes else {
        return Session::from_map(contract::blank());
    };
    if bytes.is_empty() {
        return Session::from_map(contract::blank());
    }
    let stored: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(_) => return Session::from_map(contract::blank()),
    };
    let Value::Object(stored) = stored else {
        return Session::from_map(contract::blank());
    };

    let mut map = contract::blank();
    for (key, value) in stored {
        map.insert(key, value);
    }
    Session::from_map(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_session_fills_identity_and_locale_defaults() {
        let s = new_session("t1", "57300111", None, None);
        assert_eq!(s.tenant_id(), Some("t1"));
        assert_eq!(s.wa_id(), Some("57300111"));
        assert_eq!(s.str_field(contract::LOCALE), Some("es-CO"));
        assert_eq!(s.str_field(contract::TIMEZONE), Some("America/Bogota"));
        assert_eq!(s.str_field(contract::CART_CURRENCY), Some("COP"));
    }

    #[test]
    fn explicit_locale_overrides_default() {
        let s = new_session("t1", "57300111", Some("en-US"), Some("America/New_York"));
        assert_eq!(s.str_field(contract::LOCALE), Some("en-US"));
        assert_eq!(s.str_field(contract::TIMEZONE), Some("America/New_York"));
    }

    #[test]
    fn round_trip_preserves_equality() {
        let original = new_session("t1", "57300111", None, None);
        let bytes = original.to_bytes().unwrap();
        let hydrated = from_json(Some(&bytes));
        assert_eq!(hydrated, original);
    }

    #[test]
    fn nil_and_empty_yield_blank() {
        assert_eq!(from_json(None).as_map(), &contract::blank());
        assert_eq!(from_json(Some(b"")).as_map(), &contract::blank());
    }

    #[test]
    fn malformed_json_yields_blank() {
        assert_eq!(from_json(Some(b"{\"tenant")).as_map(), &contract::blank());
    }

    #[test]
    fn non_mapping_json_yields_blank() {
        assert_eq!(from_json(Some(b"[1,2,3]")).as_map(), &contract::blank());
        assert_eq!(from_json(Some(b"\"text\"")).as_map(), &contract::blank());
    }

    #[test]
    fn stored_values_replace_defaults_and_unknown_fields_survive() {
        let blob = json!({
            "tenant_id": "t1",
            "wa_id": "57300111",
            "current_lane": "commerce",
            "cart_items": [{"sku": "CAFE-250", "qty": 2}],
            "loyalty_tier": "gold"
        });
        let s = from_json(Some(blob.to_string().as_bytes()));
        assert_eq!(s.current_lane(), Some(tendero_core::Lane::Commerce));
        assert_eq!(
            s.get("cart_items").unwrap()[0]["sku"],
            json!("CAFE-250")
        );
        // Unknown field kept verbatim.
        assert_eq!(s.str_field("loyalty_tier"), Some("gold"));
        // Missing fields filled from defaults.
        assert_eq!(s.str_field(contract::COMMERCE_STATE), Some("browsing"));
    }
}
