//! The session field contract: every known field and its default value.

use std::sync::LazyLock;

use serde_json::{json, Map, Value};

// Field names. Fields outside this list are preserved verbatim by the
// builder so newer writers stay readable by older code.
pub const TENANT_ID: &str = "tenant_id";
pub const WA_ID: &str = "wa_id";
pub const CURRENT_LANE: &str = "current_lane";
pub const LOCALE: &str = "locale";
pub const TIMEZONE: &str = "timezone";
pub const HUMAN_HANDOFF: &str = "human_handoff";
pub const VIP: &str = "vip";
pub const TURNS: &str = "turns";
pub const LAST_USER_MSG_ID: &str = "last_user_msg_id";
pub const LAST_ASSISTANT_MSG_ID: &str = "last_assistant_msg_id";
pub const PHONE_VERIFIED: &str = "phone_verified";
pub const CUSTOMER_ID: &str = "customer_id";
pub const COMMERCE_STATE: &str = "commerce_state";
pub const CART_ITEMS: &str = "cart_items";
pub const CART_SUBTOTAL_CENTS: &str = "cart_subtotal_cents";
pub const CART_CURRENCY: &str = "cart_currency";
pub const ACTIVE_CASE_ID: &str = "active_case_id";
pub const LAST_ORDER_ID: &str = "last_order_id";
pub const UPDATED_AT: &str = "updated_at";

pub const DEFAULT_LOCALE: &str = "es-CO";
pub const DEFAULT_TIMEZONE: &str = "America/Bogota";
pub const DEFAULT_CART_CURRENCY: &str = "COP";

// The commerce_state tags the commerce flow moves a session through.
pub const COMMERCE_BROWSING: &str = "browsing";
pub const COMMERCE_CART_ACTIVE: &str = "cart_active";
pub const COMMERCE_REVIEWING_CART: &str = "reviewing_cart";
pub const COMMERCE_CHECKOUT: &str = "checkout";
pub const COMMERCE_PRODUCT_INQUIRY: &str = "product_inquiry";

/// The closed commerce_state vocabulary; every writer must stay inside it.
pub const COMMERCE_STATES: [&str; 5] = [
    COMMERCE_BROWSING,
    COMMERCE_CART_ACTIVE,
    COMMERCE_REVIEWING_CART,
    COMMERCE_CHECKOUT,
    COMMERCE_PRODUCT_INQUIRY,
];

/// Frozen template mapping every known field to its default.
static DEFAULTS: LazyLock<Map<String, Value>> = LazyLock::new(|| {
    let Value::Object(map) = json!({
        TENANT_ID: null,
        WA_ID: null,
        CURRENT_LANE: "info",
        LOCALE: DEFAULT_LOCALE,
        TIMEZONE: DEFAULT_TIMEZONE,
        HUMAN_HANDOFF: false,
        VIP: false,
        TURNS: [],
        LAST_USER_MSG_ID: null,
        LAST_ASSISTANT_MSG_ID: null,
        PHONE_VERIFIED: false,
        CUSTOMER_ID: null,
        COMMERCE_STATE: COMMERCE_BROWSING,
        CART_ITEMS: [],
        CART_SUBTOTAL_CENTS: 0,
        CART_CURRENCY: DEFAULT_CART_CURRENCY,
        ACTIVE_CASE_ID: null,
        LAST_ORDER_ID: null,
        UPDATED_AT: null,
    }) else {
        unreachable!("defaults literal is an object")
    };
    map
});

/// Deep copy of the defaults template.
pub fn blank() -> Map<String, Value> {
    DEFAULTS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_a_fresh_copy() {
        let mut a = blank();
        a.insert("extra".to_string(), json!(1));
        let b = blank();
        assert!(!b.contains_key("extra"));
    }

    #[test]
    fn blank_covers_every_known_field() {
        let b = blank();
        for field in [
            TENANT_ID,
            WA_ID,
            CURRENT_LANE,
            LOCALE,
            TIMEZONE,
            HUMAN_HANDOFF,
            VIP,
            TURNS,
            LAST_USER_MSG_ID,
            LAST_ASSISTANT_MSG_ID,
            PHONE_VERIFIED,
            CUSTOMER_ID,
            COMMERCE_STATE,
            CART_ITEMS,
            CART_SUBTOTAL_CENTS,
            CART_CURRENCY,
            ACTIVE_CASE_ID,
            LAST_ORDER_ID,
            UPDATED_AT,
        ] {
            assert!(b.contains_key(field), "missing default for {}", field);
        }
    }

    #[test]
    fn default_commerce_state_is_in_the_vocabulary() {
        let b = blank();
        let state = b[COMMERCE_STATE].as_str().unwrap();
        assert!(COMMERCE_STATES.contains(&state));
    }

    #[test]
    fn booleans_default_false_and_arrays_empty() {
        let b = blank();
        assert_eq!(b[HUMAN_HANDOFF], json!(false));
        assert_eq!(b[VIP], json!(false));
        assert_eq!(b[PHONE_VERIFIED], json!(false));
        assert_eq!(b[TURNS], json!([]));
        assert_eq!(b[CART_ITEMS], json!([]));
    }
}
