//! The rule-based routing tier: an ordered regex table, first match wins.

use std::sync::LazyLock;

use regex::Regex;

use tendero_core::{Lane, RouterDecision};

struct Rule {
    pattern: Regex,
    lane: Lane,
    intent: &'static str,
    confidence: f64,
}

fn rule(pattern: &str, lane: Lane, intent: &'static str, confidence: f64) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("routing pattern is valid"),
        lane,
        intent,
        confidence,
    }
}

/// Order matters: complaints before purchases ("quiero devolver mi compra"
/// is support, not commerce), status before generic order verbs.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(
            r"(?i)(queja|reclamo|devoluci[oó]n|devolver|reembolso|da[ñn]ado|mal estado|complaint|refund|broken)",
            Lane::Support,
            "complaint",
            0.85,
        ),
        rule(
            r"(?i)(mi pedido|estado de mi|d[oó]nde va|rastrear|seguimiento|tracking|order status)",
            Lane::OrderStatus,
            "order_status",
            0.8,
        ),
        rule(
            r"(?i)(comprar|quiero pedir|hacer un pedido|agrega|a[ñn]ade|carrito|cart|buy|shop|purchase)",
            Lane::Commerce,
            "purchase_intent",
            0.8,
        ),
        rule(
            r"(?i)(men[uú]|cat[aá]logo|productos|qu[eé] venden|qu[eé] tienen|price|precio)",
            Lane::Product,
            "product_inquiry",
            0.7,
        ),
        rule(
            r"(?i)(horario|a qu[eé] hora|abren|cierran|hours|open)",
            Lane::Info,
            "hours_inquiry",
            0.8,
        ),
        rule(
            r"(?i)(d[oó]nde queda|direcci[oó]n|ubicaci[oó]n|sede|sucursal|location)",
            Lane::Info,
            "location_inquiry",
            0.8,
        ),
        rule(
            r"(?i)^(hola|buenas|buenos d[ií]as|buenas tardes|buenas noches|hey|hi|hello)\b",
            Lane::Info,
            "greeting",
            0.7,
        ),
    ]
});

/// First matching rule, if any.
pub fn match_text(text: &str) -> Option<RouterDecision> {
    RULES.iter().find(|r| r.pattern.is_match(text)).map(|r| {
        RouterDecision {
            lane: r.lane,
            intent: r.intent.to_string(),
            confidence: r.confidence,
            reasoning: vec!["rule_based".to_string()],
        }
    })
}

/// The closed-world default when nothing matched.
pub fn fallback() -> RouterDecision {
    RouterDecision {
        lane: Lane::Info,
        intent: "general_info".to_string(),
        confidence: 0.5,
        reasoning: vec!["fallback".to_string()],
    }
}
