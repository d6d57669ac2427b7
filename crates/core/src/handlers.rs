//! Route handlers
//!
//! Four pure functions, one per route label, each producing the final
//! result text for a request. Every result starts with the route's literal
//! tag followed by a newline and a human-readable message. The ticket
//! handler is the only source of non-determinism in the system; it takes
//! the RNG as a parameter so tests can seed it.

use rand::Rng;

use crate::engine::RoutingState;
use crate::kb::KnowledgeBase;

pub const FAQ_TAG: &str = "[FAQ]";
pub const REFUND_TAG: &str = "[REFUND]";
pub const TICKET_TAG: &str = "[TICKET]";
pub const HANDOFF_TAG: &str = "[HANDOFF]";

/// Substituted when a refund request carries no recognizable order id.
pub const UNKNOWN_ORDER_ID: &str = "UNKNOWN";

/// Minimum digit-run length treated as an order id.
pub const MIN_ORDER_ID_DIGITS: usize = 5;

/// Inclusive ticket id range.
pub const TICKET_ID_MIN: u32 = 1000;
pub const TICKET_ID_MAX: u32 = 9999;

pub fn faq(state: &RoutingState, kb: &KnowledgeBase) -> String {
    format!("{FAQ_TAG}\n{}", kb.lookup(state.query()))
}

pub fn refund(state: &RoutingState) -> String {
    let order_id = extract_order_id(state.query()).unwrap_or(UNKNOWN_ORDER_ID);
    format!(
        "{REFUND_TAG}\nRefund initialized for order {order_id}. You'll get a confirmation email."
    )
}

pub fn ticket(rng: &mut impl Rng) -> String {
    let ticket_id = format!("TKT-{}", rng.gen_range(TICKET_ID_MIN..=TICKET_ID_MAX));
    format!("{TICKET_TAG}\nCreated ticket {ticket_id}. Our team will follow up shortly.")
}

pub fn handoff() -> String {
    format!("{HANDOFF_TAG}\nThis needs a human agent. I've escalated your request to support.")
}

/// First maximal run of 5-or-more consecutive decimal digits in the query.
/// A shorter run never qualifies, and runs are maximal by construction, so
/// the id is never flanked by further digits.
pub fn extract_order_id(query: &str) -> Option<&str> {
    let bytes = query.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index].is_ascii_digit() {
            let start = index;
            while index < bytes.len() && bytes[index].is_ascii_digit() {
                index += 1;
            }
            if index - start >= MIN_ORDER_ID_DIGITS {
                return Some(&query[start..index]);
            }
        } else {
            index += 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{
        extract_order_id, handoff, refund, ticket, HANDOFF_TAG, REFUND_TAG, TICKET_TAG,
        UNKNOWN_ORDER_ID,
    };
    use crate::engine::RoutingState;

    #[test]
    fn extract_order_id_finds_first_long_digit_run() {
        assert_eq!(extract_order_id("refund order 123456 please"), Some("123456"));
        assert_eq!(extract_order_id("ids 123 and 4567 then 98765 and 55555"), Some("98765"));
    }

    #[test]
    fn extract_order_id_ignores_short_runs() {
        assert_eq!(extract_order_id("order 1234"), None);
        assert_eq!(extract_order_id("refund please"), None);
        assert_eq!(extract_order_id(""), None);
    }

    #[test]
    fn extract_order_id_accepts_runs_adjacent_to_letters() {
        // Runs are bounded by non-digits only; letters do not block them.
        assert_eq!(extract_order_id("order#123456done"), Some("123456"));
    }

    #[test]
    fn refund_embeds_extracted_order_id() {
        let state = RoutingState::new("I want a refund for order 987654");
        let result = refund(&state);
        assert!(result.starts_with(REFUND_TAG));
        assert!(result.contains("987654"));
    }

    #[test]
    fn refund_uses_placeholder_when_no_order_id() {
        let state = RoutingState::new("refund please");
        assert!(refund(&state).contains(UNKNOWN_ORDER_ID));
    }

    #[test]
    fn ticket_ids_stay_in_inclusive_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let result = ticket(&mut rng);
            assert!(result.starts_with(TICKET_TAG));

            let id_digits = result
                .split("TKT-")
                .nth(1)
                .and_then(|rest| rest.split('.').next())
                .expect("ticket result should embed a TKT- id");
            assert_eq!(id_digits.len(), 4, "ticket id should be four digits: {result}");

            let id: u32 = id_digits.parse().expect("ticket id should be numeric");
            assert!((1000..=9999).contains(&id), "ticket id out of range: {id}");
        }
    }

    #[test]
    fn handoff_returns_fixed_escalation_message() {
        let first = handoff();
        assert!(first.starts_with(HANDOFF_TAG));
        assert_eq!(first, handoff());
    }
}
