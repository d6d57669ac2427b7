//! Support routing engine
//!
//! Provides the single-pass state machine for one request: a `RoutingState`
//! is created from the query, classified exactly once, dispatched to
//! exactly one handler, and returned complete. No retries, no loops.

use rand::thread_rng;
use thiserror::Error;

use crate::classify::{IntentClassifier, RouteLabel};
use crate::config::BotConfig;
use crate::handlers;
use crate::kb::KnowledgeBase;

/// The single mutable record threaded through execution.
///
/// `query` is set once at creation and never mutated. `route` is written
/// exactly once by the classifier and `result` exactly once by the
/// dispatched handler; the state is complete iff both are set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingState {
    query: String,
    route: Option<RouteLabel>,
    result: String,
}

impl RoutingState {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), route: None, result: String::new() }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn route(&self) -> Option<RouteLabel> {
        self.route
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn is_complete(&self) -> bool {
        self.route.is_some() && !self.result.is_empty()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// A state reached dispatch without a classified route. The classifier
    /// is total, so hitting this means classifier/dispatch wiring drifted;
    /// the request is aborted rather than silently defaulted.
    #[error("routing state reached dispatch without a classified route")]
    RouteUnset,
}

/// Immutable per-process engine: holds the classifier rule table and the
/// knowledge base, both read-only after construction, so `execute` is safe
/// to call concurrently across independent requests.
#[derive(Clone, Debug)]
pub struct SupportEngine {
    classifier: IntentClassifier,
    kb: KnowledgeBase,
}

impl SupportEngine {
    pub fn new(classifier: IntentClassifier, kb: KnowledgeBase) -> Self {
        Self { classifier, kb }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(
            IntentClassifier::from_config(&config.routing),
            KnowledgeBase::from_config(&config.kb),
        )
    }

    /// Run one query through classify and dispatch, returning the completed
    /// state. Exactly one classifier call and one handler call per request.
    pub fn execute(&self, query: &str) -> Result<RoutingState, RoutingError> {
        let mut state = RoutingState::new(query);
        state.route = Some(self.classifier.classify(&state.query));
        self.dispatch(&mut state)?;
        Ok(state)
    }

    /// Dispatch a classified state to its handler. The match is exhaustive
    /// over `RouteLabel`, so handler coverage is checked at compile time;
    /// the only runtime failure is a state whose route was never set.
    pub fn dispatch(&self, state: &mut RoutingState) -> Result<(), RoutingError> {
        let route = state.route.ok_or(RoutingError::RouteUnset)?;

        let result = match route {
            RouteLabel::Faq => handlers::faq(state, &self.kb),
            RouteLabel::Refund => handlers::refund(state),
            RouteLabel::Ticket => handlers::ticket(&mut thread_rng()),
            RouteLabel::Handoff => handlers::handoff(),
        };
        state.result = result;

        Ok(())
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }
}

#[cfg(test)]
mod tests {
    use super::{RoutingError, RoutingState, SupportEngine};
    use crate::classify::RouteLabel;
    use crate::config::BotConfig;
    use crate::handlers::{FAQ_TAG, HANDOFF_TAG, REFUND_TAG, TICKET_TAG, UNKNOWN_ORDER_ID};

    fn engine_fixture() -> SupportEngine {
        SupportEngine::from_config(&BotConfig::default())
    }

    #[test]
    fn execute_routes_refund_queries() {
        let engine = engine_fixture();
        let state = engine.execute("I want a refund for order 987654").unwrap();

        assert_eq!(state.route(), Some(RouteLabel::Refund));
        assert!(state.result().starts_with(REFUND_TAG));
        assert!(state.result().contains("987654"));
        assert!(state.is_complete());
    }

    #[test]
    fn execute_routes_ticket_queries_with_valid_id() {
        let engine = engine_fixture();
        let state = engine.execute("please create a ticket").unwrap();

        assert_eq!(state.route(), Some(RouteLabel::Ticket));
        assert!(state.result().starts_with(TICKET_TAG));

        let id_digits = state
            .result()
            .split("TKT-")
            .nth(1)
            .and_then(|rest| rest.split('.').next())
            .expect("ticket result should embed a TKT- id");
        let id: u32 = id_digits.parse().expect("ticket id should be numeric");
        assert!((1000..=9999).contains(&id));
    }

    #[test]
    fn execute_routes_handoff_queries() {
        let engine = engine_fixture();
        for query in ["I have a complaint", "legal question", "talk to my lawyer"] {
            let state = engine.execute(query).unwrap();
            assert_eq!(state.route(), Some(RouteLabel::Handoff), "query: {query}");
            assert!(state.result().starts_with(HANDOFF_TAG));
        }
    }

    #[test]
    fn execute_defaults_to_faq_and_answers_from_kb() {
        let engine = engine_fixture();
        let state = engine.execute("How do I reset my password?").unwrap();

        assert_eq!(state.route(), Some(RouteLabel::Faq));
        assert!(state.result().starts_with(FAQ_TAG));
        assert!(state.result().contains("Reset Password"));
    }

    #[test]
    fn refund_outranks_ticket_in_mixed_queries() {
        let engine = engine_fixture();
        let state = engine.execute("open a ticket about my refund").unwrap();
        assert_eq!(state.route(), Some(RouteLabel::Refund));
    }

    #[test]
    fn execute_is_deterministic_for_non_ticket_routes() {
        let engine = engine_fixture();
        for query in ["refund order 12345", "complaint", "reset password", ""] {
            let first = engine.execute(query).unwrap();
            let second = engine.execute(query).unwrap();
            assert_eq!(first, second, "query: {query}");
        }
    }

    #[test]
    fn empty_query_flows_through_to_faq_fallback() {
        let engine = engine_fixture();
        let state = engine.execute("").unwrap();

        assert_eq!(state.route(), Some(RouteLabel::Faq));
        assert!(state.result().starts_with(FAQ_TAG));
        assert!(state.result().contains(engine.knowledge_base().fallback()));
        assert!(state.is_complete());
    }

    #[test]
    fn refund_without_order_id_uses_placeholder() {
        let engine = engine_fixture();
        let state = engine.execute("refund please").unwrap();
        assert!(state.result().contains(UNKNOWN_ORDER_ID));
    }

    #[test]
    fn dispatch_without_route_fails_fast() {
        let engine = engine_fixture();
        let mut state = RoutingState::new("anything");

        assert_eq!(engine.dispatch(&mut state), Err(RoutingError::RouteUnset));
        assert!(!state.is_complete());
        assert!(state.result().is_empty());
    }

    #[test]
    fn state_lifecycle_starts_incomplete() {
        let state = RoutingState::new("a query");
        assert_eq!(state.query(), "a query");
        assert_eq!(state.route(), None);
        assert!(state.result().is_empty());
        assert!(!state.is_complete());
    }
}
