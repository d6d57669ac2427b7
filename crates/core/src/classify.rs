//! Intent classification
//!
//! Maps a raw query to one of the four route labels by scanning an ordered
//! rule table of trigger substrings. Evaluation is case-insensitive raw
//! substring containment over the lowercased query, with no tokenization or
//! word-boundary handling ("ticketing" contains "ticket" and routes to
//! Ticket; that is the documented contract, not a defect).

use serde::{Deserialize, Serialize};

use crate::config::RoutingConfig;

/// The route selecting which handler processes a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteLabel {
    Faq,
    Refund,
    Ticket,
    Handoff,
}

impl RouteLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faq => "faq",
            Self::Refund => "refund",
            Self::Ticket => "ticket",
            Self::Handoff => "handoff",
        }
    }
}

impl std::fmt::Display for RouteLabel {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One classification rule: any contained trigger selects the route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteRule {
    pub triggers: Vec<String>,
    pub route: RouteLabel,
}

/// Priority-ordered substring classifier. Total over all inputs: the first
/// matching rule wins, and anything unmatched defaults to `Faq`.
#[derive(Clone, Debug)]
pub struct IntentClassifier {
    rules: Vec<RouteRule>,
}

impl IntentClassifier {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| RouteRule {
                triggers: rule
                    .triggers
                    .into_iter()
                    .map(|trigger| trigger.to_ascii_lowercase())
                    .collect(),
                route: rule.route,
            })
            .collect();
        Self { rules }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(
            config
                .rules
                .iter()
                .map(|rule| RouteRule { triggers: rule.triggers.clone(), route: rule.route })
                .collect(),
        )
    }

    pub fn classify(&self, query: &str) -> RouteLabel {
        let normalized = query.to_ascii_lowercase();
        for rule in &self.rules {
            if rule.triggers.iter().any(|trigger| normalized.contains(trigger.as_str())) {
                return rule.route;
            }
        }
        RouteLabel::Faq
    }
}

#[cfg(test)]
mod tests {
    use super::{IntentClassifier, RouteLabel, RouteRule};

    fn classifier_fixture() -> IntentClassifier {
        IntentClassifier::new(vec![
            RouteRule { triggers: vec!["refund".to_string()], route: RouteLabel::Refund },
            RouteRule { triggers: vec!["ticket".to_string()], route: RouteLabel::Ticket },
            RouteRule {
                triggers: vec!["complaint".to_string(), "legal".to_string(), "lawyer".to_string()],
                route: RouteLabel::Handoff,
            },
        ])
    }

    #[test]
    fn classification_follows_rule_priority() {
        let classifier = classifier_fixture();

        struct Case {
            query: &'static str,
            expected: RouteLabel,
        }

        let cases = [
            Case { query: "I want a refund for order 987654", expected: RouteLabel::Refund },
            Case { query: "please open a ticket for me", expected: RouteLabel::Ticket },
            Case { query: "create a ticket", expected: RouteLabel::Ticket },
            Case { query: "I have a complaint", expected: RouteLabel::Handoff },
            Case { query: "my lawyer will contact you", expected: RouteLabel::Handoff },
            Case { query: "this is a legal matter", expected: RouteLabel::Handoff },
            Case { query: "how do I reset my password", expected: RouteLabel::Faq },
            Case { query: "", expected: RouteLabel::Faq },
            Case { query: "   ", expected: RouteLabel::Faq },
        ];

        for (index, case) in cases.iter().enumerate() {
            assert_eq!(
                classifier.classify(case.query),
                case.expected,
                "case {index}: {}",
                case.query
            );
        }
    }

    #[test]
    fn refund_outranks_ticket_when_both_triggers_present() {
        let classifier = classifier_fixture();
        assert_eq!(
            classifier.classify("open a ticket about my refund"),
            RouteLabel::Refund
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        let classifier = classifier_fixture();
        assert_eq!(classifier.classify("REFUND NOW"), RouteLabel::Refund);
        assert_eq!(classifier.classify("Legal Department"), RouteLabel::Handoff);
    }

    #[test]
    fn substring_containment_matches_inside_unrelated_words() {
        // Raw containment, no word-boundary guard.
        let classifier = classifier_fixture();
        assert_eq!(classifier.classify("I bought a ticketing app"), RouteLabel::Ticket);
    }

    #[test]
    fn triggers_are_lowercased_at_construction() {
        let classifier = IntentClassifier::new(vec![RouteRule {
            triggers: vec!["REFUND".to_string()],
            route: RouteLabel::Refund,
        }]);
        assert_eq!(classifier.classify("refund please"), RouteLabel::Refund);
    }

    #[test]
    fn route_labels_render_as_snake_case_strings() {
        assert_eq!(RouteLabel::Faq.as_str(), "faq");
        assert_eq!(RouteLabel::Handoff.to_string(), "handoff");
    }
}
