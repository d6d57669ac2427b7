use deskbot_core::config::{BotConfig, LoadOptions};
use deskbot_core::engine::SupportEngine;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match BotConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_kb_table(&config));
            checks.push(check_routing_rules(&config));
            checks.push(check_routing_probe(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["kb_table", "routing_rules", "routing_probe"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_kb_table(config: &BotConfig) -> DoctorCheck {
    let empty_phrases = config
        .kb
        .entries
        .iter()
        .filter(|entry| entry.phrase.split_whitespace().next().is_none())
        .count();

    if empty_phrases > 0 {
        return DoctorCheck {
            name: "kb_table",
            status: CheckStatus::Fail,
            details: format!("{empty_phrases} KB entries have no keywords"),
        };
    }

    DoctorCheck {
        name: "kb_table",
        status: CheckStatus::Pass,
        details: format!(
            "{} entries, {} synonym expansions",
            config.kb.entries.len(),
            config.kb.synonyms.len()
        ),
    }
}

fn check_routing_rules(config: &BotConfig) -> DoctorCheck {
    let trigger_count: usize =
        config.routing.rules.iter().map(|rule| rule.triggers.len()).sum();

    DoctorCheck {
        name: "routing_rules",
        status: CheckStatus::Pass,
        details: format!(
            "{} rules with {} trigger substrings, default route faq",
            config.routing.rules.len(),
            trigger_count
        ),
    }
}

/// End-to-end probe: run one canned query through the engine and verify the
/// completed state carries a tagged result.
fn check_routing_probe(config: &BotConfig) -> DoctorCheck {
    let engine = SupportEngine::from_config(config);

    match engine.execute("doctor readiness probe") {
        Ok(state) if state.is_complete() && state.result().starts_with('[') => DoctorCheck {
            name: "routing_probe",
            status: CheckStatus::Pass,
            details: format!(
                "probe routed to `{}` with tagged result",
                state.route().map(|route| route.as_str()).unwrap_or("unset")
            ),
        },
        Ok(state) => DoctorCheck {
            name: "routing_probe",
            status: CheckStatus::Fail,
            details: format!("probe produced an incomplete or untagged state: {state:?}"),
        },
        Err(error) => DoctorCheck {
            name: "routing_probe",
            status: CheckStatus::Fail,
            details: format!("probe execution failed: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
