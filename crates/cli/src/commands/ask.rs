use deskbot_core::config::{BotConfig, LoadOptions};
use deskbot_core::engine::SupportEngine;
use serde::Serialize;
use tracing::info;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct AskPayload<'a> {
    query: &'a str,
    route: &'a str,
    result: &'a str,
}

pub fn run(query: &str, json_output: bool) -> CommandResult {
    let config = match BotConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("ask", "config_validation", error.to_string(), 2)
        }
    };

    let engine = SupportEngine::from_config(&config);
    let state = match engine.execute(query) {
        Ok(state) => state,
        Err(error) => {
            return CommandResult::failure("ask", "routing_invariant", error.to_string(), 5)
        }
    };

    let route = state.route().map(|route| route.as_str()).unwrap_or("unset");
    info!(event_name = "support.query.routed", route, query_len = query.len(), "query routed");

    let output = if json_output {
        let payload = AskPayload { query: state.query(), route, result: state.result() };
        serde_json::to_string(&payload).unwrap_or_else(|error| {
            format!(
                "{{\"query\":\"\",\"route\":\"{route}\",\"result\":\"serialization failed: {}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        })
    } else {
        format!("route: {route}\n{}", state.result())
    };

    CommandResult { exit_code: 0, output }
}
