use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use deskbot_core::config::{BotConfig, LoadOptions};
use deskbot_core::engine::{RoutingError, SupportEngine};
use tracing::info;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match BotConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("repl", "config_validation", error.to_string(), 2)
        }
    };

    let engine = SupportEngine::from_config(&config);
    let stdin = io::stdin();
    let stdout = io::stdout();

    match run_session(&engine, stdin.lock(), stdout.lock()) {
        Ok(handled) => {
            CommandResult::success("repl", format!("session closed after {handled} queries"))
        }
        Err(error) => {
            if error.downcast_ref::<RoutingError>().is_some() {
                CommandResult::failure("repl", "routing_invariant", error.to_string(), 5)
            } else {
                CommandResult::failure("repl", "io", error.to_string(), 1)
            }
        }
    }
}

/// Interactive read-loop: one query per line, `exit`/`quit`
/// (case-insensitive, whitespace-trimmed) ends the session. Returns the
/// number of queries handled.
pub fn run_session(
    engine: &SupportEngine,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<u64> {
    writeln!(output, "deskbot support console (type 'exit' or 'quit' to leave)")
        .context("failed to write console banner")?;

    let mut handled = 0u64;
    for line in input.lines() {
        let line = line.context("failed to read query from input")?;
        let query = line.trim();

        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        let state = engine.execute(query)?;
        let route = state.route().map(|route| route.as_str()).unwrap_or("unset");
        info!(
            event_name = "support.query.routed",
            route,
            query_len = query.len(),
            "query routed"
        );

        writeln!(output, "route: {route}").context("failed to write route")?;
        writeln!(output, "{}\n", state.result()).context("failed to write result")?;
        handled += 1;
    }

    info!(event_name = "support.session.closed", handled, "console session closed");
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use deskbot_core::config::BotConfig;
    use deskbot_core::engine::SupportEngine;

    use super::run_session;

    fn session_output(input: &str) -> (u64, String) {
        let engine = SupportEngine::from_config(&BotConfig::default());
        let mut output = Vec::new();
        let handled = run_session(&engine, input.as_bytes(), &mut output)
            .expect("session should complete");
        (handled, String::from_utf8(output).expect("console output should be utf-8"))
    }

    #[test]
    fn session_routes_queries_until_exit_sentinel() {
        let (handled, output) =
            session_output("I want a refund for order 987654\nreset password\nexit\n");

        assert_eq!(handled, 2);
        assert!(output.contains("route: refund"));
        assert!(output.contains("987654"));
        assert!(output.contains("route: faq"));
        assert!(output.contains("[FAQ]"));
    }

    #[test]
    fn sentinel_is_case_insensitive_and_trimmed() {
        for sentinel in ["exit", "QUIT", "  Exit  ", "quit"] {
            let (handled, _) = session_output(&format!("{sentinel}\nrefund order 12345\n"));
            assert_eq!(handled, 0, "sentinel `{sentinel}` should end the session immediately");
        }
    }

    #[test]
    fn session_ends_at_end_of_input_without_sentinel() {
        let (handled, output) = session_output("open a ticket\n");
        assert_eq!(handled, 1);
        assert!(output.contains("route: ticket"));
        assert!(output.contains("TKT-"));
    }
}
