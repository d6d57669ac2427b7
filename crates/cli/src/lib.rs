pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use deskbot_core::config::{BotConfig, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "deskbot",
    about = "Deskbot support routing CLI",
    long_about = "Route customer-support queries to FAQ, refund, ticket, or human-handoff \
                  handlers, and inspect the routing configuration.",
    after_help = "Examples:\n  deskbot ask \"I want a refund for order 987654\"\n  deskbot repl\n  deskbot doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start the interactive support console (type exit or quit to leave)")]
    Repl,
    #[command(about = "Route a single query and print the route and result")]
    Ask {
        #[arg(help = "The support query to route")]
        query: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, KB table, and routing rule readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Command::Repl => commands::repl::run(),
        Command::Ask { query, json } => commands::ask::run(&query, json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_tracing() {
    // Commands re-load and report config errors themselves; logging falls
    // back to defaults rather than blocking startup.
    let logging = BotConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| BotConfig::default().logging);

    let filter = EnvFilter::try_from_env("DESKBOT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let initialized = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // A second init (e.g. in tests) is fine to ignore.
    let _ = initialized;
}
