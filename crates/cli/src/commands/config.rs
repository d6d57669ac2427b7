use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use deskbot_core::config::{BotConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match BotConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "kb.entries",
        &format!("{} entries", config.kb.entries.len()),
        field_source(
            "kb.entries",
            &[],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "kb.synonyms",
        &format!("{} expansions", config.kb.synonyms.len()),
        field_source(
            "kb.synonyms",
            &[],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "kb.fallback",
        &config.kb.fallback,
        field_source(
            "kb.fallback",
            &["DESKBOT_KB_FALLBACK"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "routing.rules",
        &format!("{} rules", config.routing.rules.len()),
        field_source(
            "routing.rules",
            &[],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    for (index, rule) in config.routing.rules.iter().enumerate() {
        lines.push(format!(
            "  {index}. [{}] -> {}",
            rule.triggers.join(", "),
            rule.route.as_str()
        ));
    }
    lines.push("  (default) -> faq".to_string());

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source(
            "logging.level",
            &["DESKBOT_LOGGING_LEVEL", "DESKBOT_LOG_LEVEL"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source(
            "logging.format",
            &["DESKBOT_LOGGING_FORMAT", "DESKBOT_LOG_FORMAT"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("deskbot.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/deskbot.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
