use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::RouteLabel;

/// Effective bot configuration: the KB table, the priority-ordered
/// classification rules, and logging. Immutable after load; the engine is
/// constructed from it once at startup.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub kb: KbConfig,
    pub routing: RoutingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct KbConfig {
    pub entries: Vec<KbEntryConfig>,
    pub synonyms: Vec<SynonymConfig>,
    pub fallback: String,
}

/// One configured KB row: the phrase's whitespace-split lowercase words
/// form the keyword set; declaration order is the match priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbEntryConfig {
    pub phrase: String,
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymConfig {
    pub token: String,
    pub expands_to: String,
}

#[derive(Clone, Debug)]
pub struct RoutingConfig {
    pub rules: Vec<RouteRuleConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRuleConfig {
    pub triggers: Vec<String>,
    pub route: RouteLabel,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub kb_fallback: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            kb: KbConfig {
                entries: vec![
                    KbEntryConfig {
                        phrase: "reset password".to_string(),
                        answer: "Go to Settings > Security > Reset Password. You'll get a \
                                 one-time link by email."
                            .to_string(),
                    },
                    KbEntryConfig {
                        phrase: "shipping status".to_string(),
                        answer: "Open Orders > Track to see real-time shipment updates."
                            .to_string(),
                    },
                    KbEntryConfig {
                        phrase: "refund policy".to_string(),
                        answer: "Refunds are available within 30 days if unused and in original \
                                 packaging."
                            .to_string(),
                    },
                ],
                synonyms: vec![SynonymConfig {
                    token: "pwd".to_string(),
                    expands_to: "password".to_string(),
                }],
                fallback: "I couldn't find that in the KB. Please try rephrasing or open a \
                           ticket."
                    .to_string(),
            },
            routing: RoutingConfig {
                rules: vec![
                    RouteRuleConfig {
                        triggers: vec!["refund".to_string()],
                        route: RouteLabel::Refund,
                    },
                    RouteRuleConfig {
                        triggers: vec!["ticket".to_string()],
                        route: RouteLabel::Ticket,
                    },
                    RouteRuleConfig {
                        triggers: vec![
                            "complaint".to_string(),
                            "legal".to_string(),
                            "lawyer".to_string(),
                        ],
                        route: RouteLabel::Handoff,
                    },
                ],
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl BotConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("deskbot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(kb) = patch.kb {
            if let Some(entries) = kb.entries {
                self.kb.entries = entries;
            }
            if let Some(synonyms) = kb.synonyms {
                self.kb.synonyms = synonyms;
            }
            if let Some(fallback) = kb.fallback {
                self.kb.fallback = fallback;
            }
        }

        if let Some(routing) = patch.routing {
            if let Some(rules) = routing.rules {
                self.routing.rules = rules;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DESKBOT_KB_FALLBACK") {
            self.kb.fallback = value;
        }

        let log_level =
            read_env("DESKBOT_LOGGING_LEVEL").or_else(|| read_env("DESKBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("DESKBOT_LOGGING_FORMAT").or_else(|| read_env("DESKBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(kb_fallback) = overrides.kb_fallback {
            self.kb.fallback = kb_fallback;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_kb(&self.kb)?;
        validate_routing(&self.routing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("deskbot.toml"), PathBuf::from("config/deskbot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_kb(kb: &KbConfig) -> Result<(), ConfigError> {
    if kb.entries.is_empty() {
        return Err(ConfigError::Validation(
            "kb.entries must contain at least one phrase/answer pair".to_string(),
        ));
    }

    for (index, entry) in kb.entries.iter().enumerate() {
        if entry.phrase.split_whitespace().next().is_none() {
            return Err(ConfigError::Validation(format!(
                "kb.entries[{index}].phrase must contain at least one keyword"
            )));
        }
        if entry.answer.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "kb.entries[{index}].answer must not be empty"
            )));
        }
    }

    for (index, synonym) in kb.synonyms.iter().enumerate() {
        if synonym.token.trim().is_empty() || synonym.expands_to.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "kb.synonyms[{index}] must have a non-empty token and expansion"
            )));
        }
    }

    if kb.fallback.trim().is_empty() {
        return Err(ConfigError::Validation("kb.fallback must not be empty".to_string()));
    }

    Ok(())
}

fn validate_routing(routing: &RoutingConfig) -> Result<(), ConfigError> {
    if routing.rules.is_empty() {
        return Err(ConfigError::Validation(
            "routing.rules must contain at least one rule".to_string(),
        ));
    }

    for (index, rule) in routing.rules.iter().enumerate() {
        if rule.triggers.is_empty() {
            return Err(ConfigError::Validation(format!(
                "routing.rules[{index}] must list at least one trigger substring"
            )));
        }
        if rule.triggers.iter().any(|trigger| trigger.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "routing.rules[{index}] contains an empty trigger substring"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    kb: Option<KbPatch>,
    routing: Option<RoutingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct KbPatch {
    entries: Option<Vec<KbEntryConfig>>,
    synonyms: Option<Vec<SynonymConfig>>,
    fallback: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RoutingPatch {
    rules: Option<Vec<RouteRuleConfig>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
