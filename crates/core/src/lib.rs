pub mod classify;
pub mod config;
pub mod engine;
pub mod handlers;
pub mod kb;

pub use classify::{IntentClassifier, RouteLabel, RouteRule};
pub use config::{
    BotConfig, ConfigError, ConfigOverrides, KbConfig, KbEntryConfig, LoadOptions, LogFormat,
    LoggingConfig, RouteRuleConfig, RoutingConfig, SynonymConfig,
};
pub use engine::{RoutingError, RoutingState, SupportEngine};
pub use kb::{KbEntry, KnowledgeBase, Synonym};
