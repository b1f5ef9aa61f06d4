//! Shared configuration and domain vocabulary for the solarhub ingestion jobs.

pub mod app_config;
pub mod config;
pub mod records;
pub mod source;

pub use app_config::{AppConfig, Environment, NewsFormat, NewsLocale};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{ContentRecord, MediaRecord, NewsRecord, DEFAULT_LANGUAGE, YOUTUBE_PLATFORM};
pub use source::SourceKind;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
