//! Shared domain types and configuration for the vantage workspace.
//!
//! Holds the post record and its enums, the own/competitor account model,
//! detection tunables, and the env-driven application config. No I/O beyond
//! reading environment variables lives here.

use thiserror::Error;

pub mod accounts;
pub mod app_config;
pub mod config;
pub mod post;
pub mod settings;

pub use accounts::{Account, Relationship};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use post::{Annotations, EngagementCounts, MediaType, Platform, Post};
pub use settings::DetectionSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
