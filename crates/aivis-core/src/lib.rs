//! Shared configuration and domain primitives for AIVIS.
//!
//! Holds the environment-driven [`AppConfig`], the project seed file loader,
//! and the derived per-keyword display status. Everything here is free of I/O
//! except the seed file reader.

pub mod app_config;
pub mod config;
pub mod projects;
pub mod status;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use projects::{load_projects, ProjectSeed, ProjectsFile};
pub use status::{DisplayStatus, VisibilitySignals};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read projects file {path}: {source}")]
    ProjectsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse projects file: {0}")]
    ProjectsFileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
