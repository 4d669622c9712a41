//! Hivecfg - swarm configuration synthesis and migration for the `hive` CLI.
//!
//! This library provides the core functionality for the `hive` CLI tool:
//! loading the agent/preset catalog, synthesizing versioned swarm
//! configurations, materializing the on-disk swarm layout, and migrating
//! legacy configuration documents to the current schema.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod migrate;
pub mod synth;

use std::path::PathBuf;

/// Library-level error type for hivecfg operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown agents: {}", .0.join(", "))]
    UnknownAgents(Vec<String>),

    #[error("Cannot parse unit value: '{value}'")]
    UnitParse { value: String },

    #[error("Schema invariant violated: {0}")]
    SchemaInvariant(String),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for hivecfg operations.
pub type Result<T> = std::result::Result<T, Error>;
