//! Versioned swarm configuration schema.
//!
//! This module provides:
//! - Rust structs representing the configuration document
//! - Serialization to/from the orchestrator's camelCase JSON dialect
//! - Invariant validation against a catalog
//! - The current schema version constant

pub mod schema;

pub use schema::{
    AgentsConfig, CURRENT_SCHEMA_VERSION, Configuration, FaultTolerance, MemoryBackend,
    MemoryConfig, Metadata, OrchestratorConfig, Provenance, Specialization, TaskConfig,
};
