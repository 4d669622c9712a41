//! Schema definitions for the versioned swarm configuration document.
//!
//! A `Configuration` is created once per synthesis run or per migrated
//! file, serialized, and never mutated in place. Field names follow the
//! external orchestrator's camelCase JSON dialect.

use crate::catalog::{AgentCatalog, AgentRole, ModelTier, Strategy, Topology, VerificationPolicy};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The structural contract version this build writes.
pub const CURRENT_SCHEMA_VERSION: &str = "2.0.0";

/// Inclusive bounds for `orchestrator.maxAgents`.
pub const MAX_AGENTS_RANGE: std::ops::RangeInclusive<u8> = 1..=20;

/// Minimum allowed health check interval in milliseconds.
pub const MIN_HEALTH_CHECK_INTERVAL_MS: u64 = 1000;

/// How a configuration came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Built fresh from a catalog selection.
    Synthesized,
    /// Rewritten from a legacy document.
    Migrated,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Synthesized => write!(f, "synthesized"),
            Provenance::Migrated => write!(f, "migrated"),
        }
    }
}

/// Fault tolerance policy passed through to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultTolerance {
    /// Retry count for failed agent operations.
    pub retries: u32,
    /// Whether byzantine fault handling is enabled.
    pub byzantine: bool,
    /// Health check interval in milliseconds (>= 1000).
    pub health_check_interval_ms: u64,
}

/// Orchestrator section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorConfig {
    /// Maximum number of agents (1-20).
    pub max_agents: u8,
    /// Maximum number of concurrently active agents (<= maxAgents).
    pub max_concurrent_agents: u8,
    /// Coordination topology.
    pub topology: Topology,
    /// Orchestration strategy.
    pub strategy: Strategy,
    /// Fault tolerance policy.
    pub fault_tolerance: FaultTolerance,
}

/// Per-agent specialization block derived from the catalog definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    /// Role the agent plays inside the swarm.
    pub role: AgentRole,
    /// Model tier assigned by the preset (sonnet when unreferenced).
    pub tier: ModelTier,
    /// Declared capabilities.
    pub capabilities: Vec<String>,
    /// Verification policy (explicit or the generic default).
    pub verification: VerificationPolicy,
}

/// Agents section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsConfig {
    /// Selected agent ids: stable sorted, de-duplicated, never empty.
    pub selected: Vec<String>,
    /// Specialization block per selected agent.
    pub specializations: BTreeMap<String, Specialization>,
}

/// Memory backend kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryBackend {
    #[default]
    Sqlite,
    Json,
    InMemory,
}

impl std::fmt::Display for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryBackend::Sqlite => write!(f, "sqlite"),
            MemoryBackend::Json => write!(f, "json"),
            MemoryBackend::InMemory => write!(f, "in-memory"),
        }
    }
}

/// Memory section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    /// Backend kind.
    pub backend: MemoryBackend,
    /// Whether memory persists across sessions.
    pub persistent: bool,
    /// Cache size in MB (> 0).
    #[serde(rename = "cacheSizeMB")]
    pub cache_size_mb: u64,
    /// Memory namespaces.
    pub namespaces: Vec<String>,
}

/// Task section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    /// Free-text task description.
    pub description: String,
    /// Preset id the configuration was built from.
    pub preset: String,
}

/// Metadata section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Unique id of this configuration instance.
    pub id: uuid::Uuid,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Schema version; always `CURRENT_SCHEMA_VERSION` after a successful
    /// synthesis or migration.
    pub version: String,
    /// How the configuration came to exist.
    pub provenance: Provenance,
    /// Identifying filename/label of the legacy source (migrated only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

/// The versioned configuration aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub orchestrator: OrchestratorConfig,
    pub agents: AgentsConfig,
    pub memory: MemoryConfig,
    pub task: TaskConfig,
    pub metadata: Metadata,
}

impl Configuration {
    /// Validate the configuration invariants against a catalog.
    ///
    /// On violation, fails with `SchemaInvariant` naming the invariant.
    /// Never coerces an invalid state into a valid one.
    pub fn validate(&self, catalog: &AgentCatalog) -> Result<()> {
        if self.agents.selected.is_empty() {
            return Err(Error::SchemaInvariant(
                "agents must not be empty".to_string(),
            ));
        }

        let unknown: Vec<String> = self
            .agents
            .selected
            .iter()
            .filter(|id| !catalog.has_agent(id))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(Error::SchemaInvariant(format!(
                "selected agents not present in catalog: {}",
                unknown.join(", ")
            )));
        }

        if !MAX_AGENTS_RANGE.contains(&self.orchestrator.max_agents) {
            return Err(Error::SchemaInvariant(format!(
                "maxAgents must be in {}..={}, got {}",
                MAX_AGENTS_RANGE.start(),
                MAX_AGENTS_RANGE.end(),
                self.orchestrator.max_agents
            )));
        }

        if self.orchestrator.max_concurrent_agents == 0
            || self.orchestrator.max_concurrent_agents > self.orchestrator.max_agents
        {
            return Err(Error::SchemaInvariant(format!(
                "maxConcurrentAgents must be in 1..=maxAgents ({}), got {}",
                self.orchestrator.max_agents, self.orchestrator.max_concurrent_agents
            )));
        }

        if self.orchestrator.fault_tolerance.health_check_interval_ms
            < MIN_HEALTH_CHECK_INTERVAL_MS
        {
            return Err(Error::SchemaInvariant(format!(
                "healthCheckIntervalMs must be >= {}, got {}",
                MIN_HEALTH_CHECK_INTERVAL_MS,
                self.orchestrator.fault_tolerance.health_check_interval_ms
            )));
        }

        if self.memory.cache_size_mb == 0 {
            return Err(Error::SchemaInvariant(
                "cacheSizeMB must be > 0".to_string(),
            ));
        }

        for id in &self.agents.selected {
            let spec = self.agents.specializations.get(id).ok_or_else(|| {
                Error::SchemaInvariant(format!("agent '{}' has no specialization block", id))
            })?;
            if !(0.0..=1.0).contains(&spec.verification.truth_threshold) {
                return Err(Error::SchemaInvariant(format!(
                    "agent '{}': truthThreshold must be in [0, 1], got {}",
                    id, spec.verification.truth_threshold
                )));
            }
        }

        if self.metadata.version != CURRENT_SCHEMA_VERSION {
            return Err(Error::SchemaInvariant(format!(
                "version must be {}, got {}",
                CURRENT_SCHEMA_VERSION, self.metadata.version
            )));
        }

        Ok(())
    }
}
