//! Legacy configuration migration.
//!
//! `ConfigMigrator` rewrites configuration documents produced under the
//! legacy (pre-2.0, flat `project`/`agents`/`swarm`/`settings`) schema
//! into the current schema. The mapping is a fixed, statically declared
//! field table so every mapping is enumerable and testable in isolation;
//! every current field with no legacy counterpart is filled by the same
//! defaulting rules the synthesizer uses, so migrated and freshly
//! synthesized configurations are structurally identical.
//!
//! The migrator keeps no state across calls; each `migrate` invocation is
//! a pure function of its input document plus the fixed defaulting rules.

pub mod units;

use crate::catalog::{AgentCatalog, PRESET_NONE, Strategy, Topology};
use crate::config::{
    AgentsConfig, CURRENT_SCHEMA_VERSION, Configuration, Metadata, OrchestratorConfig, Provenance,
    TaskConfig,
};
use crate::synth::{ConfigSynthesizer, defaults};
use crate::{Error, Result};
use chrono::Utc;
use serde_json::Value;

/// Transform applied to a legacy value before insertion.
type Transform = fn(&Value) -> Result<Value>;

/// One row of the legacy-to-current field table.
struct FieldMapping {
    /// Dotted path in the legacy document.
    legacy: &'static str,
    /// Dotted path in the current-schema draft.
    target: &'static str,
    /// Optional value transform; `None` copies verbatim.
    transform: Option<Transform>,
}

/// The fixed field table.
///
/// Paths absent from the legacy document are skipped here and filled from
/// defaults afterwards.
const FIELD_TABLE: &[FieldMapping] = &[
    FieldMapping {
        legacy: "agents.selected",
        target: "agents.selected",
        transform: Some(agent_list),
    },
    FieldMapping {
        legacy: "swarm.topology",
        target: "orchestrator.topology",
        transform: Some(topology_value),
    },
    FieldMapping {
        legacy: "swarm.strategy",
        target: "orchestrator.strategy",
        transform: Some(strategy_value),
    },
    FieldMapping {
        legacy: "swarm.maxAgents",
        target: "orchestrator.maxAgents",
        transform: Some(small_int),
    },
    FieldMapping {
        legacy: "settings.memorySize",
        target: "memory.cacheSizeMB",
        transform: Some(size_to_mb),
    },
    FieldMapping {
        legacy: "settings.persistence",
        target: "memory.persistent",
        transform: Some(bool_value),
    },
    FieldMapping {
        legacy: "settings.healthCheckInterval",
        target: "orchestrator.faultTolerance.healthCheckIntervalMs",
        transform: Some(duration_to_ms),
    },
    FieldMapping {
        legacy: "project.description",
        target: "task.description",
        transform: Some(string_value),
    },
    FieldMapping {
        legacy: "project.preset",
        target: "task.preset",
        transform: Some(string_value),
    },
];

/// De-duplicate and stable-sort a legacy agent id array.
fn agent_list(value: &Value) -> Result<Value> {
    let array = value.as_array().ok_or_else(|| {
        Error::InvalidInput("agents.selected must be an array of strings".to_string())
    })?;
    let mut ids = Vec::with_capacity(array.len());
    for entry in array {
        let id = entry.as_str().ok_or_else(|| {
            Error::InvalidInput(format!("agents.selected entry is not a string: {}", entry))
        })?;
        ids.push(id.to_string());
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(Value::from(ids))
}

/// Validate and normalize a topology string.
fn topology_value(value: &Value) -> Result<Value> {
    let text = expect_str(value, "swarm.topology")?;
    let topology: Topology = text.parse()?;
    Ok(Value::from(topology.as_str()))
}

/// Validate and normalize a strategy string.
fn strategy_value(value: &Value) -> Result<Value> {
    let text = expect_str(value, "swarm.strategy")?;
    let strategy: Strategy = text.parse()?;
    Ok(Value::from(strategy.as_str()))
}

/// Validate a small integer field.
fn small_int(value: &Value) -> Result<Value> {
    let number = value
        .as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| Error::InvalidInput(format!("expected a small integer, got {}", value)))?;
    Ok(Value::from(number))
}

/// Parse a legacy memory size (string with unit, or bare MB number).
fn size_to_mb(value: &Value) -> Result<Value> {
    match value {
        Value::String(text) => Ok(Value::from(units::parse_size_mb(text)?)),
        Value::Number(n) if n.as_u64().is_some() => Ok(value.clone()),
        other => Err(Error::UnitParse {
            value: other.to_string(),
        }),
    }
}

/// Parse a legacy health check interval (string with unit, or bare ms number).
fn duration_to_ms(value: &Value) -> Result<Value> {
    match value {
        Value::String(text) => Ok(Value::from(units::parse_duration_ms(text)?)),
        Value::Number(n) if n.as_u64().is_some() => Ok(value.clone()),
        other => Err(Error::UnitParse {
            value: other.to_string(),
        }),
    }
}

fn bool_value(value: &Value) -> Result<Value> {
    value
        .as_bool()
        .map(Value::from)
        .ok_or_else(|| Error::InvalidInput(format!("expected a boolean, got {}", value)))
}

fn string_value(value: &Value) -> Result<Value> {
    expect_str(value, "field").map(Value::from)
}

fn expect_str<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::InvalidInput(format!("{} must be a string, got {}", field, value)))
}

/// Walk a dotted path through nested objects.
fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Insert a value at a dotted path, creating intermediate objects.
fn insert_path(draft: &mut serde_json::Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            draft.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = draft
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(map) = entry {
                insert_path(map, rest, value);
            }
        }
    }
}

/// Check whether a document already carries the current schema shape.
///
/// Legacy documents have no reliable version tag, so shape sniffing is
/// the detection mechanism: anything without the current top-level
/// sections is treated as legacy.
pub fn is_current_shape(doc: &Value) -> bool {
    doc.get("orchestrator").is_some() && doc.get("metadata").is_some()
}

/// Partitioned result of a batch migration.
#[derive(Debug)]
pub struct MigrationReport {
    /// Configurations migrated successfully, in input order.
    pub successes: Vec<Configuration>,
    /// Labels and errors of the documents that failed, in input order.
    pub failures: Vec<(String, Error)>,
}

impl MigrationReport {
    /// Check whether every document migrated.
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rewrites legacy configuration documents into the current schema.
#[derive(Debug, Clone, Copy)]
pub struct ConfigMigrator<'a> {
    catalog: &'a AgentCatalog,
}

impl<'a> ConfigMigrator<'a> {
    /// Create a migrator over a catalog.
    pub fn new(catalog: &'a AgentCatalog) -> Self {
        Self { catalog }
    }

    /// Migrate one legacy document.
    ///
    /// `label` identifies the document (usually its filename) and is
    /// recorded in `metadata.sourceFile`. The result satisfies the same
    /// invariants as a freshly synthesized configuration; violations fail
    /// with `SchemaInvariant` naming the invariant, never a silent
    /// coercion.
    pub fn migrate(&self, label: &str, doc: &Value) -> Result<Configuration> {
        if is_current_shape(doc) {
            return Err(Error::InvalidInput(format!(
                "'{}' already carries the current schema",
                label
            )));
        }
        if !doc.is_object() {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a configuration document",
                label
            )));
        }

        // Apply the field table to build the current-schema draft.
        let mut draft = serde_json::Map::new();
        for mapping in FIELD_TABLE {
            if let Some(value) = lookup_path(doc, mapping.legacy) {
                let mapped = match mapping.transform {
                    Some(transform) => transform(value)?,
                    None => value.clone(),
                };
                insert_path(&mut draft, mapping.target, mapped);
            }
        }
        let draft = Value::Object(draft);

        // Selected agents: batch-report unknown ids, same rule as synthesis.
        let selected: Vec<String> = match lookup_path(&draft, "agents.selected") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let (selection, unknown) =
            self.catalog.partition_agent_ids(selected.iter().map(String::as_str));
        if !unknown.is_empty() {
            return Err(Error::UnknownAgents(unknown));
        }

        // Fill every field with no legacy counterpart from the shared
        // defaulting rules.
        let max_agents = match lookup_path(&draft, "orchestrator.maxAgents") {
            Some(value) => value.as_u64().and_then(|n| u8::try_from(n).ok()).ok_or_else(
                || Error::InvalidInput(format!("maxAgents out of range: {}", value)),
            )?,
            None => defaults::max_agents(selection.len()),
        };
        let topology = match lookup_path(&draft, "orchestrator.topology") {
            Some(value) => expect_str(value, "orchestrator.topology")?.parse()?,
            None => Topology::default(),
        };
        let strategy = match lookup_path(&draft, "orchestrator.strategy") {
            Some(value) => expect_str(value, "orchestrator.strategy")?.parse()?,
            None => Strategy::default(),
        };

        let mut fault_tolerance = defaults::fault_tolerance(topology);
        if let Some(value) = lookup_path(&draft, "orchestrator.faultTolerance.healthCheckIntervalMs") {
            fault_tolerance.health_check_interval_ms =
                value.as_u64().unwrap_or(fault_tolerance.health_check_interval_ms);
        }

        let mut memory = defaults::memory();
        if let Some(value) = lookup_path(&draft, "memory.cacheSizeMB") {
            if let Some(mb) = value.as_u64() {
                memory.cache_size_mb = mb;
            }
        }
        if let Some(value) = lookup_path(&draft, "memory.persistent") {
            if let Some(persistent) = value.as_bool() {
                memory.persistent = persistent;
            }
        }

        let description = lookup_path(&draft, "task.description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let preset = lookup_path(&draft, "task.preset")
            .and_then(Value::as_str)
            .unwrap_or(PRESET_NONE)
            .to_string();

        // Specializations: reuse the synthesizer's rules. Legacy documents
        // carry no tiers, so derivation runs against the default preset.
        let specializations = ConfigSynthesizer::new(self.catalog)
            .build_specializations(&selection, &AgentCatalog::default_preset())?;

        let config = Configuration {
            orchestrator: OrchestratorConfig {
                max_agents,
                max_concurrent_agents: defaults::concurrency(max_agents, selection.len(), None),
                topology,
                strategy,
                fault_tolerance,
            },
            agents: AgentsConfig {
                selected: selection,
                specializations,
            },
            memory,
            task: TaskConfig {
                description,
                preset,
            },
            metadata: Metadata {
                id: uuid::Uuid::new_v4(),
                created: Utc::now(),
                version: CURRENT_SCHEMA_VERSION.to_string(),
                provenance: Provenance::Migrated,
                source_file: Some(label.to_string()),
            },
        };

        config.validate(self.catalog)?;
        Ok(config)
    }

    /// Migrate a batch of labeled documents independently.
    ///
    /// One failing document never aborts the batch; the report is
    /// partitioned so the caller can say precisely which inputs failed
    /// and why.
    pub fn migrate_batch(&self, documents: &[(String, Value)]) -> MigrationReport {
        let mut report = MigrationReport {
            successes: Vec::new(),
            failures: Vec::new(),
        };
        for (label, doc) in documents {
            match self.migrate(label, doc) {
                Ok(config) => report.successes.push(config),
                Err(error) => report.failures.push((label.clone(), error)),
            }
        }
        report
    }
}
