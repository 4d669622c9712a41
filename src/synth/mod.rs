//! Configuration synthesis.
//!
//! `ConfigSynthesizer` combines a catalog selection (chosen agents + chosen
//! preset) with runtime parameters (task text, orchestrator overrides) into
//! one normalized, versioned `Configuration`. The `defaults` module holds
//! the default-filling rules; the migrator reuses them so migrated and
//! freshly synthesized configurations are structurally identical.

pub mod layout;

pub use layout::{LAYOUT_DIRS, materialize_layout};

use crate::catalog::{AgentCatalog, PRESET_NONE, PresetDefinition, Strategy, Topology};
use crate::config::{
    AgentsConfig, CURRENT_SCHEMA_VERSION, Configuration, MemoryConfig, Metadata,
    OrchestratorConfig, Provenance, Specialization, TaskConfig,
};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::BTreeMap;

/// Default-filling rules shared by synthesis and migration.
pub mod defaults {
    use super::*;
    use crate::catalog::VerificationPolicy;
    use crate::config::{FaultTolerance, MemoryBackend};

    /// Default ceiling on concurrently active agents.
    ///
    /// Bounds concurrent external process/API load, not an architectural
    /// limit: callers may override upward up to `maxAgents`.
    pub const DEFAULT_CONCURRENCY_CAP: u8 = 8;

    /// Generic verification policy for agents that define none.
    pub fn generic_verification_policy() -> VerificationPolicy {
        VerificationPolicy::new(
            vec!["test".to_string(), "validate".to_string()],
            0.85,
            10,
        )
    }

    /// Default fault tolerance policy for a topology.
    ///
    /// Peer-equal mesh swarms verify each other's claims, so byzantine
    /// handling is on there and off elsewhere.
    pub fn fault_tolerance(topology: Topology) -> FaultTolerance {
        FaultTolerance {
            retries: 3,
            byzantine: topology == Topology::Mesh,
            health_check_interval_ms: 5000,
        }
    }

    /// Default memory section.
    pub fn memory() -> MemoryConfig {
        MemoryConfig {
            backend: MemoryBackend::Sqlite,
            persistent: true,
            cache_size_mb: 100,
            namespaces: vec![
                "default".to_string(),
                "agents".to_string(),
                "sessions".to_string(),
                "workflows".to_string(),
            ],
        }
    }

    /// Default concurrency: `min(cap, preset default, maxAgents, selection size)`.
    pub fn concurrency(max_agents: u8, selection_len: usize, preset_default: Option<u8>) -> u8 {
        let selection = u8::try_from(selection_len).unwrap_or(u8::MAX);
        let mut value = DEFAULT_CONCURRENCY_CAP.min(max_agents).min(selection);
        if let Some(pinned) = preset_default {
            value = value.min(pinned);
        }
        value.max(1)
    }

    /// Default agent count when neither the caller nor the preset pins one.
    pub fn max_agents(selection_len: usize) -> u8 {
        u8::try_from(selection_len).unwrap_or(u8::MAX)
    }
}

/// Partial orchestrator record supplied by the caller.
///
/// `None` values fall back to preset defaults and derived values.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorOverrides {
    /// Override for `maxAgents`.
    pub max_agents: Option<u8>,
    /// Explicit override for `maxConcurrentAgents`; may exceed the default
    /// ceiling of 8 up to `maxAgents`.
    pub max_concurrent_agents: Option<u8>,
    /// Override for the topology.
    pub topology: Option<Topology>,
    /// Override for the strategy.
    pub strategy: Option<Strategy>,
}

/// Produces fresh configurations from catalog selections.
#[derive(Debug, Clone, Copy)]
pub struct ConfigSynthesizer<'a> {
    catalog: &'a AgentCatalog,
}

impl<'a> ConfigSynthesizer<'a> {
    /// Create a synthesizer over a catalog.
    pub fn new(catalog: &'a AgentCatalog) -> Self {
        Self { catalog }
    }

    /// Synthesize a configuration.
    ///
    /// - Every selected id must exist in the catalog; unknown ids are
    ///   reported all at once via `UnknownAgents`.
    /// - `preset_id = None` (or the `"none"` sentinel) falls back to the
    ///   default preset.
    /// - An empty selection falls back to the preset's required agents.
    ///
    /// Returns the configuration value; persistence is the caller's
    /// concern.
    pub fn synthesize(
        &self,
        selected_agent_ids: &[String],
        preset_id: Option<&str>,
        task: &str,
        overrides: &OrchestratorOverrides,
    ) -> Result<Configuration> {
        let preset = self
            .catalog
            .get_preset(preset_id.unwrap_or(PRESET_NONE))?
            .into_owned();

        let selection = self.resolve_selection(selected_agent_ids, &preset)?;

        let max_agents = overrides
            .max_agents
            .or(preset.defaults.max_agents)
            .unwrap_or_else(|| defaults::max_agents(selection.len()));

        let max_concurrent_agents = overrides.max_concurrent_agents.unwrap_or_else(|| {
            defaults::concurrency(
                max_agents,
                selection.len(),
                preset.defaults.max_concurrent_agents,
            )
        });

        let topology = overrides.topology.unwrap_or(preset.topology);
        let strategy = overrides.strategy.unwrap_or(preset.defaults.strategy);

        let specializations = self.build_specializations(&selection, &preset)?;

        let config = Configuration {
            orchestrator: OrchestratorConfig {
                max_agents,
                max_concurrent_agents,
                topology,
                strategy,
                fault_tolerance: defaults::fault_tolerance(topology),
            },
            agents: AgentsConfig {
                selected: selection,
                specializations,
            },
            memory: defaults::memory(),
            task: TaskConfig {
                description: task.to_string(),
                preset: preset.id.clone(),
            },
            metadata: Metadata {
                id: uuid::Uuid::new_v4(),
                created: Utc::now(),
                version: CURRENT_SCHEMA_VERSION.to_string(),
                provenance: Provenance::Synthesized,
                source_file: None,
            },
        };

        config.validate(self.catalog)?;
        Ok(config)
    }

    /// Resolve the selected agent ids: de-duplicated, stable sorted.
    ///
    /// An empty caller selection falls back to the preset's required
    /// agents. Unknown ids fail in batch, listing every absent id.
    fn resolve_selection(
        &self,
        selected_agent_ids: &[String],
        preset: &PresetDefinition,
    ) -> Result<Vec<String>> {
        let requested: Vec<&str> = if selected_agent_ids.is_empty() {
            preset.required_agent_ids()
        } else {
            selected_agent_ids.iter().map(String::as_str).collect()
        };

        let (known, unknown) = self.catalog.partition_agent_ids(requested);
        if !unknown.is_empty() {
            return Err(Error::UnknownAgents(unknown));
        }
        Ok(known)
    }

    /// Build the per-agent specialization map.
    ///
    /// Copies each definition's verification policy; agents with no
    /// explicit policy get the generic default. Tier comes from the
    /// preset's agent reference when present.
    pub(crate) fn build_specializations(
        &self,
        selection: &[String],
        preset: &PresetDefinition,
    ) -> Result<BTreeMap<String, Specialization>> {
        let mut specializations = BTreeMap::new();
        for id in selection {
            let definition = self.catalog.get_agent(id)?;
            let verification = definition
                .verification
                .clone()
                .unwrap_or_else(defaults::generic_verification_policy);
            specializations.insert(
                id.clone(),
                Specialization {
                    role: definition.role,
                    tier: preset.tier_for(id).unwrap_or_default(),
                    capabilities: definition.capabilities.clone(),
                    verification,
                },
            );
        }
        Ok(specializations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AgentRole, ModelTier};

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    // ==================== synthesize Tests ====================

    #[test]
    fn test_synthesize_example_scenario() {
        // Spec'd example: three agents, "minimal" preset.
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let config = synth
            .synthesize(
                &ids(&["queen", "backend-dev", "tester"]),
                Some("minimal"),
                "Build a REST API",
                &OrchestratorOverrides::default(),
            )
            .unwrap();

        assert_eq!(config.orchestrator.max_agents, 3);
        assert_eq!(config.orchestrator.max_concurrent_agents, 3);
        assert_eq!(
            config.agents.selected,
            vec!["backend-dev", "queen", "tester"]
        );
        assert_eq!(config.metadata.provenance, Provenance::Synthesized);
        assert_eq!(config.metadata.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.task.description, "Build a REST API");
        assert_eq!(config.task.preset, "minimal");
    }

    #[test]
    fn test_synthesize_dedupes_selection() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let config = synth
            .synthesize(
                &ids(&["tester", "queen", "tester", "queen"]),
                None,
                "task",
                &OrchestratorOverrides::default(),
            )
            .unwrap();

        assert_eq!(config.agents.selected, vec!["queen", "tester"]);
        assert_eq!(config.orchestrator.max_agents, 2);
    }

    #[test]
    fn test_synthesize_unknown_agents_listed_all_at_once() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let err = synth
            .synthesize(
                &ids(&["queen", "ghost-b", "ghost-a"]),
                None,
                "task",
                &OrchestratorOverrides::default(),
            )
            .unwrap_err();

        match err {
            Error::UnknownAgents(unknown) => {
                assert_eq!(unknown, vec!["ghost-a", "ghost-b"]);
            }
            other => panic!("expected UnknownAgents, got {:?}", other),
        }
    }

    #[test]
    fn test_synthesize_unknown_preset_is_not_found() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let err = synth
            .synthesize(
                &ids(&["queen"]),
                Some("ghost-preset"),
                "task",
                &OrchestratorOverrides::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_synthesize_empty_selection_uses_preset_required() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let config = synth
            .synthesize(&[], Some("hive-mind"), "task", &OrchestratorOverrides::default())
            .unwrap();

        assert_eq!(config.agents.selected, vec!["coder", "queen", "tester"]);
        // Preset pins max_agents at 8; concurrency derives from selection.
        assert_eq!(config.orchestrator.max_agents, 8);
        assert_eq!(config.orchestrator.max_concurrent_agents, 3);
    }

    #[test]
    fn test_synthesize_empty_selection_without_preset_fails_invariant() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let err = synth
            .synthesize(&[], None, "task", &OrchestratorOverrides::default())
            .unwrap_err();
        assert!(matches!(err, Error::SchemaInvariant(_)));
    }

    #[test]
    fn test_concurrency_capped_at_eight_by_default() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let all: Vec<String> = catalog
            .list_agents(None)
            .iter()
            .map(|a| a.id.clone())
            .collect();
        assert_eq!(all.len(), 10);

        let config = synth
            .synthesize(&all, None, "task", &OrchestratorOverrides::default())
            .unwrap();

        assert_eq!(config.orchestrator.max_agents, 10);
        assert_eq!(config.orchestrator.max_concurrent_agents, 8);
    }

    #[test]
    fn test_concurrency_override_may_exceed_cap() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let all: Vec<String> = catalog
            .list_agents(None)
            .iter()
            .map(|a| a.id.clone())
            .collect();

        let config = synth
            .synthesize(
                &all,
                None,
                "task",
                &OrchestratorOverrides {
                    max_concurrent_agents: Some(10),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(config.orchestrator.max_concurrent_agents, 10);
    }

    #[test]
    fn test_concurrency_override_above_max_agents_fails() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let err = synth
            .synthesize(
                &ids(&["queen", "tester"]),
                None,
                "task",
                &OrchestratorOverrides {
                    max_concurrent_agents: Some(5),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::SchemaInvariant(_)));
    }

    #[test]
    fn test_topology_and_strategy_come_from_preset() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let config = synth
            .synthesize(
                &ids(&["researcher", "analyst"]),
                Some("research"),
                "survey crates",
                &OrchestratorOverrides::default(),
            )
            .unwrap();

        assert_eq!(config.orchestrator.topology, Topology::Star);
        assert_eq!(config.orchestrator.strategy, Strategy::Research);
        assert!(!config.orchestrator.fault_tolerance.byzantine);
    }

    #[test]
    fn test_mesh_topology_enables_byzantine() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let config = synth
            .synthesize(
                &ids(&["backend-dev", "frontend-dev", "tester"]),
                Some("swarm-dev"),
                "task",
                &OrchestratorOverrides::default(),
            )
            .unwrap();
        assert!(config.orchestrator.fault_tolerance.byzantine);
    }

    #[test]
    fn test_specialization_copies_policy_and_tier() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let config = synth
            .synthesize(
                &ids(&["queen", "coder"]),
                Some("hive-mind"),
                "task",
                &OrchestratorOverrides::default(),
            )
            .unwrap();

        let queen = &config.agents.specializations["queen"];
        assert_eq!(queen.role, AgentRole::Queen);
        assert_eq!(queen.tier, ModelTier::Opus);
        assert!(queen.verification.checks.contains(&"consensus".to_string()));
    }

    #[test]
    fn test_specialization_default_policy_for_bare_agents() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let config = synth
            .synthesize(
                &ids(&["researcher"]),
                None,
                "task",
                &OrchestratorOverrides::default(),
            )
            .unwrap();

        let spec = &config.agents.specializations["researcher"];
        assert_eq!(spec.verification.checks, vec!["test", "validate"]);
        assert!((spec.verification.truth_threshold - 0.85).abs() < f64::EPSILON);
        assert_eq!(spec.verification.max_files_per_operation, 10);
        // Unreferenced by any preset: default tier
        assert_eq!(spec.tier, ModelTier::Sonnet);
    }

    #[test]
    fn test_synthesize_is_pure_no_two_calls_share_identity() {
        let catalog = AgentCatalog::embedded();
        let synth = ConfigSynthesizer::new(&catalog);

        let a = synth
            .synthesize(&ids(&["queen"]), None, "task", &OrchestratorOverrides::default())
            .unwrap();
        let b = synth
            .synthesize(&ids(&["queen"]), None, "task", &OrchestratorOverrides::default())
            .unwrap();

        // Fresh value every invocation, never an in-place patch.
        assert_ne!(a.metadata.id, b.metadata.id);
        assert_eq!(a.agents, b.agents);
        assert_eq!(a.orchestrator, b.orchestrator);
    }

    // ==================== defaults Tests ====================

    #[test]
    fn test_defaults_concurrency() {
        assert_eq!(defaults::concurrency(3, 3, None), 3);
        assert_eq!(defaults::concurrency(20, 12, None), 8);
        assert_eq!(defaults::concurrency(20, 12, Some(1)), 1);
        assert_eq!(defaults::concurrency(2, 10, None), 2);
        // Floor of 1 even for degenerate inputs
        assert_eq!(defaults::concurrency(1, 0, None), 1);
    }

    #[test]
    fn test_defaults_memory_shape() {
        let memory = defaults::memory();
        assert!(memory.persistent);
        assert_eq!(memory.cache_size_mb, 100);
        assert_eq!(memory.namespaces.len(), 4);
    }
}
