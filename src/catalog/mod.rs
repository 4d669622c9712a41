//! Agent and preset catalog.
//!
//! The catalog is the read-only lookup of `AgentDefinition`s and
//! `PresetDefinition`s. It is built once at process start and injected by
//! reference into the synthesizer and migrator.
//!
//! ## Resolution Order
//!
//! Definitions are resolved in layers (later sources replace earlier ones
//! by id):
//!
//! 1. **Embedded** (in the hive binary) - Built-in agents and presets
//! 2. **User** (~/.config/hivecfg/catalog.kdl) - User-wide additions
//! 3. **Explicit** (`--catalog FILE`, `HIVE_CATALOG`) - Per-invocation files
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hivecfg::catalog::AgentCatalog;
//!
//! let catalog = AgentCatalog::embedded();
//! let queen = catalog.get_agent("queen")?;
//! for agent in catalog.list_agents(Some("development")) {
//!     println!("{}", agent.summary());
//! }
//! ```

pub mod definitions;
pub mod embedded;
pub mod kdl;

// Re-export commonly used types
pub use definitions::{
    AGENT_ANALYST, AGENT_ARCHITECT, AGENT_BACKEND_DEV, AGENT_CODER, AGENT_DEVOPS,
    AGENT_FRONTEND_DEV, AGENT_QUEEN, AGENT_RESEARCHER, AGENT_REVIEWER, AGENT_TESTER,
    AgentDefinition, AgentRef, AgentRole, ModelTier, OrchestrationDefaults, PRESET_HIVE_MIND,
    PRESET_MINIMAL, PRESET_NONE, PRESET_PIPELINE, PRESET_RESEARCH, PRESET_SWARM_DEV,
    PresetDefinition, Strategy, Topology, VerificationPolicy,
};
pub use kdl::{CatalogExtension, load_extension_from_file, parse_catalog_extension};

use crate::{Error, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Read-only catalog of agent and preset definitions.
///
/// Keyed by id; `BTreeMap` keeps listings stably ordered for
/// reproducibility.
#[derive(Debug, Clone)]
pub struct AgentCatalog {
    agents: BTreeMap<String, AgentDefinition>,
    presets: BTreeMap<String, PresetDefinition>,
}

impl AgentCatalog {
    /// Build a catalog from the embedded definitions only.
    pub fn embedded() -> Self {
        let mut catalog = Self {
            agents: BTreeMap::new(),
            presets: BTreeMap::new(),
        };
        for agent in embedded::get_all_embedded_agents() {
            catalog.agents.insert(agent.id.clone(), agent);
        }
        for preset in embedded::get_all_embedded_presets() {
            catalog.presets.insert(preset.id.clone(), preset);
        }
        catalog
    }

    /// Build a catalog from the embedded definitions plus extension files.
    ///
    /// Files are layered in order; the user-level catalog file (if any) is
    /// applied before the explicit paths. A malformed file is fatal.
    pub fn load(extension_paths: &[PathBuf]) -> Result<Self> {
        let mut catalog = Self::embedded();

        if let Some(user_path) = Self::user_catalog_path() {
            if user_path.exists() {
                catalog.apply_extension_file(&user_path)?;
            }
        }
        for path in extension_paths {
            catalog.apply_extension_file(path)?;
        }
        Ok(catalog)
    }

    /// Default user-level catalog extension path
    /// (`~/.config/hivecfg/catalog.kdl`).
    pub fn user_catalog_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hivecfg").join("catalog.kdl"))
    }

    /// Layer one extension file onto this catalog.
    pub fn apply_extension_file(&mut self, path: &Path) -> Result<()> {
        let extension = kdl::load_extension_from_file(path)?;
        self.apply_extension(extension);
        Ok(())
    }

    /// Layer parsed extension definitions onto this catalog.
    ///
    /// Definitions replace earlier ones with the same id.
    pub fn apply_extension(&mut self, extension: CatalogExtension) {
        for agent in extension.agents {
            self.agents.insert(agent.id.clone(), agent);
        }
        for preset in extension.presets {
            self.presets.insert(preset.id.clone(), preset);
        }
    }

    /// Look up an agent definition by id.
    pub fn get_agent(&self, id: &str) -> Result<&AgentDefinition> {
        self.agents
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("agent '{}'", id)))
    }

    /// Check whether an agent id exists.
    pub fn has_agent(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Look up a preset definition by id.
    ///
    /// The sentinel id `"none"` yields the built-in default preset
    /// (hierarchical, no agent refs, no pinned limits); this is distinct
    /// from a not-found error for an unknown id.
    pub fn get_preset(&self, id: &str) -> Result<Cow<'_, PresetDefinition>> {
        if id == PRESET_NONE {
            return Ok(Cow::Owned(Self::default_preset()));
        }
        self.presets
            .get(id)
            .map(Cow::Borrowed)
            .ok_or_else(|| Error::NotFound(format!("preset '{}'", id)))
    }

    /// The built-in default preset used when no preset is requested.
    pub fn default_preset() -> PresetDefinition {
        PresetDefinition::new(PRESET_NONE, "No preset", Topology::Hierarchical)
    }

    /// List agent definitions, optionally filtered by category.
    ///
    /// Ordering is stable by id.
    pub fn list_agents(&self, category: Option<&str>) -> Vec<&AgentDefinition> {
        self.agents
            .values()
            .filter(|a| category.is_none_or(|c| a.category == c))
            .collect()
    }

    /// List preset definitions, stably ordered by id.
    pub fn list_presets(&self) -> Vec<&PresetDefinition> {
        self.presets.values().collect()
    }

    /// Partition a set of ids into (known, unknown), both sorted.
    ///
    /// Used by the synthesizer and migrator to report every unknown id at
    /// once instead of failing on the first.
    pub fn partition_agent_ids<'a, I>(&self, ids: I) -> (Vec<String>, Vec<String>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut known = Vec::new();
        let mut unknown = Vec::new();
        for id in ids {
            if self.has_agent(id) {
                known.push(id.to_string());
            } else {
                unknown.push(id.to_string());
            }
        }
        known.sort_unstable();
        known.dedup();
        unknown.sort_unstable();
        unknown.dedup();
        (known, unknown)
    }
}

impl Default for AgentCatalog {
    fn default() -> Self {
        Self::embedded()
    }
}
