//! KDL parsing for catalog extension files.
//!
//! Catalog extension files add agent and preset definitions on top of the
//! embedded defaults. A definition with the same id as an earlier layer
//! replaces it.
//!
//! # KDL Schema
//!
//! ```kdl
//! agent "security-auditor" {
//!     name "Security Auditor"
//!     category "quality"
//!     role "worker"          // "queen" | "lead" | "worker"
//!     capability "audit"
//!     capability "threat-model"
//!     language "rust"
//!     prompt "Audit the changes for: {task}"
//!
//!     verification {
//!         check "audit"
//!         truth-threshold 0.95
//!         max-files 5
//!     }
//! }
//!
//! preset "audit" {
//!     name "Security audit sweep"
//!     topology "star"
//!     agent "security-auditor" required=#true tier="opus"
//!     max-agents 4
//!     strategy "analysis"
//! }
//! ```
//!
//! Malformed entries are fatal and report the offending identifier.
//! Unknown nodes are ignored for forward compatibility.

use crate::Error;
use crate::catalog::definitions::{
    AgentDefinition, AgentRef, ModelTier, OrchestrationDefaults, PresetDefinition,
    VerificationPolicy,
};
use kdl::{KdlDocument, KdlNode};
use std::path::Path;

/// Definitions parsed from one extension file.
#[derive(Debug, Clone, Default)]
pub struct CatalogExtension {
    /// Agent definitions, in file order.
    pub agents: Vec<AgentDefinition>,
    /// Preset definitions, in file order.
    pub presets: Vec<PresetDefinition>,
}

impl CatalogExtension {
    /// Check whether the extension carries no definitions.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.presets.is_empty()
    }
}

/// Parse a catalog extension from a KDL document.
///
/// Looks for `agent "id" { ... }` and `preset "id" { ... }` blocks.
pub fn parse_catalog_extension(doc: &KdlDocument) -> Result<CatalogExtension, Error> {
    let mut extension = CatalogExtension::default();

    for node in doc.nodes() {
        match node.name().value() {
            "agent" => extension.agents.push(parse_agent_node(node)?),
            "preset" => extension.presets.push(parse_preset_node(node)?),
            _ => {
                // Ignore unknown top-level nodes for forward compatibility
            }
        }
    }

    Ok(extension)
}

/// Load a catalog extension from a KDL file path.
pub fn load_extension_from_file(path: &Path) -> Result<CatalogExtension, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let doc: KdlDocument = content.parse().map_err(|e| {
        Error::InvalidInput(format!("Failed to parse KDL in {}: {}", path.display(), e))
    })?;

    parse_catalog_extension(&doc)
}

/// Parse a single agent node.
fn parse_agent_node(node: &KdlNode) -> Result<AgentDefinition, Error> {
    let id = get_name_arg(node)
        .ok_or_else(|| Error::InvalidInput("agent node must have an id argument".to_string()))?;

    let mut name = id.clone();
    let mut category = "custom".to_string();
    let mut role = crate::catalog::definitions::AgentRole::Worker;
    let mut capabilities = Vec::new();
    let mut languages = Vec::new();
    let mut frameworks = Vec::new();
    let mut prompt = None;
    let mut verification = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "name" => {
                    if let Some(value) = get_string_arg(child) {
                        name = value;
                    }
                }
                "category" => {
                    if let Some(value) = get_string_arg(child) {
                        category = value;
                    }
                }
                "role" => {
                    let value = get_string_arg(child).ok_or_else(|| {
                        Error::InvalidInput(format!("agent '{}': role needs a value", id))
                    })?;
                    role = value.parse()?;
                }
                "capability" => {
                    if let Some(value) = get_string_arg(child) {
                        capabilities.push(value);
                    }
                }
                "language" => {
                    if let Some(value) = get_string_arg(child) {
                        languages.push(value);
                    }
                }
                "framework" => {
                    if let Some(value) = get_string_arg(child) {
                        frameworks.push(value);
                    }
                }
                "prompt" => {
                    if let Some(value) = get_string_arg(child) {
                        prompt = Some(value);
                    }
                }
                "verification" => {
                    verification = Some(parse_verification_node(child, &id)?);
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }
    }

    let agent = AgentDefinition {
        id,
        name,
        category,
        role,
        capabilities,
        verification,
        languages,
        frameworks,
        prompt,
    };
    agent.validate()?;
    Ok(agent)
}

/// Parse a verification block.
fn parse_verification_node(node: &KdlNode, owner: &str) -> Result<VerificationPolicy, Error> {
    let mut checks = Vec::new();
    let mut truth_threshold = 0.85;
    let mut max_files = 10;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "check" => {
                    if let Some(value) = get_string_arg(child) {
                        checks.push(value);
                    }
                }
                "truth-threshold" => {
                    truth_threshold = get_float_arg(child).ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "agent '{}': truth-threshold needs a numeric value",
                            owner
                        ))
                    })?;
                }
                "max-files" => {
                    let value = get_int_arg(child).ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "agent '{}': max-files needs an integer value",
                            owner
                        ))
                    })?;
                    max_files = u32::try_from(value).map_err(|_| {
                        Error::InvalidInput(format!(
                            "agent '{}': max-files must be non-negative, got {}",
                            owner, value
                        ))
                    })?;
                }
                _ => {}
            }
        }
    }

    let policy = VerificationPolicy::new(checks, truth_threshold, max_files);
    policy.validate(owner)?;
    Ok(policy)
}

/// Parse a single preset node.
fn parse_preset_node(node: &KdlNode) -> Result<PresetDefinition, Error> {
    let id = get_name_arg(node)
        .ok_or_else(|| Error::InvalidInput("preset node must have an id argument".to_string()))?;

    let mut name = id.clone();
    let mut topology = crate::catalog::definitions::Topology::Hierarchical;
    let mut agents = Vec::new();
    let mut defaults = OrchestrationDefaults::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "name" => {
                    if let Some(value) = get_string_arg(child) {
                        name = value;
                    }
                }
                "topology" => {
                    let value = get_string_arg(child).ok_or_else(|| {
                        Error::InvalidInput(format!("preset '{}': topology needs a value", id))
                    })?;
                    topology = value.parse()?;
                }
                "agent" => {
                    agents.push(parse_agent_ref_node(child, &id)?);
                }
                "max-agents" => {
                    let value = get_int_arg(child).ok_or_else(|| {
                        Error::InvalidInput(format!("preset '{}': max-agents needs an integer", id))
                    })?;
                    defaults.max_agents = Some(to_u8(value, &id, "max-agents")?);
                }
                "max-concurrent" => {
                    let value = get_int_arg(child).ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "preset '{}': max-concurrent needs an integer",
                            id
                        ))
                    })?;
                    defaults.max_concurrent_agents = Some(to_u8(value, &id, "max-concurrent")?);
                }
                "strategy" => {
                    let value = get_string_arg(child).ok_or_else(|| {
                        Error::InvalidInput(format!("preset '{}': strategy needs a value", id))
                    })?;
                    defaults.strategy = value.parse()?;
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }
    }

    let preset = PresetDefinition {
        id,
        name,
        topology,
        agents,
        defaults,
    };
    preset.validate()?;
    Ok(preset)
}

/// Parse an agent reference inside a preset: `agent "id" required=#true tier="opus"`.
fn parse_agent_ref_node(node: &KdlNode, preset_id: &str) -> Result<AgentRef, Error> {
    let agent_id = get_name_arg(node).ok_or_else(|| {
        Error::InvalidInput(format!(
            "preset '{}': agent reference needs an id argument",
            preset_id
        ))
    })?;

    let required = get_prop_bool(node, "required").unwrap_or(true);
    let tier = match get_prop_string(node, "tier") {
        Some(value) => value.parse::<ModelTier>()?,
        None => ModelTier::default(),
    };

    Ok(AgentRef {
        agent_id,
        required,
        tier,
    })
}

fn to_u8(value: i128, preset_id: &str, field: &str) -> Result<u8, Error> {
    u8::try_from(value).map_err(|_| {
        Error::InvalidInput(format!(
            "preset '{}': {} out of range, got {}",
            preset_id, field, value
        ))
    })
}

/// Get the id from a node's first positional argument.
fn get_name_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Get a string argument from a node's first entry.
fn get_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Get an integer argument from a node's first entry.
fn get_int_arg(node: &KdlNode) -> Option<i128> {
    node.entries().first().and_then(|e| e.value().as_integer())
}

/// Get a float argument from a node's first entry (integers accepted).
fn get_float_arg(node: &KdlNode) -> Option<f64> {
    let entry = node.entries().first()?;
    entry
        .value()
        .as_float()
        .or_else(|| entry.value().as_integer().map(|i| i as f64))
}

/// Get a named boolean property from a node.
fn get_prop_bool(node: &KdlNode, name: &str) -> Option<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(name))
        .and_then(|e| e.value().as_bool())
}

/// Get a named string property from a node.
fn get_prop_string(node: &KdlNode, name: &str) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(name))
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}
