//! Definition types for the agent/preset catalog.
//!
//! This module defines the core types for catalog entries:
//! - `AgentDefinition`: A named role template with capabilities and verification policy
//! - `PresetDefinition`: A reusable bundle of agent references plus orchestrator defaults
//! - `Topology` / `Strategy` / `ModelTier`: enums passed through to the orchestrator
//!
//! Definitions are immutable once loaded. An agent definition describes a
//! role template, not a running process.

use serde::{Deserialize, Serialize};

/// Role an agent plays inside a swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Coordinates the swarm and delegates work.
    Queen,
    /// Owns a sub-tree of workers in hierarchical topologies.
    Lead,
    /// Executes delegated work items.
    Worker,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Queen => write!(f, "queen"),
            AgentRole::Lead => write!(f, "lead"),
            AgentRole::Worker => write!(f, "worker"),
        }
    }
}

impl std::str::FromStr for AgentRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queen" => Ok(AgentRole::Queen),
            "lead" => Ok(AgentRole::Lead),
            "worker" => Ok(AgentRole::Worker),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid agent role: '{}'. Expected 'queen', 'lead' or 'worker'.",
                s
            ))),
        }
    }
}

/// Coordination shape declared for the external orchestrator.
///
/// The topology is passed through uninterpreted; hivecfg only validates
/// that it is one of the known shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    #[default]
    Hierarchical,
    Mesh,
    Ring,
    Star,
    Sequential,
}

impl Topology {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Hierarchical => "hierarchical",
            Topology::Mesh => "mesh",
            Topology::Ring => "ring",
            Topology::Star => "star",
            Topology::Sequential => "sequential",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Topology {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hierarchical" => Ok(Topology::Hierarchical),
            "mesh" => Ok(Topology::Mesh),
            "ring" => Ok(Topology::Ring),
            "star" => Ok(Topology::Star),
            "sequential" => Ok(Topology::Sequential),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid topology: '{}'. Expected one of 'hierarchical', 'mesh', 'ring', 'star', 'sequential'.",
                s
            ))),
        }
    }
}

/// Orchestration strategy declared for the external orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Development,
    Research,
    Testing,
    Analysis,
    Maintenance,
}

impl Strategy {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Development => "development",
            Strategy::Research => "research",
            Strategy::Testing => "testing",
            Strategy::Analysis => "analysis",
            Strategy::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Strategy::Development),
            "research" => Ok(Strategy::Research),
            "testing" => Ok(Strategy::Testing),
            "analysis" => Ok(Strategy::Analysis),
            "maintenance" => Ok(Strategy::Maintenance),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid strategy: '{}'. Expected one of 'development', 'research', 'testing', 'analysis', 'maintenance'.",
                s
            ))),
        }
    }
}

/// Model tier assigned to an agent inside a preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Opus,
    #[default]
    Sonnet,
    Haiku,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Opus => write!(f, "opus"),
            ModelTier::Sonnet => write!(f, "sonnet"),
            ModelTier::Haiku => write!(f, "haiku"),
        }
    }
}

impl std::str::FromStr for ModelTier {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "opus" => Ok(ModelTier::Opus),
            "sonnet" => Ok(ModelTier::Sonnet),
            "haiku" => Ok(ModelTier::Haiku),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid model tier: '{}'. Expected 'opus', 'sonnet' or 'haiku'.",
                s
            ))),
        }
    }
}

/// Verification policy attached to an agent definition.
///
/// Agents without an explicit policy receive the generic default at
/// synthesis time (see `synth::defaults`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationPolicy {
    /// Named checks the agent must run before claiming completion.
    pub checks: Vec<String>,
    /// Minimum confidence score for accepting the agent's claims, in [0, 1].
    pub truth_threshold: f64,
    /// Maximum number of files the agent may touch per operation.
    pub max_files_per_operation: u32,
}

impl VerificationPolicy {
    /// Create a new verification policy.
    pub fn new(checks: Vec<String>, truth_threshold: f64, max_files_per_operation: u32) -> Self {
        Self {
            checks,
            truth_threshold,
            max_files_per_operation,
        }
    }

    /// Validate policy values, naming the owning agent on failure.
    pub fn validate(&self, owner: &str) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.truth_threshold) {
            return Err(crate::Error::InvalidInput(format!(
                "agent '{}': truth threshold must be in [0, 1], got {}",
                owner, self.truth_threshold
            )));
        }
        Ok(())
    }
}

/// Agent definition with all catalog-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Unique agent identifier (e.g., "queen", "backend-dev").
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Catalog category (e.g., "core", "development", "quality").
    pub category: String,
    /// Role the agent plays inside a swarm.
    pub role: AgentRole,
    /// Declared capabilities.
    pub capabilities: Vec<String>,
    /// Verification policy, if the agent declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationPolicy>,
    /// Language tags (optional).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// Framework tags (optional).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    /// Prompt template with a `{task}` placeholder (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl AgentDefinition {
    /// Create a new agent definition.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        role: AgentRole,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            role,
            capabilities: Vec::new(),
            verification: None,
            languages: Vec::new(),
            frameworks: Vec::new(),
            prompt: None,
        }
    }

    /// Set declared capabilities.
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Set the verification policy.
    pub fn with_verification(mut self, policy: VerificationPolicy) -> Self {
        self.verification = Some(policy);
        self
    }

    /// Set language tags.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Set framework tags.
    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }

    /// Set the prompt template.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Check if this agent coordinates the swarm.
    pub fn is_queen(&self) -> bool {
        self.role == AgentRole::Queen
    }

    /// Render the prompt template for a task, replacing the `{task}` placeholder.
    ///
    /// Returns `None` if the agent declares no prompt template.
    pub fn prompt_for_task(&self, task: &str) -> Option<String> {
        self.prompt.as_ref().map(|p| p.replace("{task}", task))
    }

    /// Get a short summary for display.
    pub fn summary(&self) -> String {
        format!("{}: [{}, {}] {}", self.id, self.role, self.category, self.name)
    }

    /// Validate the definition, naming the offending id on failure.
    pub fn validate(&self) -> crate::Result<()> {
        if self.id.is_empty() {
            return Err(crate::Error::InvalidInput(
                "agent definition has an empty id".to_string(),
            ));
        }
        if let Some(ref policy) = self.verification {
            policy.validate(&self.id)?;
        }
        Ok(())
    }
}

/// Reference to an agent inside a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    /// Id of the referenced agent.
    pub agent_id: String,
    /// Whether the agent is part of the preset's fallback selection.
    pub required: bool,
    /// Model tier assigned to the agent by this preset.
    pub tier: ModelTier,
}

impl AgentRef {
    /// Create a required agent reference.
    pub fn required(agent_id: impl Into<String>, tier: ModelTier) -> Self {
        Self {
            agent_id: agent_id.into(),
            required: true,
            tier,
        }
    }

    /// Create an optional agent reference.
    pub fn optional(agent_id: impl Into<String>, tier: ModelTier) -> Self {
        Self {
            agent_id: agent_id.into(),
            required: false,
            tier,
        }
    }
}

/// Orchestration defaults carried by a preset.
///
/// `None` values mean "derive from the selection" at synthesis time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationDefaults {
    /// Maximum number of agents, if the preset pins one.
    pub max_agents: Option<u8>,
    /// Maximum number of concurrently active agents, if pinned.
    pub max_concurrent_agents: Option<u8>,
    /// Orchestration strategy.
    pub strategy: Strategy,
}

/// Preset definition: a reusable bundle of agent references plus defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetDefinition {
    /// Unique preset identifier (e.g., "minimal", "hive-mind").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Coordination topology.
    pub topology: Topology,
    /// Ordered agent references.
    pub agents: Vec<AgentRef>,
    /// Orchestration defaults.
    pub defaults: OrchestrationDefaults,
}

impl PresetDefinition {
    /// Create a new preset with no agent references.
    pub fn new(id: impl Into<String>, name: impl Into<String>, topology: Topology) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            topology,
            agents: Vec::new(),
            defaults: OrchestrationDefaults::default(),
        }
    }

    /// Set the agent references.
    pub fn with_agents(mut self, agents: Vec<AgentRef>) -> Self {
        self.agents = agents;
        self
    }

    /// Set the orchestration defaults.
    pub fn with_defaults(mut self, defaults: OrchestrationDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Ids of the preset's required agents, in declaration order.
    pub fn required_agent_ids(&self) -> Vec<&str> {
        self.agents
            .iter()
            .filter(|r| r.required)
            .map(|r| r.agent_id.as_str())
            .collect()
    }

    /// Model tier this preset assigns to an agent, if referenced.
    pub fn tier_for(&self, agent_id: &str) -> Option<ModelTier> {
        self.agents
            .iter()
            .find(|r| r.agent_id == agent_id)
            .map(|r| r.tier)
    }

    /// Validate the definition, naming the offending id on failure.
    pub fn validate(&self) -> crate::Result<()> {
        if self.id.is_empty() {
            return Err(crate::Error::InvalidInput(
                "preset definition has an empty id".to_string(),
            ));
        }
        Ok(())
    }
}

/// Built-in agent ids.
pub const AGENT_QUEEN: &str = "queen";
pub const AGENT_ARCHITECT: &str = "architect";
pub const AGENT_CODER: &str = "coder";
pub const AGENT_BACKEND_DEV: &str = "backend-dev";
pub const AGENT_FRONTEND_DEV: &str = "frontend-dev";
pub const AGENT_TESTER: &str = "tester";
pub const AGENT_REVIEWER: &str = "reviewer";
pub const AGENT_RESEARCHER: &str = "researcher";
pub const AGENT_ANALYST: &str = "analyst";
pub const AGENT_DEVOPS: &str = "devops";

/// Built-in preset ids.
pub const PRESET_MINIMAL: &str = "minimal";
pub const PRESET_HIVE_MIND: &str = "hive-mind";
pub const PRESET_SWARM_DEV: &str = "swarm-dev";
pub const PRESET_RESEARCH: &str = "research";
pub const PRESET_PIPELINE: &str = "pipeline";

/// Sentinel preset id for "no preset": resolves to the built-in default
/// preset instead of a not-found error.
pub const PRESET_NONE: &str = "none";
