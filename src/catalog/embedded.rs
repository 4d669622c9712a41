//! Embedded default agent and preset definitions.
//!
//! This module contains the built-in catalog entries that are compiled into
//! the hive binary. These serve as the base layer for catalog resolution;
//! KDL extension files layer on top (see `catalog::kdl`).

use crate::catalog::definitions::{
    AGENT_ANALYST, AGENT_ARCHITECT, AGENT_BACKEND_DEV, AGENT_CODER, AGENT_DEVOPS,
    AGENT_FRONTEND_DEV, AGENT_QUEEN, AGENT_RESEARCHER, AGENT_REVIEWER, AGENT_TESTER,
    AgentDefinition, AgentRef, AgentRole, ModelTier, OrchestrationDefaults, PRESET_HIVE_MIND,
    PRESET_MINIMAL, PRESET_PIPELINE, PRESET_RESEARCH, PRESET_SWARM_DEV, PresetDefinition,
    Strategy, Topology, VerificationPolicy,
};

/// Verification policies for the built-in agents.
///
/// Not every agent declares one; agents without a policy receive the
/// generic default at synthesis time.
mod policies {
    use super::*;

    /// Queen agents review delegated work and gate on consensus.
    pub fn queen_policy() -> VerificationPolicy {
        VerificationPolicy::new(
            vec!["review".to_string(), "consensus".to_string()],
            0.95,
            20,
        )
    }

    /// Development agents must build and test what they touch.
    pub fn dev_policy() -> VerificationPolicy {
        VerificationPolicy::new(
            vec!["build".to_string(), "test".to_string(), "lint".to_string()],
            0.9,
            15,
        )
    }

    /// Quality agents run the full check battery on a narrow file set.
    pub fn quality_policy() -> VerificationPolicy {
        VerificationPolicy::new(
            vec![
                "test".to_string(),
                "coverage".to_string(),
                "regression".to_string(),
            ],
            0.9,
            10,
        )
    }
}

/// Get the embedded agent definition for a given id.
///
/// Returns `None` if the id is not a built-in agent.
pub fn get_embedded_agent(id: &str) -> Option<AgentDefinition> {
    match id {
        AGENT_QUEEN => Some(queen_agent()),
        AGENT_ARCHITECT => Some(architect_agent()),
        AGENT_CODER => Some(coder_agent()),
        AGENT_BACKEND_DEV => Some(backend_dev_agent()),
        AGENT_FRONTEND_DEV => Some(frontend_dev_agent()),
        AGENT_TESTER => Some(tester_agent()),
        AGENT_REVIEWER => Some(reviewer_agent()),
        AGENT_RESEARCHER => Some(researcher_agent()),
        AGENT_ANALYST => Some(analyst_agent()),
        AGENT_DEVOPS => Some(devops_agent()),
        _ => None,
    }
}

/// Get all embedded agent definitions.
pub fn get_all_embedded_agents() -> Vec<AgentDefinition> {
    vec![
        queen_agent(),
        architect_agent(),
        coder_agent(),
        backend_dev_agent(),
        frontend_dev_agent(),
        tester_agent(),
        reviewer_agent(),
        researcher_agent(),
        analyst_agent(),
        devops_agent(),
    ]
}

/// Get the embedded preset definition for a given id.
///
/// Returns `None` if the id is not a built-in preset. The `"none"`
/// sentinel is handled by the catalog, not here.
pub fn get_embedded_preset(id: &str) -> Option<PresetDefinition> {
    match id {
        PRESET_MINIMAL => Some(minimal_preset()),
        PRESET_HIVE_MIND => Some(hive_mind_preset()),
        PRESET_SWARM_DEV => Some(swarm_dev_preset()),
        PRESET_RESEARCH => Some(research_preset()),
        PRESET_PIPELINE => Some(pipeline_preset()),
        _ => None,
    }
}

/// Get all embedded preset definitions.
pub fn get_all_embedded_presets() -> Vec<PresetDefinition> {
    vec![
        minimal_preset(),
        hive_mind_preset(),
        swarm_dev_preset(),
        research_preset(),
        pipeline_preset(),
    ]
}

/// Queen: swarm coordinator.
fn queen_agent() -> AgentDefinition {
    AgentDefinition::new(AGENT_QUEEN, "Queen Coordinator", "core", AgentRole::Queen)
        .with_capabilities(["orchestration", "delegation", "consensus"])
        .with_verification(policies::queen_policy())
        .with_prompt("You coordinate the swarm. Delegate, verify and merge work on: {task}")
}

/// Architect: designs module boundaries before workers start.
fn architect_agent() -> AgentDefinition {
    AgentDefinition::new(AGENT_ARCHITECT, "System Architect", "planning", AgentRole::Lead)
        .with_capabilities(["design", "decomposition", "review"])
}

/// Coder: general-purpose implementation worker.
fn coder_agent() -> AgentDefinition {
    AgentDefinition::new(AGENT_CODER, "Implementation Coder", "development", AgentRole::Worker)
        .with_capabilities(["implementation", "refactoring"])
        .with_verification(policies::dev_policy())
        .with_prompt("Implement the assigned slice of: {task}")
}

/// Backend developer: API and persistence work.
fn backend_dev_agent() -> AgentDefinition {
    AgentDefinition::new(
        AGENT_BACKEND_DEV,
        "Backend Developer",
        "development",
        AgentRole::Worker,
    )
    .with_capabilities(["api", "database", "services"])
    .with_languages(["typescript", "python", "rust"])
    .with_frameworks(["express", "fastapi", "axum"])
    .with_verification(policies::dev_policy())
}

/// Frontend developer: UI work.
fn frontend_dev_agent() -> AgentDefinition {
    AgentDefinition::new(
        AGENT_FRONTEND_DEV,
        "Frontend Developer",
        "development",
        AgentRole::Worker,
    )
    .with_capabilities(["ui", "components", "styling"])
    .with_languages(["typescript"])
    .with_frameworks(["react"])
    .with_verification(policies::dev_policy())
}

/// Tester: writes and runs tests against delivered work.
fn tester_agent() -> AgentDefinition {
    AgentDefinition::new(AGENT_TESTER, "Test Engineer", "quality", AgentRole::Worker)
        .with_capabilities(["testing", "coverage", "edge-cases"])
        .with_verification(policies::quality_policy())
        .with_prompt("Write and run tests for: {task}")
}

/// Reviewer: reads diffs, files findings.
fn reviewer_agent() -> AgentDefinition {
    AgentDefinition::new(AGENT_REVIEWER, "Code Reviewer", "quality", AgentRole::Worker)
        .with_capabilities(["review", "style", "correctness"])
        .with_verification(policies::quality_policy())
}

/// Researcher: gathers context before implementation. No explicit
/// verification policy; gets the generic default at synthesis.
fn researcher_agent() -> AgentDefinition {
    AgentDefinition::new(AGENT_RESEARCHER, "Researcher", "research", AgentRole::Worker)
        .with_capabilities(["search", "summarization", "citation"])
}

/// Analyst: interprets research output. Also policy-free.
fn analyst_agent() -> AgentDefinition {
    AgentDefinition::new(AGENT_ANALYST, "Analyst", "research", AgentRole::Worker)
        .with_capabilities(["metrics", "tradeoffs", "reporting"])
}

/// DevOps: pipelines and environments.
fn devops_agent() -> AgentDefinition {
    AgentDefinition::new(AGENT_DEVOPS, "DevOps Engineer", "operations", AgentRole::Worker)
        .with_capabilities(["ci", "deployment", "observability"])
        .with_verification(policies::dev_policy())
}

/// Minimal: hierarchical shell with no pinned agents or limits.
fn minimal_preset() -> PresetDefinition {
    PresetDefinition::new(PRESET_MINIMAL, "Minimal swarm", Topology::Hierarchical)
}

/// Hive-mind: queen-led hierarchical swarm.
fn hive_mind_preset() -> PresetDefinition {
    PresetDefinition::new(PRESET_HIVE_MIND, "Hive mind", Topology::Hierarchical)
        .with_agents(vec![
            AgentRef::required(AGENT_QUEEN, ModelTier::Opus),
            AgentRef::optional(AGENT_ARCHITECT, ModelTier::Sonnet),
            AgentRef::required(AGENT_CODER, ModelTier::Sonnet),
            AgentRef::required(AGENT_TESTER, ModelTier::Sonnet),
            AgentRef::optional(AGENT_REVIEWER, ModelTier::Haiku),
        ])
        .with_defaults(OrchestrationDefaults {
            max_agents: Some(8),
            max_concurrent_agents: None,
            strategy: Strategy::Development,
        })
}

/// Swarm-dev: peer-equal mesh of implementation agents.
fn swarm_dev_preset() -> PresetDefinition {
    PresetDefinition::new(PRESET_SWARM_DEV, "Development swarm", Topology::Mesh)
        .with_agents(vec![
            AgentRef::required(AGENT_BACKEND_DEV, ModelTier::Sonnet),
            AgentRef::required(AGENT_FRONTEND_DEV, ModelTier::Sonnet),
            AgentRef::required(AGENT_TESTER, ModelTier::Sonnet),
            AgentRef::optional(AGENT_DEVOPS, ModelTier::Haiku),
        ])
        .with_defaults(OrchestrationDefaults {
            max_agents: Some(6),
            max_concurrent_agents: None,
            strategy: Strategy::Development,
        })
}

/// Research: star topology fanning out from the researcher.
fn research_preset() -> PresetDefinition {
    PresetDefinition::new(PRESET_RESEARCH, "Research sweep", Topology::Star)
        .with_agents(vec![
            AgentRef::required(AGENT_RESEARCHER, ModelTier::Opus),
            AgentRef::required(AGENT_ANALYST, ModelTier::Sonnet),
        ])
        .with_defaults(OrchestrationDefaults {
            max_agents: Some(4),
            max_concurrent_agents: None,
            strategy: Strategy::Research,
        })
}

/// Pipeline: sequential code-test-review chain.
fn pipeline_preset() -> PresetDefinition {
    PresetDefinition::new(PRESET_PIPELINE, "Sequential pipeline", Topology::Sequential)
        .with_agents(vec![
            AgentRef::required(AGENT_CODER, ModelTier::Sonnet),
            AgentRef::required(AGENT_TESTER, ModelTier::Sonnet),
            AgentRef::required(AGENT_REVIEWER, ModelTier::Haiku),
        ])
        .with_defaults(OrchestrationDefaults {
            max_agents: Some(3),
            max_concurrent_agents: Some(1),
            strategy: Strategy::Testing,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_agent_queen() {
        let agent = get_embedded_agent(AGENT_QUEEN).unwrap();
        assert_eq!(agent.id, AGENT_QUEEN);
        assert_eq!(agent.role, AgentRole::Queen);
        assert!(agent.verification.is_some());
        assert!(agent.prompt.is_some());
    }

    #[test]
    fn test_get_embedded_agent_unknown() {
        assert!(get_embedded_agent("unknown").is_none());
        assert!(get_embedded_agent("").is_none());
    }

    #[test]
    fn test_all_embedded_agents_are_unique_and_valid() {
        let agents = get_all_embedded_agents();
        assert_eq!(agents.len(), 10);

        let mut ids: Vec<&str> = agents.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10, "embedded agent ids must be unique");

        for agent in &agents {
            agent.validate().unwrap();
        }
    }

    #[test]
    fn test_research_agents_have_no_policy() {
        // These exercise the generic-default path in the synthesizer.
        assert!(get_embedded_agent(AGENT_RESEARCHER).unwrap().verification.is_none());
        assert!(get_embedded_agent(AGENT_ANALYST).unwrap().verification.is_none());
    }

    #[test]
    fn test_all_embedded_presets_reference_known_agents() {
        for preset in get_all_embedded_presets() {
            preset.validate().unwrap();
            for agent_ref in &preset.agents {
                assert!(
                    get_embedded_agent(&agent_ref.agent_id).is_some(),
                    "preset '{}' references unknown agent '{}'",
                    preset.id,
                    agent_ref.agent_id
                );
            }
        }
    }

    #[test]
    fn test_minimal_preset_pins_nothing() {
        let preset = get_embedded_preset(PRESET_MINIMAL).unwrap();
        assert_eq!(preset.topology, Topology::Hierarchical);
        assert!(preset.agents.is_empty());
        assert_eq!(preset.defaults.max_agents, None);
        assert_eq!(preset.defaults.max_concurrent_agents, None);
    }

    #[test]
    fn test_hive_mind_preset_shape() {
        let preset = get_embedded_preset(PRESET_HIVE_MIND).unwrap();
        assert_eq!(preset.topology, Topology::Hierarchical);
        assert_eq!(preset.required_agent_ids(), vec![AGENT_QUEEN, AGENT_CODER, AGENT_TESTER]);
        assert_eq!(preset.tier_for(AGENT_QUEEN), Some(ModelTier::Opus));
        assert_eq!(preset.defaults.max_agents, Some(8));
    }

    #[test]
    fn test_pipeline_preset_is_sequential() {
        let preset = get_embedded_preset(PRESET_PIPELINE).unwrap();
        assert_eq!(preset.topology, Topology::Sequential);
        assert_eq!(preset.defaults.max_concurrent_agents, Some(1));
    }

    #[test]
    fn test_get_embedded_preset_unknown() {
        assert!(get_embedded_preset("unknown").is_none());
        // The sentinel is a catalog concern, not an embedded preset.
        assert!(get_embedded_preset("none").is_none());
    }
}
