//! Command implementations for the hive CLI.
//!
//! This module contains the business logic for each CLI command. Every
//! command produces an `Output` that renders as JSON (default) or
//! human-readable text (`-H`).

use crate::catalog::AgentCatalog;
use crate::migrate::ConfigMigrator;
use crate::synth::{ConfigSynthesizer, OrchestratorOverrides, materialize_layout};
use crate::{Error, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// Command output, serializable to JSON or formatted for humans.
pub struct Output {
    /// Machine-readable result (default output).
    pub json: Value,
    /// Human-readable rendering (`-H`).
    pub human: String,
    /// Whether the command partially failed (non-zero exit with output).
    pub failed: bool,
}

impl Output {
    fn new(json: Value, human: String) -> Self {
        Self {
            json,
            human,
            failed: false,
        }
    }

    /// Print the output in the requested format.
    pub fn print(&self, human: bool) {
        if human {
            println!("{}", self.human);
        } else {
            println!("{}", self.json);
        }
    }
}

/// Parameters for the synthesize command.
#[derive(Debug, Default)]
pub struct SynthesizeArgs {
    pub agents: Vec<String>,
    pub preset: Option<String>,
    pub task: String,
    pub max_agents: Option<u8>,
    pub max_concurrent: Option<u8>,
    pub topology: Option<String>,
    pub strategy: Option<String>,
    pub output: Option<PathBuf>,
    pub layout: Option<PathBuf>,
}

/// Synthesize a configuration and optionally persist it / materialize the
/// swarm layout.
pub fn synthesize(catalog: &AgentCatalog, args: SynthesizeArgs) -> Result<Output> {
    let overrides = OrchestratorOverrides {
        max_agents: args.max_agents,
        max_concurrent_agents: args.max_concurrent,
        topology: args.topology.as_deref().map(str::parse).transpose()?,
        strategy: args.strategy.as_deref().map(str::parse).transpose()?,
    };

    let config = ConfigSynthesizer::new(catalog).synthesize(
        &args.agents,
        args.preset.as_deref(),
        &args.task,
        &overrides,
    )?;

    let mut human = format!(
        "Synthesized configuration {} ({} agents, topology {}, {}/{} concurrent)",
        config.metadata.id,
        config.agents.selected.len(),
        config.orchestrator.topology,
        config.orchestrator.max_concurrent_agents,
        config.orchestrator.max_agents,
    );

    let written = match &args.output {
        Some(path) => {
            write_config_file(path, &serde_json::to_value(&config)?)?;
            human.push_str(&format!("\nWrote {}", path.display()));
            Some(path.display().to_string())
        }
        None => None,
    };

    let layout_paths = match &args.layout {
        Some(root) => {
            let created = materialize_layout(&config, root)?;
            human.push_str(&format!(
                "\nMaterialized layout under {} ({} paths)",
                root.display(),
                created.len()
            ));
            created
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
        }
        None => Vec::new(),
    };

    let mut json = json!({ "config": serde_json::to_value(&config)? });
    if let Some(written) = written {
        json["written"] = Value::String(written);
    }
    if !layout_paths.is_empty() {
        json["layout"] = Value::from(layout_paths);
    }

    Ok(Output::new(json, human))
}

/// Migrate legacy configuration files to the current schema.
///
/// Documents are processed independently; the output reports successes
/// and failures per file, and the command is marked failed if any
/// document failed.
pub fn migrate(
    catalog: &AgentCatalog,
    files: &[PathBuf],
    output_dir: Option<&Path>,
) -> Result<Output> {
    let mut documents = Vec::new();
    let mut read_failures: Vec<(String, Error)> = Vec::new();

    for path in files {
        let label = file_label(path);
        match read_json_file(path) {
            Ok(doc) => documents.push((label, doc)),
            Err(error) => read_failures.push((label, error)),
        }
    }

    let migrator = ConfigMigrator::new(catalog);
    let mut report = migrator.migrate_batch(&documents);
    report.failures.extend(read_failures);

    let mut written = Vec::new();
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir).map_err(|source| Error::Filesystem {
            path: dir.to_path_buf(),
            source,
        })?;
        for config in &report.successes {
            let source = config
                .metadata
                .source_file
                .as_deref()
                .unwrap_or("config.json");
            let stem = Path::new(source)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("config");
            let path = dir.join(format!("{}.v2.json", stem));
            write_config_file(&path, &serde_json::to_value(config)?)?;
            written.push(path.display().to_string());
        }
    }

    let mut human = format!(
        "Migrated {} of {} documents",
        report.successes.len(),
        report.successes.len() + report.failures.len()
    );
    for (label, error) in &report.failures {
        human.push_str(&format!("\n  FAILED {}: {}", label, error));
    }
    for path in &written {
        human.push_str(&format!("\n  wrote {}", path));
    }

    let json = json!({
        "migrated": report.successes.len(),
        "failed": report.failures.len(),
        "configs": report
            .successes
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?,
        "failures": report
            .failures
            .iter()
            .map(|(label, error)| json!({ "file": label, "error": error.to_string() }))
            .collect::<Vec<_>>(),
        "written": written,
    });

    let mut output = Output::new(json, human);
    output.failed = !report.failures.is_empty();
    Ok(output)
}

/// List agent definitions, optionally filtered by category.
pub fn agents_list(catalog: &AgentCatalog, category: Option<&str>) -> Result<Output> {
    let agents = catalog.list_agents(category);

    let human = agents
        .iter()
        .map(|a| a.summary())
        .collect::<Vec<_>>()
        .join("\n");
    let json = json!({
        "agents": agents
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?
    });

    Ok(Output::new(json, human))
}

/// Show one agent definition.
pub fn agents_show(catalog: &AgentCatalog, id: &str) -> Result<Output> {
    let agent = catalog.get_agent(id)?;
    let human = format!(
        "{}\n  capabilities: {}\n  verification: {}",
        agent.summary(),
        agent.capabilities.join(", "),
        match &agent.verification {
            Some(policy) => format!(
                "{} (threshold {}, max files {})",
                policy.checks.join(", "),
                policy.truth_threshold,
                policy.max_files_per_operation
            ),
            None => "default".to_string(),
        }
    );
    Ok(Output::new(serde_json::to_value(agent)?, human))
}

/// List preset definitions.
pub fn presets_list(catalog: &AgentCatalog) -> Result<Output> {
    let presets = catalog.list_presets();

    let human = presets
        .iter()
        .map(|p| {
            format!(
                "{}: [{}] {} ({} agents)",
                p.id,
                p.topology,
                p.name,
                p.agents.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let json = json!({
        "presets": presets
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?
    });

    Ok(Output::new(json, human))
}

/// Show one preset definition.
pub fn presets_show(catalog: &AgentCatalog, id: &str) -> Result<Output> {
    let preset = catalog.get_preset(id)?.into_owned();
    let agents = preset
        .agents
        .iter()
        .map(|r| {
            format!(
                "{} ({}, {})",
                r.agent_id,
                if r.required { "required" } else { "optional" },
                r.tier
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let human = format!(
        "{}: [{}] {}\n  agents: {}\n  strategy: {}",
        preset.id,
        preset.topology,
        preset.name,
        if agents.is_empty() { "none" } else { agents.as_str() },
        preset.defaults.strategy,
    );
    Ok(Output::new(serde_json::to_value(&preset)?, human))
}

/// Show version and build information.
pub fn version() -> Output {
    let json = json!({
        "version": env!("CARGO_PKG_VERSION"),
        "schemaVersion": crate::config::CURRENT_SCHEMA_VERSION,
        "buildTimestamp": env!("HIVE_BUILD_TIMESTAMP"),
        "gitCommit": env!("HIVE_GIT_COMMIT"),
    });
    let human = format!(
        "hive {} (schema {}, built {}, commit {})",
        env!("CARGO_PKG_VERSION"),
        crate::config::CURRENT_SCHEMA_VERSION,
        env!("HIVE_BUILD_TIMESTAMP"),
        env!("HIVE_GIT_COMMIT"),
    );
    Output::new(json, human)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn read_json_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| Error::Filesystem {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn write_config_file(path: &Path, value: &Value) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    fs::write(path, content).map_err(|source| Error::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}
