//! CLI argument definitions for the hive binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hive - swarm configuration synthesis and migration.
///
/// Synthesize a fresh swarm configuration with `hive synthesize`, or bring
/// legacy configuration files up to the current schema with `hive migrate`.
#[derive(Parser, Debug)]
#[command(name = "hive")]
#[command(author, version, about = "A CLI tool for synthesizing and migrating multi-agent swarm configurations", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Additional catalog extension file (KDL); repeatable.
    /// Can also be set via the HIVE_CATALOG environment variable.
    #[arg(long = "catalog", global = true, env = "HIVE_CATALOG")]
    pub catalog: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize a swarm configuration from a catalog selection
    Synthesize {
        /// Agent id to include; repeatable. Omit to use the preset's
        /// required agents.
        #[arg(short, long = "agent")]
        agent: Vec<String>,

        /// Preset id (defaults to "none")
        #[arg(short, long)]
        preset: Option<String>,

        /// Task description
        #[arg(short, long, default_value = "")]
        task: String,

        /// Override maximum number of agents (1-20)
        #[arg(long)]
        max_agents: Option<u8>,

        /// Override maximum concurrent agents (up to --max-agents;
        /// the default ceiling is 8)
        #[arg(long)]
        max_concurrent: Option<u8>,

        /// Override the preset topology
        #[arg(long)]
        topology: Option<String>,

        /// Override the preset strategy
        #[arg(long)]
        strategy: Option<String>,

        /// Write the configuration to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Materialize the swarm directory layout under this root
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Migrate legacy configuration files to the current schema
    Migrate {
        /// Legacy configuration files (JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write each migrated configuration as <stem>.v2.json into this
        /// directory instead of printing
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Agent catalog commands
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },

    /// Preset catalog commands
    Presets {
        #[command(subcommand)]
        command: PresetCommands,
    },

    /// Show version and build information
    Version,
}

/// Agent subcommands
#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// List agent definitions
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show one agent definition
    Show {
        /// Agent id
        id: String,
    },
}

/// Preset subcommands
#[derive(Subcommand, Debug)]
pub enum PresetCommands {
    /// List preset definitions
    List,

    /// Show one preset definition
    Show {
        /// Preset id
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_synthesize() {
        let cli = Cli::parse_from([
            "hive",
            "synthesize",
            "--agent",
            "queen",
            "--agent",
            "tester",
            "--preset",
            "minimal",
            "--task",
            "Build a REST API",
        ]);

        match cli.command {
            Commands::Synthesize { agent, preset, task, .. } => {
                assert_eq!(agent, vec!["queen", "tester"]);
                assert_eq!(preset.as_deref(), Some("minimal"));
                assert_eq!(task, "Build a REST API");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_human_flag_after_subcommand() {
        let cli = Cli::parse_from(["hive", "agents", "list", "-H"]);
        assert!(cli.human_readable);
    }

    #[test]
    fn test_migrate_requires_files() {
        assert!(Cli::try_parse_from(["hive", "migrate"]).is_err());
    }
}
