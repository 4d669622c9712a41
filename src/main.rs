//! Hive CLI - swarm configuration synthesis and migration.

use clap::Parser;
use hivecfg::catalog::AgentCatalog;
use hivecfg::cli::{AgentCommands, Cli, Commands, PresetCommands};
use hivecfg::commands::{self, Output, SynthesizeArgs};
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    // Build the catalog once: embedded definitions plus extension files
    let catalog = match AgentCatalog::load(&cli.catalog) {
        Ok(catalog) => catalog,
        Err(e) => fail(&e, human),
    };

    let result = run_command(cli.command, &catalog);

    match result {
        Ok(output) => {
            output.print(human);
            if output.failed {
                process::exit(1);
            }
        }
        Err(e) => fail(&e, human),
    }
}

/// Dispatch a parsed command against the catalog.
fn run_command(command: Commands, catalog: &AgentCatalog) -> hivecfg::Result<Output> {
    match command {
        Commands::Synthesize {
            agent,
            preset,
            task,
            max_agents,
            max_concurrent,
            topology,
            strategy,
            output,
            layout,
        } => commands::synthesize(
            catalog,
            SynthesizeArgs {
                agents: agent,
                preset,
                task,
                max_agents,
                max_concurrent,
                topology,
                strategy,
                output,
                layout,
            },
        ),
        Commands::Migrate { files, output_dir } => {
            commands::migrate(catalog, &files, output_dir.as_deref())
        }
        Commands::Agents { command } => match command {
            AgentCommands::List { category } => {
                commands::agents_list(catalog, category.as_deref())
            }
            AgentCommands::Show { id } => commands::agents_show(catalog, &id),
        },
        Commands::Presets { command } => match command {
            PresetCommands::List => commands::presets_list(catalog),
            PresetCommands::Show { id } => commands::presets_show(catalog, &id),
        },
        Commands::Version => Ok(commands::version()),
    }
}

/// Print an error in the requested format and exit.
fn fail(error: &hivecfg::Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", error);
    } else {
        eprintln!(
            "{}",
            serde_json::json!({ "error": error.to_string() })
        );
    }
    process::exit(1);
}
