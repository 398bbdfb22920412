//! Command dispatch and handlers

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::ReplayOutcome;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Execute the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `archsim --help`".to_string(),
        ));
    };

    // Completions need no settings, so a broken config file cannot block them.
    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let mut settings = Settings::load(cli.project_dir.as_deref())?;
    if cli.strict {
        settings.strict = true;
    }
    if cli.compact {
        settings.pretty = false;
    }
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Compose { script } => cmd_compose(&container, script),
        Commands::Tree { script } => cmd_tree(&container, script),
        Commands::Names { script, service } => cmd_names(&container, script, service.as_deref()),
        Commands::Graph { descriptor } => cmd_graph(&container, descriptor),
        Commands::Aggregate { graph } => cmd_aggregate(&container, graph),
        Commands::Config { command } => cmd_config(&container, cli.project_dir.as_deref(), command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool, what: &str) -> CliResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|source| InfraError::Serialize {
        what: what.to_string(),
        source,
    })?;
    output::info(&json);
    Ok(())
}

fn replay(container: &ServiceContainer, script: &Path) -> CliResult<ReplayOutcome> {
    let outcome = container.session.load(script)?;
    for rejected in &outcome.rejected {
        output::warning(&format!(
            "{}:{}: {} (kept previous value)",
            script.display(),
            rejected.line,
            rejected.error
        ));
    }
    Ok(outcome)
}

#[instrument(skip(container))]
fn cmd_compose(container: &ServiceContainer, script: &Path) -> CliResult<()> {
    let outcome = replay(container, script)?;
    print_json(
        &outcome.tree.snapshot(),
        container.settings.pretty,
        "descriptor document",
    )
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, script: &Path) -> CliResult<()> {
    let outcome = replay(container, script)?;
    output::info(&outcome.tree.render_tree());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_names(
    container: &ServiceContainer,
    script: &Path,
    service: Option<&str>,
) -> CliResult<()> {
    let outcome = replay(container, script)?;
    let names = match service {
        Some(name) => outcome.tree.list_operation_names(name),
        None => outcome.tree.list_service_names(),
    };
    for name in names {
        output::info(&name);
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_graph(container: &ServiceContainer, descriptor: &Path) -> CliResult<()> {
    let graph = container.graph.render_file(descriptor)?;
    print_json(&graph, container.settings.pretty, "graph")
}

#[instrument(skip(container))]
fn cmd_aggregate(container: &ServiceContainer, graph: &Path) -> CliResult<()> {
    let grouped = container.graph.aggregate_file(graph)?;
    print_json(&grouped, container.settings.pretty, "graph")
}

fn cmd_config(
    container: &ServiceContainer,
    project_dir: Option<&Path>,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("# Effective configuration");
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", &"(no config directory)"),
            }
            let dir = project_dir.unwrap_or_else(|| Path::new("."));
            let local = local_config_path(dir);
            output::action("local", &local.display());
            if !local.exists() {
                output::detail(&"(not present)");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;
    use clap::Parser;

    #[test]
    fn given_no_subcommand_when_executing_then_usage_error() {
        let cli = Cli::try_parse_from(["archsim"]).unwrap();

        let err = execute_command(&cli).unwrap_err();

        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.exit_code(), exitcode::USAGE);
    }
}
