//! Command dispatch: load settings, open the session, run one command.

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{parse_detections, Action, DetectionFilter, FilterSession, Origin};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::Scalar;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let default = Commands::Show { all: false };
    let command = cli.command.as_ref().unwrap_or(&default);

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => _config(cli, command),
        other => {
            let container = ServiceContainer::new(load_settings(cli)?);
            let mut session = container.session()?;
            if session.origin() == Origin::Snapshot {
                debug!("restored from {}", container.settings.snapshot_path.display());
            }
            run(&container, &mut session, other)
        }
    }
}

/// Settings from config layers, with command-line paths taking precedence.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(definition) = &cli.definition {
        settings.definition = Some(definition.clone());
    }
    if let Some(snapshot) = &cli.snapshot {
        settings.snapshot_path = snapshot.clone();
    }
    Ok(settings)
}

fn run(container: &ServiceContainer, session: &mut FilterSession, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Show { all } => {
            output::tree(session.tree(), *all);
            Ok(())
        }
        Commands::Toggle { id } => _dispatch(session, Action::ToggleCheck(id.clone())),
        Commands::Open { id } => _dispatch(session, Action::ToggleOpen(id.clone())),
        Commands::Set { id, value } => _dispatch(session, Action::SetValue(id.clone(), Scalar::parse(value))),
        Commands::Project { json } => _project(session, *json),
        Commands::Filter { file, json } => _filter(container, session, file, *json),
        Commands::Reset => _reset(container, session),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::InvalidArgs(
            "command does not operate on a session".to_string(),
        )),
    }
}

#[instrument(skip(session))]
fn _dispatch(session: &mut FilterSession, action: Action) -> CliResult<()> {
    let target = action.target().to_string();
    session.try_dispatch(action)?;
    output::success(&format!("updated {target}"));
    output::tree(session.tree(), false);
    Ok(())
}

fn _project(session: &FilterSession, json: bool) -> CliResult<()> {
    let projection = session.projection();
    if json {
        let rendered = serde_json::to_string_pretty(&projection)
            .map_err(|e| CliError::InvalidArgs(format!("cannot render projection: {e}")))?;
        output::info(&rendered);
    } else {
        output::projection(&projection);
    }
    Ok(())
}

#[instrument(skip(container, session))]
fn _filter(container: &ServiceContainer, session: &FilterSession, file: &std::path::Path, json: bool) -> CliResult<()> {
    let content = container
        .fs
        .read_to_string(file)
        .map_err(|e| InfraError::io(format!("read detections {}", file.display()), e))?;
    let detections = parse_detections(&content)?;

    let filter = DetectionFilter::from_projection(&session.projection(), &container.settings.hooks.threshold_control);
    let kept = filter.apply(&detections);

    if json {
        let rendered = serde_json::to_string_pretty(&kept)
            .map_err(|e| CliError::InvalidArgs(format!("cannot render detections: {e}")))?;
        output::info(&rendered);
    } else {
        output::detections(&kept, detections.len());
    }
    Ok(())
}

fn _reset(container: &ServiceContainer, session: &mut FilterSession) -> CliResult<()> {
    session.reset().map_err(|e| InfraError::Store {
        path: container.settings.snapshot_path.clone(),
        message: e.to_string(),
    })?;
    output::success("filters reset to definition");
    output::tree(session.tree(), false);
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory on this platform"),
        },
    }
    Ok(())
}
