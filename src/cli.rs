//! Command-line driver
//!
//! Runs the conversion and view pipeline headlessly: the raw view is fed
//! from a file or stdin and the visible view is printed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use notify::{Config as WatchConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use crate::config::{Args, Command, Config, OutputFormat};
use crate::convert;
use crate::render::{CommandTypesetter, ComrakRenderer, NoopTypesetter, Typesetter};
use crate::view::{
    headless_machine, Activation, TypesetOutcome, TypesetTicket, ViewKind, ViewState,
    ViewStateMachine,
};

/// JSON report produced by `render --format json`
#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub active: Option<ViewKind>,
    pub generation: u64,
    pub views: Vec<ViewState>,
    pub content: String,
}

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    SourceChanged,
    WatcherError(notify::Error),
}

/// Parse arguments, set up logging and run the requested command
pub async fn run() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let config = Config::from_args(&args)?;
    if let Some(path) = &config.project_config_path {
        log::info!("Using project config {}", path.display());
    }

    match args.command {
        Command::Convert { file } => {
            let source = read_source(file.as_deref()).await?;
            print!("{}", convert::convert(&source));
        }
        Command::Render { file, view, format } => {
            let source = read_source(file.as_deref()).await?;
            let output = render_source(&config, &source, view, format).await?;
            println!("{}", output);
        }
        Command::Watch { file, output } => {
            watch(&config, &file, output.as_deref()).await?;
        }
    }

    Ok(())
}

/// Render `source` and format the visible view
pub async fn render_source(
    config: &Config,
    source: &str,
    view: Option<ViewKind>,
    format: OutputFormat,
) -> Result<String> {
    let mut machine = build_machine(config, source)?;

    if let Activation::Rendered(ticket) = machine.start()? {
        let outcome = match typesetter(config) {
            Some(typesetter) => finish_typeset(&mut machine, ticket, &typesetter).await,
            None => finish_typeset(&mut machine, ticket, &NoopTypesetter).await,
        };
        report_outcome(&outcome);
    }

    if let Some(view) = view {
        if machine.active() != Some(view) {
            activate(&mut machine, config, view).await?;
        }
    }

    let content = machine.visible_content().unwrap_or_default();
    match format {
        OutputFormat::Html => Ok(content),
        OutputFormat::Json => {
            let report = RenderReport {
                active: machine.active(),
                generation: machine.generation(),
                views: machine.states(),
                content,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

/// Build the headless view machine described by `config`
pub fn build_machine(config: &Config, source: &str) -> Result<ViewStateMachine> {
    let renderer = ComrakRenderer::new(config.allow_raw_html);
    let machine = headless_machine(
        &config.views,
        renderer,
        config.math,
        config.initial_view,
        source,
    )
    .context("Invalid view configuration")?;
    Ok(machine)
}

fn typesetter(config: &Config) -> Option<CommandTypesetter> {
    let command = config.typeset_command.as_deref()?;
    let typesetter = CommandTypesetter::from_command_line(command)?;
    Some(typesetter.with_timeout(config.typeset_timeout))
}

async fn finish_typeset<T: Typesetter>(
    machine: &mut ViewStateMachine,
    ticket: TypesetTicket,
    typesetter: &T,
) -> TypesetOutcome {
    let result = typesetter.typeset(ticket.html().to_string()).await;
    machine.complete_typeset(ticket, result)
}

async fn activate(machine: &mut ViewStateMachine, config: &Config, view: ViewKind) -> Result<()> {
    let outcome = match typesetter(config) {
        Some(typesetter) => machine.activate_and_typeset(view, &typesetter).await?,
        None => machine.activate_and_typeset(view, &NoopTypesetter).await?,
    };
    if let Some(outcome) = outcome {
        report_outcome(&outcome);
    }
    Ok(())
}

fn report_outcome(outcome: &TypesetOutcome) {
    match outcome {
        TypesetOutcome::Applied => log::debug!("Typesetting applied"),
        TypesetOutcome::Stale => log::debug!("Typesetting result superseded"),
        TypesetOutcome::Failed(e) => log::warn!("Showing markdown without typeset math: {}", e),
    }
}

async fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut source = String::new();
            tokio::io::stdin()
                .read_to_string(&mut source)
                .await
                .context("Failed to read stdin")?;
            Ok(source)
        }
    }
}

/// Re-render the markdown view each time `file` changes
async fn watch(config: &Config, file: &Path, output: Option<&Path>) -> Result<()> {
    let file = file
        .canonicalize()
        .with_context(|| format!("Failed to resolve input file: {}", file.display()))?;
    let dir = file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let source = read_source(Some(&file)).await?;
    let mut machine = build_machine(config, &source)?;
    if !machine.contains(ViewKind::Markdown) {
        anyhow::bail!("watch needs the markdown view to be enabled");
    }
    refresh(&mut machine, config, &source, output).await?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let target = file.clone();

    // Editors often replace files, so watch the directory and filter by path
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) = event.kind {
                    if event.paths.iter().any(|p| p == &target) {
                        let _ = tx.send(WatcherEvent::SourceChanged);
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(WatcherEvent::WatcherError(e));
            }
        },
        WatchConfig::default().with_poll_interval(Duration::from_secs(1)),
    )?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    log::info!("Watching {}", file.display());

    while let Some(event) = rx.recv().await {
        match event {
            WatcherEvent::SourceChanged => match tokio::fs::read_to_string(&file).await {
                Ok(source) => refresh(&mut machine, config, &source, output).await?,
                Err(e) => log::warn!("Failed to read {}: {}", file.display(), e),
            },
            WatcherEvent::WatcherError(e) => log::error!("File watcher error: {}", e),
        }
    }

    Ok(())
}

async fn refresh(
    machine: &mut ViewStateMachine,
    config: &Config,
    source: &str,
    output: Option<&Path>,
) -> Result<()> {
    machine.set_source(source)?;
    activate(machine, config, ViewKind::Markdown).await?;

    let html = machine
        .surface(ViewKind::Markdown)
        .map(|s| s.text())
        .unwrap_or_default();
    match output {
        Some(path) => {
            tokio::fs::write(path, &html)
                .await
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            log::info!("Rendered {} (render {})", path.display(), machine.generation());
        }
        None => println!("{}", html),
    }
    Ok(())
}
