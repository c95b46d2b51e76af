//! Civic Portal - Main Entry Point

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use civic_a11y::{
    AnnouncementCoordinator, CoordinatorConfig, PreferencesPanel, Storage, SystemClock,
    TracingSpeech,
};
use civic_portal::{feedback_page, parse, Command, Flow, Session};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    prefs: Option<PathBuf>,
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    prefers_dark: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--prefs" => args.prefs = Some(iter.next().context("--prefs needs a path")?.into()),
            "--config" => args.config = Some(iter.next().context("--config needs a path")?.into()),
            "--dark" => args.prefers_dark = true,
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            path => args.script = Some(path.into()),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    tracing::info!("Starting civic portal...");

    let config = match &args.config {
        Some(path) => CoordinatorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CoordinatorConfig::default(),
    };
    let storage = match &args.prefs {
        Some(path) => Storage::local(path)
            .with_context(|| format!("opening preferences {}", path.display()))?,
        None => Storage::session(),
    }
    .into_shared();

    let document = feedback_page().context("building portal page")?.into_shared();
    let coordinator =
        AnnouncementCoordinator::for_document(config, document.clone(), TracingSpeech, storage.clone())
            .with_clock(SystemClock::new());
    let panel = PreferencesPanel::new(coordinator, Some(document.clone()), storage)
        .with_system_dark(args.prefers_dark);
    let mut session = Session::new(panel, document);

    match &args.script {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            let commands = parse(&source)?;
            session.run(&commands);
        }
        None => {
            for (index, line) in io::stdin().lock().lines().enumerate() {
                let line = line.context("reading stdin")?;
                let command = match Command::parse_line(index + 1, &line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::warn!("{e}");
                        continue;
                    }
                };
                if session.execute(&command) == Flow::Stop {
                    break;
                }
            }
        }
    }

    if let Some(text) = session.announcement() {
        tracing::info!(live_region = %text, "final announcement");
    }
    session.close();
    Ok(())
}
