//! Headless driver: replays an input script against a session.
//!
//! Each script line is one event: `quit`, `key <identifier>`, or
//! `click <x> <y>`. Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use adventure_core::{Effect, InputEvent, Session, StepReport};
use adventure_rules::{EngineConfig, SceneCatalog};
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "adventure", about = "Replay input scripts against the adventure runtime")]
struct Cli {
    /// Engine configuration (TOML). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the directory holding the definition files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Script to replay. Reads stdin when omitted.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Print a JSON presentation snapshot after every step.
    #[arg(long)]
    json: bool,

    /// Check the definition files and exit.
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let catalog = SceneCatalog::load(&config);

    if cli.validate {
        let issues = catalog.validate();
        for issue in &issues {
            println!("{}", issue);
        }
        if !issues.is_empty() {
            anyhow::bail!("{} problems in definition files", issues.len());
        }
        println!("definitions ok");
        return Ok(());
    }

    let input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open script {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut session = Session::new(config, catalog);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cli.json {
        let verbs: Vec<&str> = session
            .verb_grid()
            .buttons()
            .iter()
            .map(|button| button.verb.as_str())
            .collect();
        writeln!(out, "verbs: {}", verbs.join(", "))?;
        writeln!(out, "== {} ==", session.state().current_scene())?;
    }

    for (number, line) in input.lines().enumerate() {
        let line = line.context("failed to read script")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event: InputEvent = match line.parse() {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("line {}: {}", number + 1, e);
                continue;
            }
        };

        let report = session.handle(event);
        if cli.json {
            let snapshot = serde_json::to_string(&session.snapshot())
                .context("failed to serialize snapshot")?;
            writeln!(out, "{}", snapshot)?;
        } else {
            print_report(&mut out, line, &report, &session)?;
        }

        if !session.is_running() {
            break;
        }
    }

    Ok(())
}

fn print_report(out: &mut impl Write, line: &str, report: &StepReport, session: &Session) -> Result<()> {
    let latest = session.narration().latest().unwrap_or_default();
    match report {
        StepReport::Quit => writeln!(out, "> {}", line)?,
        StepReport::Missed | StepReport::Ignored => writeln!(out, "> {} (nothing)", line)?,
        StepReport::DebugOverlay(on) => writeln!(out, "> {} (debug overlay {})", line, on)?,
        StepReport::SceneChanged { to, .. } => {
            writeln!(out, "> {}", line)?;
            match session.transition() {
                Some(transition) => writeln!(out, "== {} == ({} ms wipe)", to, transition.duration_ms)?,
                None => writeln!(out, "== {} ==", to)?,
            }
        }
        StepReport::Interaction { resolution, .. } => {
            writeln!(out, "> {}", line)?;
            for text in resolution.effects.iter().filter_map(|effect| match effect {
                Effect::Narrate(text) => Some(text),
                _ => None,
            }) {
                writeln!(out, "  {}", text)?;
            }
        }
        StepReport::VerbSelected(_) | StepReport::Exhausted(_) | StepReport::Hint(_) => {
            writeln!(out, "> {}", line)?;
            writeln!(out, "  {}", latest)?;
        }
    }
    Ok(())
}
