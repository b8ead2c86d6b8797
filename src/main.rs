mod buffer;
mod calculator;
mod config;
mod controller;
mod history;
mod ui;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::calculator::{DisabledClipboard, EvaluationOutcome, Evaluator, SystemClipboard};
use crate::config::Config;
use crate::controller::Controller;
use crate::history::{FileBackend, HistoryStore, MemoryBackend};
use crate::ui::Command;

#[derive(Debug, Parser)]
#[command(name = "calcbox", version, about = "A keypad calculator with live preview and history")]
struct Args {
    /// Config file (default: <config dir>/calcbox/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// History file, overriding the config
    #[arg(long, conflicts_with = "no_persist")]
    history_file: Option<PathBuf>,

    /// Keep history in memory only
    #[arg(long)]
    no_persist: bool,

    /// Do not touch the system clipboard
    #[arg(long)]
    no_clipboard: bool,

    /// Show the history panel at start
    #[arg(long)]
    show_history: bool,

    /// Evaluate one expression, print the result and exit
    #[arg(long, value_name = "EXPR")]
    eval: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(expression) = &args.eval {
        return Ok(eval_once(expression));
    }

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    debug!(?config, "loaded configuration");

    let mut controller = build_controller(&args, &config)?;
    run_session(&mut controller)?;
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "calcbox=debug" } else { "calcbox=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn eval_once(expression: &str) -> ExitCode {
    let mut evaluator = Evaluator::new();
    match evaluator.evaluate(expression) {
        outcome @ EvaluationOutcome::Numeric { .. } => {
            println!("{}", outcome.formatted().unwrap_or_default());
            ExitCode::SUCCESS
        }
        EvaluationOutcome::Invalid(reason) => {
            eprintln!("Error: {}", reason);
            ExitCode::FAILURE
        }
    }
}

fn build_controller(args: &Args, config: &Config) -> Result<Controller> {
    let history = if args.no_persist {
        HistoryStore::load(MemoryBackend::new())
    } else {
        let path = args
            .history_file
            .clone()
            .or_else(|| config.history.file.clone())
            .or_else(FileBackend::default_path)
            .context("No data directory found. Pass --history-file or --no-persist.")?;
        let backend = FileBackend::new(path);
        info!(path = %backend.path().display(), "using history file");
        HistoryStore::load(backend)
    };

    let visible = args.show_history || config.history.visible;
    let controller = if args.no_clipboard || !config.clipboard.enabled {
        Controller::new(history, DisabledClipboard)
    } else {
        Controller::new(history, SystemClipboard)
    };
    Ok(controller.with_history_visible(visible))
}

fn run_session(controller: &mut Controller) -> Result<()> {
    let color = io::stdout().is_terminal();
    let mut stdout = io::stdout().lock();

    write!(stdout, "{}", ui::render_keypad(color))?;
    writeln!(stdout, "Type 'help' for the key list.")?;
    write!(stdout, "{}", ui::render(&controller.snapshot(), color))?;
    stdout.flush()?;

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read input")?;
        let commands = match ui::parse_line(&line) {
            Ok(commands) => commands,
            Err(message) => {
                writeln!(stdout, "{}", message)?;
                continue;
            }
        };

        let mut snapshot = None;
        for command in commands {
            match command {
                Command::Quit => return Ok(()),
                Command::Help => writeln!(stdout, "{}", ui::HELP)?,
                Command::Intent(intent) => snapshot = Some(controller.handle(intent)),
            }
        }

        if let Some(snapshot) = snapshot {
            write!(stdout, "{}", ui::render(&snapshot, color))?;
        }
        stdout.flush()?;
    }

    Ok(())
}
