//! Gamebox: an analysis board on stdin.
//!
//! Usage: gamebox [--load game.pgn|game.json] [--config-env]
//!
//! Reads one command per line (`move e2e4`, `prev`, `goto 3/v0/1`, `undo`,
//! `pgn`, `save out.json`, ...) and prints the cursor path and FEN after each.

mod session;

use std::env;
use std::io::{self, BufRead, Write};

use chess_core::ShakmatyCodec;
use move_tree::{Navigator, NavigatorConfig};
use tracing_subscriber::EnvFilter;

use crate::session::{load_file, Command, Session};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut load: Option<String> = None;
    let mut config = NavigatorConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--load" => {
                load = args.get(i + 1).cloned();
                i += 2;
            }
            "--config-env" => {
                config = NavigatorConfig::from_env();
                i += 1;
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} [--load FILE] [--config-env]", args[0]);
                return Ok(());
            }
            other => {
                tracing::warn!(arg = %other, "Ignoring unknown argument");
                i += 1;
            }
        }
    }

    let mut navigator = Navigator::with_config(ShakmatyCodec::new(), config);
    if let Some(path) = load {
        let document = load_file(&path, &navigator)?;
        tracing::info!(
            file = %path,
            plies = document.mainline().node_count(),
            "Loaded game"
        );
        navigator.load_document(document);
    }

    let mut session = Session::new(navigator);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "{} {}",
        session.navigator().current_path(),
        session.navigator().current_position()
    )?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };
        match session.execute(command, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "error: {e:#}")?,
        }
        out.flush()?;
    }

    Ok(())
}
