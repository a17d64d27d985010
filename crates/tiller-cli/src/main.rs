//! `tiller` – Tiller operator console.
//!
//! This binary is the primary entry point for the Tiller decision loop.  It:
//!
//! 1. Checks for `~/.tiller/config.toml`; writes the defaults when the file
//!    is absent so the operator has something to edit.
//! 2. Builds the standard stage set and hands it to the orchestrator.
//! 3. Drops the user into an **interactive REPL** with slash-commands
//!    (`/run`, `/watch`, `/gate`, `/ledger`, `/verify`, `/help`).
//! 4. Intercepts **Ctrl-C** so `/watch` stops between ticks and the console
//!    exits cleanly.

mod config;
mod repl;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use tracing::warn;

use tiller_runtime::{Orchestrator, telemetry};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG controls verbosity (defaults to "info"); TILLER_LOG_FORMAT=json
    // switches to newline-delimited JSON; OTEL_EXPORTER_OTLP_ENDPOINT enables
    // span export.  The REPL's user-facing output still uses println! for UX
    // consistency.
    let _telemetry_guard = telemetry::init_tracing("tiller-cli");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after the current tick …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Could not write default config".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    // ── Orchestrator ──────────────────────────────────────────────────────
    let stages = tiller_stages::standard(cfg.seed);
    let orchestrator = match Orchestrator::new(stages, cfg.governance()) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            println!("{}: {}", "Invalid governance configuration".red(), e);
            std::process::exit(1);
        }
    };

    println!();
    println!(
        "  Human gate is {}.  Type {} for a list of commands.\n",
        if cfg.gate_open {
            "open".green().bold()
        } else {
            "closed".yellow().bold()
        },
        "/help".bold().cyan()
    );

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(
        shutdown,
        orchestrator,
        Duration::from_millis(cfg.tick_period_ms),
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"  _______ ____         "#.bold().cyan());
    println!("{}", r#" /_  __(_) / /__ ____  "#.bold().cyan());
    println!("{}", r#"  / / / / / / -_) __/  "#.bold().cyan());
    println!("{}", r#" /_/ /_/_/_/\__/_/     "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Tiller".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Governed Tick-Based Decision Loop");
    println!();
}
