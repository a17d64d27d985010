//! REPL – Read-Eval-Print Loop for the Tiller operator console.
//!
//! Supported slash-commands:
//!   /run [n]       – run n ticks (default 1), one summary line per tick
//!   /watch         – run continuously at the configured period until Ctrl-C
//!   /gate open|close – flip the human gate (applied between ticks)
//!   /config        – show the active governance configuration
//!   /set max_auto|hard_block <value> – adjust a threshold (validated)
//!   /ledger [n]    – show the last n audit entries (default 6)
//!   /verify        – run hash-chain verification
//!   /status        – tick counter, ledger length, last risk summary
//!   /help          – show this list
//!   /quit | /exit  – gracefully exit the console

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use tiller_runtime::Orchestrator;
use tiller_types::{ProposalStatus, TickSnapshot};

/// One parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Run(u64),
    Watch,
    Gate(bool),
    ShowConfig,
    SetMaxAuto(f64),
    SetHardBlock(f64),
    Ledger(usize),
    Verify,
    Status,
    Help,
    Quit,
}

/// Parse one input line into a [`Command`].
///
/// Returns `Err` with a user-facing message for unknown commands or
/// malformed arguments.
pub(crate) fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or("");
    match head {
        "/run" => match parts.next() {
            None => Ok(Command::Run(1)),
            Some(raw) => raw
                .parse::<u64>()
                .map(Command::Run)
                .map_err(|_| format!("'{raw}' is not a tick count")),
        },
        "/watch" => Ok(Command::Watch),
        "/gate" => match parts.next() {
            Some("open") => Ok(Command::Gate(true)),
            Some("close") => Ok(Command::Gate(false)),
            _ => Err("usage: /gate open|close".to_string()),
        },
        "/config" => Ok(Command::ShowConfig),
        "/set" => {
            let field = parts.next().unwrap_or("");
            let raw = parts.next().unwrap_or("");
            let value = raw
                .parse::<f64>()
                .map_err(|_| format!("'{raw}' is not a number"))?;
            match field {
                "max_auto" => Ok(Command::SetMaxAuto(value)),
                "hard_block" => Ok(Command::SetHardBlock(value)),
                _ => Err("usage: /set max_auto|hard_block <value>".to_string()),
            }
        }
        "/ledger" => match parts.next() {
            None => Ok(Command::Ledger(6)),
            Some(raw) => raw
                .parse::<usize>()
                .map(Command::Ledger)
                .map_err(|_| format!("'{raw}' is not an entry count")),
        },
        "/verify" => Ok(Command::Verify),
        "/status" => Ok(Command::Status),
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!(
            "Unknown command: '{other}'. Type /help for available commands."
        )),
    }
}

/// One summary line per committed tick.
pub(crate) fn tick_line(snapshot: &TickSnapshot) -> String {
    let mut auto = 0;
    let mut human = 0;
    let mut blocked = 0;
    for decision in &snapshot.decisions {
        match decision.status {
            ProposalStatus::AutoApproved => auto += 1,
            ProposalStatus::RequiresHuman => human += 1,
            ProposalStatus::Blocked => blocked += 1,
            ProposalStatus::Pending => {}
        }
    }
    format!(
        "tick {:04} | risk {:5.1} {:<8} | clarity {:5.1} | intents {} proposals {} | auto {} human {} blocked {} | actuation {}",
        snapshot.tick,
        snapshot.risk.score,
        snapshot.risk.level.to_string(),
        snapshot.risk.clarity,
        snapshot.intents.len(),
        snapshot.proposals.len(),
        auto,
        human,
        blocked,
        snapshot.commands.len(),
    )
}

/// Entry point for the interactive console.
///
/// `shutdown` is polled between ticks and between prompts; when set the
/// REPL exits cleanly.
pub fn run(shutdown: Arc<AtomicBool>, mut orchestrator: Orchestrator, tick_period: Duration) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut last_risk: Option<String> = None;

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "tiller>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse(trimmed) {
            Ok(Command::Run(count)) => cmd_run(&mut orchestrator, count, &shutdown, &mut last_risk),
            Ok(Command::Watch) => {
                cmd_watch(&mut orchestrator, tick_period, &shutdown, &mut last_risk)
            }
            Ok(Command::Gate(open)) => cmd_gate(&mut orchestrator, open),
            Ok(Command::ShowConfig) => cmd_config(&orchestrator),
            Ok(Command::SetMaxAuto(value)) => {
                let mut config = orchestrator.config().clone();
                config.max_auto_risk = value;
                cmd_replace(&mut orchestrator, config);
            }
            Ok(Command::SetHardBlock(value)) => {
                let mut config = orchestrator.config().clone();
                config.hard_block_risk = value;
                cmd_replace(&mut orchestrator, config);
            }
            Ok(Command::Ledger(count)) => cmd_ledger(&orchestrator, count),
            Ok(Command::Verify) => cmd_verify(&orchestrator),
            Ok(Command::Status) => cmd_status(&orchestrator, last_risk.as_deref()),
            Ok(Command::Help) => cmd_help(),
            Ok(Command::Quit) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Err(message) => println!("{}", message.red()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_run(
    orchestrator: &mut Orchestrator,
    count: u64,
    shutdown: &Arc<AtomicBool>,
    last_risk: &mut Option<String>,
) {
    for _ in 0..count {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match orchestrator.step() {
            Ok(snapshot) => {
                *last_risk = Some(risk_summary(&snapshot));
                println!("  {}", tick_line(&snapshot));
            }
            Err(e) => {
                println!("  {} {}", "tick failed:".red(), e);
                break;
            }
        }
    }
}

fn cmd_watch(
    orchestrator: &mut Orchestrator,
    period: Duration,
    shutdown: &Arc<AtomicBool>,
    last_risk: &mut Option<String>,
) {
    println!(
        "  watching every {} ms – {} to stop",
        period.as_millis(),
        "Ctrl-C".bold()
    );
    while !shutdown.load(Ordering::SeqCst) {
        match orchestrator.step() {
            Ok(snapshot) => {
                *last_risk = Some(risk_summary(&snapshot));
                println!("  {}", tick_line(&snapshot));
            }
            Err(e) => {
                println!("  {} {}", "tick failed:".red(), e);
                break;
            }
        }
        std::thread::sleep(period);
    }
}

fn risk_summary(snapshot: &TickSnapshot) -> String {
    format!(
        "{:.1} {} (clarity {:.1})",
        snapshot.risk.score, snapshot.risk.level, snapshot.risk.clarity
    )
}

fn cmd_gate(orchestrator: &mut Orchestrator, open: bool) {
    let mut config = orchestrator.config().clone();
    config.gate_open = open;
    match orchestrator.replace_config(config) {
        Ok(()) => {
            let state = if open {
                "OPEN – auto-approval enabled".green()
            } else {
                "CLOSED – everything goes to human review".yellow()
            };
            println!("  Human gate is now {}", state.bold());
        }
        Err(e) => println!("  {}: {}", "Config rejected".red(), e),
    }
}

fn cmd_replace(orchestrator: &mut Orchestrator, config: tiller_types::GovernanceConfig) {
    match orchestrator.replace_config(config) {
        Ok(()) => cmd_config(orchestrator),
        Err(e) => println!("  {}: {}", "Config rejected".red(), e),
    }
}

fn cmd_config(orchestrator: &Orchestrator) {
    let config = orchestrator.config();
    println!("{}", "  Governance Configuration".bold().underline());
    println!("    max_auto_risk     : {}", config.max_auto_risk);
    println!("    hard_block_risk   : {}", config.hard_block_risk);
    println!(
        "    require_human_for : {}",
        config
            .require_human_for
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "    gate_open         : {}",
        if config.gate_open {
            "true".green()
        } else {
            "false".yellow()
        }
    );
}

fn cmd_ledger(orchestrator: &Orchestrator, count: usize) {
    let entries = orchestrator.ledger().entries();
    if entries.is_empty() {
        println!("  Ledger is empty – run a tick first.");
        return;
    }
    let start = entries.len().saturating_sub(count);
    for (index, entry) in entries.iter().enumerate().skip(start) {
        println!(
            "  {:>4}  tick {:<4} {:<10} {}…",
            index,
            entry.tick,
            entry.kind,
            &entry.hash[..12]
        );
    }
}

fn cmd_verify(orchestrator: &Orchestrator) {
    match orchestrator.ledger().verify() {
        Ok(()) => println!(
            "  {} chain intact across {} entries",
            "✓".green().bold(),
            orchestrator.ledger().len()
        ),
        Err(e) => println!("  {} {}", "✗ integrity violated:".red().bold(), e),
    }
}

fn cmd_status(orchestrator: &Orchestrator, last_risk: Option<&str>) {
    println!("{}", "  Status".bold().underline());
    println!("    last tick     : {}", orchestrator.last_tick());
    println!("    ledger length : {}", orchestrator.ledger().len());
    println!(
        "    human gate    : {}",
        if orchestrator.config().gate_open {
            "open".green()
        } else {
            "closed".yellow()
        }
    );
    println!(
        "    last risk     : {}",
        last_risk.unwrap_or("(no committed tick yet)")
    );
}

fn cmd_help() {
    println!();
    println!("{}", "Tiller Commands".bold().underline());
    println!("  {}      – run n ticks (default 1)", "/run [n]".bold().cyan());
    println!("  {}        – tick continuously until Ctrl-C", "/watch".bold().cyan());
    println!("  {} – flip the human gate", "/gate open|close".bold().cyan());
    println!("  {}       – show the governance configuration", "/config".bold().cyan());
    println!(
        "  {} – adjust a risk threshold",
        "/set max_auto|hard_block <v>".bold().cyan()
    );
    println!("  {}   – show the last n audit entries", "/ledger [n]".bold().cyan());
    println!("  {}       – verify the audit chain", "/verify".bold().cyan());
    println!("  {}       – tick counter and ledger summary", "/status".bold().cyan());
    println!("  {}   – exit the console", "/quit  /exit".bold().cyan());
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
