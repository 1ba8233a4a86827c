//! Cogkernel CLI
//!
//! Command-line front end for the cognitive decision kernel: list mode
//! presets, run decision cycles over a scenario file, and inspect the
//! importance ranking of its memories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use cogkernel_cli::logging::init_logging;
use cogkernel_cli::scenario::{Scenario, load_config};
use cogkernel_core::{CognitiveKernel, CognitiveMode, DecisionResult, ManualClock};

/// Cogkernel - Cognitive Decision Kernel CLI
#[derive(Parser)]
#[command(name = "cogkernel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the cogkernel decision kernel")]
#[command(long_about = "Cogkernel ranks memories by graph importance and steers decisions with entropy, decaying core strength and precession torque.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cognitive mode presets
    Modes,

    /// Run decision cycles over a scenario file
    Decide {
        /// Path to scenario JSON
        #[arg(long)]
        scenario: PathBuf,
        /// Cognitive mode (normal, adhd, asd, ptsd, alzheimer)
        #[arg(long)]
        mode: Option<String>,
        /// Number of cycles to run
        #[arg(long, default_value = "1")]
        cycles: usize,
        /// Simulated seconds between cycles
        #[arg(long, default_value = "60")]
        interval: f64,
        /// Path to kernel config JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print one JSON object per cycle
        #[arg(long)]
        json: bool,
    },

    /// Print the top memories by graph importance
    Rank {
        /// Path to scenario JSON
        #[arg(long)]
        scenario: PathBuf,
        /// Cognitive mode (normal, adhd, asd, ptsd, alzheimer)
        #[arg(long)]
        mode: Option<String>,
        /// Number of memories to show
        #[arg(short, default_value = "5")]
        k: usize,
        /// Path to kernel config JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct CycleReport<'a> {
    cycle: usize,
    #[serde(flatten)]
    result: &'a DecisionResult,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Modes => run_modes(),
        Commands::Decide {
            scenario,
            mode,
            cycles,
            interval,
            config,
            json,
        } => run_decide(scenario, mode, cycles, interval, config, json),
        Commands::Rank {
            scenario,
            mode,
            k,
            config,
        } => run_rank(scenario, mode, k, config),
    }
}

/// List every preset with its key constants
fn run_modes() -> anyhow::Result<()> {
    println!("{}", "=== Cognitive Modes ===".cyan().bold());
    println!();

    for mode in CognitiveMode::ALL {
        let profile = mode.profile();
        let name = if mode.is_pathological() {
            mode.as_str().red().bold()
        } else {
            mode.as_str().green().bold()
        };
        println!("{} - {}", name, mode.description());
        println!(
            "  β {:.1}  WM {}  damping {:.2}  local boost {:.1}  torque x{:.1}",
            profile.decision_temperature(),
            profile.working_memory_capacity(),
            profile.damping(),
            profile.local_weight_boost(),
            profile.torque_multiplier(),
        );
        if profile.decays() {
            println!(
                "  {} λ {:.3}/s, update failure {:.1}",
                "core decay".yellow(),
                profile.core_decay_rate(),
                profile.memory_update_failure(),
            );
        }
    }

    Ok(())
}

fn build_kernel(
    scenario_path: &Path,
    mode: Option<String>,
    config_path: Option<PathBuf>,
) -> anyhow::Result<(CognitiveKernel, Scenario, ManualClock)> {
    let config = load_config(config_path.as_deref(), mode.as_deref())?;
    let scenario = Scenario::load(scenario_path)?;

    let clock = ManualClock::new(Utc::now());
    let kernel = CognitiveKernel::builder(config)
        .clock(Arc::new(clock.clone()))
        .build()?;
    let ids = scenario.record_into(&kernel)?;
    info!(memories = ids.len(), mode = kernel.mode().as_str(), "Scenario loaded");

    Ok((kernel, scenario, clock))
}

/// Run decision cycles, advancing simulated time between them
fn run_decide(
    scenario_path: PathBuf,
    mode: Option<String>,
    cycles: usize,
    interval: f64,
    config_path: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    if !(interval.is_finite() && interval >= 0.0) {
        anyhow::bail!("--interval must be a non-negative number of seconds");
    }
    let (kernel, scenario, clock) = build_kernel(&scenario_path, mode, config_path)?;

    if !json {
        println!(
            "{}",
            format!("=== Decision Cycles ({}) ===", kernel.mode()).cyan().bold()
        );
        println!();
    }

    for cycle in 1..=cycles.max(1) {
        if cycle > 1 {
            clock.advance_secs(interval);
        }
        let result = kernel.decide(&scenario.options, scenario.habit.as_deref())?;

        if json {
            println!("{}", serde_json::to_string(&CycleReport { cycle, result: &result })?);
        } else {
            print_result(cycle, &result);
        }
    }

    Ok(())
}

fn print_result(cycle: usize, result: &DecisionResult) {
    let action = result.action.as_deref().unwrap_or("-");
    println!(
        "{} {} {}",
        format!("Cycle {cycle}:").white().bold(),
        action.green().bold(),
        format!("(p {:.3}, U {:.3})", result.probability, result.utility).dimmed()
    );
    println!(
        "  {}: {:.4}  {}: {:.4}",
        "Entropy".white(),
        result.entropy,
        "Core".white(),
        result.core_strength
    );
    for (option, p) in &result.probability_distribution {
        let filled = (p * 30.0).round() as usize;
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(30usize.saturating_sub(filled)));
        println!("  {:15} [{}] {:.3}", option, bar.blue(), p);
    }
    if result.conflict {
        let habit = result.habit_suggestion.as_deref().unwrap_or("-");
        println!("  {} habit suggested {}", "!".yellow().bold(), habit.yellow());
    }
    if result.cognitive_distress {
        println!("  {} {}", "!".red().bold(), result.distress_message.red());
    }
    println!();
}

/// Show the ranking of the scenario's memories
fn run_rank(
    scenario_path: PathBuf,
    mode: Option<String>,
    k: usize,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (kernel, _, _) = build_kernel(&scenario_path, mode, config_path)?;
    let top = kernel.recall(k)?;

    println!("{}", "=== Memory Importance ===".cyan().bold());
    println!();

    if top.is_empty() {
        println!("{}", "No memories found.".dimmed());
        return Ok(());
    }

    for (rank, record) in top.iter().enumerate() {
        println!(
            "{:>3}. {:.4}  {}",
            rank + 1,
            record.importance,
            record.content_text().white()
        );
    }

    Ok(())
}
