//! `cyclecount-probe`: checks the cycle counter's contract on this host.
//!
//! Runs the monotonicity, overhead and delta-scaling checks and prints a
//! report. Exits non-zero when a check fails.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cyclecount::probe::{self, ProbeConfig, Verdict};
use cyclecount::{read_cycles, Backend};
use tracing::info;

/// Probe command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "cyclecount-probe",
    about = "Check the hardware cycle counter on this host",
    version,
    long_about = None
)]
struct Args {
    /// Back-to-back read pairs checked for regressions.
    #[arg(long, default_value_t = 100_000)]
    monotonic_samples: usize,

    /// Reads in the overhead loop.
    #[arg(long, default_value_t = 1_000_000)]
    overhead_calls: usize,

    /// Wall-clock budget for the overhead loop (e.g. "50ms").
    #[arg(long, default_value = "50ms", value_parser = humantime::parse_duration)]
    overhead_budget: Duration,

    /// Busy-loop iterations of the smallest delta workload.
    #[arg(long, default_value_t = 10_000)]
    delta_base_work: u64,

    /// Number of delta workloads, each 10x the previous.
    #[arg(long, default_value_t = 4)]
    delta_steps: u32,

    /// Repetitions per delta workload.
    #[arg(long, default_value_t = 5)]
    delta_trials: usize,

    /// CPU to pin the probe thread to.
    #[arg(long, default_value_t = 0)]
    cpu: usize,

    /// Do not pin the probe thread.
    #[arg(long)]
    no_pin: bool,

    /// Check the serialized read instead of the plain one.
    #[arg(long)]
    serialized: bool,

    /// Print one raw counter value and exit.
    #[arg(long, conflicts_with = "serialized")]
    once: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

impl Args {
    fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            monotonic_samples: self.monotonic_samples,
            overhead_calls: self.overhead_calls,
            overhead_budget: self.overhead_budget,
            delta_base_work: self.delta_base_work,
            delta_steps: self.delta_steps,
            delta_trials: self.delta_trials,
            pin_cpu: if self.no_pin { None } else { Some(self.cpu) },
            serialized: self.serialized,
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.once {
        println!("{}", read_cycles());
        return Ok(ExitCode::SUCCESS);
    }

    init_logging(&args.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), backend = %Backend::ACTIVE, "cyclecount probe");

    let config = args.probe_config();
    let report = probe::run(&config).context("counter self-check could not run")?;

    println!("{}", report.summary());

    Ok(match report.verdict() {
        Verdict::Pass | Verdict::Degraded => ExitCode::SUCCESS,
        Verdict::Fail => ExitCode::FAILURE,
    })
}

fn init_logging(level: &str) {
    let filter = format!("cyclecount={level},cyclecount_probe={level}");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
