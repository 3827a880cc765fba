//! Self-check of the counter on the running host.
//!
//! Pins the thread, records host conditions, then runs the contract checks
//! from [`checks`] against the plain or serialized read and folds the
//! outcomes into a [`Verdict`].

pub mod affinity;
pub mod checks;
pub mod config;
pub mod environment;

pub use checks::{Check, CheckOutcome};
pub use config::ProbeConfig;
pub use environment::HostEnvironment;

use tracing::{info, warn};

use crate::backend::Backend;
use crate::counter::{read_cycles, read_cycles_serialized, CycleValue};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every check passed on a clean host.
    Pass,
    /// Every check passed, but host conditions make readings less reliable.
    Degraded,
    /// At least one check failed.
    Fail,
}

/// Everything one probe run found.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub backend: Backend,
    pub serialized: bool,
    /// CPU the thread was pinned to, if pinning was requested and succeeded.
    pub pinned_cpu: Option<usize>,
    pub environment: HostEnvironment,
    pub outcomes: Vec<CheckOutcome>,
}

impl ProbeReport {
    pub fn verdict(&self) -> Verdict {
        if self.outcomes.iter().any(|o| !o.passed) {
            Verdict::Fail
        } else if !self.environment.is_clean() {
            Verdict::Degraded
        } else {
            Verdict::Pass
        }
    }

    pub fn outcome(&self, check: Check) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.check == check)
    }

    /// Returns a summary suitable for printing
    pub fn summary(&self) -> String {
        let read = if self.serialized { "serialized" } else { "unserialized" };
        let mut s = format!(
            "Backend: {} | Read: {} | Verdict: {:?}\n",
            self.backend,
            read,
            self.verdict()
        );
        match self.pinned_cpu {
            Some(cpu) => s.push_str(&format!("Pinned to CPU {}\n", cpu)),
            None => s.push_str("Not pinned\n"),
        }
        s.push_str("Checks:\n");
        for o in &self.outcomes {
            let mark = if o.passed { "ok" } else { "FAILED" };
            s.push_str(&format!("  {:<14} {:<6} {}\n", o.check.to_string(), mark, o.details));
        }
        if !self.environment.warnings.is_empty() {
            s.push_str("Environment:\n");
            for w in &self.environment.warnings {
                s.push_str(&format!("  {}\n", w));
            }
        }
        s
    }
}

/// Runs every check described by `config`.
pub fn run(config: &ProbeConfig) -> Result<ProbeReport> {
    config.validate()?;

    let backend = Backend::ACTIVE;
    info!(%backend, serialized = config.serialized, "starting counter self-check");

    let mut environment = HostEnvironment::detect(backend);
    let pinned_cpu = match config.pin_cpu {
        Some(cpu) => match affinity::pin_to_cpu(cpu) {
            Ok(()) => Some(cpu),
            Err(err) => {
                warn!(%err, "could not pin, results may include cross-core noise");
                environment.warnings.push(format!("thread not pinned: {}", err));
                None
            }
        },
        None => None,
    };
    environment.log_summary();

    let read: fn() -> CycleValue = if config.serialized {
        read_cycles_serialized
    } else {
        read_cycles
    };

    let outcomes = vec![
        checks::check_monotonic(read, config.monotonic_samples),
        checks::check_overhead(read, config.overhead_calls, config.overhead_budget),
        checks::check_delta_scaling(read, &config.delta_workloads(), config.delta_trials),
    ];
    for outcome in &outcomes {
        if outcome.passed {
            info!(check = %outcome.check, "{}", outcome.details);
        } else {
            warn!(check = %outcome.check, "check failed: {}", outcome.details);
        }
    }

    Ok(ProbeReport {
        backend,
        serialized: config.serialized,
        pinned_cpu,
        environment,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::time::Duration;

    fn quick_config() -> ProbeConfig {
        ProbeConfig {
            monotonic_samples: 1_000,
            overhead_calls: 10_000,
            overhead_budget: Duration::from_secs(5),
            delta_base_work: 10_000,
            delta_steps: 2,
            delta_trials: 3,
            pin_cpu: None,
            serialized: false,
        }
    }

    fn outcome(check: Check, passed: bool) -> CheckOutcome {
        CheckOutcome { check, passed, details: String::new() }
    }

    fn report(outcomes: Vec<CheckOutcome>, warnings: Vec<String>) -> ProbeReport {
        ProbeReport {
            backend: Backend::ACTIVE,
            serialized: false,
            pinned_cpu: None,
            environment: HostEnvironment { warnings, ..Default::default() },
            outcomes,
        }
    }

    #[test]
    fn test_verdict_thresholds() {
        let passing = || vec![outcome(Check::Monotonic, true), outcome(Check::Overhead, true)];
        assert_eq!(report(passing(), vec![]).verdict(), Verdict::Pass);
        assert_eq!(report(passing(), vec!["SMT".into()]).verdict(), Verdict::Degraded);

        let failing = vec![outcome(Check::Monotonic, true), outcome(Check::Overhead, false)];
        assert_eq!(report(failing, vec!["SMT".into()]).verdict(), Verdict::Fail);
    }

    #[test]
    fn test_summary_lists_checks_and_warnings() {
        let r = report(
            vec![outcome(Check::DeltaScaling, false)],
            vec!["CPU governor 'powersave'".into()],
        );
        let summary = r.summary();
        assert!(summary.contains("Verdict: Fail"));
        assert!(summary.contains("delta-scaling"));
        assert!(summary.contains("FAILED"));
        assert!(summary.contains("powersave"));
    }

    #[test]
    fn test_run_reports_every_check() {
        let report = run(&quick_config()).unwrap();
        assert_eq!(report.backend, Backend::ACTIVE);
        for check in [Check::Monotonic, Check::Overhead, Check::DeltaScaling] {
            let o = report.outcome(check).unwrap();
            assert!(o.passed, "{}: {}", check, o.details);
        }
        assert_ne!(report.verdict(), Verdict::Fail);
    }

    #[test]
    fn test_run_serialized() {
        let config = ProbeConfig { serialized: true, ..quick_config() };
        let report = run(&config).unwrap();
        assert!(report.serialized);
        assert!(report.outcome(Check::Monotonic).unwrap().passed);
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let config = ProbeConfig { overhead_calls: 0, ..quick_config() };
        assert!(matches!(run(&config), Err(Error::InvalidConfig(_))));
    }
}
