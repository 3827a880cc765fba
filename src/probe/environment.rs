//! Host conditions that make counter readings less trustworthy.
//!
//! # Factors Considered
//!
//! - **CPU Governor**: anything but `performance` changes the core clock, so
//!   the same work costs a different number of cycles from run to run
//! - **SMT**: a busy sibling thread slows the measured one
//! - **TSC flags**: without `constant_tsc` the TSC rate follows the core
//!   frequency; without `nonstop_tsc` it may stop in deep C-states
//! - **Clocksource**: if the kernel has rejected the TSC as its clocksource it
//!   usually found it unsynchronized across cores
//!
//! Everything is read from procfs/sysfs; missing files mean "unknown" and
//! produce no warning.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::backend::Backend;

/// Snapshot of the host state relevant to counter readings.
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    /// CPU frequency governor of CPU 0 (e.g. "performance", "schedutil")
    pub cpu_governor: Option<String>,
    /// Whether SMT (Hyper-Threading) is active
    pub smt_active: Option<bool>,
    /// `constant_tsc` present in the CPU flags (x86 only)
    pub constant_tsc: Option<bool>,
    /// `nonstop_tsc` present in the CPU flags (x86 only)
    pub nonstop_tsc: Option<bool>,
    /// Current kernel clocksource
    pub clocksource: Option<String>,
    /// Human-readable warnings about the environment
    pub warnings: Vec<String>,
}

impl HostEnvironment {
    /// Detect the current host state for `backend`.
    pub fn detect(backend: Backend) -> Self {
        let cpu_flags = detect_cpu_flags();
        let has_flag = |name: &str| cpu_flags.as_ref().map(|flags| flags.iter().any(|f| f == name));

        Self::assess(
            backend,
            read_first_line("/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor"),
            read_first_line("/sys/devices/system/cpu/smt/active").map(|v| v == "1"),
            has_flag("constant_tsc"),
            has_flag("nonstop_tsc"),
            read_first_line("/sys/devices/system/clocksource/clocksource0/current_clocksource"),
        )
    }

    /// Builds the snapshot from already-gathered facts and derives warnings.
    pub fn assess(
        backend: Backend,
        cpu_governor: Option<String>,
        smt_active: Option<bool>,
        constant_tsc: Option<bool>,
        nonstop_tsc: Option<bool>,
        clocksource: Option<String>,
    ) -> Self {
        let mut env = Self {
            cpu_governor,
            smt_active,
            constant_tsc,
            nonstop_tsc,
            clocksource,
            warnings: Vec::new(),
        };
        env.collect_warnings(backend);
        env
    }

    fn collect_warnings(&mut self, backend: Backend) {
        if let Some(ref gov) = self.cpu_governor {
            if gov != "performance" {
                self.warnings.push(format!(
                    "CPU governor '{}' scales the core clock; cycle deltas for equal work will vary \
                     (consider: cpupower frequency-set -g performance)",
                    gov
                ));
            }
        }

        if let Some(true) = self.smt_active {
            self.warnings.push(
                "SMT (Hyper-Threading) active - sibling threads add noise to cycle deltas".to_string(),
            );
        }

        if backend != Backend::Rdtsc {
            return;
        }

        if let Some(false) = self.constant_tsc {
            self.warnings.push(
                "CPU lacks constant_tsc - TSC rate follows the core frequency".to_string(),
            );
        }
        if let Some(false) = self.nonstop_tsc {
            self.warnings.push(
                "CPU lacks nonstop_tsc - TSC may stop in deep C-states".to_string(),
            );
        }
        if let Some(ref source) = self.clocksource {
            if source != "tsc" {
                self.warnings.push(format!(
                    "kernel clocksource is '{}', not 'tsc' - TSC may be unsynchronized across cores",
                    source
                ));
            }
        }
    }

    /// True when nothing degrades the readings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Log the environment summary.
    pub fn log_summary(&self) {
        tracing::info!(
            governor = self.cpu_governor.as_deref().unwrap_or("unknown"),
            smt = ?self.smt_active,
            constant_tsc = ?self.constant_tsc,
            nonstop_tsc = ?self.nonstop_tsc,
            clocksource = self.clocksource.as_deref().unwrap_or("unknown"),
            "host environment"
        );
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }
}

fn read_first_line(path: &str) -> Option<String> {
    let file = File::open(path).ok()?;
    let line = BufReader::new(file).lines().next()?.ok()?;
    Some(line.trim().to_string())
}

/// Flags of the first CPU listed in /proc/cpuinfo.
fn detect_cpu_flags() -> Option<Vec<String>> {
    let file = File::open("/proc/cpuinfo").ok()?;
    BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .find_map(|line| parse_flags_line(&line))
}

fn parse_flags_line(line: &str) -> Option<Vec<String>> {
    let (key, value) = line.split_once(':')?;
    if key.trim() != "flags" {
        return None;
    }
    Some(value.split_whitespace().map(str::to_string).collect())
}
