//! Runtime checks of the counter's contract on the current host.
//!
//! Each check takes the read function as a parameter so the same code runs
//! against the plain and the serialized read (and against fakes in tests).
//!
//! Detects:
//! - Regressions between back-to-back reads on one thread
//! - Per-call overhead that points at a trapping or emulated counter
//! - Counters that do not advance with the amount of work done

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::counter::{cycles_between, CycleValue};

/// Which property a [`CheckOutcome`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    Monotonic,
    Overhead,
    DeltaScaling,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::Monotonic => "monotonic",
            Check::Overhead => "overhead",
            Check::DeltaScaling => "delta-scaling",
        };
        f.write_str(name)
    }
}

/// Result of one check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub check: Check,
    pub passed: bool,
    pub details: String,
}

const WARMUP_READS: usize = 100;

fn warm_up<F: FnMut() -> CycleValue>(read: &mut F) {
    for _ in 0..WARMUP_READS {
        black_box(read());
    }
}

/// Fixed amount of arithmetic the optimizer cannot remove.
#[inline(never)]
pub fn busy_work(iterations: u64) -> u64 {
    let mut acc: u64 = 0;
    for i in 0..iterations {
        acc = black_box(acc.wrapping_add(i));
    }
    acc
}

/// Takes `samples` back-to-back pairs and counts pairs where the second
/// reading is below the first.
///
/// A genuine wraparound between the two reads would also count; at 64 bits
/// that is not expected within the life of a host.
pub fn check_monotonic<F: FnMut() -> CycleValue>(mut read: F, samples: usize) -> CheckOutcome {
    warm_up(&mut read);

    let mut regressions = 0usize;
    let mut worst_step: u64 = 0;
    for _ in 0..samples {
        let a = read();
        let b = read();
        if b < a {
            regressions += 1;
            worst_step = worst_step.max(a - b);
        }
    }

    let passed = regressions == 0;
    let details = if passed {
        format!("{} back-to-back pairs, no regressions", samples)
    } else {
        format!(
            "{} of {} pairs went backwards (largest step back: {} ticks)",
            regressions, samples, worst_step
        )
    };
    CheckOutcome { check: Check::Monotonic, passed, details }
}

/// Times `calls` reads in a tight loop against `budget`.
pub fn check_overhead<F: FnMut() -> CycleValue>(
    mut read: F,
    calls: usize,
    budget: Duration,
) -> CheckOutcome {
    warm_up(&mut read);

    let started = Instant::now();
    let first = read();
    let mut last = first;
    for _ in 1..calls {
        last = black_box(read());
    }
    let elapsed = started.elapsed();

    let per_call_ns = elapsed.as_nanos() as f64 / calls as f64;
    let per_call_ticks = cycles_between(first, last) as f64 / calls as f64;
    let passed = elapsed <= budget;
    let details = format!(
        "{} calls in {:?} ({:.1} ns, {:.1} ticks per call; budget {:?})",
        calls, elapsed, per_call_ns, per_call_ticks, budget
    );
    CheckOutcome { check: Check::Overhead, passed, details }
}

/// Measures the median delta across each workload in `workloads` (ascending)
/// and requires every median to be positive and none to shrink as the work
/// grows.
pub fn check_delta_scaling<F: FnMut() -> CycleValue>(
    mut read: F,
    workloads: &[u64],
    trials: usize,
) -> CheckOutcome {
    warm_up(&mut read);

    let mut medians = Vec::with_capacity(workloads.len());
    for &work in workloads {
        let mut deltas: Vec<u64> = (0..trials.max(1))
            .map(|_| {
                let start = read();
                black_box(busy_work(work));
                cycles_between(start, read())
            })
            .collect();
        deltas.sort_unstable();
        medians.push(deltas[deltas.len() / 2]);
    }

    let all_positive = medians.iter().all(|&m| m > 0);
    let non_decreasing = medians.windows(2).all(|w| w[1] >= w[0]);
    let passed = !medians.is_empty() && all_positive && non_decreasing;

    let table: Vec<String> = workloads
        .iter()
        .zip(&medians)
        .map(|(work, median)| format!("{}->{}", work, median))
        .collect();
    let verdict = if medians.is_empty() {
        "no workloads to measure"
    } else if passed {
        "deltas grow with work"
    } else if !all_positive {
        "counter did not advance"
    } else {
        "larger workload measured smaller"
    };
    let details = format!("{} (work->median ticks: {})", verdict, table.join(", "));
    CheckOutcome { check: Check::DeltaScaling, passed, details }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::read_cycles;

    #[test]
    fn test_real_counter_is_monotonic() {
        let outcome = check_monotonic(read_cycles, 10_000);
        assert!(outcome.passed, "{}", outcome.details);
        assert_eq!(outcome.check, Check::Monotonic);
    }

    #[test]
    fn test_backwards_counter_is_caught() {
        let mut value = 1_000_000u64;
        let outcome = check_monotonic(
            move || {
                value -= 1;
                value
            },
            10,
        );
        assert!(!outcome.passed);
        assert!(outcome.details.contains("10 of 10"));
    }

    #[test]
    fn test_wrapping_counter_counts_as_regression() {
        let mut value = u64::MAX - (WARMUP_READS as u64) - 1;
        let outcome = check_monotonic(
            move || {
                value = value.wrapping_add(1);
                value
            },
            2,
        );
        // Warm-up leaves the counter at MAX - 1, so the first pair wraps.
        assert!(!outcome.passed);
        assert!(outcome.details.contains("1 of 2"));
    }

    #[test]
    fn test_overhead_within_generous_budget() {
        let outcome = check_overhead(read_cycles, 10_000, Duration::from_secs(5));
        assert!(outcome.passed, "{}", outcome.details);
    }

    #[test]
    fn test_slow_counter_exceeds_budget() {
        let outcome = check_overhead(
            || {
                std::thread::sleep(Duration::from_millis(2));
                read_cycles()
            },
            5,
            Duration::from_millis(1),
        );
        assert!(!outcome.passed);
    }

    #[test]
    fn test_steadily_advancing_counter_passes_delta_scaling() {
        let mut clock = 0u64;
        let outcome = check_delta_scaling(
            move || {
                clock += 1;
                clock
            },
            &[10, 100, 1000],
            3,
        );
        // Every delta is exactly 1: positive and never shrinking.
        assert!(outcome.passed, "{}", outcome.details);
    }

    #[test]
    fn test_stuck_counter_fails_delta_scaling() {
        let outcome = check_delta_scaling(|| 42, &[10, 100], 3);
        assert!(!outcome.passed);
        assert!(outcome.details.contains("did not advance"));
    }

    #[test]
    fn test_empty_workloads_fail_with_reason() {
        let outcome = check_delta_scaling(read_cycles, &[], 3);
        assert!(!outcome.passed);
        assert!(outcome.details.starts_with("no workloads"), "{}", outcome.details);
    }

    #[test]
    fn test_real_counter_tracks_work() {
        let outcome = check_delta_scaling(read_cycles, &[10_000, 1_000_000], 5);
        assert!(outcome.passed, "{}", outcome.details);
    }

    #[test]
    fn test_busy_work_result() {
        assert_eq!(busy_work(0), 0);
        assert_eq!(busy_work(5), 10);
    }
}
