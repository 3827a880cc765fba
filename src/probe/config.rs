use std::time::Duration;

use crate::error::{Error, Result};

/// Self-check parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Back-to-back read pairs examined for regressions.
    pub monotonic_samples: usize,
    /// Reads in the overhead loop.
    pub overhead_calls: usize,
    /// Wall-clock limit for the overhead loop.
    pub overhead_budget: Duration,
    /// Busy-loop iterations for the smallest delta workload.
    pub delta_base_work: u64,
    /// Number of workloads; each is 10x the previous one.
    pub delta_steps: u32,
    /// Repetitions per workload (the median delta is used).
    pub delta_trials: usize,
    /// CPU to pin the probe thread to, if any.
    pub pin_cpu: Option<usize>,
    /// Run the checks against the serialized read.
    pub serialized: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            monotonic_samples: 100_000,
            overhead_calls: 1_000_000,
            overhead_budget: Duration::from_millis(50),
            delta_base_work: 10_000,
            delta_steps: 4,
            delta_trials: 5,
            pin_cpu: Some(0),
            serialized: false,
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.monotonic_samples == 0 {
            return Err(Error::InvalidConfig("monotonic_samples must be > 0".into()));
        }
        if self.overhead_calls == 0 {
            return Err(Error::InvalidConfig("overhead_calls must be > 0".into()));
        }
        if self.overhead_budget.is_zero() {
            return Err(Error::InvalidConfig("overhead_budget must be > 0".into()));
        }
        if self.delta_base_work == 0 {
            return Err(Error::InvalidConfig("delta_base_work must be > 0".into()));
        }
        if self.delta_steps < 2 {
            return Err(Error::InvalidConfig(
                "delta_steps must be >= 2 to compare workloads".into(),
            ));
        }
        if self.delta_trials == 0 {
            return Err(Error::InvalidConfig("delta_trials must be > 0".into()));
        }
        if self.largest_delta_work().is_none() {
            return Err(Error::InvalidConfig(format!(
                "delta_base_work {} x 10^{} overflows",
                self.delta_base_work,
                self.delta_steps - 1
            )));
        }
        Ok(())
    }

    /// Workload sizes for the delta check, smallest first.
    pub fn delta_workloads(&self) -> Vec<u64> {
        (0..self.delta_steps)
            .map_while(|step| {
                10u64
                    .checked_pow(step)
                    .and_then(|scale| self.delta_base_work.checked_mul(scale))
            })
            .collect()
    }

    fn largest_delta_work(&self) -> Option<u64> {
        let scale = 10u64.checked_pow(self.delta_steps.checked_sub(1)?)?;
        self.delta_base_work.checked_mul(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        ProbeConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_workloads() {
        assert_eq!(
            ProbeConfig::default().delta_workloads(),
            vec![10_000, 100_000, 1_000_000, 10_000_000]
        );
    }

    #[test]
    fn test_rejects_zero_counts() {
        let cases = [
            ProbeConfig { monotonic_samples: 0, ..Default::default() },
            ProbeConfig { overhead_calls: 0, ..Default::default() },
            ProbeConfig { overhead_budget: Duration::ZERO, ..Default::default() },
            ProbeConfig { delta_base_work: 0, ..Default::default() },
            ProbeConfig { delta_trials: 0, ..Default::default() },
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))), "{:?}", config);
        }
    }

    #[test]
    fn test_rejects_single_workload() {
        let config = ProbeConfig { delta_steps: 1, ..Default::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("delta_steps"));
    }

    #[test]
    fn test_rejects_overflowing_workloads() {
        let config = ProbeConfig {
            delta_base_work: u64::MAX / 2,
            delta_steps: 3,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }
}
