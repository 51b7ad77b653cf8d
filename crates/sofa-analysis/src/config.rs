use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameters of one bootstrap comparison run.
///
/// # Examples
///
/// ```
/// use sofa_analysis::config::BootstrapConfig;
///
/// let config = BootstrapConfig {
///     resample_count: 1000,
///     seed: Some(42),
///     ..BootstrapConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Number of valid resamples to draw.
    pub resample_count: usize,
    /// Coverage of the percentile interval, in `(0, 1)`.
    pub confidence_level: f64,
    /// Base seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Consecutive degenerate draws tolerated for one resample; one more aborts the run.
    pub max_consecutive_failures: usize,
    /// Number of worker threads.
    pub threads: usize,
    /// Wall-clock budget for the resampling loop.
    pub time_limit: Option<Duration>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            resample_count: Self::DEFAULT_RESAMPLE_COUNT,
            confidence_level: Self::DEFAULT_CONFIDENCE_LEVEL,
            seed: None,
            max_consecutive_failures: Self::DEFAULT_MAX_CONSECUTIVE_FAILURES,
            threads: 1,
            time_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("resample count must be positive")]
    ZeroResampleCount,
    #[display("confidence level must lie strictly between 0 and 1 (got {level})")]
    ConfidenceLevelOutOfRange { level: f64 },
    #[display("consecutive failure budget must be positive")]
    ZeroFailureBudget,
    #[display("thread count must be positive")]
    ZeroThreads,
}

impl BootstrapConfig {
    pub const DEFAULT_RESAMPLE_COUNT: usize = 2000;
    pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;
    pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: usize = 100;

    /// Checks every parameter against its domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resample_count == 0 {
            return Err(ConfigError::ZeroResampleCount);
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::ConfidenceLevelOutOfRange {
                level: self.confidence_level,
            });
        }
        if self.max_consecutive_failures == 0 {
            return Err(ConfigError::ZeroFailureBudget);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(BootstrapConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_out_of_domain_values() {
        let base = BootstrapConfig::default();
        let cases = [
            (
                BootstrapConfig {
                    resample_count: 0,
                    ..base.clone()
                },
                ConfigError::ZeroResampleCount,
            ),
            (
                BootstrapConfig {
                    max_consecutive_failures: 0,
                    ..base.clone()
                },
                ConfigError::ZeroFailureBudget,
            ),
            (
                BootstrapConfig {
                    threads: 0,
                    ..base.clone()
                },
                ConfigError::ZeroThreads,
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }

        for level in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let config = BootstrapConfig {
                confidence_level: level,
                ..base.clone()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ConfidenceLevelOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BootstrapConfig =
            serde_json::from_str(r#"{ "resample_count": 500, "seed": 7 }"#).unwrap();
        assert_eq!(config.resample_count, 500);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.threads, 1);
    }
}
