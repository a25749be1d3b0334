//! Engine configuration

use std::time::Duration;

use log::warn;

use crate::error::{EngineError, EngineResult};

/// Default physics step: 60 updates per second
pub const DEFAULT_FIXED_STEP: Duration = Duration::from_nanos(16_666_667);

/// Default cap on the wall time a single frame may simulate
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Timing and debugging knobs for an `Engine`
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Duration of one update slice
    pub fixed_step: Duration,
    /// Elapsed wall time is clamped to this before slicing
    pub max_frame_delta: Duration,
    /// Outline every node's bounds
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            debug: false,
        }
    }
}

impl EngineConfig {
    /// Step given as a rate in updates per second
    ///
    /// Rates that do not map to a representable step keep the current one.
    pub fn with_step_hz(mut self, hz: f64) -> Self {
        if !(hz.is_finite() && hz > 0.0) {
            warn!("Ignoring step rate {} Hz", hz);
            return self;
        }
        match Duration::try_from_secs_f64(1.0 / hz) {
            Ok(step) => self.fixed_step = step,
            Err(e) => warn!("Ignoring step rate {} Hz: {}", hz, e),
        }
        self
    }

    /// Check the timing values make a terminating scheduler
    pub fn validate(&self) -> EngineResult<()> {
        if self.fixed_step.is_zero() {
            return Err(EngineError::InvalidStep);
        }
        if self.max_frame_delta < self.fixed_step {
            return Err(EngineError::InvalidFrameDelta {
                max_ms: self.max_frame_delta.as_millis(),
                step_ms: self.fixed_step.as_millis(),
            });
        }
        Ok(())
    }

    /// Upper bound on update slices per frame
    pub fn max_slices(&self) -> u32 {
        let step = self.fixed_step.as_nanos().max(1);
        self.max_frame_delta.as_nanos().div_ceil(step) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_slices(), 15);
    }

    #[test]
    fn test_zero_step_rejected() {
        let config = EngineConfig {
            fixed_step: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidStep)));
    }

    #[test]
    fn test_delta_shorter_than_step_rejected() {
        let config = EngineConfig {
            fixed_step: Duration::from_millis(100),
            max_frame_delta: Duration::from_millis(50),
            debug: false,
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidFrameDelta { .. })
        ));
    }

    #[test]
    fn test_step_from_hz() {
        let config = EngineConfig::default().with_step_hz(24.0);
        assert_eq!(config.fixed_step, Duration::from_secs_f64(1.0 / 24.0));
        let unchanged = EngineConfig::default().with_step_hz(0.0);
        assert_eq!(unchanged.fixed_step, DEFAULT_FIXED_STEP);
    }

    #[test]
    fn test_tiny_step_rate_keeps_default() {
        let config = EngineConfig::default().with_step_hz(1e-300);
        assert_eq!(config.fixed_step, DEFAULT_FIXED_STEP);
        assert!(config.validate().is_ok());

        let nan = EngineConfig::default().with_step_hz(f64::NAN);
        assert_eq!(nan.fixed_step, DEFAULT_FIXED_STEP);
    }
}
