//! Run configurations
//!
//! A configuration says HOW a run proceeds (step size, horizon, what to
//! record), independently of the network being simulated. Each one validates
//! itself before an engine consumes it.
//!
//! # Examples
//!
//! ```rust
//! use sck_rs::solver::{GillespieConfiguration, IntegrationConfiguration};
//!
//! // CME: dt = 1e-4 up to t = 2, snapshot every 1000 steps
//! let cme = IntegrationConfiguration::new(1e-4, 2.0).with_sampling_stride(1000);
//! assert!(cme.validate().is_ok());
//!
//! // SSA: at most 10 000 events, stop before t = 9
//! let ssa = GillespieConfiguration::new(10_000).with_deadline(9.0).recording(true);
//! assert!(ssa.validate().is_ok());
//! ```

use crate::error::{KineticsError, Result};
use crate::Real;

// =================================================================================================
// Master Equation Integration
// =================================================================================================

/// Fixed-step integration parameters for the master-equation solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationConfiguration<T: Real> {
    /// Time step
    pub dt: T,

    /// Final time; steps are taken while the clock is `≤ t_final`
    pub t_final: T,

    /// Record a snapshot every this many steps (`None`: final state only)
    pub sampling_stride: Option<usize>,
}

impl<T: Real> IntegrationConfiguration<T> {
    /// Create a configuration without intermediate sampling
    pub fn new(dt: T, t_final: T) -> Self {
        Self {
            dt,
            t_final,
            sampling_stride: None,
        }
    }

    /// Record a snapshot every `stride` steps
    pub fn with_sampling_stride(mut self, stride: usize) -> Self {
        self.sampling_stride = Some(stride);
        self
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] when `dt` is not finite and
    /// strictly positive, when `t_final` is not finite, or when the sampling
    /// stride is zero.
    pub fn validate(&self) -> Result<()> {
        validate_horizon(self.dt, self.t_final)?;

        if self.sampling_stride == Some(0) {
            return Err(KineticsError::invalid("sampling_stride", "must be at least 1"));
        }

        Ok(())
    }
}

/// Shared check for `dt`/`t_final` pairs
pub(crate) fn validate_horizon<T: Real>(dt: T, t_final: T) -> Result<()> {
    if !dt.is_finite() || dt <= T::zero() {
        return Err(KineticsError::invalid("dt", format!("must be finite and positive, got {}", dt)));
    }
    if !t_final.is_finite() {
        return Err(KineticsError::invalid("t_final", format!("must be finite, got {}", t_final)));
    }
    Ok(())
}

// =================================================================================================
// Gillespie Simulation
// =================================================================================================

/// Run parameters for the Gillespie engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GillespieConfiguration<T: Real> {
    /// Maximum number of events to fire
    pub max_events: usize,

    /// Deadline; an event that would land after it is not fired.
    /// `None` or a non-positive value means no deadline.
    pub t_final: Option<T>,

    /// Record a snapshot after every fired event
    pub record: bool,

    /// When recording, also store the state the run started from
    pub include_initial: bool,
}

impl<T: Real> GillespieConfiguration<T> {
    /// Create an unbounded-in-time configuration firing at most `max_events`
    pub fn new(max_events: usize) -> Self {
        Self {
            max_events,
            t_final: None,
            record: false,
            include_initial: false,
        }
    }

    /// Stop before any event that would land after `t_final`
    pub fn with_deadline(mut self, t_final: T) -> Self {
        self.t_final = Some(t_final);
        self
    }

    /// Record every event
    pub fn recording(mut self, include_initial: bool) -> Self {
        self.record = true;
        self.include_initial = include_initial;
        self
    }

    /// Deadline in effect, if any
    pub(crate) fn deadline(&self) -> Option<T> {
        effective_deadline(self.t_final)
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] when the deadline is NaN.
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.t_final
            && t.partial_cmp(&t).is_none()
        {
            return Err(KineticsError::invalid("t_final", "must not be NaN"));
        }
        Ok(())
    }
}

/// `Some(t)` only for a strictly positive, non-NaN deadline
pub(crate) fn effective_deadline<T: Real>(t_final: Option<T>) -> Option<T> {
    t_final.filter(|&t| t > T::zero())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_configuration_validation() {
        assert!(IntegrationConfiguration::new(1e-3, 1.0).validate().is_ok());
        assert!(IntegrationConfiguration::new(1e-3, 0.0).validate().is_ok());
        assert!(IntegrationConfiguration::new(0.0, 1.0).validate().is_err());
        assert!(IntegrationConfiguration::new(-1e-3, 1.0).validate().is_err());
        assert!(IntegrationConfiguration::new(f64::NAN, 1.0).validate().is_err());
        assert!(IntegrationConfiguration::new(1e-3, f64::INFINITY).validate().is_err());
        assert!(IntegrationConfiguration::new(1e-3, 1.0)
            .with_sampling_stride(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_sampling_stride_builder() {
        let config = IntegrationConfiguration::new(1e-3, 1.0).with_sampling_stride(10);
        assert_eq!(config.sampling_stride, Some(10));
    }

    #[test]
    fn test_gillespie_deadline() {
        let config = GillespieConfiguration::<f64>::new(100);
        assert_eq!(config.deadline(), None);

        assert_eq!(config.with_deadline(2.0).deadline(), Some(2.0));
        assert_eq!(config.with_deadline(0.0).deadline(), None);
        assert_eq!(config.with_deadline(-1.0).deadline(), None);
        assert_eq!(config.with_deadline(f64::INFINITY).deadline(), Some(f64::INFINITY));
    }

    #[test]
    fn test_gillespie_validation() {
        assert!(GillespieConfiguration::<f64>::new(10).validate().is_ok());
        assert!(GillespieConfiguration::new(10).with_deadline(f64::NAN).validate().is_err());

        let config = GillespieConfiguration::<f64>::new(10).recording(true);
        assert!(config.record);
        assert!(config.include_initial);
    }
}
