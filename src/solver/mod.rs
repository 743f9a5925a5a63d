//! Numerical solvers
//!
//! This module turns a [`ReactionNetwork`](crate::network::ReactionNetwork)
//! into numbers. Two complementary engines are provided:
//!
//! - [`MasterEquation`]: deterministic evolution of the full probability
//!   distribution over a truncated state space (the CME)
//! - [`Gillespie`]: exact stochastic trajectories, one event at a time (the SSA)
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Network** - WHAT to solve
//!    - Species, stoichiometry and propensities
//!    - Conservation laws (admissible populations)
//!
//! 2. **Configuration** - HOW to run
//!    - [`IntegrationConfiguration`]: step size, horizon, sampling stride
//!    - [`GillespieConfiguration`]: event budget, deadline, recording
//!
//! 3. **Stepper** ([`Stepper`] trait) - The numerical method
//!    - Explicit Runge-Kutta schemes described by a [`ButcherTableau`]
//!    - Independent of the chemistry: anything implementing [`OdeSystem`]
//!
//! # Module Organization
//!
//! - **`traits`**: [`OdeSystem`], [`Stepper`], [`SimulationResult`]
//! - **`config`**: run configurations
//! - **`methods`**: tableaux and the generic explicit Runge-Kutta stepper
//! - **`cme`**: transition table and [`MasterEquation`] engine
//! - **`ssa`**: [`Gillespie`] engine
//! - **[`ensemble`]**: independent SSA replicates and their statistics
//!
//! # Quick Start Example
//!
//! ```rust
//! use sck_rs::models::SingleSubstrateTqssa;
//! use sck_rs::solver::{ExplicitRungeKutta, IntegrationConfiguration, MasterEquation, Method};
//!
//! # fn main() -> Result<(), sck_rs::error::KineticsError> {
//! let model = SingleSubstrateTqssa::new(1.0, 1.0, 10, 9)?;
//! let mut cme = MasterEquation::new(model)?;
//! let mut rk4 = ExplicitRungeKutta::from_method(Method::Rk4);
//!
//! let config = IntegrationConfiguration::new(1e-3, 1.0).with_sampling_stride(100);
//! let result = cme.run(&mut rk4, &config)?;
//!
//! println!("{} snapshots, <P>(1) = {:.4}", result.len(), cme.mean(SingleSubstrateTqssa::P)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Every fallible operation returns [`crate::error::Result`]. Common errors:
//! - Invalid configuration (non-positive `dt`, zero sampling stride)
//! - Negative or non-finite propensities
//! - Non-finite probabilities (step size too large for the network)

// =================================================================================================
// Module Declarations
// =================================================================================================
mod traits;
mod config;
mod methods;
mod cme;
mod ssa;
pub mod ensemble;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// The threshold is stored in an AtomicUsize so that it can be changed at
// runtime (benchmarks, tests) without a mutex on every derivative evaluation.
// Relaxed ordering is sufficient: the value is a performance hint, not a
// synchronisation point.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of states above which the master-equation derivative is
/// assembled in parallel.
///
/// Below this point rayon's dispatch overhead outweighs the per-state work
/// (a handful of multiply-adds).
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

/// Runtime-configurable parallel-execution threshold.
///
/// Read via [`parallel_threshold()`], written via [`set_parallel_threshold()`].
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// The master-equation derivative is assembled sequentially when the state
/// space holds fewer states than this value, and with rayon otherwise, but
/// only when the crate is compiled with the `parallel` feature.
///
/// # Example
///
/// ```rust
/// use sck_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use sck_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
///
/// // Restore so other tests are not affected.
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// RAII guard that saves the current threshold on construction and restores
/// it on drop.
///
/// Only compiled in test builds. Prevents one test from leaking a modified
/// threshold value into the next.
///
/// ```rust,ignore
/// let _guard = crate::solver::ThresholdGuard::save(50);
/// // threshold is now 50 …
/// // … and is automatically restored when _guard is dropped.
/// ```
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    /// Set the threshold to `new_value` and return a guard that will
    /// restore the previous value on drop.
    pub(crate) fn save(new_value: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        // Bypass the public setter so that restoring never panics.
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{OdeSystem, SimulationResult, Stepper};

pub use config::{GillespieConfiguration, IntegrationConfiguration};

pub use methods::{ButcherTableau, ExplicitRungeKutta, Method};

pub use cme::{CmeState, MasterEquation, TransitionTable, MASS_TOLERANCE};

pub use ssa::{Gillespie, SsaState, StepOutcome};

// =================================================================================================
// Tests
// =================================================================================================
