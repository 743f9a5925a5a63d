//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! - `OdeSystem` is WHAT gets integrated: an explicit right-hand side `f(y)`
//! - `Stepper` is HOW one step is taken: a slope estimate for `[y, y + dt]`
//! - `SimulationResult` carries what a run produced, whichever engine ran it
//!
//! Steppers never own the state. They return the weighted slope
//! `Σ bᵢ·kᵢ` and the caller applies `y ← y + dt·Σ bᵢ·kᵢ`, so the CME solver
//! keeps full control of its distribution and clock.

use nalgebra::DVector;

use crate::Real;

// =================================================================================================
// ODE System
// =================================================================================================

/// Autonomous system of ordinary differential equations `dy/dt = f(y)`
pub trait OdeSystem<T: Real> {
    /// Length of the state vector
    fn dimension(&self) -> usize;

    /// Evaluate `f(y)` into `dydt`
    ///
    /// Both vectors have [`dimension()`](Self::dimension) entries. Every entry
    /// of `dydt` is overwritten.
    fn derivative(&self, y: &DVector<T>, dydt: &mut DVector<T>);
}

// =================================================================================================
// Stepper
// =================================================================================================

/// One-step explicit integrator
///
/// # Contract
///
/// [`weighted_derivative`](Self::weighted_derivative) returns `Σ bᵢ·kᵢ`
/// where `kᵢ = f(y + dt·Σ_{j<i} aᵢⱼ·kⱼ)`. It returns a slope, not a new state.
pub trait Stepper<T: Real> {
    /// Name of the method (used to display and logging)
    fn name(&self) -> &str;

    /// Nominal order of accuracy
    fn order(&self) -> usize;

    /// Number of derivative evaluations per step
    fn stages(&self) -> usize;

    /// Weighted slope over `[y, y + dt]`
    fn weighted_derivative<S>(&mut self, system: &S, y: &DVector<T>, dt: T) -> &DVector<T>
    where
        S: OdeSystem<T> + ?Sized;

    /// Advance `y` in place by one step of size `dt`
    fn advance<S>(&mut self, system: &S, y: &mut DVector<T>, dt: T)
    where
        S: OdeSystem<T> + ?Sized,
    {
        let slope = self.weighted_derivative(system, y, dt);
        y.axpy(dt, slope, T::one());
    }
}

// =================================================================================================
// Simulation Result
// =================================================================================================

/// Outcome of a sampled run
///
/// `steps` counts integration steps (CME) or fired events (SSA). `snapshots`
/// holds the states recorded during the run, in chronological order, the last
/// one being the state the engine ended in.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult<S> {
    /// Number of steps taken or events fired
    pub steps: usize,

    /// Recorded states, oldest first
    pub snapshots: Vec<S>,
}

impl<S> SimulationResult<S> {
    /// Create a new result
    pub fn new(steps: usize, snapshots: Vec<S>) -> Self {
        Self { steps, snapshots }
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot was recorded
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// State the engine ended in
    pub fn final_state(&self) -> Option<&S> {
        self.snapshots.last()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
