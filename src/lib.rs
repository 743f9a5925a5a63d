//! sck-rs: Stochastic Chemical Kinetics Framework
//!
//! A framework for simulating the stochastic dynamics of small, well-mixed
//! chemical reaction networks, built around two complementary formulations
//! of the same Markov jump process.
//!
//! # Architecture
//!
//! sck-rs is built on two core principles:
//!
//! 1. **Separation of Network and Numerics**
//!    - Reaction networks define stoichiometry and propensities (what to solve)
//!    - Engines provide the method (how to solve)
//!
//! 2. **Two exact formulations over one contract**
//!    - [`solver::MasterEquation`] integrates the chemical master equation
//!      (CME) on a truncated, finite state space
//!    - [`solver::Gillespie`] samples individual trajectories with the
//!      direct stochastic simulation algorithm (SSA)
//!
//! Both engines take any type implementing
//! [`ReactionNetwork`](network::ReactionNetwork), so reduced models
//! (tQSSA/sQSSA) can be cross-validated against the exact kinetics.
//!
//! # Quick Start
//!
//! ```rust
//! use sck_rs::prelude::*;
//!
//! # fn main() -> Result<(), KineticsError> {
//! // 1. Build a model
//! let model = SingleSubstrateTqssa::new(1.0, 1.0, 10, 9)?;
//!
//! // 2. Integrate its master equation
//! let mut cme = MasterEquation::new(model.clone())?;
//! let mut stepper = ExplicitRungeKutta::<f64>::default();
//! cme.simulate(&mut stepper, 1e-3, 1.0)?;
//! println!("<P>(1) = {:.4}", cme.mean(SingleSubstrateTqssa::P)?);
//!
//! // 3. Or sample a trajectory
//! let mut ssa = Gillespie::new(model, 42);
//! ssa.simulate(1_000, Some(1.0))?;
//! println!("P(1) = {}", ssa.population()[SingleSubstrateTqssa::P]);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`network`]: Reaction-network contract and state-space encoding
//! - [`solver`]: CME solver, Runge-Kutta steppers and Gillespie engine
//! - [`models`]: Enzyme-kinetics models and their reductions
//! - [`error`]: Crate-wide error type

#![warn(missing_docs)]

// Core modules
pub mod error;
pub mod network;

pub mod models;
pub mod solver;

use nalgebra::RealField;

/// Floating-point scalar accepted by every engine.
///
/// Blanket-implemented for any `nalgebra` real field that is cheap to copy
/// and can cross threads, which covers `f32` and `f64`.
pub trait Real: RealField + Copy + Send + Sync {}

impl<T> Real for T where T: RealField + Copy + Send + Sync {}

/// Convert an `f64` constant into the working precision.
#[inline]
pub(crate) fn real<T: Real>(value: f64) -> T {
    nalgebra::convert::<f64, T>(value)
}

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //!
    //! use sck_rs::prelude::*;
    //! ```
    pub use crate::Real;

    pub use crate::error::{KineticsError, Result};

    pub use crate::network::{BoundedNetwork, ReactionNetwork, StateSpace};

    pub use crate::solver::{
        ButcherTableau,
        CmeState,
        ExplicitRungeKutta,
        Gillespie,
        GillespieConfiguration,
        IntegrationConfiguration,
        MasterEquation,
        Method,
        OdeSystem,
        SsaState,
        StepOutcome,
        Stepper,
    };

    pub use crate::models::{
        GoldbeterKoshland,
        GoldbeterKoshlandSqssa,
        GoldbeterKoshlandTqssa,
        SingleSubstrate,
        SingleSubstrateSqssa,
        SingleSubstrateTqssa,
    };
}
