//! Numerical methods for advancing ODE systems
//!
//! This module contains the concrete implementation of the
//! [`Stepper`](crate::solver::Stepper) trait and the coefficient tables that
//! parameterise it.
//!
//! # Architecture
//!
//! One evaluator, many tableaux:
//! - [`ButcherTableau`] is plain data, validated once at construction
//! - [`ExplicitRungeKutta`] evaluates any tableau with owned stage buffers
//! - [`Method`] names the built-in tableaux, from Euler up to Verner's
//!   eighth-order method
//!
//! Adding a method means adding coefficients, not code.
//!
//! # Example
//!
//! ```rust
//! use sck_rs::solver::{ButcherTableau, ExplicitRungeKutta, Method, Stepper};
//!
//! # fn main() -> Result<(), sck_rs::error::KineticsError> {
//! // Built-in method
//! let rk4 = ExplicitRungeKutta::<f64>::from_method(Method::Rk4);
//! assert_eq!(rk4.stages(), 4);
//!
//! // Custom tableau (Heun's method)
//! let heun = ButcherTableau::new(
//!     "Heun",
//!     2,
//!     vec![vec![], vec![1.0]],
//!     vec![0.5, 0.5],
//!     vec![0.0, 1.0],
//! )?;
//! let heun = ExplicitRungeKutta::<f64>::new(heun);
//! assert_eq!(heun.order(), 2);
//! # Ok(())
//! # }
//! ```

mod runge_kutta;
mod tableau;

// Re-exports for convenience
pub use runge_kutta::ExplicitRungeKutta;
pub use tableau::{ButcherTableau, Method};
