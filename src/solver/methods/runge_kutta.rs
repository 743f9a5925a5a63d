//! Explicit Runge-Kutta stepper
//!
//! # Mathematical Background
//!
//! For an autonomous system `dy/dt = f(y)` one step of an explicit
//! Runge-Kutta method with tableau `(a, b, c)` computes the stage slopes
//!
//! ```text
//! kᵢ = f(yₙ + dt·Σ_{j<i} aᵢⱼ·kⱼ)        i = 1 … s
//! ```
//!
//! and combines them as `Σ bᵢ·kᵢ`. The caller applies
//! `yₙ₊₁ = yₙ + dt·Σ bᵢ·kᵢ`.
//!
//! # Characteristics
//!
//! - **Order**: given by the tableau (1 to 8 for the built-in methods)
//! - **Complexity**: `s` function evaluations per step
//! - **Memory**: `s + 2` vectors of the system dimension, allocated once
//!
//! # Example
//!
//! ```rust
//! use nalgebra::DVector;
//! use sck_rs::solver::{ExplicitRungeKutta, Method, OdeSystem, Stepper};
//!
//! struct Decay;
//!
//! impl OdeSystem<f64> for Decay {
//!     fn dimension(&self) -> usize { 1 }
//!     fn derivative(&self, y: &DVector<f64>, dydt: &mut DVector<f64>) {
//!         dydt[0] = -y[0];
//!     }
//! }
//!
//! let mut rk = ExplicitRungeKutta::<f64>::from_method(Method::Rk4);
//! let mut y = DVector::from_vec(vec![1.0]);
//! for _ in 0..100 {
//!     rk.advance(&Decay, &mut y, 0.01);
//! }
//! assert!((y[0] - (-1.0f64).exp()).abs() < 1e-9);
//! ```

use nalgebra::DVector;

use crate::solver::methods::tableau::{ButcherTableau, Method};
use crate::solver::traits::{OdeSystem, Stepper};
use crate::{real, Real};

// =================================================================================================
// Explicit Runge-Kutta Stepper
// =================================================================================================

/// Generic explicit Runge-Kutta stepper driven by a [`ButcherTableau`]
///
/// Stage buffers are owned scratch, reused across calls and resized only when
/// the system dimension changes.
#[derive(Debug, Clone)]
pub struct ExplicitRungeKutta<T: Real> {
    tableau: ButcherTableau,
    a: Vec<Vec<T>>,
    b: Vec<T>,
    slopes: Vec<DVector<T>>,
    probe: DVector<T>,
    weighted: DVector<T>,
}

impl<T: Real> ExplicitRungeKutta<T> {
    /// Create a stepper for an arbitrary (validated) tableau
    pub fn new(tableau: ButcherTableau) -> Self {
        let a = tableau
            .a()
            .iter()
            .map(|row| row.iter().map(|&x| real::<T>(x)).collect())
            .collect();
        let b = tableau.b().iter().map(|&x| real::<T>(x)).collect();

        Self {
            slopes: vec![DVector::zeros(0); tableau.stages()],
            probe: DVector::zeros(0),
            weighted: DVector::zeros(0),
            tableau,
            a,
            b,
        }
    }

    /// Create a stepper for one of the built-in methods
    ///
    /// # Example
    ///
    /// ```rust
    /// use sck_rs::solver::{ExplicitRungeKutta, Method, Stepper};
    ///
    /// let rk = ExplicitRungeKutta::<f64>::from_method(Method::Verner8);
    /// assert_eq!(rk.order(), 8);
    /// assert_eq!(rk.stages(), 11);
    /// ```
    pub fn from_method(method: Method) -> Self {
        Self::new(method.tableau())
    }

    /// Tableau driving this stepper
    pub fn tableau(&self) -> &ButcherTableau {
        &self.tableau
    }

    fn ensure_dimension(&mut self, n: usize) {
        if self.probe.len() != n {
            self.probe = DVector::zeros(n);
            self.weighted = DVector::zeros(n);
            for slope in &mut self.slopes {
                *slope = DVector::zeros(n);
            }
        }
    }
}

impl<T: Real> Default for ExplicitRungeKutta<T> {
    /// Ralston's fourth-order method
    fn default() -> Self {
        Self::from_method(Method::default())
    }
}

impl<T: Real> Stepper<T> for ExplicitRungeKutta<T> {
    fn name(&self) -> &str {
        self.tableau.name()
    }

    fn order(&self) -> usize {
        self.tableau.order()
    }

    fn stages(&self) -> usize {
        self.tableau.stages()
    }

    fn weighted_derivative<S>(&mut self, system: &S, y: &DVector<T>, dt: T) -> &DVector<T>
    where
        S: OdeSystem<T> + ?Sized,
    {
        debug_assert_eq!(y.len(), system.dimension(), "state length differs from system dimension");
        self.ensure_dimension(y.len());

        // ====== Stages: kᵢ = f(y + dt·Σ aᵢⱼ·kⱼ) ======

        for i in 0..self.slopes.len() {
            self.probe.copy_from(y);
            for (j, &aij) in self.a[i].iter().enumerate() {
                if aij != T::zero() {
                    self.probe.axpy(dt * aij, &self.slopes[j], T::one());
                }
            }
            system.derivative(&self.probe, &mut self.slopes[i]);
        }

        // ====== Combination: Σ bᵢ·kᵢ ======

        self.weighted.fill(T::zero());
        for (slope, &bi) in self.slopes.iter().zip(&self.b) {
            if bi != T::zero() {
                self.weighted.axpy(bi, slope, T::one());
            }
        }

        &self.weighted
    }
}

// =================================================================================================
// Tests
// =================================================================================================
