//! Mock networks and ODE systems with known analytical solutions

use nalgebra::DVector;
use sck_rs::error::{KineticsError, Result};
use sck_rs::network::{BoundedNetwork, ReactionNetwork};
use sck_rs::solver::OdeSystem;

// =================================================================================================
// Birth-death process
// =================================================================================================

/// ∅ → X at rate `birth`, X → ∅ at rate `death·x`
///
/// Started from `x = 0`, `X(t)` is Poisson with mean
/// `(birth/death)·(1 − e^{−death·t})`.
#[derive(Debug, Clone)]
pub struct BirthDeath {
    birth: f64,
    death: f64,
    n_max: i64,
    stoichiometry: Vec<DVector<i64>>,
}

impl BirthDeath {
    pub fn new(birth: f64, death: f64, n_max: i64) -> Self {
        Self {
            birth,
            death,
            n_max,
            stoichiometry: vec![DVector::from_row_slice(&[1]), DVector::from_row_slice(&[-1])],
        }
    }

    /// Exact mean (and variance) at time `t`
    pub fn poisson_mean(&self, t: f64) -> f64 {
        self.birth / self.death * (1.0 - (-self.death * t).exp())
    }
}

impl ReactionNetwork<f64> for BirthDeath {
    fn name(&self) -> &str {
        "BirthDeath"
    }

    fn species(&self) -> usize {
        1
    }

    fn stoichiometry(&self) -> &[DVector<i64>] {
        &self.stoichiometry
    }

    fn is_admissible(&self, population: &[i64]) -> bool {
        population[0] >= 0
    }

    fn rate(&self, population: &[i64], channel: usize) -> Result<f64> {
        match channel {
            0 => Ok(self.birth),
            1 => Ok(self.death * population[0] as f64),
            _ => Err(KineticsError::IndexOutOfRange { what: "channel", index: channel, len: 2 }),
        }
    }
}

impl BoundedNetwork<f64> for BirthDeath {
    fn population_bounds(&self) -> Vec<i64> {
        vec![self.n_max]
    }
}

// =================================================================================================
// Independent conversions
// =================================================================================================

/// `n` molecules each converted once at unit rate `k`
///
/// `X(t) ~ Binomial(n, 1 − e^{−k·t})`; absorbing at `x = n`.
#[derive(Debug, Clone)]
pub struct Conversion {
    k: f64,
    n: i64,
    stoichiometry: Vec<DVector<i64>>,
}

impl Conversion {
    pub fn new(k: f64, n: i64) -> Self {
        Self {
            k,
            n,
            stoichiometry: vec![DVector::from_row_slice(&[1])],
        }
    }

    /// Binomial mean and standard deviation at time `t`
    pub fn binomial(&self, t: f64) -> (f64, f64) {
        let q = 1.0 - (-self.k * t).exp();
        let n = self.n as f64;
        (n * q, (n * q * (1.0 - q)).sqrt())
    }
}

impl ReactionNetwork<f64> for Conversion {
    fn name(&self) -> &str {
        "Conversion"
    }

    fn species(&self) -> usize {
        1
    }

    fn stoichiometry(&self) -> &[DVector<i64>] {
        &self.stoichiometry
    }

    fn is_admissible(&self, population: &[i64]) -> bool {
        (0..=self.n).contains(&population[0])
    }

    fn rate(&self, population: &[i64], channel: usize) -> Result<f64> {
        KineticsError::check_index("channel", channel, 1)?;
        Ok(self.k * (self.n - population[0]) as f64)
    }
}

impl BoundedNetwork<f64> for Conversion {
    fn population_bounds(&self) -> Vec<i64> {
        vec![self.n + 1]
    }
}

// =================================================================================================
// Logistic growth
// =================================================================================================

/// `y' = y·(1 − y)`, nonlinear with a closed-form solution
pub struct Logistic;

impl Logistic {
    pub fn exact(y0: f64, t: f64) -> f64 {
        1.0 / (1.0 + (1.0 / y0 - 1.0) * (-t).exp())
    }
}

impl OdeSystem<f64> for Logistic {
    fn dimension(&self) -> usize {
        1
    }

    fn derivative(&self, y: &DVector<f64>, dydt: &mut DVector<f64>) {
        dydt[0] = y[0] * (1.0 - y[0]);
    }
}
