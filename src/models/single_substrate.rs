//! Single-substrate enzyme kinetics
//!
//! ```text
//!            kf          kcat
//!   E + S  ⇌⇌⇌⇌  C  ────►  E + P
//!            kb
//! ```
//!
//! Enzyme and substrate are conserved: `E + C = ET` and `S + C + P = ST`.
//! The exact model therefore only tracks the complex `C` and the product `P`;
//! the two reductions only track `P`.
//!
//! # Example
//!
//! ```rust
//! use sck_rs::models::{SingleSubstrate, SingleSubstrateTqssa};
//! use sck_rs::network::ReactionNetwork;
//!
//! # fn main() -> Result<(), sck_rs::error::KineticsError> {
//! let exact = SingleSubstrate::new(10.0, 9.0, 1.0, 10, 9)?;
//! // No complex yet: only binding can fire, at kf·ET·ST
//! assert_eq!(exact.propensity(&[0, 0], SingleSubstrate::FORWARD)?, 900.0);
//!
//! let reduced = SingleSubstrateTqssa::new(exact.michaelis_constant(), 1.0, 10, 9)?;
//! assert!(reduced.propensity(&[9], SingleSubstrateTqssa::CONVERSION)? == 0.0);
//! # Ok(())
//! # }
//! ```

use nalgebra::DVector;

use crate::error::{KineticsError, Result};
use crate::models::{conserved_total, michaelis_constant, rate_constant, reduced_constant, sqssa_rate, tqssa_rate};
use crate::network::{BoundedNetwork, ReactionNetwork};
use crate::{real, Real};

// Species of the exact model
const COMPLEX: usize = 0;
const PRODUCT: usize = 1;

// Channels of the exact model
const FORWARD: usize = 0;
const BACKWARD: usize = 1;
const CATALYTIC: usize = 2;

// =================================================================================================
// Exact Mechanism
// =================================================================================================

/// Exact single-substrate mechanism over `(C, P)`
///
/// | channel | reaction | `ν` | propensity |
/// |---|---|---|---|
/// | `FORWARD` | `E + S → C` | `(1, 0)` | `kf·(ET − C)·(ST − C − P)` |
/// | `BACKWARD` | `C → E + S` | `(−1, 0)` | `kb·C` |
/// | `CATALYTIC` | `C → E + P` | `(−1, 1)` | `kcat·C` |
#[derive(Debug, Clone)]
pub struct SingleSubstrate<T: Real = f64> {
    /// Binding rate constant
    kf: T,
    /// Unbinding rate constant
    kb: T,
    /// Catalytic rate constant
    kcat: T,
    /// Total enzyme ET
    e_total: i64,
    /// Total substrate ST
    s_total: i64,
    stoichiometry: Vec<DVector<i64>>,
}

/// Species and channel indices
impl SingleSubstrate {
    /// Enzyme-substrate complex
    pub const C: usize = COMPLEX;
    /// Product
    pub const P: usize = PRODUCT;

    /// `E + S → C`
    pub const FORWARD: usize = FORWARD;
    /// `C → E + S`
    pub const BACKWARD: usize = BACKWARD;
    /// `C → E + P`
    pub const CATALYTIC: usize = CATALYTIC;
}

impl<T: Real> SingleSubstrate<T> {
    /// Create the exact model
    ///
    /// # Arguments
    ///
    /// * `kf` - Binding rate constant
    /// * `kb` - Unbinding rate constant
    /// * `kcat` - Catalytic rate constant
    /// * `e_total` - Total enzyme ET (molecules)
    /// * `s_total` - Total substrate ST (molecules)
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] for a negative or non-finite rate
    /// constant, or a non-positive total.
    pub fn new(kf: T, kb: T, kcat: T, e_total: i64, s_total: i64) -> Result<Self> {
        Ok(Self {
            kf: rate_constant("kf", kf)?,
            kb: rate_constant("kb", kb)?,
            kcat: rate_constant("kcat", kcat)?,
            e_total: conserved_total("e_total", e_total)?,
            s_total: conserved_total("s_total", s_total)?,
            stoichiometry: vec![
                DVector::from_row_slice(&[1, 0]),
                DVector::from_row_slice(&[-1, 0]),
                DVector::from_row_slice(&[-1, 1]),
            ],
        })
    }

    /// Binding rate constant `kf`
    pub fn kf(&self) -> T {
        self.kf
    }

    /// Unbinding rate constant `kb`
    pub fn kb(&self) -> T {
        self.kb
    }

    /// Catalytic rate constant `kcat`
    pub fn kcat(&self) -> T {
        self.kcat
    }

    /// Total enzyme `ET`
    pub fn e_total(&self) -> i64 {
        self.e_total
    }

    /// Total substrate `ST`
    pub fn s_total(&self) -> i64 {
        self.s_total
    }

    /// Michaelis constant `kM = (kb + kcat) / kf`
    pub fn michaelis_constant(&self) -> T {
        (self.kb + self.kcat) / self.kf
    }

    /// Total quasi-steady-state reduction with the same constants
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] when `kM` is not finite and
    /// strictly positive (e.g. `kf = 0`).
    pub fn tqssa(&self) -> Result<SingleSubstrateTqssa<T>> {
        let k_m = reduced_constant("k_m", self.kf, self.kb, self.kcat)?;
        SingleSubstrateTqssa::new(k_m, self.kcat, self.e_total, self.s_total)
    }

    /// Standard quasi-steady-state reduction with the same constants
    ///
    /// # Errors
    ///
    /// As for [`tqssa`](Self::tqssa).
    pub fn sqssa(&self) -> Result<SingleSubstrateSqssa<T>> {
        let k_m = reduced_constant("k_m", self.kf, self.kb, self.kcat)?;
        SingleSubstrateSqssa::new(k_m, self.kcat, self.e_total, self.s_total)
    }
}

impl<T: Real> ReactionNetwork<T> for SingleSubstrate<T> {
    fn name(&self) -> &str {
        "SingleSubstrate"
    }

    fn species(&self) -> usize {
        2
    }

    fn stoichiometry(&self) -> &[DVector<i64>] {
        &self.stoichiometry
    }

    fn is_admissible(&self, population: &[i64]) -> bool {
        let (c, p) = (population[COMPLEX], population[PRODUCT]);
        (0..=self.e_total).contains(&c) && p >= 0 && c + p <= self.s_total
    }

    fn rate(&self, population: &[i64], channel: usize) -> Result<T> {
        let (c, p) = (population[COMPLEX], population[PRODUCT]);
        match channel {
            FORWARD => Ok(self.kf * real::<T>(((self.e_total - c) * (self.s_total - c - p)) as f64)),
            BACKWARD => Ok(self.kb * real::<T>(c as f64)),
            CATALYTIC => Ok(self.kcat * real::<T>(c as f64)),
            _ => Err(KineticsError::IndexOutOfRange { what: "channel", index: channel, len: 3 }),
        }
    }

    fn description(&self) -> Option<&str> {
        Some("E + S <-> C -> E + P, exact mass-action kinetics")
    }
}

impl<T: Real> BoundedNetwork<T> for SingleSubstrate<T> {
    fn population_bounds(&self) -> Vec<i64> {
        vec![self.e_total + 1, self.s_total + 1]
    }
}

// =================================================================================================
// Total QSSA
// =================================================================================================

/// Total quasi-steady-state reduction over `P`
///
/// One channel `S → P` (`ν = (1)`) with propensity `kcat·Ĉ` where `Ĉ` is the
/// quasi-steady complex level for `Ŝ = ST − P`:
///
/// ```text
/// c = 2·ET·Ŝ    b = ET + Ŝ + kM    a = kcat·c / (b + √(b² − 2c))
/// ```
///
/// Remains accurate when enzyme is not scarce, unlike the sQSSA.
#[derive(Debug, Clone)]
pub struct SingleSubstrateTqssa<T: Real = f64> {
    k_m: T,
    kcat: T,
    e_total: i64,
    s_total: i64,
    stoichiometry: Vec<DVector<i64>>,
}

/// Species and channel indices
impl SingleSubstrateTqssa {
    /// Product
    pub const P: usize = 0;

    /// `S → P`
    pub const CONVERSION: usize = 0;
}

impl<T: Real> SingleSubstrateTqssa<T> {
    /// Create the tQSSA model
    ///
    /// # Arguments
    ///
    /// * `k_m` - Michaelis constant `(kb + kcat) / kf`
    /// * `kcat` - Catalytic rate constant
    /// * `e_total` - Total enzyme ET
    /// * `s_total` - Total substrate ST
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] for an invalid constant or total.
    pub fn new(k_m: T, kcat: T, e_total: i64, s_total: i64) -> Result<Self> {
        Ok(Self {
            k_m: michaelis_constant("k_m", k_m)?,
            kcat: rate_constant("kcat", kcat)?,
            e_total: conserved_total("e_total", e_total)?,
            s_total: conserved_total("s_total", s_total)?,
            stoichiometry: vec![DVector::from_row_slice(&[1])],
        })
    }

    /// Michaelis constant `kM`
    pub fn michaelis_constant(&self) -> T {
        self.k_m
    }

    /// Catalytic rate constant `kcat`
    pub fn kcat(&self) -> T {
        self.kcat
    }

    /// Total enzyme `ET`
    pub fn e_total(&self) -> i64 {
        self.e_total
    }

    /// Total substrate `ST`
    pub fn s_total(&self) -> i64 {
        self.s_total
    }
}

impl<T: Real> ReactionNetwork<T> for SingleSubstrateTqssa<T> {
    fn name(&self) -> &str {
        "SingleSubstrateTqssa"
    }

    fn species(&self) -> usize {
        1
    }

    fn stoichiometry(&self) -> &[DVector<i64>] {
        &self.stoichiometry
    }

    fn is_admissible(&self, population: &[i64]) -> bool {
        (0..=self.s_total).contains(&population[0])
    }

    fn rate(&self, population: &[i64], channel: usize) -> Result<T> {
        KineticsError::check_index("channel", channel, 1)?;
        Ok(tqssa_rate(self.kcat, self.k_m, self.e_total, self.s_total - population[0]))
    }

    fn description(&self) -> Option<&str> {
        Some("S -> P, total quasi-steady-state approximation")
    }
}

impl<T: Real> BoundedNetwork<T> for SingleSubstrateTqssa<T> {
    fn population_bounds(&self) -> Vec<i64> {
        vec![self.s_total + 1]
    }
}

// =================================================================================================
// Standard QSSA
// =================================================================================================

/// Standard (Michaelis-Menten) quasi-steady-state reduction over `P`
///
/// One channel `S → P` with propensity `kcat·ET·S / (S + kM)`, `S = ST − P`.
#[derive(Debug, Clone)]
pub struct SingleSubstrateSqssa<T: Real = f64> {
    k_m: T,
    kcat: T,
    e_total: i64,
    s_total: i64,
    stoichiometry: Vec<DVector<i64>>,
}

/// Species and channel indices
impl SingleSubstrateSqssa {
    /// Product
    pub const P: usize = 0;

    /// `S → P`
    pub const CONVERSION: usize = 0;
}

impl<T: Real> SingleSubstrateSqssa<T> {
    /// Create the sQSSA model
    ///
    /// Arguments and errors as for [`SingleSubstrateTqssa::new`].
    pub fn new(k_m: T, kcat: T, e_total: i64, s_total: i64) -> Result<Self> {
        Ok(Self {
            k_m: michaelis_constant("k_m", k_m)?,
            kcat: rate_constant("kcat", kcat)?,
            e_total: conserved_total("e_total", e_total)?,
            s_total: conserved_total("s_total", s_total)?,
            stoichiometry: vec![DVector::from_row_slice(&[1])],
        })
    }

    /// Michaelis constant `kM`
    pub fn michaelis_constant(&self) -> T {
        self.k_m
    }

    /// Catalytic rate constant `kcat`
    pub fn kcat(&self) -> T {
        self.kcat
    }

    /// Total enzyme `ET`
    pub fn e_total(&self) -> i64 {
        self.e_total
    }

    /// Total substrate `ST`
    pub fn s_total(&self) -> i64 {
        self.s_total
    }
}

impl<T: Real> ReactionNetwork<T> for SingleSubstrateSqssa<T> {
    fn name(&self) -> &str {
        "SingleSubstrateSqssa"
    }

    fn species(&self) -> usize {
        1
    }

    fn stoichiometry(&self) -> &[DVector<i64>] {
        &self.stoichiometry
    }

    fn is_admissible(&self, population: &[i64]) -> bool {
        (0..=self.s_total).contains(&population[0])
    }

    fn rate(&self, population: &[i64], channel: usize) -> Result<T> {
        KineticsError::check_index("channel", channel, 1)?;
        Ok(sqssa_rate(self.kcat, self.k_m, self.e_total, self.s_total - population[0]))
    }

    fn description(&self) -> Option<&str> {
        Some("S -> P, Michaelis-Menten approximation")
    }
}

impl<T: Real> BoundedNetwork<T> for SingleSubstrateSqssa<T> {
    fn population_bounds(&self) -> Vec<i64> {
        vec![self.s_total + 1]
    }
}

// =================================================================================================
// Tests
// =================================================================================================
