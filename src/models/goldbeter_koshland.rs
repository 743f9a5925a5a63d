//! Goldbeter-Koshland switch
//!
//! A substrate cycled between `S` and `SP` by a kinase `E` and a
//! phosphatase `D`:
//!
//! ```text
//!            kfe          ke
//!   E + S   ⇌⇌⇌⇌  C   ────►  E + SP
//!            kbe
//!            kfd          kd
//!   D + SP  ⇌⇌⇌⇌  CP  ────►  D + S
//!            kbd
//! ```
//!
//! Conserved: `E + C = ET`, `D + CP = DT` and `S + SP + C + CP = ST`.

use nalgebra::DVector;

use crate::error::{KineticsError, Result};
use crate::models::{conserved_total, michaelis_constant, rate_constant, reduced_constant, sqssa_rate, tqssa_rate};
use crate::network::{BoundedNetwork, ReactionNetwork};
use crate::{real, Real};

// Species of the exact model
const PHOSPHORYLATED: usize = 0;
const KINASE_COMPLEX: usize = 1;
const PHOSPHATASE_COMPLEX: usize = 2;

// Channels of the exact model
const KINASE_FORWARD: usize = 0;
const KINASE_BACKWARD: usize = 1;
const PHOSPHORYLATION: usize = 2;
const PHOSPHATASE_FORWARD: usize = 3;
const PHOSPHATASE_BACKWARD: usize = 4;
const DEPHOSPHORYLATION: usize = 5;

// Channels of the reductions
const REDUCED_PHOSPHORYLATION: usize = 0;
const REDUCED_DEPHOSPHORYLATION: usize = 1;

// =================================================================================================
// Exact Mechanism
// =================================================================================================

/// Exact Goldbeter-Koshland mechanism over `(SP, C, CP)`
///
/// | channel | `ν` | propensity |
/// |---|---|---|
/// | `KINASE_FORWARD` | `(0, 1, 0)` | `kfe·(ET − C)·(ST − SP − C − CP)` |
/// | `KINASE_BACKWARD` | `(0, −1, 0)` | `kbe·C` |
/// | `PHOSPHORYLATION` | `(1, −1, 0)` | `ke·C` |
/// | `PHOSPHATASE_FORWARD` | `(−1, 0, 1)` | `kfd·(DT − CP)·SP` |
/// | `PHOSPHATASE_BACKWARD` | `(1, 0, −1)` | `kbd·CP` |
/// | `DEPHOSPHORYLATION` | `(0, 0, −1)` | `kd·CP` |
#[derive(Debug, Clone)]
pub struct GoldbeterKoshland<T: Real = f64> {
    kfe: T,
    kbe: T,
    ke: T,
    kfd: T,
    kbd: T,
    kd: T,
    /// Total kinase ET
    e_total: i64,
    /// Total phosphatase DT
    d_total: i64,
    /// Total substrate ST
    s_total: i64,
    stoichiometry: Vec<DVector<i64>>,
}

/// Species and channel indices
impl GoldbeterKoshland {
    /// Phosphorylated substrate
    pub const SP: usize = PHOSPHORYLATED;
    /// Kinase-substrate complex
    pub const C: usize = KINASE_COMPLEX;
    /// Phosphatase-substrate complex
    pub const CP: usize = PHOSPHATASE_COMPLEX;

    /// `E + S → C`
    pub const KINASE_FORWARD: usize = KINASE_FORWARD;
    /// `C → E + S`
    pub const KINASE_BACKWARD: usize = KINASE_BACKWARD;
    /// `C → E + SP`
    pub const PHOSPHORYLATION: usize = PHOSPHORYLATION;
    /// `D + SP → CP`
    pub const PHOSPHATASE_FORWARD: usize = PHOSPHATASE_FORWARD;
    /// `CP → D + SP`
    pub const PHOSPHATASE_BACKWARD: usize = PHOSPHATASE_BACKWARD;
    /// `CP → D + S`
    pub const DEPHOSPHORYLATION: usize = DEPHOSPHORYLATION;
}

impl<T: Real> GoldbeterKoshland<T> {
    /// Create the exact model
    ///
    /// # Arguments
    ///
    /// * `kfe`, `kbe`, `ke` - Kinase binding, unbinding and catalytic constants
    /// * `kfd`, `kbd`, `kd` - Phosphatase binding, unbinding and catalytic constants
    /// * `e_total` - Total kinase ET
    /// * `d_total` - Total phosphatase DT
    /// * `s_total` - Total substrate ST
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] for a negative or non-finite rate
    /// constant, or a non-positive total.
    #[allow(clippy::too_many_arguments)]
    pub fn new(kfe: T, kbe: T, ke: T, kfd: T, kbd: T, kd: T, e_total: i64, d_total: i64, s_total: i64) -> Result<Self> {
        Ok(Self {
            kfe: rate_constant("kfe", kfe)?,
            kbe: rate_constant("kbe", kbe)?,
            ke: rate_constant("ke", ke)?,
            kfd: rate_constant("kfd", kfd)?,
            kbd: rate_constant("kbd", kbd)?,
            kd: rate_constant("kd", kd)?,
            e_total: conserved_total("e_total", e_total)?,
            d_total: conserved_total("d_total", d_total)?,
            s_total: conserved_total("s_total", s_total)?,
            stoichiometry: vec![
                DVector::from_row_slice(&[0, 1, 0]),
                DVector::from_row_slice(&[0, -1, 0]),
                DVector::from_row_slice(&[1, -1, 0]),
                DVector::from_row_slice(&[-1, 0, 1]),
                DVector::from_row_slice(&[1, 0, -1]),
                DVector::from_row_slice(&[0, 0, -1]),
            ],
        })
    }

    /// Total kinase `ET`
    pub fn e_total(&self) -> i64 {
        self.e_total
    }

    /// Total phosphatase `DT`
    pub fn d_total(&self) -> i64 {
        self.d_total
    }

    /// Total substrate `ST`
    pub fn s_total(&self) -> i64 {
        self.s_total
    }

    /// Kinase Michaelis constant `kME = (kbe + ke) / kfe`
    pub fn kinase_michaelis_constant(&self) -> T {
        (self.kbe + self.ke) / self.kfe
    }

    /// Phosphatase Michaelis constant `kMD = (kbd + kd) / kfd`
    pub fn phosphatase_michaelis_constant(&self) -> T {
        (self.kbd + self.kd) / self.kfd
    }

    /// tQSSA reduction with the same constants
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] when either Michaelis constant is
    /// not finite and strictly positive.
    pub fn tqssa(&self) -> Result<GoldbeterKoshlandTqssa<T>> {
        GoldbeterKoshlandTqssa::new(
            reduced_constant("k_me", self.kfe, self.kbe, self.ke)?,
            self.ke,
            reduced_constant("k_md", self.kfd, self.kbd, self.kd)?,
            self.kd,
            self.e_total,
            self.d_total,
            self.s_total,
        )
    }

    /// sQSSA reduction with the same constants
    ///
    /// # Errors
    ///
    /// As for [`tqssa`](Self::tqssa).
    pub fn sqssa(&self) -> Result<GoldbeterKoshlandSqssa<T>> {
        GoldbeterKoshlandSqssa::new(
            reduced_constant("k_me", self.kfe, self.kbe, self.ke)?,
            self.ke,
            reduced_constant("k_md", self.kfd, self.kbd, self.kd)?,
            self.kd,
            self.e_total,
            self.d_total,
            self.s_total,
        )
    }
}

impl<T: Real> ReactionNetwork<T> for GoldbeterKoshland<T> {
    fn name(&self) -> &str {
        "GoldbeterKoshland"
    }

    fn species(&self) -> usize {
        3
    }

    fn stoichiometry(&self) -> &[DVector<i64>] {
        &self.stoichiometry
    }

    fn is_admissible(&self, population: &[i64]) -> bool {
        let (sp, c, cp) = (
            population[PHOSPHORYLATED],
            population[KINASE_COMPLEX],
            population[PHOSPHATASE_COMPLEX],
        );
        sp >= 0
            && (0..=self.e_total).contains(&c)
            && (0..=self.d_total).contains(&cp)
            && sp + c + cp <= self.s_total
    }

    fn rate(&self, population: &[i64], channel: usize) -> Result<T> {
        let (sp, c, cp) = (
            population[PHOSPHORYLATED],
            population[KINASE_COMPLEX],
            population[PHOSPHATASE_COMPLEX],
        );
        let count = |n: i64| real::<T>(n as f64);

        match channel {
            KINASE_FORWARD => Ok(self.kfe * count((self.e_total - c) * (self.s_total - sp - c - cp))),
            KINASE_BACKWARD => Ok(self.kbe * count(c)),
            PHOSPHORYLATION => Ok(self.ke * count(c)),
            PHOSPHATASE_FORWARD => Ok(self.kfd * count((self.d_total - cp) * sp)),
            PHOSPHATASE_BACKWARD => Ok(self.kbd * count(cp)),
            DEPHOSPHORYLATION => Ok(self.kd * count(cp)),
            _ => Err(KineticsError::IndexOutOfRange { what: "channel", index: channel, len: 6 }),
        }
    }

    fn description(&self) -> Option<&str> {
        Some("Phosphorylation-dephosphorylation cycle, exact mass-action kinetics")
    }
}

impl<T: Real> BoundedNetwork<T> for GoldbeterKoshland<T> {
    fn population_bounds(&self) -> Vec<i64> {
        vec![
            self.s_total + 1,
            self.e_total.min(self.s_total) + 1,
            self.d_total.min(self.s_total) + 1,
        ]
    }
}

// =================================================================================================
// Total QSSA
// =================================================================================================

/// tQSSA reduction over `ŜP = SP + CP`
///
/// Two channels, `ν = (1)` and `ν = (−1)`, each using the single-substrate
/// tQSSA rate law: phosphorylation with `(ET, ST − ŜP, kME, ke)`,
/// dephosphorylation with `(DT, ŜP, kMD, kd)`.
#[derive(Debug, Clone)]
pub struct GoldbeterKoshlandTqssa<T: Real = f64> {
    k_me: T,
    ke: T,
    k_md: T,
    kd: T,
    e_total: i64,
    d_total: i64,
    s_total: i64,
    stoichiometry: Vec<DVector<i64>>,
}

/// Species and channel indices
impl GoldbeterKoshlandTqssa {
    /// Total phosphorylated substrate `SP + CP`
    pub const SP_HAT: usize = 0;

    /// Kinase-driven `S → SP`
    pub const PHOSPHORYLATION: usize = REDUCED_PHOSPHORYLATION;
    /// Phosphatase-driven `SP → S`
    pub const DEPHOSPHORYLATION: usize = REDUCED_DEPHOSPHORYLATION;
}

impl<T: Real> GoldbeterKoshlandTqssa<T> {
    /// Create the tQSSA model
    ///
    /// # Arguments
    ///
    /// * `k_me`, `ke` - Kinase Michaelis and catalytic constants
    /// * `k_md`, `kd` - Phosphatase Michaelis and catalytic constants
    /// * `e_total`, `d_total`, `s_total` - Conserved totals ET, DT, ST
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] for an invalid constant or total.
    pub fn new(k_me: T, ke: T, k_md: T, kd: T, e_total: i64, d_total: i64, s_total: i64) -> Result<Self> {
        Ok(Self {
            k_me: michaelis_constant("k_me", k_me)?,
            ke: rate_constant("ke", ke)?,
            k_md: michaelis_constant("k_md", k_md)?,
            kd: rate_constant("kd", kd)?,
            e_total: conserved_total("e_total", e_total)?,
            d_total: conserved_total("d_total", d_total)?,
            s_total: conserved_total("s_total", s_total)?,
            stoichiometry: vec![DVector::from_row_slice(&[1]), DVector::from_row_slice(&[-1])],
        })
    }

    /// Total substrate `ST`
    pub fn s_total(&self) -> i64 {
        self.s_total
    }
}

impl<T: Real> ReactionNetwork<T> for GoldbeterKoshlandTqssa<T> {
    fn name(&self) -> &str {
        "GoldbeterKoshlandTqssa"
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
        let sp_hat = population[0];
        match channel {
            REDUCED_PHOSPHORYLATION => Ok(tqssa_rate(self.ke, self.k_me, self.e_total, self.s_total - sp_hat)),
            REDUCED_DEPHOSPHORYLATION => Ok(tqssa_rate(self.kd, self.k_md, self.d_total, sp_hat)),
            _ => Err(KineticsError::IndexOutOfRange { what: "channel", index: channel, len: 2 }),
        }
    }

    fn description(&self) -> Option<&str> {
        Some("Phosphorylation-dephosphorylation cycle, total quasi-steady-state approximation")
    }
}

impl<T: Real> BoundedNetwork<T> for GoldbeterKoshlandTqssa<T> {
    fn population_bounds(&self) -> Vec<i64> {
        vec![self.s_total + 1]
    }
}

// =================================================================================================
// Standard QSSA
// =================================================================================================

/// sQSSA reduction over `SP`
///
/// Phosphorylation `ke·ET·S / (S + kME)` with `S = ST − SP`, and
/// dephosphorylation `kd·DT·SP / (SP + kMD)`.
#[derive(Debug, Clone)]
pub struct GoldbeterKoshlandSqssa<T: Real = f64> {
    k_me: T,
    ke: T,
    k_md: T,
    kd: T,
    e_total: i64,
    d_total: i64,
    s_total: i64,
    stoichiometry: Vec<DVector<i64>>,
}

/// Species and channel indices
impl GoldbeterKoshlandSqssa {
    /// Phosphorylated substrate
    pub const SP: usize = 0;

    /// Kinase-driven `S → SP`
    pub const PHOSPHORYLATION: usize = REDUCED_PHOSPHORYLATION;
    /// Phosphatase-driven `SP → S`
    pub const DEPHOSPHORYLATION: usize = REDUCED_DEPHOSPHORYLATION;
}

impl<T: Real> GoldbeterKoshlandSqssa<T> {
    /// Create the sQSSA model
    ///
    /// Arguments and errors as for [`GoldbeterKoshlandTqssa::new`].
    pub fn new(k_me: T, ke: T, k_md: T, kd: T, e_total: i64, d_total: i64, s_total: i64) -> Result<Self> {
        Ok(Self {
            k_me: michaelis_constant("k_me", k_me)?,
            ke: rate_constant("ke", ke)?,
            k_md: michaelis_constant("k_md", k_md)?,
            kd: rate_constant("kd", kd)?,
            e_total: conserved_total("e_total", e_total)?,
            d_total: conserved_total("d_total", d_total)?,
            s_total: conserved_total("s_total", s_total)?,
            stoichiometry: vec![DVector::from_row_slice(&[1]), DVector::from_row_slice(&[-1])],
        })
    }

    /// Total substrate `ST`
    pub fn s_total(&self) -> i64 {
        self.s_total
    }
}

impl<T: Real> ReactionNetwork<T> for GoldbeterKoshlandSqssa<T> {
    fn name(&self) -> &str {
        "GoldbeterKoshlandSqssa"
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
        let sp = population[0];
        match channel {
            REDUCED_PHOSPHORYLATION => Ok(sqssa_rate(self.ke, self.k_me, self.e_total, self.s_total - sp)),
            REDUCED_DEPHOSPHORYLATION => Ok(sqssa_rate(self.kd, self.k_md, self.d_total, sp)),
            _ => Err(KineticsError::IndexOutOfRange { what: "channel", index: channel, len: 2 }),
        }
    }

    fn description(&self) -> Option<&str> {
        Some("Phosphorylation-dephosphorylation cycle, Michaelis-Menten approximation")
    }
}

impl<T: Real> BoundedNetwork<T> for GoldbeterKoshlandSqssa<T> {
    fn population_bounds(&self) -> Vec<i64> {
        vec![self.s_total + 1]
    }
}

// =================================================================================================
// Tests
// =================================================================================================
