//! Enzyme-kinetics reaction networks
//!
//! All models implement [`ReactionNetwork`](crate::network::ReactionNetwork)
//! and [`BoundedNetwork`](crate::network::BoundedNetwork), so each one runs
//! unchanged on the master-equation solver and on the Gillespie engine.
//! Models describe the chemistry; engines own time and randomness.
//!
//! # Available Models
//!
//! ## Single-substrate enzyme kinetics
//!
//! `E + S ⇌ C → E + P` with conserved enzyme `ET = E + C` and substrate
//! `ST = S + C + P`:
//!
//! - [`SingleSubstrate`]: the exact mechanism, tracking `(C, P)`
//! - [`SingleSubstrateTqssa`]: total quasi-steady-state reduction, tracking `P`
//! - [`SingleSubstrateSqssa`]: standard (Michaelis-Menten) reduction, tracking `P`
//!
//! ## Goldbeter-Koshland switch
//!
//! A substrate phosphorylated by a kinase `E` and dephosphorylated by a
//! phosphatase `D`, with conserved `ET`, `DT` and `ST`:
//!
//! - [`GoldbeterKoshland`]: the exact mechanism, tracking `(SP, C, CP)`
//! - [`GoldbeterKoshlandTqssa`]: tQSSA reduction, tracking `ŜP = SP + CP`
//! - [`GoldbeterKoshlandSqssa`]: sQSSA reduction, tracking `SP`
//!
//! # Reductions
//!
//! Both reductions replace the fast binding steps by a single effective
//! channel per enzyme with Michaelis constant `kM = (kb + kcat) / kf`. The
//! exact models build them directly:
//!
//! ```rust
//! use sck_rs::models::SingleSubstrate;
//!
//! # fn main() -> Result<(), sck_rs::error::KineticsError> {
//! let exact = SingleSubstrate::new(10.0, 9.0, 1.0, 10, 9)?;
//! assert_eq!(exact.michaelis_constant(), 1.0);
//!
//! let tqssa = exact.tqssa()?;
//! assert_eq!(tqssa.michaelis_constant(), 1.0);
//! # Ok(())
//! # }
//! ```

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod single_substrate;
pub mod goldbeter_koshland;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use single_substrate::{SingleSubstrate, SingleSubstrateSqssa, SingleSubstrateTqssa};
pub use goldbeter_koshland::{GoldbeterKoshland, GoldbeterKoshlandSqssa, GoldbeterKoshlandTqssa};

// =================================================================================================
// Shared Rate Laws and Validation
// =================================================================================================

use crate::error::{KineticsError, Result};
use crate::{real, Real};

/// tQSSA complex level `2·E·S / (b + √(b² − 4·E·S))` with `b = E + S + kM`,
/// scaled by `k_cat`
///
/// The fraction is the smaller root of `C² − b·C + E·S = 0`, written so that
/// it stays accurate when `E·S ≪ b²`.
pub(crate) fn tqssa_rate<T: Real>(k_cat: T, k_m: T, enzyme: i64, substrate: i64) -> T {
    let c = real::<T>((2 * enzyme * substrate) as f64);
    let b = real::<T>((enzyme + substrate) as f64) + k_m;
    let delta = b * b - (c + c);
    k_cat * c / (b + delta.sqrt())
}

/// Michaelis-Menten rate `k_cat·E·S / (S + kM)`
pub(crate) fn sqssa_rate<T: Real>(k_cat: T, k_m: T, enzyme: i64, substrate: i64) -> T {
    let s = real::<T>(substrate as f64);
    k_cat * real::<T>(enzyme as f64) * s / (s + k_m)
}

/// Accept a finite, non-negative rate constant
pub(crate) fn rate_constant<T: Real>(parameter: &str, value: T) -> Result<T> {
    if !value.is_finite() || value < T::zero() {
        return Err(KineticsError::invalid(
            parameter,
            format!("rate constant must be finite and non-negative, got {}", value),
        ));
    }
    Ok(value)
}

/// Accept a finite, strictly positive Michaelis constant
pub(crate) fn michaelis_constant<T: Real>(parameter: &str, value: T) -> Result<T> {
    if !value.is_finite() || value <= T::zero() {
        return Err(KineticsError::invalid(
            parameter,
            format!("Michaelis constant must be finite and strictly positive, got {}", value),
        ));
    }
    Ok(value)
}

/// Accept a strictly positive conserved total
pub(crate) fn conserved_total(parameter: &str, value: i64) -> Result<i64> {
    if value <= 0 {
        return Err(KineticsError::invalid(
            parameter,
            format!("conserved total must be strictly positive, got {}", value),
        ));
    }
    Ok(value)
}

/// `(kb + kcat) / kf`, validated as a Michaelis constant
pub(crate) fn reduced_constant<T: Real>(parameter: &str, kf: T, kb: T, kcat: T) -> Result<T> {
    michaelis_constant(parameter, (kb + kcat) / kf)
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tqssa_rate_is_smaller_quadratic_root() {
        let (e, s, k_m) = (10_i64, 9_i64, 1.0_f64);
        let c = tqssa_rate(1.0, k_m, e, s);
        let b = (e + s) as f64 + k_m;

        assert_relative_eq!(c * c - b * c + (e * s) as f64, 0.0, epsilon = 1e-10);
        assert!(c <= e.min(s) as f64);
    }

    #[test]
    fn test_rates_vanish_without_substrate() {
        assert_eq!(tqssa_rate(2.0, 1.0, 5, 0), 0.0);
        assert_eq!(sqssa_rate(2.0, 1.0, 5, 0), 0.0);
    }

    #[test]
    fn test_tqssa_approaches_sqssa_for_scarce_enzyme() {
        // With E ≪ S + kM the two reductions coincide.
        let t = tqssa_rate(1.0, 500.0, 1, 100);
        let s = sqssa_rate(1.0, 500.0, 1, 100);
        assert_relative_eq!(t, s, max_relative = 1e-2);
    }

    #[test]
    fn test_validators() {
        assert!(rate_constant("k", 0.0).is_ok());
        assert!(rate_constant("k", -1.0).is_err());
        assert!(rate_constant("k", f64::NAN).is_err());
        assert!(michaelis_constant("kM", 0.0).is_err());
        assert!(michaelis_constant("kM", f64::INFINITY).is_err());
        assert!(conserved_total("ET", 0).is_err());
        assert_eq!(conserved_total("ET", 3).unwrap(), 3);
        assert!(reduced_constant("kM", 0.0, 1.0, 1.0).is_err());
        assert_eq!(reduced_constant("kM", 10.0, 9.0, 1.0).unwrap(), 1.0);
    }
}
