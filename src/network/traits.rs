//! Reaction-network contract

use nalgebra::DVector;

use crate::error::{KineticsError, Result};
use crate::Real;

/// Trait for reaction networks
///
/// # Responsibility
/// Describes the kinetics of a well-mixed system: how many species it tracks,
/// how each channel changes the populations, and how fast each channel fires
/// in a given state. Does NOT evolve anything (that's the engine's job).
///
/// # Propensities
/// The kinetics are split in two parts:
/// - [`is_admissible`](Self::is_admissible) is the conserved-quantity check
/// - [`rate`](Self::rate) is the rate law, only meaningful on admissible states
///
/// The master-equation solver evaluates `rate` on admissible states and treats
/// every other state as having zero propensity. The Gillespie engine calls
/// [`propensity`](Self::propensity), which rejects inadmissible populations
/// with [`KineticsError::DomainViolation`].
///
/// # Mandatory Point
/// All new reaction networks MUST implement this trait.
pub trait ReactionNetwork<T: Real>: Send + Sync {
    /// Name of the network (used to display and logging)
    fn name(&self) -> &str;

    /// Number of species `N_s`
    fn species(&self) -> usize;

    /// Stoichiometric vectors, one per channel, each of length `N_s`
    fn stoichiometry(&self) -> &[DVector<i64>];

    /// Number of reaction channels `N_r`
    fn channels(&self) -> usize {
        self.stoichiometry().len()
    }

    /// Whether `population` satisfies every conservation law of the network
    fn is_admissible(&self, population: &[i64]) -> bool;

    /// Rate law of `channel` evaluated at `population`
    ///
    /// Callers guarantee that `population` is admissible and has `N_s`
    /// entries. Implementations only check the channel index.
    fn rate(&self, population: &[i64], channel: usize) -> Result<T>;

    /// Checked propensity of `channel` at `population`
    ///
    /// # Errors
    /// - [`KineticsError::IndexOutOfRange`] for an unknown channel
    /// - [`KineticsError::DimensionMismatch`] for a population of the wrong length
    /// - [`KineticsError::DomainViolation`] when a conserved quantity is breached
    fn propensity(&self, population: &[i64], channel: usize) -> Result<T> {
        KineticsError::check_index("channel", channel, self.channels())?;
        KineticsError::check_len("population", self.species(), population.len())?;

        if !self.is_admissible(population) {
            return Err(KineticsError::DomainViolation {
                model: self.name().to_string(),
                population: population.to_vec(),
            });
        }

        self.rate(population, channel)
    }

    /// Description of the network (option)
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Reaction network with a finite, declared population range
///
/// The master-equation solver truncates species `i` to `[0, bounds[i])`.
pub trait BoundedNetwork<T: Real>: ReactionNetwork<T> {
    /// Exclusive upper bound `n_max[i]` of each species population
    fn population_bounds(&self) -> Vec<i64>;
}

/// `Err(DimensionMismatch)` unless `model` declares one stoichiometric
/// vector per channel, each with one entry per species
pub(crate) fn check_shape<N, T>(model: &N) -> Result<()>
where
    N: ReactionNetwork<T> + ?Sized,
    T: Real,
{
    let stoichiometry = model.stoichiometry();
    KineticsError::check_len("stoichiometry", model.channels(), stoichiometry.len())?;
    for nu in stoichiometry {
        KineticsError::check_len("stoichiometric vector", model.species(), nu.len())?;
    }
    Ok(())
}

// Borrowed networks, so several engines can share one model.

impl<T: Real, N: ReactionNetwork<T> + ?Sized> ReactionNetwork<T> for &N {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn species(&self) -> usize {
        (**self).species()
    }

    fn stoichiometry(&self) -> &[DVector<i64>] {
        (**self).stoichiometry()
    }

    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn is_admissible(&self, population: &[i64]) -> bool {
        (**self).is_admissible(population)
    }

    fn rate(&self, population: &[i64], channel: usize) -> Result<T> {
        (**self).rate(population, channel)
    }

    fn propensity(&self, population: &[i64], channel: usize) -> Result<T> {
        (**self).propensity(population, channel)
    }

    fn description(&self) -> Option<&str> {
        (**self).description()
    }
}

impl<T: Real, N: BoundedNetwork<T> + ?Sized> BoundedNetwork<T> for &N {
    fn population_bounds(&self) -> Vec<i64> {
        (**self).population_bounds()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
