//! Independent Gillespie replicates
//!
//! Every replicate runs its own [`Gillespie`] engine from the zero population
//! at `t = 0`, with its own `StdRng`. Replicate seeds are derived from a
//! master seed by hashing `(master_seed, replicate)` with SipHash-1-3 under
//! fixed zero keys, so results do not depend on thread scheduling and are
//! reproducible across platforms.
//!
//! With the `parallel` feature, replicates run on the rayon thread pool.
//!
//! # Example
//!
//! ```rust
//! use sck_rs::models::SingleSubstrateTqssa;
//! use sck_rs::solver::{ensemble, GillespieConfiguration};
//!
//! # fn main() -> Result<(), sck_rs::error::KineticsError> {
//! let model = SingleSubstrateTqssa::new(1.0, 1.0, 10, 9)?;
//! let config = GillespieConfiguration::new(usize::MAX).with_deadline(2.0);
//!
//! let states = ensemble::sample_final_states(&model, &config, 1_000, 42)?;
//! let (mean, sd) = ensemble::population_statistics(&states, SingleSubstrateTqssa::P)?;
//! println!("P(2) = {:.3} ± {:.3}", mean, sd);
//! # Ok(())
//! # }
//! ```

use std::hash::Hasher;

use log::debug;
use siphasher::sip::SipHasher13;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{KineticsError, Result};
use crate::network::ReactionNetwork;
use crate::solver::config::GillespieConfiguration;
use crate::solver::ssa::{Gillespie, SsaState};
use crate::{real, Real};

/// Seed of replicate `replicate` under `master_seed`
pub fn replicate_seed(master_seed: u64, replicate: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(replicate);
    hasher.finish()
}

/// Run `replicates` independent trajectories and return their end states
///
/// Each replicate fires at most `config.max_events` events and honours the
/// configured deadline; recording flags are ignored.
///
/// # Errors
///
/// The configuration's validation error, or the first error raised by a
/// replicate.
pub fn sample_final_states<N, T>(
    model: &N,
    config: &GillespieConfiguration<T>,
    replicates: usize,
    master_seed: u64,
) -> Result<Vec<SsaState<T>>>
where
    N: ReactionNetwork<T>,
    T: Real,
{
    config.validate()?;

    debug!(
        "{}: sampling {} replicates (max {} events, deadline {:?}, seed {})",
        model.name(),
        replicates,
        config.max_events,
        config.t_final,
        master_seed
    );

    let run = |replicate: usize| -> Result<SsaState<T>> {
        let mut engine = Gillespie::new(model, replicate_seed(master_seed, replicate as u64));
        engine.simulate(config.max_events, config.t_final)?;
        Ok(engine.state())
    };

    #[cfg(feature = "parallel")]
    let states = (0..replicates).into_par_iter().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let states = (0..replicates).map(run).collect();

    states
}

/// Times at which each replicate stopped
///
/// Runs every replicate until it is absorbed or has fired `max_events`
/// events; for absorbing networks this is the completion time.
pub fn completion_times<N, T>(model: &N, max_events: usize, replicates: usize, master_seed: u64) -> Result<Vec<T>>
where
    N: ReactionNetwork<T>,
    T: Real,
{
    let config = GillespieConfiguration::new(max_events);
    let states = sample_final_states(model, &config, replicates, master_seed)?;
    Ok(states.into_iter().map(|s| s.t).collect())
}

/// Sample mean and sample standard deviation of one species over `states`
///
/// The standard deviation uses the `n − 1` denominator and is zero for a
/// single state.
///
/// # Errors
///
/// - [`KineticsError::InvalidParameter`] when `states` is empty
/// - [`KineticsError::IndexOutOfRange`] for an invalid species
pub fn population_statistics<T: Real>(states: &[SsaState<T>], species: usize) -> Result<(T, T)> {
    let first = states
        .first()
        .ok_or_else(|| KineticsError::invalid("states", "at least one state is required"))?;
    KineticsError::check_index("species", species, first.x.len())?;

    let n = real::<T>(states.len() as f64);
    let values = || states.iter().map(|s| real::<T>(s.x[species] as f64));

    let mean = values().fold(T::zero(), |acc, v| acc + v) / n;
    if states.len() < 2 {
        return Ok((mean, T::zero()));
    }

    let squares = values().fold(T::zero(), |acc, v| acc + (v - mean) * (v - mean));
    let sd = (squares / (n - T::one())).sqrt();
    Ok((mean, sd))
}

// =================================================================================================
// Tests
// =================================================================================================
