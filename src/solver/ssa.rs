//! Gillespie stochastic simulation algorithm (direct method)
//!
//! # Algorithm
//!
//! Each step samples the next event of the Markov jump process exactly:
//!
//! ```text
//! a_tot = Σᵣ aᵣ(x)
//! τ     = −ln(r₁) / a_tot              r₁ ~ U(0, 1)
//! j     = min { j : Σ_{r≤j} aᵣ(x) > r₂·a_tot }    r₂ ~ U(0, 1)
//! t ← t + τ,   x ← x + νⱼ
//! ```
//!
//! A state with `a_tot = 0` is absorbing: nothing can happen any more.
//!
//! # Deadlines
//!
//! With a deadline `t_final > 0`, an event whose time would exceed it is not
//! fired and the engine keeps its current state. The clock therefore stays at
//! the last event time and never jumps to `t_final`. The population held at
//! that point is the population of the process at `t_final`.
//!
//! # Example
//!
//! ```rust
//! use sck_rs::models::SingleSubstrateTqssa;
//! use sck_rs::solver::{Gillespie, StepOutcome};
//!
//! # fn main() -> Result<(), sck_rs::error::KineticsError> {
//! let model = SingleSubstrateTqssa::new(1.0, 1.0, 10, 9)?;
//! let mut ssa = Gillespie::new(model, 7);
//!
//! // Fire events until every substrate molecule is converted.
//! let fired = ssa.simulate(usize::MAX, None)?;
//! assert_eq!(fired, 9);
//! assert_eq!(ssa.population()[SingleSubstrateTqssa::P], 9);
//! assert_eq!(ssa.step(None)?, StepOutcome::Absorbed);
//! # Ok(())
//! # }
//! ```

use log::{debug, trace};
use nalgebra::DVector;
use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{KineticsError, Result};
use crate::network::{check_shape, ReactionNetwork};
use crate::solver::config::{effective_deadline, GillespieConfiguration};
use crate::solver::traits::SimulationResult;
use crate::{real, Real};

// =================================================================================================
// Step Outcome and Snapshot
// =================================================================================================

/// Result of one [`Gillespie::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome<T: Real> {
    /// An event fired
    Fired {
        /// Channel that fired
        channel: usize,
        /// Waiting time `τ` before the event
        waiting_time: T,
    },

    /// Total propensity is zero; the state is absorbing
    Absorbed,

    /// The next event would land after the deadline
    Deadline,
}

impl<T: Real> StepOutcome<T> {
    /// Whether an event fired
    pub fn fired(&self) -> bool {
        matches!(self, StepOutcome::Fired { .. })
    }
}

/// Population and clock of a [`Gillespie`] engine at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct SsaState<T: Real> {
    /// Population of every species
    pub x: DVector<i64>,

    /// Time
    pub t: T,
}

// =================================================================================================
// Gillespie Engine
// =================================================================================================

/// Direct-method SSA engine for one trajectory
///
/// The engine owns its model, its population (zero at construction), its
/// clock and its random generator. Generators are never shared between
/// engines; use [`super::ensemble`] for independent replicates.
#[derive(Debug, Clone)]
pub struct Gillespie<N, T: Real = f64, R = StdRng> {
    model: N,
    x: DVector<i64>,
    t: T,
    rng: R,
    propensities: Vec<T>,
}

impl<N, T> Gillespie<N, T, StdRng>
where
    N: ReactionNetwork<T>,
    T: Real,
{
    /// Create an engine with a deterministic generator seeded by `seed`
    pub fn new(model: N, seed: u64) -> Self {
        Self::with_rng(model, StdRng::seed_from_u64(seed))
    }

    /// Create an engine with a generator seeded from operating-system entropy
    pub fn from_entropy(model: N) -> Self {
        Self::with_rng(model, StdRng::from_entropy())
    }
}

impl<N, T, R> Gillespie<N, T, R>
where
    N: ReactionNetwork<T>,
    T: Real,
    R: Rng,
{
    /// Create an engine driven by a caller-supplied generator
    pub fn with_rng(model: N, rng: R) -> Self {
        Self {
            x: DVector::zeros(model.species()),
            t: T::zero(),
            propensities: vec![T::zero(); model.channels()],
            model,
            rng,
        }
    }

    /// Total propensity `Σᵣ aᵣ(x)` of the current state
    ///
    /// # Errors
    ///
    /// [`KineticsError::DomainViolation`] when the current population breaks
    /// a conservation law of the model.
    pub fn total_propensity(&self) -> Result<T> {
        let mut total = T::zero();
        for r in 0..self.model.channels() {
            total += self.model.propensity(self.x.as_slice(), r)?;
        }
        Ok(total)
    }

    /// Fire at most one event
    ///
    /// `t_final` is the deadline; `None` or a non-positive value means none.
    /// On [`StepOutcome::Absorbed`] and [`StepOutcome::Deadline`] the state is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// - [`KineticsError::DimensionMismatch`] when the model's stoichiometry
    ///   does not match its species and channel counts
    /// - [`KineticsError::DomainViolation`] from the model's propensities
    /// - [`KineticsError::InvalidParameter`] when a propensity is negative or
    ///   not finite
    pub fn step(&mut self, t_final: Option<T>) -> Result<StepOutcome<T>> {
        check_shape::<N, T>(&self.model)?;

        // ====== Propensities ======

        let mut total = T::zero();
        for (r, slot) in self.propensities.iter_mut().enumerate() {
            let a = self.model.propensity(self.x.as_slice(), r)?;
            if !a.is_finite() || a < T::zero() {
                return Err(KineticsError::invalid(
                    "propensity",
                    format!(
                        "channel {} of {} evaluates to {} at {:?}",
                        r,
                        self.model.name(),
                        a,
                        self.x.as_slice()
                    ),
                ));
            }
            *slot = a;
            total += a;
        }

        if total == T::zero() {
            return Ok(StepOutcome::Absorbed);
        }

        // ====== Waiting time ======

        let r1: f64 = self.rng.sample(Open01);
        let r2: f64 = self.rng.sample(Open01);
        let tau = -real::<T>(r1).ln() / total;

        if let Some(deadline) = effective_deadline(t_final)
            && self.t + tau > deadline
        {
            return Ok(StepOutcome::Deadline);
        }

        // ====== Channel selection ======

        let target = real::<T>(r2) * total;
        let mut channel = self.propensities.len() - 1;
        let mut cumulative = T::zero();
        for (r, &a) in self.propensities.iter().enumerate() {
            cumulative += a;
            if cumulative > target {
                channel = r;
                break;
            }
        }

        self.t += tau;
        self.x += &self.model.stoichiometry()[channel];

        trace!("{}: channel {} fired at t = {}", self.model.name(), channel, self.t);

        Ok(StepOutcome::Fired {
            channel,
            waiting_time: tau,
        })
    }

    /// Fire up to `n` events while `t ≤ t_final`, returning how many fired
    ///
    /// Stops early at an absorbing state or at the deadline.
    pub fn simulate(&mut self, n: usize, t_final: Option<T>) -> Result<usize> {
        let deadline = effective_deadline(t_final);
        let mut fired = 0;

        while fired < n && deadline.is_none_or(|tf| self.t <= tf) {
            if !self.step(deadline)?.fired() {
                break;
            }
            fired += 1;
        }

        Ok(fired)
    }

    /// Like [`simulate`](Self::simulate), recording a snapshot after every event
    ///
    /// With `include_initial` the starting state is recorded first. The end
    /// state is always the last snapshot, even when no event fired.
    pub fn simulate_recorded(
        &mut self,
        n: usize,
        t_final: Option<T>,
        include_initial: bool,
    ) -> Result<SimulationResult<SsaState<T>>> {
        let deadline = effective_deadline(t_final);
        let mut snapshots = Vec::new();
        if include_initial {
            snapshots.push(self.state());
        }

        let mut fired = 0;
        while fired < n && deadline.is_none_or(|tf| self.t <= tf) {
            if !self.step(deadline)?.fired() {
                break;
            }
            fired += 1;
            snapshots.push(self.state());
        }

        if snapshots.is_empty() {
            snapshots.push(self.state());
        }

        Ok(SimulationResult::new(fired, snapshots))
    }

    /// Run a validated [`GillespieConfiguration`]
    ///
    /// Without recording, the result holds only the end state.
    pub fn run(&mut self, config: &GillespieConfiguration<T>) -> Result<SimulationResult<SsaState<T>>> {
        config.validate()?;

        debug!(
            "{}: Gillespie run from t = {} (max {} events, deadline {:?})",
            self.model.name(),
            self.t,
            config.max_events,
            config.deadline()
        );

        let result = if config.record {
            self.simulate_recorded(config.max_events, config.t_final, config.include_initial)?
        } else {
            let fired = self.simulate(config.max_events, config.t_final)?;
            SimulationResult::new(fired, vec![self.state()])
        };

        debug!("{}: {} events, t = {}", self.model.name(), result.steps, self.t);
        Ok(result)
    }

    // =============================================================================================
    // Accessors
    // =============================================================================================

    /// Current population
    pub fn population(&self) -> &DVector<i64> {
        &self.x
    }

    /// Current time
    pub fn time(&self) -> T {
        self.t
    }

    /// Snapshot of the population and clock
    pub fn state(&self) -> SsaState<T> {
        SsaState {
            x: self.x.clone(),
            t: self.t,
        }
    }

    /// Restore a snapshot (or set an initial condition)
    ///
    /// The population is not checked against the model's conservation laws
    /// here; the next propensity evaluation does that.
    ///
    /// # Errors
    ///
    /// [`KineticsError::DimensionMismatch`] when the population does not have
    /// one entry per species.
    pub fn set_state(&mut self, state: SsaState<T>) -> Result<()> {
        KineticsError::check_len("population", self.model.species(), state.x.len())?;
        self.x = state.x;
        self.t = state.t;
        Ok(())
    }

    /// Return to the zero population at `t = 0`
    ///
    /// The generator keeps its stream position.
    pub fn reset(&mut self) {
        self.x.fill(0);
        self.t = T::zero();
    }

    /// Network being simulated
    pub fn model(&self) -> &N {
        &self.model
    }

    /// Random generator driving the engine
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// ∅ → X at rate `cap − x`; absorbing once `x = cap`.
    #[derive(Debug, Clone)]
    struct Countdown {
        stoichiometry: Vec<DVector<i64>>,
        cap: i64,
    }

    impl Countdown {
        fn new(cap: i64) -> Self {
            Self {
                stoichiometry: vec![DVector::from_row_slice(&[1])],
                cap,
            }
        }
    }

    impl ReactionNetwork<f64> for Countdown {
        fn name(&self) -> &str {
            "Countdown"
        }

        fn species(&self) -> usize {
            1
        }

        fn stoichiometry(&self) -> &[DVector<i64>] {
            &self.stoichiometry
        }

        fn is_admissible(&self, population: &[i64]) -> bool {
            (0..=self.cap).contains(&population[0])
        }

        fn rate(&self, population: &[i64], _channel: usize) -> Result<f64> {
            Ok((self.cap - population[0]) as f64)
        }
    }

    /// Two channels, the first one never fires: a(0) = 0, a(1) = 1.
    #[derive(Debug, Clone)]
    struct DeadFirstChannel {
        stoichiometry: Vec<DVector<i64>>,
    }

    impl ReactionNetwork<f64> for DeadFirstChannel {
        fn name(&self) -> &str {
            "Dead first channel"
        }

        fn species(&self) -> usize {
            2
        }

        fn stoichiometry(&self) -> &[DVector<i64>] {
            &self.stoichiometry
        }

        fn is_admissible(&self, population: &[i64]) -> bool {
            population.iter().all(|&y| y >= 0)
        }

        fn rate(&self, _population: &[i64], channel: usize) -> Result<f64> {
            Ok(if channel == 0 { 0.0 } else { 1.0 })
        }
    }

    fn dead_first_channel() -> DeadFirstChannel {
        DeadFirstChannel {
            stoichiometry: vec![DVector::from_row_slice(&[1, 0]), DVector::from_row_slice(&[0, 1])],
        }
    }

    #[test]
    fn test_misshapen_stoichiometry_is_an_error() {
        // Two species, but the firing channel only moves one of them.
        let model = DeadFirstChannel {
            stoichiometry: vec![DVector::from_row_slice(&[1, 0]), DVector::from_row_slice(&[1])],
        };
        let mut ssa = Gillespie::new(model, 5);

        assert_eq!(
            ssa.step(None),
            Err(KineticsError::DimensionMismatch { what: "stoichiometric vector", expected: 2, found: 1 })
        );
        assert!(ssa.simulate(10, None).is_err());
        assert_eq!(ssa.population().as_slice(), &[0, 0]);
        assert_eq!(ssa.time(), 0.0);
    }

    #[test]
    fn test_initial_state() {
        let ssa = Gillespie::new(Countdown::new(3), 1);
        assert_eq!(ssa.population().as_slice(), &[0]);
        assert_eq!(ssa.time(), 0.0);
        assert_relative_eq!(ssa.total_propensity().unwrap(), 3.0);
    }

    #[test]
    fn test_runs_to_absorption() {
        let mut ssa = Gillespie::new(Countdown::new(5), 11);

        let fired = ssa.simulate(100, None).unwrap();

        assert_eq!(fired, 5);
        assert_eq!(ssa.population()[0], 5);
        assert_eq!(ssa.total_propensity().unwrap(), 0.0);
    }

    #[test]
    fn test_absorbing_state_is_left_untouched() {
        let mut ssa = Gillespie::new(Countdown::new(2), 3);
        ssa.simulate(10, None).unwrap();
        let before = ssa.state();

        assert_eq!(ssa.step(None).unwrap(), StepOutcome::Absorbed);
        assert_eq!(ssa.step(Some(1e9)).unwrap(), StepOutcome::Absorbed);
        assert_eq!(ssa.state(), before);
    }

    #[test]
    fn test_deadline_is_never_exceeded() {
        for seed in 0..50 {
            let mut ssa = Gillespie::new(Countdown::new(20), seed);
            let t_final = 0.05;

            let fired = ssa.simulate(1000, Some(t_final)).unwrap();

            assert!(ssa.time() <= t_final, "seed {}: t = {}", seed, ssa.time());
            assert!(fired < 20);
        }
    }

    #[test]
    fn test_deadline_leaves_state_unchanged() {
        let mut ssa = Gillespie::new(Countdown::new(1), 5);
        let before = ssa.state();

        // One molecule, unit rate: an event inside [0, 1e-12] is practically impossible.
        assert_eq!(ssa.step(Some(1e-12)).unwrap(), StepOutcome::Deadline);
        assert_eq!(ssa.state(), before);
    }

    #[test]
    fn test_non_positive_deadline_means_unbounded() {
        let mut a = Gillespie::new(Countdown::new(4), 9);
        let mut b = Gillespie::new(Countdown::new(4), 9);

        assert_eq!(a.simulate(100, Some(0.0)).unwrap(), 4);
        assert_eq!(b.simulate(100, Some(-1.0)).unwrap(), 4);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_zero_propensity_channel_is_never_selected() {
        let mut ssa = Gillespie::new(dead_first_channel(), 2024);

        for _ in 0..1000 {
            match ssa.step(None).unwrap() {
                StepOutcome::Fired { channel, .. } => assert_eq!(channel, 1),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
        assert_eq!(ssa.population().as_slice(), &[0, 1000]);
    }

    #[test]
    fn test_waiting_times_are_positive_and_accumulate() {
        let mut ssa = Gillespie::new(dead_first_channel(), 17);
        let mut clock = 0.0;

        for _ in 0..100 {
            if let StepOutcome::Fired { waiting_time, .. } = ssa.step(None).unwrap() {
                assert!(waiting_time > 0.0);
                clock += waiting_time;
            }
        }
        assert_relative_eq!(ssa.time(), clock, max_relative = 1e-12);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = Gillespie::new(Countdown::new(10), 42);
        let mut b = Gillespie::new(Countdown::new(10), 42);

        let ra = a.simulate_recorded(100, None, true).unwrap();
        let rb = b.simulate_recorded(100, None, true).unwrap();

        assert_eq!(ra, rb);
    }

    #[test]
    fn test_recorded_run_layout() {
        let mut ssa = Gillespie::new(Countdown::new(3), 8);

        let result = ssa.simulate_recorded(100, None, true).unwrap();

        assert_eq!(result.steps, 3);
        assert_eq!(result.len(), 4);
        assert_eq!(result.snapshots[0].x.as_slice(), &[0]);
        assert_eq!(result.final_state().unwrap(), &ssa.state());
        for pair in result.snapshots.windows(2) {
            assert!(pair[1].t > pair[0].t);
        }
    }

    #[test]
    fn test_recorded_run_always_holds_final_state() {
        let mut ssa = Gillespie::new(Countdown::new(3), 8);
        ssa.simulate(100, None).unwrap();

        let result = ssa.simulate_recorded(100, None, false).unwrap();

        assert_eq!(result.steps, 0);
        assert_eq!(result.snapshots, vec![ssa.state()]);
    }

    #[test]
    fn test_run_with_configuration() {
        let mut ssa = Gillespie::new(Countdown::new(6), 4);

        let result = ssa.run(&GillespieConfiguration::new(2)).unwrap();
        assert_eq!(result.steps, 2);
        assert_eq!(result.len(), 1);

        let result = ssa.run(&GillespieConfiguration::new(100).recording(false)).unwrap();
        assert_eq!(result.steps, 4);
        assert_eq!(result.len(), 4);

        assert!(ssa.run(&GillespieConfiguration::new(1).with_deadline(f64::NAN)).is_err());
    }

    #[test]
    fn test_domain_violation_is_reported() {
        let mut ssa = Gillespie::new(Countdown::new(3), 1);
        ssa.set_state(SsaState { x: DVector::from_row_slice(&[7]), t: 0.0 }).unwrap();

        let err = ssa.step(None).unwrap_err();
        assert_eq!(
            err,
            KineticsError::DomainViolation { model: "Countdown".to_string(), population: vec![7] }
        );
        assert!(ssa.total_propensity().is_err());
        assert_eq!(ssa.population().as_slice(), &[7]);
    }

    #[test]
    fn test_set_state_and_reset() {
        let mut ssa = Gillespie::new(Countdown::new(3), 1);

        assert!(matches!(
            ssa.set_state(SsaState { x: DVector::from_row_slice(&[0, 0]), t: 0.0 }),
            Err(KineticsError::DimensionMismatch { expected: 1, found: 2, .. })
        ));

        ssa.set_state(SsaState { x: DVector::from_row_slice(&[2]), t: 1.5 }).unwrap();
        assert_eq!(ssa.time(), 1.5);
        assert_eq!(ssa.simulate(10, None).unwrap(), 1);

        ssa.reset();
        assert_eq!(ssa.population().as_slice(), &[0]);
        assert_eq!(ssa.time(), 0.0);
    }

    #[test]
    fn test_borrowed_model() {
        let model = Countdown::new(2);
        let mut a = Gillespie::new(&model, 1);
        let mut b = Gillespie::new(&model, 2);

        assert_eq!(a.simulate(10, None).unwrap(), 2);
        assert_eq!(b.simulate(10, None).unwrap(), 2);
        assert_eq!(a.model().name(), "Countdown");
    }

    #[test]
    fn test_custom_generator() {
        let rng = StdRng::seed_from_u64(99);
        let mut a = Gillespie::with_rng(Countdown::new(4), rng);
        let mut b = Gillespie::new(Countdown::new(4), 99);

        a.simulate(100, None).unwrap();
        b.simulate(100, None).unwrap();
        assert_eq!(a.state(), b.state());
    }
}
