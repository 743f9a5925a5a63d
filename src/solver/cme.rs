//! Chemical master equation (CME) solver
//!
//! # Mathematical Background
//!
//! For a network with stoichiometric vectors `νᵣ` and propensities `aᵣ(x)`,
//! the probability `p(x, t)` of every population `x` obeys
//!
//! ```text
//! dp(x)/dt = Σᵣ [ aᵣ(x − νᵣ)·p(x − νᵣ) − aᵣ(x)·p(x) ]
//! ```
//!
//! The solver truncates species `i` to `[0, n_max[i])`, stores `p` as a dense
//! vector indexed by the [`StateSpace`] encoding and integrates the resulting
//! linear system with any [`Stepper`].
//!
//! # Truncation
//!
//! Inflow from a source `x − νᵣ` outside the truncated space is dropped while
//! outflow `aᵣ(x)·p(x)` is always applied. Probability that would leave the
//! space is therefore lost, and `Σ p < 1` signals bounds that are too tight.
//!
//! # Architecture
//!
//! Construction evaluates every propensity once and stores the operator as a
//! [`TransitionTable`]: one exit rate per state plus, per state, the list of
//! `(source, rate)` inflows. The table implements [`OdeSystem`], so steppers
//! never see the network itself.
//!
//! # Example
//!
//! ```rust
//! use sck_rs::models::SingleSubstrate;
//! use sck_rs::solver::{ExplicitRungeKutta, MasterEquation, Method};
//!
//! # fn main() -> Result<(), sck_rs::error::KineticsError> {
//! let model = SingleSubstrate::new(10.0, 9.0, 1.0, 10, 9)?;
//! let mut cme: MasterEquation<_, f64> = MasterEquation::new(model)?;
//! let mut rk4 = ExplicitRungeKutta::from_method(Method::Rk4);
//!
//! cme.simulate(&mut rk4, 1e-3, 0.5)?;
//!
//! let p = SingleSubstrate::P;
//! println!("<P> = {:.4} ± {:.4}", cme.mean(p)?, cme.sd(p)?);
//! assert!((cme.total_probability() - 1.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

use std::sync::OnceLock;

use log::{debug, warn};
use nalgebra::DVector;
use ndarray::{ArrayViewD, IxDyn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{KineticsError, Result};
use crate::network::{check_shape, BoundedNetwork, ReactionNetwork, StateSpace};
use crate::solver::config::{validate_horizon, IntegrationConfiguration};
use crate::solver::traits::{OdeSystem, SimulationResult, Stepper};
use crate::{real, Real};

/// Deviation of `Σ p` from 1 above which a run end is reported as lossy.
pub const MASS_TOLERANCE: f64 = 1e-6;

// =================================================================================================
// Transition Table
// =================================================================================================

/// Master-equation operator over a truncated state space
///
/// Row `x` holds the exit rate `Σᵣ aᵣ(x)` and the inflows
/// `(x − νᵣ, aᵣ(x − νᵣ))` whose source lies inside the space. Inflows are
/// stored in compressed-row form.
#[derive(Debug, Clone)]
pub struct TransitionTable<T: Real> {
    exit_rates: Vec<T>,
    row_offsets: Vec<usize>,
    sources: Vec<usize>,
    inflow_rates: Vec<T>,
}

impl<T: Real> TransitionTable<T> {
    /// Evaluate the propensities of `model` over `space` and assemble the operator
    ///
    /// Inadmissible states get zero propensity.
    ///
    /// # Errors
    ///
    /// - Errors raised by [`ReactionNetwork::rate`]
    /// - [`KineticsError::InvalidParameter`] when a rate is negative or not finite
    pub fn assemble<N>(model: &N, space: &StateSpace) -> Result<Self>
    where
        N: ReactionNetwork<T> + ?Sized,
    {
        let channels = model.channels();
        let states = space.len();

        // ====== Step 1: propensity of every channel in every state ======

        let mut propensities = vec![T::zero(); states * channels];
        for (x, population) in space.populations().enumerate() {
            if !model.is_admissible(&population) {
                continue;
            }
            for r in 0..channels {
                let a = model.rate(&population, r)?;
                if !a.is_finite() || a < T::zero() {
                    return Err(KineticsError::invalid(
                        "propensity",
                        format!(
                            "channel {} of {} evaluates to {} at {:?}",
                            r,
                            model.name(),
                            a,
                            population
                        ),
                    ));
                }
                propensities[x * channels + r] = a;
            }
        }

        // ====== Step 2: exit rates and in-bounds inflows ======

        let mut exit_rates = Vec::with_capacity(states);
        let mut row_offsets = Vec::with_capacity(states + 1);
        let mut sources = Vec::new();
        let mut inflow_rates = Vec::new();
        let mut source = vec![0i64; space.species()];

        row_offsets.push(0);
        for (x, population) in space.populations().enumerate() {
            let row = &propensities[x * channels..(x + 1) * channels];
            exit_rates.push(row.iter().fold(T::zero(), |acc, &a| acc + a));

            for (r, nu) in model.stoichiometry().iter().enumerate() {
                for ((s, &y), &dy) in source.iter_mut().zip(&population).zip(nu.iter()) {
                    *s = y - dy;
                }
                if let Some(from) = space.try_encode(&source) {
                    let a = propensities[from * channels + r];
                    if a > T::zero() {
                        sources.push(from);
                        inflow_rates.push(a);
                    }
                }
            }
            row_offsets.push(sources.len());
        }

        Ok(Self {
            exit_rates,
            row_offsets,
            sources,
            inflow_rates,
        })
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.exit_rates.len()
    }

    /// Whether the table has no state
    pub fn is_empty(&self) -> bool {
        self.exit_rates.is_empty()
    }

    /// Number of stored inflow transitions
    pub fn inflow_count(&self) -> usize {
        self.sources.len()
    }

    /// Total propensity `Σᵣ aᵣ(x)` of state `x`
    pub fn exit_rate(&self, x: usize) -> T {
        self.exit_rates[x]
    }

    /// `dp[x]` for a single state
    #[inline]
    fn balance(&self, p: &DVector<T>, x: usize) -> T {
        let inflow = (self.row_offsets[x]..self.row_offsets[x + 1])
            .fold(T::zero(), |acc, k| acc + self.inflow_rates[k] * p[self.sources[k]]);
        inflow - self.exit_rates[x] * p[x]
    }
}

impl<T: Real> OdeSystem<T> for TransitionTable<T> {
    fn dimension(&self) -> usize {
        self.len()
    }

    fn derivative(&self, p: &DVector<T>, dp: &mut DVector<T>) {
        #[cfg(feature = "parallel")]
        {
            if self.len() >= super::parallel_threshold() {
                dp.as_mut_slice()
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(x, d)| *d = self.balance(p, x));
                return;
            }
        }

        for (x, d) in dp.iter_mut().enumerate() {
            *d = self.balance(p, x);
        }
    }
}

// =================================================================================================
// Snapshot
// =================================================================================================

/// Distribution and clock of a [`MasterEquation`] at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct CmeState<T: Real> {
    /// Probability of every encoded state
    pub p: DVector<T>,

    /// Time
    pub t: T,
}

// =================================================================================================
// Master Equation Solver
// =================================================================================================

/// Dense chemical-master-equation solver for a bounded reaction network
///
/// The distribution starts as a point mass at the origin (all populations
/// zero) at `t = 0`. Moments of order 0 to 3 are cached after the first read
/// and dropped whenever the distribution changes. They are raw moments of
/// the (possibly leaky) truncated distribution, not renormalised by `Σ p`.
#[derive(Debug, Clone)]
pub struct MasterEquation<N, T: Real = f64> {
    model: N,
    space: StateSpace,
    table: TransitionTable<T>,
    p: DVector<T>,
    t: T,
    steps: usize,
    moments: OnceLock<Vec<[T; 4]>>,
}

impl<N, T> MasterEquation<N, T>
where
    N: BoundedNetwork<T>,
    T: Real,
{
    /// Create a solver sized by the model's own population bounds
    ///
    /// # Errors
    ///
    /// See [`with_bounds`](Self::with_bounds).
    pub fn new(model: N) -> Result<Self> {
        let bounds = model.population_bounds();
        Self::with_bounds(model, &bounds)
    }
}

impl<N, T> MasterEquation<N, T>
where
    N: ReactionNetwork<T>,
    T: Real,
{
    /// Create a solver over an explicit truncation `n_max`
    ///
    /// # Errors
    ///
    /// - [`KineticsError::DimensionMismatch`] when `n_max` or a stoichiometric
    ///   vector does not have one entry per species, or when the number of
    ///   stoichiometric vectors differs from the number of channels
    /// - [`KineticsError::InvalidParameter`] when any `n_max[i] ≤ 0`, or when a
    ///   propensity is negative or not finite
    pub fn with_bounds(model: N, n_max: &[i64]) -> Result<Self> {
        let species = model.species();
        KineticsError::check_len("n_max", species, n_max.len())?;
        check_shape::<N, T>(&model)?;

        let space = StateSpace::new(n_max)?;
        let table = TransitionTable::assemble(&model, &space)?;

        debug!(
            "{}: master equation over {} states ({} species, {} channels, {} transitions)",
            model.name(),
            space.len(),
            species,
            model.channels(),
            table.inflow_count()
        );

        let mut p = DVector::zeros(space.len());
        p[0] = T::one();

        Ok(Self {
            model,
            space,
            table,
            p,
            t: T::zero(),
            steps: 0,
            moments: OnceLock::new(),
        })
    }

    // =============================================================================================
    // Time Evolution
    // =============================================================================================

    /// Advance the distribution by one step of size `dt`
    ///
    /// Applies `p ← p + dt·Σ bᵢkᵢ`, `t ← t + dt` and drops the moment cache.
    ///
    /// # Errors
    ///
    /// - [`KineticsError::InvalidParameter`] when `t + dt` rounds back to `t`
    ///   in `T`. Nothing is changed.
    /// - [`KineticsError::NonFiniteProbability`] when the new distribution
    ///   holds a NaN or infinite entry. The step is kept, so the offending
    ///   state can be inspected.
    pub fn step<S>(&mut self, stepper: &mut S, dt: T) -> Result<()>
    where
        S: Stepper<T>,
    {
        Self::check_clock_advances(self.t, dt)?;
        let next = self.t + dt;
        self.apply_step(stepper, dt, next)
    }

    /// Step while `t ≤ t_final`, returning the number of steps taken
    ///
    /// The clock after `k` steps is `t₀ + k·dt`, computed from the starting
    /// time `t₀` rather than accumulated.
    ///
    /// # Errors
    ///
    /// - [`KineticsError::InvalidParameter`] when `dt` is not finite and
    ///   positive, when `t_final` is not finite, or when `dt` is too small to
    ///   move the clock
    /// - errors from [`step`](Self::step)
    pub fn simulate<S>(&mut self, stepper: &mut S, dt: T, t_final: T) -> Result<usize>
    where
        S: Stepper<T>,
    {
        validate_horizon(dt, t_final)?;
        self.log_start(stepper.name(), dt, t_final);

        let steps = self.integrate_until(stepper, dt, t_final, |_, _| {})?;

        self.log_finish(steps);
        Ok(steps)
    }

    /// Like [`simulate`](Self::simulate), recording snapshots
    ///
    /// The initial state is recorded, then the state after every `stride`-th
    /// step, and finally the end state if the last step was not already
    /// recorded.
    ///
    /// # Errors
    ///
    /// As [`simulate`](Self::simulate), plus
    /// [`KineticsError::InvalidParameter`] when `stride == 0`.
    pub fn simulate_sampled<S>(
        &mut self,
        stepper: &mut S,
        dt: T,
        t_final: T,
        stride: usize,
    ) -> Result<SimulationResult<CmeState<T>>>
    where
        S: Stepper<T>,
    {
        validate_horizon(dt, t_final)?;
        if stride == 0 {
            return Err(KineticsError::invalid("sampling_stride", "must be at least 1"));
        }
        self.log_start(stepper.name(), dt, t_final);

        let mut snapshots = vec![self.state()];
        let steps = self.integrate_until(stepper, dt, t_final, |cme, steps| {
            if steps % stride == 0 {
                snapshots.push(cme.state());
            }
        })?;
        if steps % stride != 0 {
            snapshots.push(self.state());
        }

        self.log_finish(steps);
        Ok(SimulationResult::new(steps, snapshots))
    }

    /// Shared time loop of [`simulate`](Self::simulate) and
    /// [`simulate_sampled`](Self::simulate_sampled)
    fn integrate_until<S, F>(&mut self, stepper: &mut S, dt: T, t_final: T, mut after_step: F) -> Result<usize>
    where
        S: Stepper<T>,
        F: FnMut(&Self, usize),
    {
        let start = self.t;
        let clock = |k: usize| start + real::<T>(k as f64) * dt;

        if start <= t_final {
            Self::check_clock_advances(start, dt)?;
        }

        let mut steps = 0;
        while clock(steps) <= t_final {
            steps += 1;
            self.apply_step(stepper, dt, clock(steps))?;
            after_step(&*self, steps);
        }

        Ok(steps)
    }

    fn check_clock_advances(t: T, dt: T) -> Result<()> {
        if t + dt == t {
            return Err(KineticsError::invalid(
                "dt",
                format!("{} is too small to advance the clock from t = {}", dt, t),
            ));
        }
        Ok(())
    }

    fn apply_step<S>(&mut self, stepper: &mut S, dt: T, next: T) -> Result<()>
    where
        S: Stepper<T>,
    {
        let slope = stepper.weighted_derivative(&self.table, &self.p, dt);
        self.p.axpy(dt, slope, T::one());
        self.t = next;
        self.steps += 1;
        self.moments = OnceLock::new();

        match self.p.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(KineticsError::NonFiniteProbability {
                step: self.steps,
                index,
            }),
            None => Ok(()),
        }
    }

    /// Run a validated [`IntegrationConfiguration`]
    ///
    /// Without a sampling stride, the result holds only the end state.
    pub fn run<S>(
        &mut self,
        stepper: &mut S,
        config: &IntegrationConfiguration<T>,
    ) -> Result<SimulationResult<CmeState<T>>>
    where
        S: Stepper<T>,
    {
        config.validate()?;

        match config.sampling_stride {
            Some(stride) => self.simulate_sampled(stepper, config.dt, config.t_final, stride),
            None => {
                let steps = self.simulate(stepper, config.dt, config.t_final)?;
                Ok(SimulationResult::new(steps, vec![self.state()]))
            }
        }
    }

    fn log_start(&self, method: &str, dt: T, t_final: T) {
        debug!(
            "{}: integrating master equation with {} from t = {} to {} (dt = {})",
            self.model.name(),
            method,
            self.t,
            t_final,
            dt
        );
    }

    fn log_finish(&self, steps: usize) {
        let total = self.total_probability();
        let drift = (total - T::one()).abs();

        if drift > real::<T>(MASS_TOLERANCE) {
            warn!(
                "{}: total probability is {} at t = {}; population bounds {:?} may truncate reachable states",
                self.model.name(),
                total,
                self.t,
                self.space.bounds()
            );
        }
        debug!("{}: {} steps, t = {}, Σp = {}", self.model.name(), steps, self.t, total);
    }

    // =============================================================================================
    // Statistics
    // =============================================================================================

    fn moments(&self) -> &[[T; 4]] {
        self.moments.get_or_init(|| {
            let mut moments = vec![[T::zero(); 4]; self.space.species()];
            let mut population = vec![0i64; self.space.species()];

            for (index, &p) in self.p.iter().enumerate() {
                self.space.decode_into(index, &mut population);
                for (m, &y) in moments.iter_mut().zip(&population) {
                    let y = real::<T>(y as f64);
                    let py = p * y;
                    m[0] += p;
                    m[1] += py;
                    m[2] += py * y;
                    m[3] += py * y * y;
                }
            }

            moments
        })
    }

    /// Expected population `E[Xᵢ]`
    pub fn mean(&self, species: usize) -> Result<T> {
        KineticsError::check_index("species", species, self.space.species())?;
        Ok(self.moments()[species][1])
    }

    /// Mean square population `E[Xᵢ²]`
    pub fn msq(&self, species: usize) -> Result<T> {
        KineticsError::check_index("species", species, self.space.species())?;
        Ok(self.moments()[species][2])
    }

    /// Standard deviation `sqrt(max(E[Xᵢ²] − E[Xᵢ]², 0))`
    pub fn sd(&self, species: usize) -> Result<T> {
        KineticsError::check_index("species", species, self.space.species())?;
        let m = &self.moments()[species];
        let variance = m[2] - m[1] * m[1];
        Ok(variance.max(T::zero()).sqrt())
    }

    /// Raw moment `E[Xᵢⁿ]`
    ///
    /// Orders 0 to 3 come from the cache; higher orders are summed directly.
    pub fn nth_moment(&self, species: usize, n: u32) -> Result<T> {
        KineticsError::check_index("species", species, self.space.species())?;

        if n <= 3 {
            return Ok(self.moments()[species][n as usize]);
        }

        let mut population = vec![0i64; self.space.species()];
        let moment = self.p.iter().enumerate().fold(T::zero(), |acc, (index, &p)| {
            self.space.decode_into(index, &mut population);
            acc + p * real::<T>(population[species] as f64).powi(n as i32)
        });
        Ok(moment)
    }

    /// `Σ p` over the truncated space
    pub fn total_probability(&self) -> T {
        self.p.iter().fold(T::zero(), |acc, &p| acc + p)
    }

    /// Marginal distribution of one species, indexed by population
    pub fn marginal(&self, species: usize) -> Result<DVector<T>> {
        KineticsError::check_index("species", species, self.space.species())?;

        let mut marginal = DVector::zeros(self.space.bounds()[species] as usize);
        let mut population = vec![0i64; self.space.species()];
        for (index, &p) in self.p.iter().enumerate() {
            self.space.decode_into(index, &mut population);
            marginal[population[species] as usize] += p;
        }
        Ok(marginal)
    }

    // =============================================================================================
    // Accessors
    // =============================================================================================

    /// Current time
    pub fn time(&self) -> T {
        self.t
    }

    /// Steps taken since construction or the last [`reset`](Self::reset)
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Flat probability vector
    pub fn distribution(&self) -> &DVector<T> {
        &self.p
    }

    /// Probability array shaped `n_max[0] × … × n_max[N-1]`
    pub fn distribution_view(&self) -> Result<ArrayViewD<'_, T>> {
        ArrayViewD::from_shape(IxDyn(&self.space.shape()), self.p.as_slice()).map_err(|_| {
            KineticsError::DimensionMismatch {
                what: "distribution",
                expected: self.space.len(),
                found: self.p.len(),
            }
        })
    }

    /// Snapshot of the distribution and clock
    pub fn state(&self) -> CmeState<T> {
        CmeState {
            p: self.p.clone(),
            t: self.t,
        }
    }

    /// Restore a snapshot
    ///
    /// # Errors
    ///
    /// [`KineticsError::DimensionMismatch`] when the snapshot was taken over a
    /// state space of a different size. The solver is left untouched.
    pub fn set_state(&mut self, state: CmeState<T>) -> Result<()> {
        KineticsError::check_len("distribution", self.space.len(), state.p.len())?;
        self.p = state.p;
        self.t = state.t;
        self.moments = OnceLock::new();
        Ok(())
    }

    /// Return to a point mass at the origin at `t = 0`
    pub fn reset(&mut self) {
        self.p.fill(T::zero());
        self.p[0] = T::one();
        self.t = T::zero();
        self.steps = 0;
        self.moments = OnceLock::new();
    }

    /// Flat index of `population`, or `None` outside the truncated space
    pub fn index_of(&self, population: &[i64]) -> Option<usize> {
        self.space.try_encode(population)
    }

    /// Population stored at flat `index`
    ///
    /// # Errors
    ///
    /// [`KineticsError::IndexOutOfRange`] when `index ≥` the number of states.
    pub fn population_at(&self, index: usize) -> Result<Vec<i64>> {
        KineticsError::check_index("state", index, self.space.len())?;
        Ok(self.space.decode(index))
    }

    /// Probability of `population` (zero outside the truncated space)
    pub fn probability_of(&self, population: &[i64]) -> T {
        self.index_of(population).map_or(T::zero(), |x| self.p[x])
    }

    /// State-space encoder
    pub fn state_space(&self) -> &StateSpace {
        &self.space
    }

    /// Assembled master-equation operator
    pub fn transitions(&self) -> &TransitionTable<T> {
        &self.table
    }

    /// Network being solved
    pub fn model(&self) -> &N {
        &self.model
    }
}

// =================================================================================================
// Tests
// =================================================================================================
