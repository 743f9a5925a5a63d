//! Mixed-radix state-space encoding
//!
//! A population vector `y` with `0 ≤ y[i] < n_max[i]` is read as a number in
//! a mixed radix, species 0 being the most significant digit:
//!
//! ```text
//! index = y[0]·(n_max[1]·…·n_max[N-1]) + … + y[N-2]·n_max[N-1] + y[N-1]
//! ```
//!
//! Iterating indices in increasing order therefore walks populations like an
//! odometer, last species fastest.

use crate::error::{KineticsError, Result};

/// Bijection between bounded population vectors and `0..len()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSpace {
    bounds: Vec<i64>,
    strides: Vec<usize>,
    len: usize,
}

impl StateSpace {
    /// Build the state space for per-species exclusive upper bounds `n_max`
    ///
    /// # Errors
    /// [`KineticsError::InvalidParameter`] when there are no species, when any
    /// bound is not strictly positive, or when the number of states overflows
    /// `usize`.
    pub fn new(bounds: &[i64]) -> Result<Self> {
        if bounds.is_empty() {
            return Err(KineticsError::invalid("n_max", "at least one species is required"));
        }

        if let Some((i, &n)) = bounds.iter().enumerate().find(|&(_, &n)| n <= 0) {
            return Err(KineticsError::invalid(
                "n_max",
                format!("bound of species {} must be strictly positive, got {}", i, n),
            ));
        }

        let mut strides = vec![1usize; bounds.len()];
        let mut len = 1usize;
        for i in (0..bounds.len()).rev() {
            strides[i] = len;
            len = len
                .checked_mul(bounds[i] as usize)
                .ok_or_else(|| KineticsError::invalid("n_max", "state space does not fit in memory"))?;
        }

        Ok(Self {
            bounds: bounds.to_vec(),
            strides,
            len,
        })
    }

    /// Number of species (digits)
    pub fn species(&self) -> usize {
        self.bounds.len()
    }

    /// Number of encoded states, `∏ n_max[i]`
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a valid state space holds at least the origin
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Per-species exclusive upper bounds
    pub fn bounds(&self) -> &[i64] {
        &self.bounds
    }

    /// Bounds as an array shape, for `ndarray` views
    pub fn shape(&self) -> Vec<usize> {
        self.bounds.iter().map(|&n| n as usize).collect()
    }

    /// Whether every entry of `population` lies in `[0, n_max[i])`
    pub fn contains(&self, population: &[i64]) -> bool {
        population.len() == self.bounds.len()
            && population
                .iter()
                .zip(&self.bounds)
                .all(|(&y, &n)| 0 <= y && y < n)
    }

    /// Flat index of an in-range population
    ///
    /// The result is unspecified for out-of-range populations; use
    /// [`try_encode`](Self::try_encode) when the input is not known to be valid.
    pub fn encode(&self, population: &[i64]) -> usize {
        debug_assert!(self.contains(population), "population {:?} outside state space", population);
        population
            .iter()
            .zip(&self.strides)
            .map(|(&y, &stride)| y as usize * stride)
            .sum()
    }

    /// Flat index of `population`, or `None` when it lies outside the space
    pub fn try_encode(&self, population: &[i64]) -> Option<usize> {
        self.contains(population).then(|| self.encode(population))
    }

    /// Population stored at `index` (`index < len()`)
    pub fn decode(&self, index: usize) -> Vec<i64> {
        let mut population = vec![0; self.bounds.len()];
        self.decode_into(index, &mut population);
        population
    }

    /// Write the population stored at `index` into `population`
    pub fn decode_into(&self, index: usize, population: &mut [i64]) {
        debug_assert!(index < self.len, "state index {} outside state space", index);
        for ((y, &stride), &n) in population.iter_mut().zip(&self.strides).zip(&self.bounds) {
            *y = ((index / stride) % n as usize) as i64;
        }
    }

    /// Iterate every population in index order
    pub fn populations(&self) -> Populations<'_> {
        Populations {
            space: self,
            next: Some(vec![0; self.bounds.len()]),
        }
    }
}

/// Odometer over a [`StateSpace`], yielding populations in index order
#[derive(Debug, Clone)]
pub struct Populations<'a> {
    space: &'a StateSpace,
    next: Option<Vec<i64>>,
}

impl Iterator for Populations<'_> {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        // Increment the least significant digit, carrying leftwards.
        let mut following = current.clone();
        for i in (0..following.len()).rev() {
            following[i] += 1;
            if following[i] < self.space.bounds[i] {
                self.next = Some(following);
                break;
            }
            following[i] = 0;
        }

        Some(current)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
