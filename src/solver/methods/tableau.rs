//! Butcher tableaux for explicit Runge-Kutta methods
//!
//! # Mathematical Background
//!
//! An explicit `s`-stage Runge-Kutta method is fully described by its
//! tableau:
//!
//! ```text
//!  c₁ |
//!  c₂ | a₂₁
//!  c₃ | a₃₁  a₃₂
//!  ⋮  |  ⋮         ⋱
//!  cₛ | aₛ₁  aₛ₂  …  aₛ,ₛ₋₁
//! ----+--------------------
//!     | b₁   b₂   …  bₛ
//! ```
//!
//! Only the strictly lower-triangular part of `a` is stored, row `i` holding
//! the `i` coefficients `aᵢ₀ … aᵢ,ᵢ₋₁`.
//!
//! # Available Methods
//!
//! | Method              | Order | Stages |
//! |---------------------|-------|--------|
//! | `Euler`             | 1     | 1      |
//! | `Midpoint`          | 2     | 2      |
//! | `Heun2`             | 2     | 2      |
//! | `Ralston2`          | 2     | 2      |
//! | `Rk4`               | 4     | 4      |
//! | `Rk4ThreeEighths`   | 4     | 4      |
//! | `Ralston4`          | 4     | 4      |
//! | `Butcher6`          | 6     | 7      |
//! | `Verner8`           | 8     | 11     |
//!
//! `Ralston4` is the default: it minimises the truncation-error bound among
//! four-stage fourth-order methods.

use std::fmt;
use std::str::FromStr;

use crate::error::{KineticsError, Result};

/// Tolerance on the consistency conditions `Σⱼ aᵢⱼ = cᵢ` and `Σ bᵢ = 1`.
const CONSISTENCY_TOLERANCE: f64 = 1e-10;

// =================================================================================================
// Butcher Tableau
// =================================================================================================

/// Coefficients of an explicit Runge-Kutta method
///
/// Immutable once built. [`ButcherTableau::new`] rejects malformed data, so a
/// tableau in hand is always consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct ButcherTableau {
    name: String,
    order: usize,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
}

impl ButcherTableau {
    /// Build and validate a tableau
    ///
    /// `a` holds the rows of the strictly lower-triangular matrix, row `i`
    /// having exactly `i` entries (the first row is empty).
    ///
    /// # Errors
    ///
    /// [`KineticsError::InvalidParameter`] when:
    /// - there are no stages or `order == 0`
    /// - `a`, `b` and `c` disagree on the stage count, or a row has the wrong length
    /// - a coefficient is not finite
    /// - `c₁ ≠ 0`, some `Σⱼ aᵢⱼ ≠ cᵢ`, or `Σ bᵢ ≠ 1`
    pub fn new(
        name: impl Into<String>,
        order: usize,
        a: Vec<Vec<f64>>,
        b: Vec<f64>,
        c: Vec<f64>,
    ) -> Result<Self> {
        let stages = b.len();

        if stages == 0 {
            return Err(KineticsError::invalid("tableau", "at least one stage is required"));
        }
        if order == 0 {
            return Err(KineticsError::invalid("tableau", "order must be at least 1"));
        }
        if a.len() != stages || c.len() != stages {
            return Err(KineticsError::invalid(
                "tableau",
                format!(
                    "stage count mismatch: {} rows in a, {} weights, {} nodes",
                    a.len(),
                    stages,
                    c.len()
                ),
            ));
        }
        if let Some((i, row)) = a.iter().enumerate().find(|(i, row)| row.len() != *i) {
            return Err(KineticsError::invalid(
                "tableau",
                format!("row {} of a must have {} entries, found {}", i, i, row.len()),
            ));
        }

        let all_finite = a.iter().flatten().chain(&b).chain(&c).all(|x| x.is_finite());
        if !all_finite {
            return Err(KineticsError::invalid("tableau", "coefficients must be finite"));
        }

        if c[0] != 0.0 {
            return Err(KineticsError::invalid("tableau", "first node c₁ must be 0"));
        }
        for (i, (row, &ci)) in a.iter().zip(&c).enumerate() {
            let row_sum: f64 = row.iter().sum();
            if (row_sum - ci).abs() > CONSISTENCY_TOLERANCE {
                return Err(KineticsError::invalid(
                    "tableau",
                    format!("row {} of a sums to {}, expected c = {}", i, row_sum, ci),
                ));
            }
        }
        let weight_sum: f64 = b.iter().sum();
        if (weight_sum - 1.0).abs() > CONSISTENCY_TOLERANCE {
            return Err(KineticsError::invalid(
                "tableau",
                format!("weights sum to {}, expected 1", weight_sum),
            ));
        }

        Ok(Self {
            name: name.into(),
            order,
            a,
            b,
            c,
        })
    }

    /// Name of the method
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nominal order of accuracy
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of stages `s`
    pub fn stages(&self) -> usize {
        self.b.len()
    }

    /// Lower-triangular rows of `a`
    pub fn a(&self) -> &[Vec<f64>] {
        &self.a
    }

    /// Weights `b`
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Nodes `c`
    pub fn c(&self) -> &[f64] {
        &self.c
    }
}

// =================================================================================================
// Named Methods
// =================================================================================================

/// Catalogue of built-in explicit Runge-Kutta methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Forward Euler
    Euler,
    /// Explicit midpoint
    Midpoint,
    /// Heun's second-order method
    Heun2,
    /// Ralston's second-order method
    Ralston2,
    /// Classical fourth-order method
    Rk4,
    /// Kutta's 3/8-rule fourth-order method
    Rk4ThreeEighths,
    /// Ralston's minimum-error fourth-order method
    #[default]
    Ralston4,
    /// Butcher's seven-stage sixth-order method
    Butcher6,
    /// Verner's eleven-stage eighth-order method
    Verner8,
}

impl Method {
    /// Every built-in method, lowest order first
    pub const ALL: [Method; 9] = [
        Method::Euler,
        Method::Midpoint,
        Method::Heun2,
        Method::Ralston2,
        Method::Rk4,
        Method::Rk4ThreeEighths,
        Method::Ralston4,
        Method::Butcher6,
        Method::Verner8,
    ];

    /// Identifier accepted by [`FromStr`]
    pub fn key(&self) -> &'static str {
        match self {
            Method::Euler => "euler",
            Method::Midpoint => "midpoint",
            Method::Heun2 => "heun2",
            Method::Ralston2 => "ralston2",
            Method::Rk4 => "rk4",
            Method::Rk4ThreeEighths => "rk4_3_8",
            Method::Ralston4 => "ralston4",
            Method::Butcher6 => "butcher6",
            Method::Verner8 => "verner8",
        }
    }

    /// Coefficients of this method
    pub fn tableau(&self) -> ButcherTableau {
        let (name, order, a, b, c) = match self {
            Method::Euler => ("Forward Euler", 1, vec![vec![]], vec![1.0], vec![0.0]),

            Method::Midpoint => (
                "Explicit midpoint",
                2,
                vec![vec![], vec![0.5]],
                vec![0.0, 1.0],
                vec![0.0, 0.5],
            ),

            Method::Heun2 => (
                "Heun (RK2)",
                2,
                vec![vec![], vec![1.0]],
                vec![0.5, 0.5],
                vec![0.0, 1.0],
            ),

            Method::Ralston2 => (
                "Ralston (RK2)",
                2,
                vec![vec![], vec![2.0 / 3.0]],
                vec![0.25, 0.75],
                vec![0.0, 2.0 / 3.0],
            ),

            Method::Rk4 => (
                "Runge Kutta (RK4)",
                4,
                vec![vec![], vec![0.5], vec![0.0, 0.5], vec![0.0, 0.0, 1.0]],
                vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
                vec![0.0, 0.5, 0.5, 1.0],
            ),

            Method::Rk4ThreeEighths => (
                "Runge Kutta 3/8 rule (RK4)",
                4,
                vec![
                    vec![],
                    vec![1.0 / 3.0],
                    vec![-1.0 / 3.0, 1.0],
                    vec![1.0, -1.0, 1.0],
                ],
                vec![1.0 / 8.0, 3.0 / 8.0, 3.0 / 8.0, 1.0 / 8.0],
                vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0],
            ),

            Method::Ralston4 => {
                let s5 = 5f64.sqrt();
                (
                    "Ralston (RK4)",
                    4,
                    vec![
                        vec![],
                        vec![0.4],
                        vec![(-2889.0 + 1428.0 * s5) / 1024.0, (3785.0 - 1620.0 * s5) / 1024.0],
                        vec![
                            (-3365.0 + 2094.0 * s5) / 6040.0,
                            (-975.0 - 3046.0 * s5) / 2552.0,
                            (467040.0 + 203968.0 * s5) / 240845.0,
                        ],
                    ],
                    vec![
                        (263.0 + 24.0 * s5) / 1812.0,
                        (125.0 - 1000.0 * s5) / 3828.0,
                        (3426304.0 + 1661952.0 * s5) / 5924787.0,
                        (30.0 - 4.0 * s5) / 123.0,
                    ],
                    vec![0.0, 0.4, 7.0 / 8.0 - 3.0 * s5 / 16.0, 1.0],
                )
            }

            Method::Butcher6 => (
                "Butcher (RK6)",
                6,
                vec![
                    vec![],
                    vec![1.0 / 3.0],
                    vec![0.0, 2.0 / 3.0],
                    vec![1.0 / 12.0, 1.0 / 3.0, -1.0 / 12.0],
                    vec![-1.0 / 16.0, 9.0 / 8.0, -3.0 / 16.0, -3.0 / 8.0],
                    vec![0.0, 9.0 / 8.0, -3.0 / 8.0, -3.0 / 4.0, 0.5],
                    vec![9.0 / 44.0, -9.0 / 11.0, 63.0 / 44.0, 18.0 / 11.0, 0.0, -16.0 / 11.0],
                ],
                vec![
                    11.0 / 120.0,
                    0.0,
                    27.0 / 40.0,
                    27.0 / 40.0,
                    -4.0 / 15.0,
                    -4.0 / 15.0,
                    11.0 / 120.0,
                ],
                vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0 / 3.0, 0.5, 0.5, 1.0],
            ),

            Method::Verner8 => {
                let s = 21f64.sqrt();
                (
                    "Verner (RK8)",
                    8,
                    vec![
                        vec![],
                        vec![0.5],
                        vec![0.25, 0.25],
                        vec![1.0 / 7.0, (-7.0 - 3.0 * s) / 98.0, (21.0 + 5.0 * s) / 49.0],
                        vec![(11.0 + s) / 84.0, 0.0, (18.0 + 4.0 * s) / 63.0, (21.0 - s) / 252.0],
                        vec![
                            (5.0 + s) / 48.0,
                            0.0,
                            (9.0 + s) / 36.0,
                            (-231.0 + 14.0 * s) / 360.0,
                            (63.0 - 7.0 * s) / 80.0,
                        ],
                        vec![
                            (10.0 - s) / 42.0,
                            0.0,
                            (-432.0 + 92.0 * s) / 315.0,
                            (633.0 - 145.0 * s) / 90.0,
                            (-504.0 + 115.0 * s) / 70.0,
                            (63.0 - 13.0 * s) / 35.0,
                        ],
                        vec![
                            1.0 / 14.0,
                            0.0,
                            0.0,
                            0.0,
                            (14.0 - 3.0 * s) / 126.0,
                            (13.0 - 3.0 * s) / 63.0,
                            1.0 / 9.0,
                        ],
                        vec![
                            1.0 / 32.0,
                            0.0,
                            0.0,
                            0.0,
                            (91.0 - 21.0 * s) / 576.0,
                            11.0 / 72.0,
                            (-385.0 - 75.0 * s) / 1152.0,
                            (63.0 + 13.0 * s) / 128.0,
                        ],
                        vec![
                            1.0 / 14.0,
                            0.0,
                            0.0,
                            0.0,
                            1.0 / 9.0,
                            (-733.0 - 147.0 * s) / 2205.0,
                            (515.0 + 111.0 * s) / 504.0,
                            (-51.0 - 11.0 * s) / 56.0,
                            (132.0 + 28.0 * s) / 245.0,
                        ],
                        vec![
                            0.0,
                            0.0,
                            0.0,
                            0.0,
                            (-42.0 + 7.0 * s) / 18.0,
                            (-18.0 + 28.0 * s) / 45.0,
                            (-273.0 - 53.0 * s) / 72.0,
                            (301.0 + 53.0 * s) / 72.0,
                            (28.0 - 28.0 * s) / 45.0,
                            (49.0 - 7.0 * s) / 18.0,
                        ],
                    ],
                    vec![
                        1.0 / 20.0,
                        0.0,
                        0.0,
                        0.0,
                        0.0,
                        0.0,
                        0.0,
                        49.0 / 180.0,
                        16.0 / 45.0,
                        49.0 / 180.0,
                        1.0 / 20.0,
                    ],
                    vec![
                        0.0,
                        0.5,
                        0.5,
                        (7.0 + s) / 14.0,
                        (7.0 + s) / 14.0,
                        0.5,
                        (7.0 - s) / 14.0,
                        (7.0 - s) / 14.0,
                        0.5,
                        (7.0 + s) / 14.0,
                        1.0,
                    ],
                )
            }
        };

        // Built-in coefficients satisfy every check; rebuild without going
        // through `new` so no error path is needed here.
        debug_assert!(ButcherTableau::new(name, order, a.clone(), b.clone(), c.clone()).is_ok());
        ButcherTableau {
            name: name.to_string(),
            order,
            a,
            b,
            c,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Method {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Method::ALL
            .into_iter()
            .find(|m| m.key() == key)
            .ok_or_else(|| KineticsError::invalid("method", format!("unknown Runge-Kutta method `{}`", s)))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
