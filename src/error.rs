//! Error type shared by every engine and model.
//!
//! Construction problems, bad indices and conservation-law breaches are the
//! three failure families callers have to handle. Two more cover restored
//! snapshots of the wrong shape and numerical blow-ups during integration.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = KineticsError> = std::result::Result<T, E>;

/// Canonical error type for sck-rs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KineticsError {
    /// A constructor or run configuration received an unusable parameter.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: String,
        /// Human readable diagnostic.
        reason: String,
    },

    /// A species, channel or state index lies outside its valid range.
    #[error("{what} index {index} out of range (valid: 0..{len})")]
    IndexOutOfRange {
        /// Kind of index (`"species"`, `"channel"`, `"state"`...).
        what: &'static str,
        /// Index that was requested.
        index: usize,
        /// Number of valid entries.
        len: usize,
    },

    /// A population breaches one of the model's conserved quantities.
    #[error("population {population:?} violates the conservation laws of {model}")]
    DomainViolation {
        /// Name of the model that rejected the population.
        model: String,
        /// Offending population vector.
        population: Vec<i64>,
    },

    /// A vector has the wrong number of entries.
    #[error("{what} has length {found}, expected {expected}")]
    DimensionMismatch {
        /// What was being checked.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Length actually supplied.
        found: usize,
    },

    /// The probability distribution picked up a NaN or infinite entry.
    #[error(
        "non-finite probability at state {index} after step {step}; \
         try reducing the time step"
    )]
    NonFiniteProbability {
        /// Number of completed steps when the entry was detected.
        step: usize,
        /// Flat state index of the first offending entry.
        index: usize,
    },
}

impl KineticsError {
    /// Shorthand for [`KineticsError::InvalidParameter`].
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Return `Err(IndexOutOfRange)` unless `index < len`.
    pub fn check_index(what: &'static str, index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Self::IndexOutOfRange { what, index, len })
        }
    }

    /// Return `Err(DimensionMismatch)` unless `found == expected`.
    pub fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::DimensionMismatch { what, expected, found })
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
