//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{BirthDeath, Conversion, Logistic};
pub use test_helpers::{assert_only_admissible_mass, observed_order, relative_error};
