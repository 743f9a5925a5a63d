//! Helper functions for integration tests

use sck_rs::network::ReactionNetwork;
use sck_rs::solver::MasterEquation;

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Convergence order observed between step sizes `h` and `h / 2`
pub fn observed_order(coarse_error: f64, fine_error: f64) -> f64 {
    (coarse_error / fine_error).log2()
}

/// Assert that every state breaking a conservation law holds no probability
pub fn assert_only_admissible_mass<N: ReactionNetwork<f64>>(cme: &MasterEquation<N>) {
    for (index, &p) in cme.distribution().iter().enumerate() {
        let population = cme.population_at(index).unwrap();
        if !cme.model().is_admissible(&population) {
            assert_eq!(p, 0.0, "inadmissible state {:?} holds probability {}", population, p);
        }
    }
}
