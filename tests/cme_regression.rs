//! Master-equation regression tests
//!
//! Reduced enzyme models against the exact mechanism, and the solver against
//! processes with known distributions.

use approx::assert_relative_eq;
use sck_rs::models::{GoldbeterKoshland, SingleSubstrate, SingleSubstrateSqssa, SingleSubstrateTqssa};
use sck_rs::network::ReactionNetwork;
use sck_rs::solver::{ExplicitRungeKutta, IntegrationConfiguration, MasterEquation, Method};

mod common;
use common::{assert_only_admissible_mass, relative_error, BirthDeath};

// =================================================================================================
// Enzyme Kinetics
// =================================================================================================

#[test]
fn test_tqssa_agrees_with_exact_mechanism() {
    // High enzyme concentration: ET comparable to ST
    let (kf, kb, kcat) = (10.0, 9.0, 1.0);
    let (e_total, s_total) = (10, 9);
    let k_m = (kb + kcat) / kf;
    let (dt, t_final) = (1e-4, 2.0);

    let mut rk4 = ExplicitRungeKutta::from_method(Method::Rk4);

    let mut exact = MasterEquation::new(SingleSubstrate::new(kf, kb, kcat, e_total, s_total).unwrap()).unwrap();
    exact.simulate(&mut rk4, dt, t_final).unwrap();

    let mut tqssa = MasterEquation::new(SingleSubstrateTqssa::new(k_m, kcat, e_total, s_total).unwrap()).unwrap();
    tqssa.simulate(&mut rk4, dt, t_final).unwrap();

    let exact_mean = exact.mean(SingleSubstrate::P).unwrap();
    let tqssa_mean = tqssa.mean(SingleSubstrateTqssa::P).unwrap();

    println!("exact: {} ± {}", exact_mean, exact.sd(SingleSubstrate::P).unwrap());
    println!("tQSSA: {} ± {}", tqssa_mean, tqssa.sd(SingleSubstrateTqssa::P).unwrap());

    assert!(
        relative_error(tqssa_mean, exact_mean) < 0.01,
        "tQSSA mean {} vs exact {}",
        tqssa_mean,
        exact_mean
    );
    assert_relative_eq!(exact.total_probability(), 1.0, epsilon = 1e-9);
    assert_only_admissible_mass(&exact);
}

#[test]
fn test_sqssa_fails_at_high_enzyme_concentration() {
    let exact_model = SingleSubstrate::new(10.0, 9.0, 1.0, 10, 9).unwrap();
    let sqssa_model: SingleSubstrateSqssa = exact_model.sqssa().unwrap();
    let mut rk4 = ExplicitRungeKutta::from_method(Method::Rk4);

    let mut exact = MasterEquation::new(exact_model).unwrap();
    exact.simulate(&mut rk4, 1e-3, 2.0).unwrap();

    let mut sqssa = MasterEquation::new(sqssa_model).unwrap();
    sqssa.simulate(&mut rk4, 1e-3, 2.0).unwrap();

    // The Michaelis-Menten reduction runs well ahead of the exact kinetics.
    let exact_mean = exact.mean(SingleSubstrate::P).unwrap();
    let sqssa_mean = sqssa.mean(SingleSubstrateSqssa::P).unwrap();
    assert!(relative_error(sqssa_mean, exact_mean) > 0.1);
    assert!(sqssa_mean > exact_mean);
}

#[test]
fn test_goldbeter_koshland_keeps_mass_on_admissible_states() {
    let model = GoldbeterKoshland::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2, 2, 10).unwrap();
    let mut cme = MasterEquation::new(model).unwrap();
    let mut stepper = ExplicitRungeKutta::default();

    assert_eq!(cme.state_space().len(), 11 * 3 * 3);

    let result = cme
        .run(&mut stepper, &IntegrationConfiguration::new(1e-3, 1.0).with_sampling_stride(250))
        .unwrap();

    for snapshot in &result.snapshots {
        assert_relative_eq!(snapshot.p.sum(), 1.0, epsilon = 1e-9);
    }
    assert_only_admissible_mass(&cme);

    // Complexes never exceed their enzyme totals
    assert!(cme.mean(GoldbeterKoshland::C).unwrap() <= 2.0);
    assert!(cme.mean(GoldbeterKoshland::CP).unwrap() <= 2.0);
}

// =================================================================================================
// Known Distributions
// =================================================================================================

#[test]
fn test_birth_death_matches_poisson() {
    let model = BirthDeath::new(5.0, 1.0, 40);
    let mut cme = MasterEquation::new(model.clone()).unwrap();
    let mut rk4 = ExplicitRungeKutta::from_method(Method::Rk4);

    cme.simulate(&mut rk4, 1e-3, 1.0).unwrap();

    let lambda = model.poisson_mean(cme.time());
    assert_relative_eq!(cme.mean(0).unwrap(), lambda, max_relative = 1e-8);
    assert_relative_eq!(cme.sd(0).unwrap(), lambda.sqrt(), max_relative = 1e-8);

    // Single state probabilities follow the Poisson law
    for k in 0..10_i64 {
        let factorial: f64 = (1..=k).map(|i| i as f64).product();
        let expected = (-lambda).exp() * lambda.powi(k as i32) / factorial;
        assert_relative_eq!(cme.probability_of(&[k]), expected, max_relative = 1e-6);
    }
}

#[test]
fn test_probability_mass_is_stable_over_sampled_run() {
    let mut cme = MasterEquation::new(BirthDeath::new(5.0, 1.0, 40)).unwrap();
    let mut stepper = ExplicitRungeKutta::from_method(Method::Rk4ThreeEighths);

    let result = cme.simulate_sampled(&mut stepper, 1e-3, 2.0, 100).unwrap();

    assert!(result.len() > 2);
    for snapshot in &result.snapshots {
        assert!((snapshot.p.sum() - 1.0).abs() < 1e-6, "Σp = {} at t = {}", snapshot.p.sum(), snapshot.t);
    }
}

#[test]
fn test_tight_bounds_lose_probability() {
    // Mean population reaches 5·(1 − e^{-2}) ≈ 4.3, well beyond n_max = 4
    let mut cme = MasterEquation::new(BirthDeath::new(5.0, 1.0, 4)).unwrap();
    let mut rk4 = ExplicitRungeKutta::from_method(Method::Rk4);

    cme.simulate(&mut rk4, 1e-3, 2.0).unwrap();

    assert!(1.0 - cme.total_probability() > 1e-6);
}

#[test]
fn test_with_bounds_overrides_model_bounds() {
    let model = BirthDeath::new(5.0, 1.0, 40);
    let narrow = MasterEquation::with_bounds(model.clone(), &[20]).unwrap();
    assert_eq!(narrow.state_space().len(), 20);
    assert!(MasterEquation::with_bounds(model, &[20, 20]).is_err());
}

// =================================================================================================
// Moments
// =================================================================================================

#[test]
fn test_moment_consistency() {
    let model = SingleSubstrate::new(10.0, 9.0, 1.0, 10, 9).unwrap();
    let mut cme = MasterEquation::new(model).unwrap();
    let mut stepper = ExplicitRungeKutta::from_method(Method::Rk4);
    cme.simulate(&mut stepper, 1e-3, 0.5).unwrap();

    for species in 0..ReactionNetwork::<f64>::species(cme.model()) {
        assert_relative_eq!(cme.nth_moment(species, 1).unwrap(), cme.mean(species).unwrap(), epsilon = 1e-12);
        assert_relative_eq!(cme.nth_moment(species, 2).unwrap(), cme.msq(species).unwrap(), epsilon = 1e-12);
        assert_relative_eq!(cme.nth_moment(species, 0).unwrap(), cme.total_probability(), epsilon = 1e-12);

        // Direct high-order moment against a brute-force sum
        let brute: f64 = cme
            .distribution()
            .iter()
            .enumerate()
            .map(|(index, &p)| p * (cme.population_at(index).unwrap()[species] as f64).powi(5))
            .sum();
        assert_relative_eq!(cme.nth_moment(species, 5).unwrap(), brute, max_relative = 1e-10);

        // Marginals reproduce the same mean
        let marginal = cme.marginal(species).unwrap();
        let mean: f64 = marginal.iter().enumerate().map(|(n, &p)| n as f64 * p).sum();
        assert_relative_eq!(mean, cme.mean(species).unwrap(), epsilon = 1e-12);
    }

    assert!(cme.mean(2).is_err());
}
