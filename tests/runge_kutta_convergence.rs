//! Convergence tests for the explicit Runge-Kutta family
//!
//! Every built-in tableau must show its nominal order when the step size is
//! halved on a nonlinear problem.

use nalgebra::DVector;
use sck_rs::solver::{ButcherTableau, ExplicitRungeKutta, Method, Stepper};

mod common;
use common::{observed_order, Logistic};

const Y0: f64 = 0.1;
const T_FINAL: f64 = 1.0;

fn integrate(method: Method, steps: usize) -> f64 {
    let mut stepper = ExplicitRungeKutta::from_method(method);
    let mut y = DVector::from_element(1, Y0);
    let dt = T_FINAL / steps as f64;

    for _ in 0..steps {
        stepper.advance(&Logistic, &mut y, dt);
    }
    y[0]
}

fn error(method: Method, steps: usize) -> f64 {
    (integrate(method, steps) - Logistic::exact(Y0, T_FINAL)).abs()
}

#[test]
fn test_every_method_shows_nominal_order() {
    for method in Method::ALL {
        let tableau = method.tableau();

        // Coarse enough to stay clear of round-off for the high orders
        let coarse = match tableau.order() {
            1 | 2 => 20,
            4 => 10,
            6 => 4,
            _ => 2,
        };

        let order = observed_order(error(method, coarse), error(method, 2 * coarse));
        println!("{}: observed order {:.3}", tableau.name(), order);

        assert!(
            (order - tableau.order() as f64).abs() < 0.35,
            "{} converges with order {:.3}, expected {}",
            tableau.name(),
            order,
            tableau.order()
        );
    }
}

#[test]
fn test_euler_first_order_convergence() {
    let errors: Vec<f64> = [100, 200, 400, 800].iter().map(|&n| error(Method::Euler, n)).collect();

    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!(ratio > 1.8 && ratio < 2.2, "Convergence ratio {} not first-order", ratio);
    }
}

#[test]
fn test_custom_tableau_matches_builtin() {
    // Heun's method written out by hand
    let heun = ButcherTableau::new("Heun", 2, vec![vec![], vec![1.0]], vec![0.5, 0.5], vec![0.0, 1.0]).unwrap();
    let mut custom = ExplicitRungeKutta::new(heun);
    let mut builtin = ExplicitRungeKutta::from_method(Method::Heun2);

    let mut a = DVector::from_element(1, Y0);
    let mut b = DVector::from_element(1, Y0);
    for _ in 0..10 {
        custom.advance(&Logistic, &mut a, 0.1);
        builtin.advance(&Logistic, &mut b, 0.1);
    }

    assert_eq!(a, b);
    assert_eq!(custom.order(), 2);
    assert_eq!(custom.stages(), 2);
}

#[test]
fn test_malformed_tableaux_are_rejected() {
    // b does not sum to one
    assert!(ButcherTableau::new("bad b", 1, vec![vec![]], vec![0.5], vec![0.0]).is_err());
    // c does not match the row sums of a
    assert!(ButcherTableau::new("bad c", 2, vec![vec![], vec![0.5]], vec![0.0, 1.0], vec![0.0, 0.7]).is_err());
    // implicit row
    assert!(ButcherTableau::new("implicit", 1, vec![vec![0.5]], vec![1.0], vec![0.5]).is_err());
    // no stage
    assert!(ButcherTableau::new("empty", 1, vec![], vec![], vec![]).is_err());
}

#[test]
fn test_method_names_round_trip() {
    for method in Method::ALL {
        assert_eq!(method.key().parse::<Method>().unwrap(), method);
    }
    assert!("rk5".parse::<Method>().is_err());
}
