#![allow(non_snake_case)]

use bootsdp::algebra::Matrix;
use bootsdp::solver::{Sdp, SdpSolver, SettingsBuilder, TerminateReason};
use bootsdp::timers::Timers;

// One group, dimension 1, degree 0: maximize y subject to y <= 1, with the
// primal forced onto x = 1.  Optimal value 1 on both sides.
fn tiny_sdp(c: f64) -> Sdp<f64> {
    Sdp::new(
        vec![Matrix::identity(1)],
        Matrix::new_from_rows((1, 1), &[1.0]),
        vec![c],
        vec![1.0],
        0.0,
        vec![1],
        vec![0],
        vec![vec![0]],
    )
    .unwrap()
}

#[test]
fn test_tiny_feasible_reaches_optimality() {
    let settings = SettingsBuilder::<f64>::default()
        .verbose(false)
        .initial_matrix_scale_primal(1.0)
        .initial_matrix_scale_dual(1.0)
        .duality_gap_threshold(1e-10)
        .primal_error_threshold(1e-10)
        .dual_error_threshold(1e-10)
        .max_iterations(200)
        .build()
        .unwrap();

    let mut solver = SdpSolver::new(tiny_sdp(1.0), settings);
    let mut timers = Timers::new();
    let reason = solver.run(None, &mut timers).unwrap();

    assert_eq!(reason, TerminateReason::PrimalDualOptimal);
    assert!((solver.info.primal_objective - 1.0).abs() < 1e-8);
    assert!((solver.info.dual_objective - 1.0).abs() < 1e-8);
    assert!(solver.info.duality_gap < 1e-10);

    // the multiplier and the free dual variable both land on 1
    assert!((solver.x()[0] - 1.0).abs() < 1e-6);
    assert!((solver.y()[0] - 1.0).abs() < 1e-6);
}

#[test]
fn test_ill_conditioned_scale_still_optimal() {
    // scale the primal objective by 1e6; the relative gap must still close
    let settings = SettingsBuilder::<f64>::default()
        .verbose(false)
        .initial_matrix_scale_primal(1.0)
        .initial_matrix_scale_dual(1.0)
        .duality_gap_threshold(1e-8)
        .primal_error_threshold(1e-6)
        .dual_error_threshold(1e-6)
        .max_iterations(500)
        .build()
        .unwrap();

    let mut solver = SdpSolver::new(tiny_sdp(1e6), settings);
    let mut timers = Timers::new();
    let reason = solver.run(None, &mut timers).unwrap();

    assert_eq!(reason, TerminateReason::PrimalDualOptimal);
    assert!(solver.info.duality_gap < 1e-8);
    assert!((solver.info.primal_objective - 1e6).abs() < 1e-1);
}

#[test]
fn test_two_group_unit_normalization() {
    // two independent copies with F = I: both sides optimal at 2
    let sdp = Sdp::new(
        vec![Matrix::identity(1), Matrix::identity(1)],
        Matrix::identity(2),
        vec![1.0, 1.0],
        vec![1.0, 1.0],
        0.0,
        vec![1, 1],
        vec![0, 0],
        vec![vec![0], vec![1]],
    )
    .unwrap();

    let settings = SettingsBuilder::<f64>::default()
        .verbose(false)
        .initial_matrix_scale_primal(1.0)
        .initial_matrix_scale_dual(1.0)
        .duality_gap_threshold(1e-10)
        .primal_error_threshold(1e-10)
        .dual_error_threshold(1e-10)
        .max_iterations(200)
        .build()
        .unwrap();

    let mut solver = SdpSolver::new(sdp, settings);
    let mut timers = Timers::new();
    let reason = solver.run(None, &mut timers).unwrap();

    assert_eq!(reason, TerminateReason::PrimalDualOptimal);
    assert!((solver.info.primal_objective - 2.0).abs() < 1e-8);
    assert!((solver.info.dual_objective - 2.0).abs() < 1e-8);
    assert!(timers.elapsed("run.factorize") > std::time::Duration::ZERO);
}
