use bootsdp::algebra::{set_default_precision, FloatT, Matrix, MpFloat};
use bootsdp::solver::{Sdp, SdpSolver, SettingsBuilder, TerminateReason};
use bootsdp::timers::Timers;

fn mp(v: f64) -> MpFloat {
    MpFloat::new(v)
}

fn tiny_sdp() -> Sdp<MpFloat> {
    Sdp::new(
        vec![Matrix::identity(1)],
        Matrix::new_from_rows((1, 1), &[mp(1.0)]),
        vec![mp(1.0)],
        vec![mp(1.0)],
        mp(0.0),
        vec![1],
        vec![0],
        vec![vec![0]],
    )
    .unwrap()
}

fn solve_at(precision: u32, gap_threshold: f64) -> SdpSolver<MpFloat> {
    set_default_precision(precision);
    let settings = SettingsBuilder::<MpFloat>::default()
        .verbose(false)
        .precision(precision)
        .initial_matrix_scale_primal(mp(1.0))
        .initial_matrix_scale_dual(mp(1.0))
        .duality_gap_threshold(mp(gap_threshold))
        .primal_error_threshold(mp(gap_threshold))
        .dual_error_threshold(mp(gap_threshold))
        .max_iterations(200)
        .build()
        .unwrap();

    let mut solver = SdpSolver::new(tiny_sdp(), settings);
    let mut timers = Timers::new();
    let reason = solver.run(None, &mut timers).unwrap();
    assert_eq!(reason, TerminateReason::PrimalDualOptimal);
    solver
}

// Both precisions run sequentially inside one test: the default precision
// is process-wide, so the phases must not overlap.
#[test]
fn test_precision_sweep() {
    let low = solve_at(128, 1e-20);
    assert!(low.info.duality_gap < mp(1e-20));
    assert!((low.info.primal_objective.clone() - mp(1.0)).abs() < mp(1e-15));

    let high = solve_at(256, 1e-40);
    assert!(high.info.duality_gap < mp(1e-40));
    assert!((high.info.primal_objective.clone() - mp(1.0)).abs() < mp(1e-30));

    // the tighter run closes a gap the looser one could not
    assert!(high.info.duality_gap < low.info.duality_gap);
}
