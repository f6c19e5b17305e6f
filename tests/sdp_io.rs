use bootsdp::io::{read_sdp, save_solution};
use bootsdp::solver::{SdpSolver, SettingsBuilder, TerminateReason, WriteSolution};
use bootsdp::timers::Timers;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("bootsdp-tests")
        .join(format!("{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    let mut f = fs::File::create(dir.join(name)).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
}

// the tiny one-group problem in the on-disk layout
fn write_tiny_sdp(dir: &Path) {
    write_file(dir, "objectives", "0\n1\n");
    write_file(dir, "blocks.0", "1\n1\n0\n1\n0\n");
    write_file(dir, "primal_objective_c.0", "1\n1\n");
    write_file(dir, "free_var_matrix.0", "1 1\n1\n");
    write_file(dir, "bilinear_bases.0", "1\n1 1\n1\n");
}

#[test]
fn test_load_solve_and_write_solution() {
    let sdp_dir = scratch_dir("sdp-io-in");
    let out_dir = scratch_dir("sdp-io-out");
    write_tiny_sdp(&sdp_dir);

    let sdp = read_sdp::<f64>(&sdp_dir).unwrap();

    let settings = SettingsBuilder::<f64>::default()
        .verbose(false)
        .initial_matrix_scale_primal(1.0)
        .initial_matrix_scale_dual(1.0)
        .duality_gap_threshold(1e-10)
        .primal_error_threshold(1e-10)
        .dual_error_threshold(1e-10)
        .max_iterations(200)
        .write_solution(WriteSolution {
            x: true,
            y: true,
            X: true,
            Y: false,
        })
        .build()
        .unwrap();

    let mut solver = SdpSolver::new(sdp, settings);
    let mut timers = Timers::new();
    let reason = solver.run(None, &mut timers).unwrap();
    assert_eq!(reason, TerminateReason::PrimalDualOptimal);

    save_solution(&solver, reason, &out_dir).unwrap();

    let out = fs::read_to_string(out_dir.join("out.txt")).unwrap();
    assert!(out.contains("terminateReason = \"found primal-dual optimal solution\";"));
    assert!(out.contains("primalObjective"));

    // selected solution files appear, unselected ones do not
    assert!(out_dir.join("x_0.txt").exists());
    assert!(out_dir.join("y.txt").exists());
    assert!(out_dir.join("X_matrix_0.txt").exists());
    assert!(out_dir.join("X_diag.txt").exists());
    assert!(!out_dir.join("Y_matrix_0.txt").exists());

    // y.txt carries the optimal free dual variable
    let y = fs::read_to_string(out_dir.join("y.txt")).unwrap();
    let value: f64 = y.lines().nth(1).unwrap().parse().unwrap();
    assert!((value - 1.0).abs() < 1e-6);
}

#[test]
fn test_checkpointed_run_writes_checkpoint() {
    let sdp_dir = scratch_dir("sdp-io-ck-in");
    let ck_dir = scratch_dir("sdp-io-ck");
    write_tiny_sdp(&sdp_dir);

    let sdp = read_sdp::<f64>(&sdp_dir).unwrap();
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
    // the final checkpoint is written on exit regardless of the interval
    let reason = solver.run(Some(&ck_dir), &mut timers).unwrap();
    assert_eq!(reason, TerminateReason::PrimalDualOptimal);

    assert!(ck_dir.join("meta.ck").exists());
    assert!(ck_dir.join("x_0.ck").exists());
    assert!(ck_dir.join("y.ck").exists());
    assert!(ck_dir.join("X_matrix_0.ck").exists());
    assert!(ck_dir.join("Y_matrix_0.ck").exists());
}
