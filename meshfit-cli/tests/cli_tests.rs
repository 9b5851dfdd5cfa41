//! End-to-end runs of the meshfit binary

use std::path::Path;
use std::process::{Command, Output};

fn meshfit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_meshfit"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch meshfit")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_sphere_then_info() {
    let dir = tempfile::tempdir().unwrap();
    let sphere = dir.path().join("sphere.obj");

    let out = meshfit(&["sphere", arg(&sphere), "--level", "2"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(sphere.exists());

    let out = meshfit(&["info", arg(&sphere)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Vertices: 162"), "{}", stdout);
    assert!(stdout.contains("Faces: 320"), "{}", stdout);
    assert!(stdout.contains("Edges: 480"), "{}", stdout);
    assert!(stdout.contains("Closed: true"), "{}", stdout);
}

#[test]
fn test_fit_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("target.ply");
    let output = dir.path().join("fitted.obj");
    let snapshots = dir.path().join("snapshots");
    let history = dir.path().join("losses.csv");

    let out = meshfit(&["sphere", arg(&target), "--level", "1"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = meshfit(&[
        "fit",
        arg(&target),
        "-o",
        arg(&output),
        "--level",
        "1",
        "-n",
        "6",
        "--samples",
        "200",
        "--plot-period",
        "3",
        "--snapshots",
        arg(&snapshots),
        "--history",
        arg(&history),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Iterations: 6"));

    assert!(output.exists());
    assert!(snapshots.join("iter_00000.svg").exists());
    assert!(snapshots.join("iter_00003.svg").exists());
    assert!(!snapshots.join("iter_00006.svg").exists());
    assert!(snapshots.join("losses.svg").exists());

    let csv = std::fs::read_to_string(&history).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("iteration,chamfer,edge,normal,laplacian,total"));
    assert_eq!(lines.count(), 6);
}

#[test]
fn test_fit_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("target.obj");
    let output = dir.path().join("fitted.ply");
    let config = dir.path().join("fit.toml");
    std::fs::write(
        &config,
        "iterations = 3\nnum_samples = 100\nlevel = 1\nplot_period = 0\n\n[optimizer]\nkind = \"adam\"\nlr = 0.01\n",
    )
    .unwrap();

    assert!(meshfit(&["sphere", arg(&target), "--level", "1"]).status.success());
    let out = meshfit(&["fit", arg(&target), "-o", arg(&output), "--config", arg(&config)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Iterations: 3"));
    assert!(output.exists());
}

#[test]
fn test_defaults_parse_back() {
    let out = meshfit(&["defaults"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("iterations = 2000"), "{}", stdout);
    assert!(stdout.contains("[weights]"), "{}", stdout);
}

#[test]
fn test_bad_inputs_fail() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.obj");
    let out = meshfit(&["info", arg(&missing)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error"));

    let target = dir.path().join("target.obj");
    assert!(meshfit(&["sphere", arg(&target), "--level", "0"]).status.success());
    let out = meshfit(&["fit", arg(&target), "-o", arg(&dir.path().join("out.obj")), "--lr=-1"]);
    assert!(!out.status.success());
}
