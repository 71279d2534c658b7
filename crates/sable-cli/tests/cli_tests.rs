//! End-to-end runs of the driver over temporary source trees.

use std::fs;

use clap::Parser;
use sable_cli::args::CliArgs;
use sable_cli::driver::run;
use sable_cli::reporter::Reporter;

fn cli(argv: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("sable").chain(argv.iter().copied()))
        .expect("arguments parse")
}

#[test]
fn test_run_over_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("good.js"), "function f(a) { return a * 2; }\nf(1);").unwrap();
    fs::write(dir.path().join("bad.js"), "var = 1;").unwrap();
    let root = dir.path().to_string_lossy().into_owned();

    let summary = run(&cli(&["--jobs", "2", &root])).unwrap();
    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.files[0].path.ends_with("bad.js"));
    assert!(!summary.files[0].is_ok());
    assert!(summary.files[1].is_ok());

    let rendered = Reporter::new(false).render(&summary);
    assert!(rendered.contains("error "), "{rendered}");
    assert!(rendered.ends_with("2 files, 45 bytes, 1 failed\n"), "{rendered}");
}

#[test]
fn test_strict_flag_changes_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("with.js");
    fs::write(&file, "with (o) { x; }").unwrap();
    let path = file.to_string_lossy().into_owned();

    assert_eq!(run(&cli(&[&path])).unwrap().failed, 0);
    let strict = run(&cli(&["--strict", "--mode", "validate", &path])).unwrap();
    assert_eq!(strict.failed, 1);
    let error = strict.files[0].error.as_ref().unwrap();
    assert_eq!(error.message, "'with' statements are not valid in strict mode.");
}

#[test]
fn test_print_tree_with_eager_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("f.js");
    fs::write(&file, "function f() { return 1; }").unwrap();
    let path = file.to_string_lossy().into_owned();

    let summary = run(&cli(&["--print", "tree", "--eager", &path])).unwrap();
    assert_eq!(
        summary.files[0].printed.as_deref(),
        Some("(program (function f () (body (return 1))))")
    );
}

#[test]
fn test_json_summary_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("x.js");
    fs::write(&file, "x = ;").unwrap();
    let path = file.to_string_lossy().into_owned();

    let summary = run(&cli(&["--json", &path])).unwrap();
    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["failed"], 1);
    assert_eq!(value["files"][0]["error"]["category"], "Irrecoverable");
    assert_eq!(value["files"][0]["error"]["line"], 1);
}
