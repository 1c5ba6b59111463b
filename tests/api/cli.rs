//! tests/api/cli.rs
use std::process::Command;

use crate::helpers::{test_data_dir, ScratchDir};

fn keyword_index() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_keyword-index"));
    command.current_dir(env!("CARGO_MANIFEST_DIR"));
    command
}

#[test]
fn the_binary_should_index_and_report_elapsed_time() {
    let scratch = ScratchDir::new();

    let output = keyword_index()
        .arg(test_data_dir())
        .arg(scratch.output())
        .args(["--reduce-tasks", "3", "the", "sat"])
        .output()
        .expect("Failed to run binary");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Elapsed time = "));
    assert!(stdout.trim_end().ends_with(" ms"));
    for part in ["part-r-00000", "part-r-00001", "part-r-00002", "_SUCCESS"] {
        assert!(scratch.output().join(part).is_file(), "missing {part}");
    }
}

#[test]
fn the_binary_should_require_at_least_one_keyword() {
    let scratch = ScratchDir::new();

    let output = keyword_index()
        .arg(test_data_dir())
        .arg(scratch.output())
        .output()
        .expect("Failed to run binary");

    assert!(!output.status.success());
    assert!(!scratch.output().exists());
}
