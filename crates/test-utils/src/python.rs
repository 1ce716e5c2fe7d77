//! Locating an interpreter for tests that drive the embedded scripts.

use std::process::{Command, Stdio};

/// Interpreter the driver-backed tests run with.
pub const PYTHON: &str = "python3";

/// `Some(PYTHON)` when it is installed and can import every module in
/// `modules`; otherwise prints why the calling test is skipped.
pub fn interpreter_with(modules: &[&str]) -> Option<&'static str> {
    let imports = if modules.is_empty() {
        "pass".to_string()
    } else {
        format!("import {}", modules.join(", "))
    };
    let available = Command::new(PYTHON)
        .args(["-c", &imports])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());

    if !available {
        eprintln!("skipping: `{PYTHON} -c \"{imports}\"` failed");
    }
    available.then_some(PYTHON)
}
