use std::env;
use std::process::Command;

/// Scan root used when the caller passes no arguments.
pub const DEFAULT_SCAN_PATH: &str = "/code/repo";
/// Report file gitleaks writes to and the normalizer reads from.
pub const DEFAULT_REPORT_PATH: &str = "/code/repo/output.json";

/// Gitleaks overloads exit code 1 for both "leaks found" and "real error";
/// this marker in the captured output is what separates the two.
const LEAKS_FOUND_MARKER: &str = "leaks found:";

/// Gitleaks exits with 126 when handed an unrecognized flag.
const UNKNOWN_FLAG_EXIT: i32 = 126;

/// Coarse classification of one gitleaks invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The scan ran to completion — clean, or with leaks reported.
    Completed { output: String },
    /// The tool failed, rejected its arguments, or could not be started.
    Failed { exit_code: i32, message: String },
}

/// Runs gitleaks with the given passthrough arguments and classifies the
/// raw exit status. A non-zero status is a normal return value here, never
/// an error; only a failure to spawn the process at all is absorbed into
/// the `Failed` variant.
pub fn run(args: &[String]) -> RunOutcome {
    let args = effective_args(args);
    run_with(&gitleaks_binary(), &args)
}

/// Substitutes the default invocation when no arguments were given.
fn effective_args(args: &[String]) -> Vec<String> {
    if args.is_empty() {
        vec![
            "directory".to_string(),
            DEFAULT_SCAN_PATH.to_string(),
            "--report-path".to_string(),
            DEFAULT_REPORT_PATH.to_string(),
        ]
    } else {
        args.to_vec()
    }
}

/// Binary to invoke: `GITLEAKS_PATH` if set, else `gitleaks` on PATH.
fn gitleaks_binary() -> String {
    env::var("GITLEAKS_PATH").unwrap_or_else(|_| "gitleaks".to_string())
}

fn run_with(binary: &str, args: &[String]) -> RunOutcome {
    let output = match Command::new(binary).args(args).output() {
        Ok(output) => output,
        Err(e) => {
            return RunOutcome::Failed {
                exit_code: 2,
                message: format!("Failed to run gitleaks: {e}"),
            };
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let captured = if stdout.is_empty() { stderr.clone() } else { stdout };

    // Death by signal has no exit code; treat it like any other tool failure.
    match output.status.code() {
        Some(0) => RunOutcome::Completed { output: captured },
        Some(1) => {
            if captured.contains(LEAKS_FOUND_MARKER) {
                // Leaks were found — from the wrapper's perspective the scan
                // itself succeeded.
                RunOutcome::Completed { output: captured }
            } else {
                RunOutcome::Failed {
                    exit_code: 2,
                    message: format!("Gitleaks scan failed: {stderr}"),
                }
            }
        }
        Some(UNKNOWN_FLAG_EXIT) => RunOutcome::Failed {
            exit_code: 2,
            message: format!(
                "Gitleaks scan failed: unknown argument '{}'",
                args.last().map(String::as_str).unwrap_or("")
            ),
        },
        _ => RunOutcome::Failed {
            exit_code: 2,
            message: format!("Gitleaks scan failed: {stderr}"),
        },
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fake_gitleaks(dir: &TempDir, body: &str) -> String {
        let path: PathBuf = dir.path().join("gitleaks");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn effective_args_substitutes_default_invocation() {
        assert_eq!(
            effective_args(&[]),
            args(&["directory", DEFAULT_SCAN_PATH, "--report-path", DEFAULT_REPORT_PATH])
        );
        assert_eq!(effective_args(&args(&["dir", "."])), args(&["dir", "."]));
    }

    #[test]
    fn exit_zero_is_a_completed_scan() {
        let dir = TempDir::new().unwrap();
        let bin = fake_gitleaks(&dir, "echo 'no leaks found'\nexit 0");

        let outcome = run_with(&bin, &args(&["directory", "."]));
        assert_eq!(
            outcome,
            RunOutcome::Completed { output: "no leaks found\n".to_string() }
        );
    }

    #[test]
    fn exit_one_with_marker_is_a_completed_scan() {
        let dir = TempDir::new().unwrap();
        let bin = fake_gitleaks(&dir, "echo 'WRN leaks found: 3'\nexit 1");

        match run_with(&bin, &args(&["directory", "."])) {
            RunOutcome::Completed { output } => assert!(output.contains("leaks found: 3")),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn exit_one_without_marker_is_a_tool_failure() {
        let dir = TempDir::new().unwrap();
        let bin = fake_gitleaks(&dir, "echo 'config parse error' >&2\nexit 1");

        match run_with(&bin, &args(&["directory", "."])) {
            RunOutcome::Failed { exit_code, message } => {
                assert_eq!(exit_code, 2);
                assert!(message.starts_with("Gitleaks scan failed: "));
                assert!(message.contains("config parse error"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn exit_126_names_the_offending_argument() {
        let dir = TempDir::new().unwrap();
        let bin = fake_gitleaks(&dir, "exit 126");

        match run_with(&bin, &args(&["directory", ".", "--bogus"])) {
            RunOutcome::Failed { exit_code, message } => {
                assert_eq!(exit_code, 2);
                assert!(message.contains("unknown argument '--bogus'"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn other_exit_codes_wrap_stderr() {
        let dir = TempDir::new().unwrap();
        let bin = fake_gitleaks(&dir, "echo 'disk on fire' >&2\nexit 5");

        match run_with(&bin, &args(&["directory", "."])) {
            RunOutcome::Failed { exit_code, message } => {
                assert_eq!(exit_code, 2);
                assert_eq!(message, "Gitleaks scan failed: disk on fire\n");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_an_invocation_fault() {
        match run_with("/nonexistent/gitleaks", &args(&["directory", "."])) {
            RunOutcome::Failed { exit_code, message } => {
                assert_eq!(exit_code, 2);
                assert!(message.starts_with("Failed to run gitleaks: "));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn stderr_is_captured_when_stdout_is_empty() {
        let dir = TempDir::new().unwrap();
        let bin = fake_gitleaks(&dir, "echo 'WRN leaks found: 1' >&2\nexit 1");

        match run_with(&bin, &args(&["directory", "."])) {
            RunOutcome::Completed { output } => assert!(output.contains("leaks found: 1")),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn stdout_is_preferred_over_stderr() {
        let dir = TempDir::new().unwrap();
        let bin = fake_gitleaks(&dir, "echo out\necho err >&2\nexit 0");

        assert_eq!(
            run_with(&bin, &args(&["directory", "."])),
            RunOutcome::Completed { output: "out\n".to_string() }
        );
    }
}
