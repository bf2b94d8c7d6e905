mod normalize;
mod report;
mod runner;

use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use report::{Response, ScanSummary};
use runner::{RunOutcome, DEFAULT_REPORT_PATH, DEFAULT_SCAN_PATH};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    eprintln!("{}", "Starting Gitleaks scan...".cyan());

    let started = Instant::now();
    let outcome = runner::run(&args);
    let response = build_response(
        outcome,
        Path::new(DEFAULT_REPORT_PATH),
        scan_path(&args),
        started,
    );

    print_summary(&response);

    // The response is the only thing stdout ever carries.
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("{}", format!("Error occurred: failed to serialize response: {e}").red());
            return ExitCode::from(2);
        }
    }

    ExitCode::from(response.exit_code() as u8)
}

/// Effective scan root: the token following `directory` in the passthrough
/// arguments. Feeds the file count only — gitleaks gets the raw arguments.
fn scan_path(args: &[String]) -> &Path {
    args.iter()
        .position(|arg| arg == "directory")
        .and_then(|pos| args.get(pos + 1))
        .map(Path::new)
        .unwrap_or_else(|| Path::new(DEFAULT_SCAN_PATH))
}

/// Turns a runner outcome into the single response document, reading the
/// report file on the success path.
fn build_response(
    outcome: RunOutcome,
    report_path: &Path,
    scanned_path: &Path,
    started: Instant,
) -> Response {
    match outcome {
        RunOutcome::Failed { exit_code, message } => Response::Error {
            exit_code,
            error_message: wrap_failure(message),
        },
        RunOutcome::Completed { .. } => {
            match normalize::process_report(report_path, scanned_path) {
                Ok(scan) => Response::Success {
                    findings: scan.findings,
                    scan_summary: ScanSummary {
                        duration_ms: started.elapsed().as_millis() as u64,
                        total_files_scanned: scan.total_files_scanned,
                        files_with_secrets: scan.files_with_secrets,
                    },
                },
                Err(e) => Response::Error {
                    exit_code: 2,
                    error_message: format!("Failed to process gitleaks output: {e:#}"),
                },
            }
        }
    }
}

/// Runner messages already carry their taxonomy prefix; anything else gets
/// the scan-failure prefix exactly once, never stacked.
fn wrap_failure(message: String) -> String {
    if message.starts_with("Gitleaks scan failed: ")
        || message.starts_with("Failed to run gitleaks: ")
    {
        message
    } else {
        format!("Gitleaks scan failed: {message}")
    }
}

/// One human-readable line (plus duration for non-empty scans) on stderr,
/// picked by response shape rather than exit code.
fn print_summary(response: &Response) {
    match response {
        Response::Success { findings, .. } if findings.is_empty() => {
            eprintln!("{}", "No secrets were found in the scanned files.".green());
        }
        Response::Success { findings, scan_summary } => {
            eprintln!(
                "{}",
                format!(
                    "Found {} potential secrets in {} files.",
                    findings.len(),
                    scan_summary.files_with_secrets
                )
                .yellow()
            );
            eprintln!("Scan completed in {}ms.", scan_summary.duration_ms);
        }
        Response::Error { error_message, .. } => {
            eprintln!("{}", format!("Error occurred: {error_message}").red());
        }
    }
}
