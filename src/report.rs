use serde::{Serialize, Deserialize};

/// One detected secret occurrence, as normalized from the gitleaks report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub filename: String,
    pub line_range: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub duration_ms: u64,
    pub total_files_scanned: u64,
    pub files_with_secrets: u64,
}

/// The single JSON document printed to stdout.
///
/// Exactly one branch exists per run: a successful scan (with or without
/// findings) or an error. Untagged so the wire shape stays flat — a success
/// document never carries `exit_code`/`error_message` keys and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Success {
        findings: Vec<Finding>,
        scan_summary: ScanSummary,
    },
    Error {
        exit_code: i32,
        error_message: String,
    },
}

impl Response {
    /// Process exit code for this response: the error's code, else 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            Response::Success { .. } => 0,
            Response::Error { exit_code, .. } => *exit_code,
        }
    }
}
