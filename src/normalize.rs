use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::report::Finding;

/// Normalized contents of one gitleaks report, plus scan statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub total_files_scanned: u64,
    pub files_with_secrets: u64,
}

/// Reads the JSON report at `report_path` and cross-references it with a
/// file count of `scanned_path`.
///
/// Gitleaks has emitted two top-level shapes over time — a bare array of
/// records, or an object holding a `findings` array — and two field-name
/// casings within each record. Both are accepted transparently. Any fault
/// (unreadable file, bad JSON, unusable record) aborts the whole report;
/// no partial results.
pub fn process_report(report_path: &Path, scanned_path: &Path) -> Result<ScanReport> {
    let raw = fs::read_to_string(report_path)?;
    let value: Value = serde_json::from_str(&raw)?;

    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut map) => match map.remove("findings") {
            Some(Value::Array(records)) => records,
            Some(_) => bail!("report key 'findings' is not an array"),
            None => Vec::new(),
        },
        _ => bail!("report is neither an array nor an object"),
    };

    let findings = records
        .iter()
        .map(parse_record)
        .collect::<Result<Vec<Finding>>>()?;

    let files_with_secrets = findings
        .iter()
        .map(|f| f.filename.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    Ok(ScanReport {
        files_with_secrets,
        total_files_scanned: count_files(scanned_path),
        findings,
    })
}

fn parse_record(record: &Value) -> Result<Finding> {
    let record = record
        .as_object()
        .ok_or_else(|| anyhow!("finding record is not a JSON object"))?;

    let start = field(record, "startLine", "StartLine").unwrap_or_default();
    let end = field(record, "endLine", "EndLine").unwrap_or_default();

    Ok(Finding {
        filename: field(record, "file", "File").unwrap_or_default(),
        line_range: format!("{start}-{end}"),
        description: field(record, "description", "Description")
            .unwrap_or_else(|| "Potential secret found".to_string()),
    })
}

/// Ordered lookup across the two field-name casings gitleaks has used;
/// the lower-case key wins when a record somehow carries both.
fn field(record: &Map<String, Value>, primary: &str, fallback: &str) -> Option<String> {
    record
        .get(primary)
        .or_else(|| record.get(fallback))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

/// Counts regular files under `path`, skipping `.git` subtrees at any depth.
/// A missing path counts as 0 and a single regular file as 1. This answers
/// "how much was scanned", independently of what the scanner reported.
pub fn count_files(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count() as u64
}
