//! Benchmark-claim reports (`metrics-report.html` / `metrics-report.md`).
//!
//! Benchmark scripts drop one `<name>-results.json` per suite into the report
//! directory, or a single `combined-results.json`. A suite holds one of three
//! tables (`claims`, `tests` or `flows`); anything else is listed by name only.

use super::html_escape;
use crate::errors::{TallyError, TallyResult};
use crate::summary::round1;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const COMBINED_FILE: &str = "combined-results.json";
pub const RESULTS_SUFFIX: &str = "-results.json";
pub const HTML_REPORT: &str = "metrics-report.html";
pub const MARKDOWN_REPORT: &str = "metrics-report.md";

const TEST_PASS_STATUSES: &[&str] = &[
    "success",
    "mock",
    "available",
    "expected",
    "documented",
    "confirmed",
];
const FLOW_PASS_STATUSES: &[&str] = &["success", "available", "detected", "documented"];
const SKIPPED_STATUS: &str = "skipped";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchSummary {
    #[serde(default)]
    pub passed: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub total_claims_validated: usize,
    #[serde(default)]
    pub pass_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claim {
    #[serde(default)]
    pub claim: Option<String>,
    #[serde(default)]
    pub expected: Value,
    #[serde(default)]
    pub actual: Value,
    #[serde(default)]
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_seconds: Value,
    #[serde(default)]
    pub memory_mb: Value,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Flow {
    #[serde(default)]
    pub flow: Option<String>,
    #[serde(default)]
    pub duration_seconds: Value,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Suite {
    Claims(Vec<Claim>),
    Tests(Vec<TestEntry>),
    Flows(Vec<Flow>),
    Other,
}

/// How an entry counts toward the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// Counted in the total, neither passed nor failed.
    Neutral,
}

impl Claim {
    pub fn verdict(&self) -> Verdict {
        if self.passed {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl TestEntry {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    pub fn verdict(&self) -> Verdict {
        let status = self.status();
        if TEST_PASS_STATUSES.contains(&status) {
            Verdict::Pass
        } else if status == SKIPPED_STATUS {
            Verdict::Neutral
        } else {
            Verdict::Fail
        }
    }

    /// CSS class; only `crashed` is shown as a failure.
    pub fn display_class(&self) -> &'static str {
        match self.status() {
            s if TEST_PASS_STATUSES.contains(&s) => "success",
            "crashed" => "failed",
            _ => "skipped",
        }
    }
}

impl Flow {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    pub fn verdict(&self) -> Verdict {
        let status = self.status();
        if FLOW_PASS_STATUSES.contains(&status) {
            Verdict::Pass
        } else if status == SKIPPED_STATUS {
            Verdict::Neutral
        } else {
            Verdict::Fail
        }
    }

    pub fn display_class(&self) -> &'static str {
        match self.verdict() {
            Verdict::Pass => "success",
            Verdict::Neutral => "skipped",
            Verdict::Fail => "failed",
        }
    }
}

impl Suite {
    /// Picks the table by key precedence `claims`, `tests`, `flows`. A table that
    /// does not decode is reported and the suite is listed without one.
    pub fn from_value(name: &str, value: &Value) -> Self {
        fn table<T: serde::de::DeserializeOwned>(name: &str, v: &Value) -> Option<Vec<T>> {
            match serde_json::from_value(v.clone()) {
                Ok(rows) => Some(rows),
                Err(e) => {
                    tracing::warn!(suite = name, "ignoring malformed benchmark table: {e}");
                    None
                }
            }
        }

        if let Some(v) = value.get("claims") {
            table(name, v).map_or(Suite::Other, Suite::Claims)
        } else if let Some(v) = value.get("tests") {
            table(name, v).map_or(Suite::Other, Suite::Tests)
        } else if let Some(v) = value.get("flows") {
            table(name, v).map_or(Suite::Other, Suite::Flows)
        } else {
            Suite::Other
        }
    }

    fn verdicts(&self) -> Vec<Verdict> {
        match self {
            Suite::Claims(rows) => rows.iter().map(Claim::verdict).collect(),
            Suite::Tests(rows) => rows.iter().map(TestEntry::verdict).collect(),
            Suite::Flows(rows) => rows.iter().map(Flow::verdict).collect(),
            Suite::Other => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResults {
    pub run_info: RunInfo,
    /// Suites in file (or combined-document) order.
    pub suites: Vec<(String, Suite)>,
    pub summary: BenchSummary,
}

impl BenchmarkResults {
    fn from_suites(run_info: RunInfo, raw: Vec<(String, Value)>, summary: Option<BenchSummary>) -> Self {
        let suites: Vec<(String, Suite)> = raw
            .into_iter()
            .map(|(name, value)| {
                let suite = Suite::from_value(&name, &value);
                (name, suite)
            })
            .collect();
        let summary = summary.unwrap_or_else(|| summarize_suites(&suites));
        Self {
            run_info,
            suites,
            summary,
        }
    }
}

pub fn summarize_suites(suites: &[(String, Suite)]) -> BenchSummary {
    let mut summary = BenchSummary::default();
    for verdict in suites.iter().flat_map(|(_, suite)| suite.verdicts()) {
        summary.total_claims_validated += 1;
        match verdict {
            Verdict::Pass => summary.passed += 1,
            Verdict::Fail => summary.failed += 1,
            Verdict::Neutral => {}
        }
    }
    if summary.total_claims_validated > 0 {
        summary.pass_rate =
            round1(summary.passed as f64 / summary.total_claims_validated as f64 * 100.0);
    }
    summary
}

#[derive(Deserialize)]
struct CombinedDocument {
    #[serde(default)]
    benchmark_run: RunInfo,
    #[serde(default)]
    suites: Map<String, Value>,
    #[serde(default)]
    summary: Option<BenchSummary>,
}

/// Loads `combined-results.json` when present, else every `*-results.json`.
pub fn load_results(dir: &Path) -> TallyResult<BenchmarkResults> {
    let combined = dir.join(COMBINED_FILE);
    if combined.is_file() {
        let text = std::fs::read_to_string(&combined).map_err(|e| TallyError::io(&combined, e))?;
        let doc: CombinedDocument = serde_json::from_str(&text).map_err(|e| TallyError::Json {
            path: combined.clone(),
            source: e,
        })?;
        return Ok(BenchmarkResults::from_suites(
            doc.benchmark_run,
            doc.suites.into_iter().collect(),
            doc.summary,
        ));
    }

    let no_results = || TallyError::NoBenchmarkResults {
        dir: dir.to_path_buf(),
    };
    let entries = std::fs::read_dir(dir).map_err(|_| no_results())?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(RESULTS_SUFFIX) && n != COMBINED_FILE)
        })
        .collect();
    files.sort();

    let mut raw = Vec::with_capacity(files.len());
    for path in files {
        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
        let value = match parsed {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(file = %path.display(), "skipping benchmark result: {e}");
                continue;
            }
        };
        let name = value
            .get("benchmark")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default();
        raw.push((name, value));
    }
    if raw.is_empty() {
        return Err(no_results());
    }

    let run_info = RunInfo {
        timestamp: Some(chrono::Local::now().to_rfc3339()),
        platform: Some(std::env::consts::OS.to_string()),
    };
    Ok(BenchmarkResults::from_suites(run_info, raw, None))
}

/// `cli-performance` -> `Cli Performance`.
pub fn suite_heading(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for ch in name.chars() {
        let ch = if ch == '-' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

fn value_text(v: &Value) -> String {
    match v {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn or_unknown(s: &Option<String>) -> &str {
    s.as_deref().unwrap_or("Unknown")
}

fn md_cell(s: &str) -> String {
    s.replace(['\r', '\n'], " ").replace('|', "\\|")
}

fn rate_text(rate: f64) -> String {
    format!("{rate:.1}")
}

pub fn to_html(results: &BenchmarkResults) -> String {
    let summary = &results.summary;
    let info = &results.run_info;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Benchmark Report</title>\n<style>\n");
    html.push_str(BENCH_STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str("<div class=\"header\">\n  <h1>Benchmark Report</h1>\n");
    html.push_str(&format!(
        "  <p>Generated: {} | Platform: {}</p>\n</div>\n",
        html_escape(info.timestamp.as_deref().unwrap_or("Unknown")),
        html_escape(info.platform.as_deref().unwrap_or("Unknown")),
    ));

    let failed_class = if summary.failed > 0 { "error" } else { "success" };
    let rate_class = if summary.pass_rate >= 80.0 { "success" } else { "warning" };
    let rate = rate_text(summary.pass_rate);
    html.push_str("<div class=\"summary-cards\">\n");
    html.push_str(&format!(
        "  <div class=\"card success\"><h3>Validations Passed</h3><div class=\"value\">{}</div></div>\n",
        summary.passed
    ));
    html.push_str(&format!(
        "  <div class=\"card {failed_class}\"><h3>Validations Failed</h3><div class=\"value\">{}</div></div>\n",
        summary.failed
    ));
    html.push_str(&format!(
        "  <div class=\"card\"><h3>Total Validations</h3><div class=\"value\">{}</div></div>\n",
        summary.total_claims_validated
    ));
    html.push_str(&format!(
        "  <div class=\"card {rate_class}\"><h3>Pass Rate</h3><div class=\"value\">{rate}%</div>\
         <div class=\"pass-rate\"><div class=\"pass-rate-fill\" style=\"width: {rate}%\"></div></div></div>\n"
    ));
    html.push_str("</div>\n");

    for (name, suite) in &results.suites {
        html.push_str(&format!(
            "<div class=\"suite\">\n  <h2>{}</h2>\n",
            html_escape(&suite_heading(name))
        ));
        match suite {
            Suite::Claims(rows) => {
                html.push_str(&table_head(&["Claim", "Expected", "Actual", "Status"]));
                for c in rows {
                    let (class, text) = match c.verdict() {
                        Verdict::Pass => ("success", "Passed"),
                        _ => ("failed", "Failed"),
                    };
                    html.push_str(&format!(
                        "    <tr><td>{}</td><td>{}</td><td>{}</td><td><span class=\"status {class}\">{text}</span></td></tr>\n",
                        html_escape(or_unknown(&c.claim)),
                        html_escape(&value_text(&c.expected)),
                        html_escape(&value_text(&c.actual)),
                    ));
                }
                html.push_str(TABLE_END);
            }
            Suite::Tests(rows) => {
                html.push_str(&table_head(&["Test", "Duration", "Memory", "Status"]));
                for t in rows {
                    html.push_str(&format!(
                        "    <tr><td>{}</td><td>{}s</td><td>{} MB</td><td><span class=\"status {}\">{}</span></td></tr>\n",
                        html_escape(or_unknown(&t.name)),
                        html_escape(&value_text(&t.duration_seconds)),
                        html_escape(&value_text(&t.memory_mb)),
                        t.display_class(),
                        html_escape(t.status()),
                    ));
                }
                html.push_str(TABLE_END);
            }
            Suite::Flows(rows) => {
                html.push_str(&table_head(&["Flow", "Duration", "Status", "Notes"]));
                for f in rows {
                    html.push_str(&format!(
                        "    <tr><td>{}</td><td>{}s</td><td><span class=\"status {}\">{}</span></td><td>{}</td></tr>\n",
                        html_escape(or_unknown(&f.flow)),
                        html_escape(&value_text(&f.duration_seconds)),
                        f.display_class(),
                        html_escape(f.status()),
                        html_escape(&value_text(&f.notes)),
                    ));
                }
                html.push_str(TABLE_END);
            }
            Suite::Other => {}
        }
        html.push_str("</div>\n");
    }

    html.push_str("<div class=\"footer\"><p>Generated by tally v");
    html.push_str(env!("CARGO_PKG_VERSION"));
    html.push_str("</p></div>\n</body>\n</html>\n");
    html
}

fn table_head(columns: &[&str]) -> String {
    let mut s = String::from("  <table>\n    <thead><tr>");
    for c in columns {
        s.push_str(&format!("<th>{c}</th>"));
    }
    s.push_str("</tr></thead>\n    <tbody>\n");
    s
}

const TABLE_END: &str = "    </tbody>\n  </table>\n";

pub fn to_markdown(results: &BenchmarkResults) -> String {
    let summary = &results.summary;
    let info = &results.run_info;
    let mut md = String::new();

    md.push_str("# Benchmark Report\n\n");
    md.push_str(&format!(
        "**Generated:** {}\n**Platform:** {}\n\n",
        md_cell(info.timestamp.as_deref().unwrap_or("Unknown")),
        md_cell(info.platform.as_deref().unwrap_or("Unknown")),
    ));
    md.push_str("## Summary\n\n| Metric | Value |\n|--------|-------|\n");
    md.push_str(&format!("| Validations Passed | {} |\n", summary.passed));
    md.push_str(&format!("| Validations Failed | {} |\n", summary.failed));
    md.push_str(&format!("| Total Validations | {} |\n", summary.total_claims_validated));
    md.push_str(&format!("| Pass Rate | {}% |\n\n", rate_text(summary.pass_rate)));

    for (name, suite) in &results.suites {
        md.push_str(&format!("## {}\n\n", md_cell(&suite_heading(name))));
        match suite {
            Suite::Claims(rows) => {
                md.push_str("| Claim | Expected | Actual | Status |\n");
                md.push_str("|-------|----------|--------|--------|\n");
                for c in rows {
                    let icon = if c.passed { "✓" } else { "✗" };
                    md.push_str(&format!(
                        "| {} | {} | {} | {icon} |\n",
                        md_cell(or_unknown(&c.claim)),
                        md_cell(&value_text(&c.expected)),
                        md_cell(&value_text(&c.actual)),
                    ));
                }
                md.push('\n');
            }
            Suite::Tests(rows) => {
                md.push_str("| Test | Duration | Memory | Status |\n");
                md.push_str("|------|----------|--------|--------|\n");
                for t in rows {
                    let icon = match t.display_class() {
                        "success" => "✓",
                        "failed" => "✗",
                        _ => "○",
                    };
                    md.push_str(&format!(
                        "| {} | {}s | {} MB | {icon} |\n",
                        md_cell(or_unknown(&t.name)),
                        md_cell(&value_text(&t.duration_seconds)),
                        md_cell(&value_text(&t.memory_mb)),
                    ));
                }
                md.push('\n');
            }
            Suite::Flows(rows) => {
                md.push_str("| Flow | Status | Notes |\n");
                md.push_str("|------|--------|-------|\n");
                for f in rows {
                    let icon = match f.verdict() {
                        Verdict::Pass => "✓",
                        Verdict::Neutral => "○",
                        Verdict::Fail => "✗",
                    };
                    md.push_str(&format!(
                        "| {} | {icon} {} | {} |\n",
                        md_cell(or_unknown(&f.flow)),
                        md_cell(f.status()),
                        md_cell(&value_text(&f.notes)),
                    ));
                }
                md.push('\n');
            }
            Suite::Other => {}
        }
    }

    md.push_str("---\n\n*Generated by tally*\n");
    md
}

/// Writes both reports into `dir`; returns `(html, markdown)` paths.
pub fn write_reports(dir: &Path, results: &BenchmarkResults) -> TallyResult<(PathBuf, PathBuf)> {
    let html_path = dir.join(HTML_REPORT);
    std::fs::write(&html_path, to_html(results)).map_err(|e| TallyError::io(&html_path, e))?;
    let md_path = dir.join(MARKDOWN_REPORT);
    std::fs::write(&md_path, to_markdown(results)).map_err(|e| TallyError::io(&md_path, e))?;
    Ok((html_path, md_path))
}

const BENCH_STYLE: &str = "\
* { box-sizing: border-box; }
body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; max-width: 1200px; margin: 0 auto; padding: 20px; background: #f5f5f5; }
h1, h2, h3 { color: #333; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 10px; margin-bottom: 30px; }
.header h1 { margin: 0; color: white; }
.header p { margin: 10px 0 0 0; opacity: 0.9; }
.summary-cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; margin-bottom: 30px; }
.card, .suite { background: white; padding: 20px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
.suite { margin-bottom: 20px; }
.card h3 { margin: 0 0 10px 0; color: #666; font-size: 14px; text-transform: uppercase; }
.card .value { font-size: 36px; font-weight: bold; color: #333; }
.card.success .value { color: #22c55e; }
.card.warning .value { color: #f59e0b; }
.card.error .value { color: #ef4444; }
.suite h2 { margin-top: 0; border-bottom: 2px solid #eee; padding-bottom: 10px; }
table { width: 100%; border-collapse: collapse; margin-top: 10px; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #eee; }
th { background: #f8f9fa; font-weight: 600; }
.status { display: inline-block; padding: 4px 12px; border-radius: 20px; font-size: 12px; font-weight: 600; }
.status.success { background: #dcfce7; color: #166534; }
.status.failed { background: #fee2e2; color: #991b1b; }
.status.skipped { background: #fef3c7; color: #92400e; }
.pass-rate { width: 100%; height: 20px; background: #eee; border-radius: 10px; overflow: hidden; margin-top: 10px; }
.pass-rate-fill { height: 100%; background: linear-gradient(90deg, #22c55e, #16a34a); }
.footer { text-align: center; padding: 20px; color: #666; font-size: 14px; }
";

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CLAIMS: &str = r#"{
        "benchmark": "upload-performance",
        "claims": [
            {"claim": "Upload < 10s", "expected": "<10s", "actual": 4.2, "passed": true},
            {"claim": "Parallel | chunked", "expected": 4, "actual": "1", "passed": false}
        ]
    }"#;

    const TESTS: &str = r#"{
        "tests": [
            {"name": "da4r-bundle", "duration_seconds": 12.5, "memory_mb": 48, "status": "success"},
            {"name": "offline", "status": "skipped"},
            {"name": "oom", "duration_seconds": 3, "memory_mb": 1024, "status": "crashed"},
            {"name": "quota", "status": "rate_limited"}
        ]
    }"#;

    const FLOWS: &str = r#"{
        "benchmark": "pipeline-flows",
        "flows": [
            {"flow": "upload -> translate", "duration_seconds": 40, "status": "success", "notes": "ok"},
            {"flow": "webhook", "status": "skipped"},
            {"flow": "export", "status": "error", "notes": "missing <token>"}
        ]
    }"#;

    fn write_suites(dir: &Path) {
        fs::write(dir.join("upload-results.json"), CLAIMS).unwrap();
        fs::write(dir.join("automation-results.json"), TESTS).unwrap();
        fs::write(dir.join("pipeline-results.json"), FLOWS).unwrap();
        fs::write(dir.join("notes.json"), "{}").unwrap();
    }

    #[test]
    fn loads_individual_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_suites(dir.path());
        let results = load_results(dir.path()).unwrap();
        let names: Vec<_> = results.suites.iter().map(|(n, _)| n.as_str()).collect();
        // file stem when there is no `benchmark` field
        assert_eq!(names, ["automation-results", "pipeline-flows", "upload-performance"]);
        assert!(results.run_info.timestamp.is_some());
    }

    #[test]
    fn summary_classifies_every_table() {
        let dir = tempfile::tempdir().unwrap();
        write_suites(dir.path());
        let s = load_results(dir.path()).unwrap().summary;
        // claims 1/1, tests 1 pass 1 neutral 2 fail, flows 1 pass 1 neutral 1 fail
        assert_eq!(s.total_claims_validated, 9);
        assert_eq!(s.passed, 3);
        assert_eq!(s.failed, 4);
        assert_eq!(s.pass_rate, 33.3);
    }

    #[test]
    fn display_classes() {
        let entry = |status: &str| TestEntry {
            name: None,
            duration_seconds: Value::Null,
            memory_mb: Value::Null,
            status: Some(status.into()),
        };
        assert_eq!(entry("mock").display_class(), "success");
        assert_eq!(entry("crashed").display_class(), "failed");
        assert_eq!(entry("rate_limited").display_class(), "skipped");
        assert_eq!(entry("rate_limited").verdict(), Verdict::Fail);
    }

    #[test]
    fn combined_file_wins_and_keeps_its_summary() {
        let dir = tempfile::tempdir().unwrap();
        write_suites(dir.path());
        fs::write(
            dir.path().join(COMBINED_FILE),
            r#"{
                "benchmark_run": {"timestamp": "2026-02-15T10:00:00", "platform": "Linux"},
                "suites": {"zeta": {"claims": []}, "alpha": {"other": 1}},
                "summary": {"passed": 7, "failed": 1, "total_claims_validated": 8, "pass_rate": 87.5}
            }"#,
        )
        .unwrap();
        let results = load_results(dir.path()).unwrap();
        assert_eq!(results.run_info.platform.as_deref(), Some("Linux"));
        assert_eq!(results.suites[0].0, "zeta");
        assert_eq!(results.suites[1].1, Suite::Other);
        assert_eq!(results.summary.passed, 7);
        assert_eq!(results.summary.pass_rate, 87.5);
    }

    #[test]
    fn combined_file_without_summary_is_computed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(COMBINED_FILE),
            r#"{"suites": {"s": {"claims": [{"claim": "a", "passed": true}]}}}"#,
        )
        .unwrap();
        let results = load_results(dir.path()).unwrap();
        assert_eq!(results.summary.passed, 1);
        assert_eq!(results.summary.pass_rate, 100.0);
        assert_eq!(results.run_info, RunInfo::default());
    }

    #[test]
    fn no_results_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_results(dir.path()).unwrap_err();
        assert!(matches!(err, TallyError::NoBenchmarkResults { .. }));
        let err = load_results(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, TallyError::NoBenchmarkResults { .. }));
    }

    #[test]
    fn html_escapes_values() {
        let dir = tempfile::tempdir().unwrap();
        write_suites(dir.path());
        let html = to_html(&load_results(dir.path()).unwrap());
        assert!(html.contains("<h2>Upload Performance</h2>"));
        assert!(html.contains("<td>Upload &lt; 10s</td><td>&lt;10s</td><td>4.2</td>"));
        assert!(html.contains("<td>missing &lt;token&gt;</td>"));
        assert!(html.contains("<span class=\"status failed\">crashed</span>"));
        assert!(html.contains("<div class=\"card error\"><h3>Validations Failed</h3><div class=\"value\">4</div>"));
        assert!(!html.contains("<token>"));
    }

    #[test]
    fn markdown_escapes_pipes() {
        let dir = tempfile::tempdir().unwrap();
        write_suites(dir.path());
        let md = to_markdown(&load_results(dir.path()).unwrap());
        assert!(md.contains("| Parallel \\| chunked | 4 | 1 | ✗ |"));
        assert!(md.contains("| Upload < 10s | <10s | 4.2 | ✓ |"));
        assert!(md.contains("| webhook | ○ skipped | - |"));
        assert!(md.contains("| oom | 3s | 1024 MB | ✗ |"));
        assert!(md.contains("| Pass Rate | 33.3% |"));
    }

    #[test]
    fn headings_title_case() {
        assert_eq!(suite_heading("cli-performance"), "Cli Performance");
        assert_eq!(suite_heading("API_v2"), "Api_V2");
    }

    #[test]
    fn writes_both_reports() {
        let dir = tempfile::tempdir().unwrap();
        write_suites(dir.path());
        let results = load_results(dir.path()).unwrap();
        let (html, md) = write_reports(dir.path(), &results).unwrap();
        assert!(html.ends_with(HTML_REPORT));
        assert!(fs::read_to_string(md).unwrap().starts_with("# Benchmark Report"));
    }
}
