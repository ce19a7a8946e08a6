//! Maps a run back to its slice of the section transcript.
//!
//! The transcript has no explicit run delimiters. A run starts at the first line
//! carrying its `[<id>]` marker and ends just before the next line that looks like
//! the start of something else: another run header, a lifecycle header, a long
//! dash rule or a section marker. The page script in `report/assets/dashboard.js`
//! implements the same rules; keep the two in step.

use crate::model::RunRecord;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `[SR-051] bucket-list: raps bucket list`
    static ref RUN_HEADER: Regex = Regex::new(r"^\[([^\]\s]+)\]\s+\S+:").unwrap();
    /// `Lifecycle SR-063 (bucket-lifecycle): ...`
    static ref LIFECYCLE_HEADER: Regex = Regex::new(r"^Lifecycle\s+\S").unwrap();
    static ref RULE: Regex = Regex::new(r"^-{20,}").unwrap();
    static ref SECTION_MARKER: Regex = Regex::new(r"^Section\s").unwrap();
}

/// Marker a run id carries in the transcript.
pub fn run_marker(run_id: &str) -> String {
    format!("[{run_id}]")
}

fn is_boundary(line: &str) -> bool {
    let line = line.trim();
    RUN_HEADER.is_match(line)
        || LIFECYCLE_HEADER.is_match(line)
        || RULE.is_match(line)
        || SECTION_MARKER.is_match(line)
}

/// The excerpt of `log` belonging to `run_id`, or `None` when the run's marker
/// never appears. A miss is a normal result, not an error.
pub fn extract_run_log(log: &str, run_id: &str) -> Option<String> {
    if log.is_empty() {
        return None;
    }
    let marker = run_marker(run_id);
    let lines: Vec<&str> = log.lines().collect();
    let start = lines.iter().position(|line| line.contains(&marker))?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| is_boundary(line))
        .map_or(lines.len(), |offset| start + 1 + offset);
    Some(lines[start..end].join("\n").trim_end().to_string())
}

/// Step ids (`<base>/<step>`) of lifecycle run `base_id` that open a run header in
/// `log`, distinct, in log order.
pub fn lifecycle_step_ids(log: &str, base_id: &str) -> Vec<String> {
    let prefix = format!("{base_id}/");
    let mut ids: Vec<String> = Vec::new();
    for line in log.lines() {
        let Some(caps) = RUN_HEADER.captures(line.trim()) else {
            continue;
        };
        let id = &caps[1];
        if id.starts_with(&prefix) && !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Excerpts of every step of lifecycle run `base_id`, joined in log order. The
/// harness records a lifecycle test as one run with the base id; its steps only
/// appear as `[<base>/<step>]` headers in the log. Runs that carry step ids are
/// used when the log has no such headers.
pub fn extract_lifecycle_log(runs: &[RunRecord], log: &str, base_id: &str) -> Option<String> {
    let mut step_ids = lifecycle_step_ids(log, base_id);
    if step_ids.is_empty() {
        step_ids = runs
            .iter()
            .filter(|run| run.step().is_some() && run.base_id() == base_id)
            .map(|run| run.id.clone())
            .collect();
    }
    let parts: Vec<String> = step_ids
        .iter()
        .filter_map(|id| extract_run_log(log, id))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
Section 03-storage (mock)
[SR-050] bucket-create: raps bucket create -k sr-test-bucket-raps
  -> exit 0 (1.21s)
{\"bucketKey\": \"sr-test-bucket-raps\"}

[SR-051] bucket-list: raps bucket list
  -> exit 6 (0.54s)
  stderr: Error: 403 Forbidden

[SR-052] bucket-info: raps bucket info sr-test-bucket-raps
  -> TIMEOUT (30.0s)
------------------------------------------------------------
Lifecycle SR-063 (bucket-lifecycle): 2/3 steps
[SR-063/step1] bucket-lifecycle-step1: raps bucket create -k lc
  -> exit 0 (0.9s)
[SR-063/step2] bucket-lifecycle-step2: raps bucket delete lc
  -> exit 0 (0.7s)
";

    #[test]
    fn run_excerpt_stops_at_next_header() {
        let got = extract_run_log(LOG, "SR-050").unwrap();
        assert_eq!(
            got,
            "[SR-050] bucket-create: raps bucket create -k sr-test-bucket-raps\n  -> exit 0 (1.21s)\n{\"bucketKey\": \"sr-test-bucket-raps\"}"
        );
    }

    #[test]
    fn consecutive_headers_split_exactly() {
        let log = "[A] first: one\nline a1\nline a2\n[B] second: two\nline b1\n";
        assert_eq!(
            extract_run_log(log, "A").unwrap(),
            "[A] first: one\nline a1\nline a2"
        );
        assert_eq!(extract_run_log(log, "B").unwrap(), "[B] second: two\nline b1");
    }

    #[test]
    fn dash_rule_ends_an_excerpt() {
        let got = extract_run_log(LOG, "SR-052").unwrap();
        assert_eq!(
            got,
            "[SR-052] bucket-info: raps bucket info sr-test-bucket-raps\n  -> TIMEOUT (30.0s)"
        );
    }

    #[test]
    fn lifecycle_steps_resolve_individually() {
        let got = extract_run_log(LOG, "SR-063/step1").unwrap();
        assert_eq!(
            got,
            "[SR-063/step1] bucket-lifecycle-step1: raps bucket create -k lc\n  -> exit 0 (0.9s)"
        );
        // the base id has no bracketed marker of its own
        assert_eq!(extract_run_log(LOG, "SR-063"), None);
    }

    #[test]
    fn stderr_and_blank_lines_stay_with_their_run() {
        let got = extract_run_log(LOG, "SR-051").unwrap();
        assert!(got.ends_with("  stderr: Error: 403 Forbidden"));
    }

    #[test]
    fn short_rules_and_bracketed_output_do_not_split() {
        let log = "[SR-1] slug: cmd\n-----\n[1, 2, 3]\n[\"a\",\"b\"]\nSectional view\n[SR-2] next: cmd\n";
        assert_eq!(
            extract_run_log(log, "SR-1").unwrap(),
            "[SR-1] slug: cmd\n-----\n[1, 2, 3]\n[\"a\",\"b\"]\nSectional view"
        );
    }

    #[test]
    fn missing_marker_or_log_is_none() {
        assert_eq!(extract_run_log(LOG, "SR-999"), None);
        assert_eq!(extract_run_log("", "SR-050"), None);
    }

    #[test]
    fn last_run_runs_to_end_of_log() {
        let got = extract_run_log(LOG, "SR-063/step2").unwrap();
        assert!(got.ends_with("-> exit 0 (0.7s)"));
    }

    #[test]
    fn lifecycle_base_id_collects_its_steps() {
        let step = |id: &str| RunRecord {
            id: id.into(),
            slug: "bucket-lifecycle".into(),
            command: "(lifecycle: test_sr063)".into(),
            exit_code: 0,
            duration_seconds: 0.5,
            cli_exit_code: None,
        };
        let runs = vec![step("SR-052"), step("SR-063/step1"), step("SR-063/step2")];
        let got = extract_lifecycle_log(&runs, LOG, "SR-063").unwrap();
        assert!(got.starts_with("[SR-063/step1]"));
        assert!(got.ends_with("-> exit 0 (0.7s)"));
        assert!(got.contains("\n[SR-063/step2] bucket-lifecycle-step2"));
        assert_eq!(extract_lifecycle_log(&runs, LOG, "SR-052"), None);
    }

    #[test]
    fn lifecycle_steps_come_from_log_headers() {
        let runs = vec![RunRecord {
            id: "SR-063".into(),
            slug: "bucket-lifecycle".into(),
            command: "(lifecycle: test_sr063_bucket_lifecycle)".into(),
            exit_code: 0,
            duration_seconds: 1.6,
            cli_exit_code: None,
        }];
        assert_eq!(extract_run_log(LOG, "SR-063"), None);
        assert_eq!(lifecycle_step_ids(LOG, "SR-063"), ["SR-063/step1", "SR-063/step2"]);

        let got = extract_lifecycle_log(&runs, LOG, "SR-063").unwrap();
        assert_eq!(
            got,
            "[SR-063/step1] bucket-lifecycle-step1: raps bucket create -k lc\n  -> exit 0 (0.9s)\n\
             [SR-063/step2] bucket-lifecycle-step2: raps bucket delete lc\n  -> exit 0 (0.7s)"
        );
    }

    #[test]
    fn lifecycle_ids_do_not_match_other_bases() {
        assert!(lifecycle_step_ids(LOG, "SR-06").is_empty());
        assert!(lifecycle_step_ids(LOG, "SR-050").is_empty());
    }

    #[test]
    fn crlf_logs_excerpt_like_lf_logs() {
        let crlf = LOG.replace('\n', "\r\n");
        assert_eq!(extract_run_log(&crlf, "SR-051"), extract_run_log(LOG, "SR-051"));
        assert_eq!(
            lifecycle_step_ids(&crlf, "SR-063"),
            lifecycle_step_ids(LOG, "SR-063")
        );
    }
}
