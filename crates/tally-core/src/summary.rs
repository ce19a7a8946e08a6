//! Pass/fail/timeout/skip aggregation over loaded sections.

use crate::model::{Outcome, RunRecord, Section, Target};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome tallies. `ok + fail + timeout + skip == total` always holds: every run is
/// classified exactly once (see [`RunRecord::outcome`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub total: usize,
    pub ok: usize,
    pub fail: usize,
    pub timeout: usize,
    pub skip: usize,
    /// Subset of `ok`: harness passed the run but the CLI exited non-zero.
    pub tolerated: usize,
}

impl Counts {
    pub fn record(&mut self, run: &RunRecord) {
        self.total += 1;
        match run.outcome() {
            Outcome::Ok => self.ok += 1,
            Outcome::Fail => self.fail += 1,
            Outcome::Timeout => self.timeout += 1,
            Outcome::Skip => self.skip += 1,
        }
        if run.is_tolerated_failure() {
            self.tolerated += 1;
        }
    }

    pub fn add(&mut self, other: &Counts) {
        self.total += other.total;
        self.ok += other.ok;
        self.fail += other.fail;
        self.timeout += other.timeout;
        self.skip += other.skip;
        self.tolerated += other.tolerated;
    }

    /// `ok / total` as a percentage with one decimal; 0 for an empty set.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            round1(self.ok as f64 / self.total as f64 * 100.0)
        }
    }
}

/// One section's counts plus the data the report needs to drill into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section: String,
    pub title: String,
    pub target: Target,
    pub timestamp: String,
    pub total: usize,
    pub ok: usize,
    pub fail: usize,
    pub timeout: usize,
    pub skip: usize,
    pub tolerated: usize,
    pub duration: f64,
    pub runs: Vec<RunRecord>,
    pub log: String,
}

impl SectionSummary {
    pub fn counts(&self) -> Counts {
        Counts {
            total: self.total,
            ok: self.ok,
            fail: self.fail,
            timeout: self.timeout,
            skip: self.skip,
            tolerated: self.tolerated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_runs: usize,
    pub total_ok: usize,
    pub total_fail: usize,
    pub total_timeout: usize,
    pub total_skip: usize,
    pub total_tolerated: usize,
    pub total_duration: f64,
    pub pass_rate: f64,
    pub sections: Vec<SectionSummary>,
}

impl AggregateSummary {
    pub fn counts(&self) -> Counts {
        Counts {
            total: self.total_runs,
            ok: self.total_ok,
            fail: self.total_fail,
            timeout: self.total_timeout,
            skip: self.total_skip,
            tolerated: self.total_tolerated,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl fmt::Display for AggregateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} runs, {} ok, {} fail ({:.1}%)",
            self.total_runs, self.total_ok, self.total_fail, self.pass_rate
        )
    }
}

/// Classifies every run and sums per section and globally. Sections move into the
/// summary whole, runs and log included, in their original order.
pub fn summarize(sections: Vec<Section>) -> AggregateSummary {
    let mut totals = Counts::default();
    let mut total_duration = 0.0;
    let mut summaries = Vec::with_capacity(sections.len());

    for sec in sections {
        let mut counts = Counts::default();
        let mut duration = 0.0;
        for run in &sec.runs {
            counts.record(run);
            duration += run.duration_seconds;
        }
        totals.add(&counts);
        total_duration += duration;

        let title = sec.display_title().to_string();
        summaries.push(SectionSummary {
            section: sec.section,
            title,
            target: sec.target,
            timestamp: sec.timestamp,
            total: counts.total,
            ok: counts.ok,
            fail: counts.fail,
            timeout: counts.timeout,
            skip: counts.skip,
            tolerated: counts.tolerated,
            duration: round1(duration),
            runs: sec.runs,
            log: sec.log,
        });
    }

    AggregateSummary {
        total_runs: totals.total,
        total_ok: totals.ok,
        total_fail: totals.fail,
        total_timeout: totals.timeout,
        total_skip: totals.skip,
        total_tolerated: totals.tolerated,
        total_duration: round1(total_duration),
        pass_rate: totals.pass_rate(),
        sections: summaries,
    }
}

/// Round to one decimal place, ties to even on the exact value (`6.25` -> `6.2`).
pub fn round1(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// `42.0` -> `42.0s`, `75.0` -> `1m 15s`. From a minute up, whole seconds.
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let whole = secs.round() as u64;
        format!("{}m {}s", whole / 60, whole % 60)
    }
}
