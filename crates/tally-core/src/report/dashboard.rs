//! Self-contained HTML dashboard for one run directory.
//!
//! The page carries the whole [`AggregateSummary`] as a JSON data block and builds
//! the section cards, run tables and log drawer client-side. Apart from an optional
//! web-font import the page has no external references, so it can be mailed
//! around or opened from disk.

use super::html_escape;
use crate::summary::{format_duration, AggregateSummary};

const STYLE: &str = include_str!("assets/dashboard.css");
const SCRIPT: &str = include_str!("assets/dashboard.js");

/// `id` of the embedded `<script type="application/json">` block.
pub const DATA_ELEMENT_ID: &str = "tally-data";

pub const DEFAULT_TITLE: &str = "Sample Runs Report";

/// Header texts. Everything here is escaped before it reaches the page.
#[derive(Debug, Clone)]
pub struct PageMeta<'a> {
    pub title: &'a str,
    pub run_label: &'a str,
    pub generated_at: String,
}

impl<'a> PageMeta<'a> {
    /// Default title, generated-at stamp from the local clock.
    pub fn now(run_label: &'a str) -> Self {
        Self {
            title: DEFAULT_TITLE,
            run_label,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Renders the dashboard with the default title. Never fails; an empty summary
/// yields a page with an empty-state message.
pub fn render_dashboard(summary: &AggregateSummary, run_label: &str) -> String {
    render_page(summary, &PageMeta::now(run_label))
}

pub fn render_page(summary: &AggregateSummary, meta: &PageMeta<'_>) -> String {
    let title = html_escape(meta.title);
    let label = html_escape(meta.run_label);
    let generated = html_escape(&meta.generated_at);

    let mut html = String::with_capacity(STYLE.len() + SCRIPT.len() + 4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<title>{title} - {label}</title>\n"));
    html.push_str("<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");

    html.push_str("<div class=\"header\">\n");
    html.push_str(&format!("  <h1>{title}</h1>\n"));
    html.push_str("  <div class=\"header-meta\">\n");
    html.push_str(&format!("    <div>Run: <strong>{label}</strong></div>\n"));
    html.push_str(&format!("    <div>Generated: <strong>{generated}</strong></div>\n"));
    html.push_str("  </div>\n</div>\n");

    push_cards(&mut html, summary);

    if summary.is_empty() {
        html.push_str(
            "<div class=\"empty-state\" id=\"emptyState\">No sections were found in this run.</div>\n",
        );
    } else {
        html.push_str("<div class=\"sections-grid\" id=\"sectionsGrid\"></div>\n");
        html.push_str(DETAIL_PANEL);
    }

    html.push_str("<div class=\"footer\">Generated by tally v");
    html.push_str(env!("CARGO_PKG_VERSION"));
    html.push_str("</div>\n</div>\n");

    html.push_str(&format!(
        "<script type=\"application/json\" id=\"{DATA_ELEMENT_ID}\">"
    ));
    html.push_str(&embed_json(summary));
    html.push_str("</script>\n<script>\n");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn push_cards(html: &mut String, summary: &AggregateSummary) {
    let card = |html: &mut String, label: &str, class: &str, value: &str| {
        html.push_str(&format!(
            "  <div class=\"card\"><div class=\"card-label\">{label}</div><div class=\"card-value {class}\">{value}</div></div>\n"
        ));
    };

    html.push_str("<div class=\"cards\">\n");
    card(html, "Total Runs", "total", &summary.total_runs.to_string());
    card(html, "Passed", "ok", &summary.total_ok.to_string());
    card(html, "Failed", "fail", &summary.total_fail.to_string());
    card(html, "Skipped", "skip", &summary.total_skip.to_string());
    card(html, "Timeouts", "timeout", &summary.total_timeout.to_string());
    card(html, "Tolerated", "tolerated", &summary.total_tolerated.to_string());
    card(html, "Duration", "dur", &format_duration(summary.total_duration));

    let rate = summary.pass_rate.clamp(0.0, 100.0);
    html.push_str(&format!(
        "  <div class=\"card\"><div class=\"card-label\">Pass Rate</div><div class=\"card-value rate\">{rate:.1}%</div>\
         <div class=\"progress\"><div class=\"progress-fill\" style=\"width:{rate:.1}%\"></div></div></div>\n"
    ));
    html.push_str("</div>\n");
}

const DETAIL_PANEL: &str = r#"<div class="detail-panel" id="detailPanel">
  <div class="detail-header">
    <div class="detail-title" id="detailTitle"></div>
    <button class="btn-close" id="detailClose" type="button">&times; Close</button>
  </div>
  <div class="tab-bar" id="tabBar">
    <button class="tab-btn active" data-tab="results" type="button">Results</button>
    <button class="tab-btn" data-tab="logs" type="button">Full Log</button>
  </div>
  <div class="tab-content visible" id="tabResults">
    <div class="toolbar">
      <input type="text" class="search-box" id="searchBox" placeholder="Filter runs...">
      <div class="filters" id="filters">
        <button class="filter-btn active" data-filter="all" type="button">All</button>
        <button class="filter-btn" data-filter="ok" type="button">Passed</button>
        <button class="filter-btn" data-filter="fail" type="button">Failed</button>
        <button class="filter-btn" data-filter="skip" type="button">Skipped</button>
        <button class="filter-btn" data-filter="timeout" type="button">Timeout</button>
      </div>
    </div>
    <table class="runs-table">
      <thead><tr><th>ID</th><th>Slug</th><th>Command</th><th>Exit</th><th>Duration</th></tr></thead>
      <tbody id="runsBody"></tbody>
    </table>
    <div class="drawer" id="runDrawer">
      <div class="drawer-header">
        <div><span class="drawer-id" id="drawerRunId"></span><span class="drawer-slug" id="drawerRunSlug"></span></div>
        <button class="btn-close" id="drawerClose" type="button">&times;</button>
      </div>
      <div class="drawer-body" id="drawerBody"></div>
    </div>
  </div>
  <div class="tab-content" id="tabLogs">
    <div class="log-viewer" id="logViewer"></div>
  </div>
</div>
"#;

/// Summary as JSON that is safe inside a `<script>` element: `<`, `>` and `&` only
/// occur inside JSON strings and are written as `\u` escapes, so neither
/// `</script>` nor `<!--` can appear in the block.
pub fn embed_json(summary: &AggregateSummary) -> String {
    let json = match serde_json::to_string(summary) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("failed to serialize summary for the report: {e}");
            return "{\"sections\":[]}".to_string();
        }
    };
    let mut out = String::with_capacity(json.len() + json.len() / 16);
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(ch),
        }
    }
    out
}

/// Raw text of the embedded data block, if the page has one.
pub fn data_block(html: &str) -> Option<&str> {
    let open = format!("<script type=\"application/json\" id=\"{DATA_ELEMENT_ID}\">");
    let start = html.find(&open)? + open.len();
    let len = html[start..].find("</script>")?;
    Some(&html[start..start + len])
}

/// Reads the summary back out of a rendered page.
pub fn extract_summary(html: &str) -> Option<AggregateSummary> {
    let block = data_block(html)?;
    match serde_json::from_str(block) {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::debug!("report data block does not parse: {e}");
            None
        }
    }
}
