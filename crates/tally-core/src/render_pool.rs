//! Bounded parallel rendering of scenario scripts.
//!
//! Each script is handed to a [`ScriptRenderer`]; at most `workers` renders are
//! in flight at once and each one is bounded by its own timeout. A failing or
//! slow job only marks itself failed.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const DIAGNOSTIC_CAP_CHARS: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RenderOutcome {
    pub ok: bool,
    /// Empty on success; otherwise the reason (stderr tail, exit status, timeout).
    pub diagnostic: String,
}

impl RenderOutcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            diagnostic: String::new(),
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            ok: false,
            diagnostic: diagnostic.into(),
        }
    }
}

#[async_trait]
pub trait ScriptRenderer: Send + Sync {
    async fn render(&self, script: &Path) -> anyhow::Result<RenderOutcome>;

    fn name(&self) -> String;
}

/// Runs `<binary> render <script> -q` from the script's grandparent directory
/// (scenario scripts live in `<project>/<scenarios>/`).
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    binary: PathBuf,
}

impl CommandRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

fn working_dir(script: &Path) -> PathBuf {
    script
        .parent()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn cap_diagnostic(text: &str) -> String {
    let text = text.trim();
    let count = text.chars().count();
    if count <= DIAGNOSTIC_CAP_CHARS {
        return text.to_string();
    }
    // keep the tail; renderers print the actual error last
    text.chars().skip(count - DIAGNOSTIC_CAP_CHARS).collect()
}

#[async_trait]
impl ScriptRenderer for CommandRenderer {
    async fn render(&self, script: &Path) -> anyhow::Result<RenderOutcome> {
        let script = std::path::absolute(script)?;
        let output = tokio::process::Command::new(&self.binary)
            .arg("render")
            .arg(&script)
            .arg("-q")
            .current_dir(working_dir(&script))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start {}: {e}", self.binary.display()))?;

        if output.status.success() {
            return Ok(RenderOutcome::success());
        }
        let stderr = cap_diagnostic(&String::from_utf8_lossy(&output.stderr));
        let diagnostic = if stderr.is_empty() {
            format!("renderer exited with {}", output.status)
        } else {
            stderr
        };
        Ok(RenderOutcome::failure(diagnostic))
    }

    fn name(&self) -> String {
        self.binary.display().to_string()
    }
}

/// Scripts with extension `ext` directly inside `dir`, sorted.
pub fn discover_scripts(dir: &Path, ext: &str) -> crate::TallyResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| crate::TallyError::io(dir, e))?;
    let mut scripts: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == ext))
        .collect();
    scripts.sort();
    Ok(scripts)
}

fn script_key(script: &Path) -> String {
    script
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| script.display().to_string())
}

/// Renders every script, at most `workers` at a time. Returns one outcome per
/// script keyed by file name.
pub async fn render_all(
    renderer: Arc<dyn ScriptRenderer>,
    scripts: Vec<PathBuf>,
    workers: usize,
    timeout: Duration,
) -> BTreeMap<String, RenderOutcome> {
    let sem = Arc::new(Semaphore::new(workers.max(1)));
    let mut join_set = JoinSet::new();
    let keys: Vec<String> = scripts.iter().map(|s| script_key(s)).collect();

    for (script, key) in scripts.into_iter().zip(keys.iter().cloned()) {
        let sem = sem.clone();
        let renderer = renderer.clone();
        join_set.spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return (key, RenderOutcome::failure("render pool closed"));
            };
            tracing::debug!(script = %script.display(), "rendering");
            let outcome = match tokio::time::timeout(timeout, renderer.render(&script)).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => RenderOutcome::failure(e.to_string()),
                Err(_) => RenderOutcome::failure(format!("timed out after {}s", timeout.as_secs())),
            };
            if !outcome.ok {
                tracing::warn!(script = %script.display(), "render failed: {}", outcome.diagnostic);
            }
            (key, outcome)
        });
    }

    let mut results = BTreeMap::new();
    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((key, outcome)) => {
                results.insert(key, outcome);
            }
            Err(e) => tracing::error!("render task failed: {e}"),
        }
    }
    // a task that panicked never reported back; every script gets an outcome
    for key in keys {
        results
            .entry(key)
            .or_insert_with(|| RenderOutcome::failure("render task panicked"));
    }
    results
}
