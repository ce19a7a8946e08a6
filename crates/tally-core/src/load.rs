//! Section discovery: one `<name>.json` result file per section, with an optional
//! `<name>.log` transcript next to it.

use crate::ansi::{cap_log, strip_ansi, DEFAULT_LOG_CAP_CHARS};
use crate::errors::{TallyError, TallyResult};
use crate::model::Section;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub log_cap_chars: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            log_cap_chars: DEFAULT_LOG_CAP_CHARS,
        }
    }
}

/// Result files in `dir`, sorted by file name (this is the section display order).
pub fn section_files(dir: &Path) -> TallyResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| TallyError::io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Loads every parseable section in `dir`.
///
/// A file that cannot be read or parsed is logged and skipped. Fails only when the
/// directory cannot be listed or nothing loaded at all.
pub fn load_sections(dir: &Path, opts: &LoadOptions) -> TallyResult<Vec<Section>> {
    let mut sections = Vec::new();
    for path in section_files(dir)? {
        match load_section(&path, opts) {
            Ok(section) => {
                tracing::debug!(
                    file = %path.display(),
                    runs = section.runs.len(),
                    "loaded section"
                );
                sections.push(section);
            }
            Err(e) => {
                tracing::warn!("skipping section file: {e}");
            }
        }
    }
    if sections.is_empty() {
        return Err(TallyError::NoSections {
            dir: dir.to_path_buf(),
        });
    }
    Ok(sections)
}

/// Parses one result file and attaches its companion log.
pub fn load_section(path: &Path, opts: &LoadOptions) -> TallyResult<Section> {
    let text = std::fs::read_to_string(path).map_err(|e| TallyError::io(path, e))?;
    let mut section: Section = serde_json::from_str(&text).map_err(|e| TallyError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    section.log = read_companion_log(&path.with_extension("log"), opts.log_cap_chars);
    Ok(section)
}

/// Missing or unreadable logs degrade to an empty string.
fn read_companion_log(path: &Path, cap: usize) -> String {
    if !path.is_file() {
        return String::new();
    }
    match std::fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            cap_log(strip_ansi(&text), cap)
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), "unreadable section log: {e}");
            String::new()
        }
    }
}

/// Most recent run directory under `base`, by name (run directories are named by
/// timestamp, e.g. `2026-02-15-11-50`).
pub fn find_latest_log_dir(base: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(base).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .max_by(|a, b| a.file_name().cmp(&b.file_name()))
}

/// Explicit directory if given (it must exist), else the latest run directory of
/// the first base that has one.
pub fn resolve_log_dir(explicit: Option<&Path>, bases: &[PathBuf]) -> TallyResult<PathBuf> {
    if let Some(dir) = explicit {
        if !dir.is_dir() {
            return Err(TallyError::LogDirNotFound {
                path: dir.to_path_buf(),
            });
        }
        return Ok(dir.to_path_buf());
    }
    for base in bases.iter().filter(|b| b.is_dir()) {
        if let Some(dir) = find_latest_log_dir(base) {
            return Ok(dir);
        }
    }
    Err(TallyError::NoLogDirs {
        searched: bases
            .iter()
            .map(|b| b.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const STORAGE: &str = r#"{
        "section": "03-storage",
        "title": "Storage: Buckets + Objects",
        "target": "mock",
        "timestamp": "2026-02-15T11:50:00+00:00",
        "runs": [
            {"id": "SR-050", "slug": "bucket-create", "command": "raps bucket create -k b", "exit_code": 0, "duration_seconds": 1.2},
            {"id": "SR-051", "slug": "bucket-list", "command": "raps bucket list", "exit_code": 1, "duration_seconds": 0.4}
        ]
    }"#;

    #[test]
    fn loads_sections_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("10-webhooks.json"), r#"{"section":"10-webhooks","runs":[]}"#).unwrap();
        fs::write(dir.path().join("03-storage.json"), STORAGE).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a section").unwrap();

        let sections = load_sections(dir.path(), &LoadOptions::default()).unwrap();
        let names: Vec<_> = sections.iter().map(|s| s.section.as_str()).collect();
        assert_eq!(names, ["03-storage", "10-webhooks"]);
        assert_eq!(sections[0].runs.len(), 2);
        assert_eq!(sections[0].runs[1].id, "SR-051");
    }

    #[test]
    fn corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("01-auth.json"), "{ not json").unwrap();
        fs::write(dir.path().join("02-config.json"), r#"["wrong", "shape"]"#).unwrap();
        fs::write(dir.path().join("03-storage.json"), STORAGE).unwrap();

        let sections = load_sections(dir.path(), &LoadOptions::default()).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section, "03-storage");
    }

    #[test]
    fn empty_directory_is_fatal_and_names_it() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sections(dir.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, TallyError::NoSections { .. }));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn companion_log_is_stripped_and_attached() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("03-storage.json"), STORAGE).unwrap();
        let mut log = b"[SR-050] bucket-create: raps bucket create -k b\n  \x1b[32m-> exit 0 (1.2s)\x1b[0m\n".to_vec();
        log.extend_from_slice(&[0xff, 0xfe, b'\n']);
        fs::write(dir.path().join("03-storage.log"), log).unwrap();

        let section = load_section(&dir.path().join("03-storage.json"), &LoadOptions::default()).unwrap();
        assert!(section.log.starts_with("[SR-050] bucket-create"));
        assert!(section.log.contains("  -> exit 0 (1.2s)\n"));
        assert!(!section.log.contains('\x1b'));
        assert!(section.log.contains('\u{fffd}'));
    }

    #[test]
    fn missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("03-storage.json"), STORAGE).unwrap();
        let section = load_section(&dir.path().join("03-storage.json"), &LoadOptions::default()).unwrap();
        assert_eq!(section.log, "");
    }

    #[test]
    fn long_log_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("03-storage.json"), STORAGE).unwrap();
        fs::write(dir.path().join("03-storage.log"), "x".repeat(120)).unwrap();
        let opts = LoadOptions { log_cap_chars: 100 };
        let section = load_section(&dir.path().join("03-storage.json"), &opts).unwrap();
        assert!(section.log.starts_with(&"x".repeat(100)));
        assert!(section.log.ends_with("--- LOG TRUNCATED (original: 120 chars) ---\n"));
    }

    #[test]
    fn latest_dir_is_greatest_name() {
        let base = tempfile::tempdir().unwrap();
        for name in ["2026-02-14-09-00", "2026-02-15-11-50", "2026-02-15-08-30"] {
            fs::create_dir(base.path().join(name)).unwrap();
        }
        fs::write(base.path().join("zzz-not-a-dir"), "").unwrap();
        let latest = find_latest_log_dir(base.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "2026-02-15-11-50");
    }

    #[test]
    fn resolve_prefers_explicit_and_checks_it() {
        let base = tempfile::tempdir().unwrap();
        let run = base.path().join("run-a");
        fs::create_dir(&run).unwrap();
        assert_eq!(resolve_log_dir(Some(&run), &[]).unwrap(), run);

        let missing = base.path().join("missing");
        let err = resolve_log_dir(Some(&missing), &[]).unwrap_err();
        assert!(matches!(err, TallyError::LogDirNotFound { .. }));
    }

    #[test]
    fn resolve_searches_bases_in_order() {
        let empty = tempfile::tempdir().unwrap();
        let populated = tempfile::tempdir().unwrap();
        fs::create_dir(populated.path().join("2026-02-17-23-35")).unwrap();
        let bases = vec![
            empty.path().join("does-not-exist"),
            empty.path().to_path_buf(),
            populated.path().to_path_buf(),
        ];
        let dir = resolve_log_dir(None, &bases).unwrap();
        assert_eq!(dir.file_name().unwrap(), "2026-02-17-23-35");

        let err = resolve_log_dir(None, &bases[..2]).unwrap_err();
        assert!(matches!(err, TallyError::NoLogDirs { .. }));
        assert!(err.to_string().contains("does-not-exist"));
    }
}
