//! Named report stores: a directory of text files, or an in-memory table.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ReportError;

pub trait ReportSource {
    /// Report names, sorted.
    fn list_names(&self) -> Vec<String>;
    fn get_text(&self, name: &str) -> Result<String, ReportError>;
}

/// Files in one directory whose extension matches (case-insensitive).
pub struct DirSource {
    dir: PathBuf,
    extension: String,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn matches_extension(&self, p: &Path) -> bool {
        p.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

impl ReportSource for DirSource {
    fn list_names(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("report dir {} unavailable: {}", self.dir.display(), e);
                return Vec::new();
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && self.matches_extension(p))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }

    fn get_text(&self, name: &str) -> Result<String, ReportError> {
        // Only bare file names from this directory are served.
        let bare = Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
        if !bare || !self.matches_extension(Path::new(name)) {
            return Err(ReportError::UnknownReport(name.to_string()));
        }
        fs::read_to_string(self.dir.join(name)).map_err(|source| ReportError::SourceRead {
            name: name.to_string(),
            source,
        })
    }
}

/// Fixed table of named reports held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    reports: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, text: &str) -> Self {
        self.reports.insert(name.to_string(), text.to_string());
        self
    }

    /// Reports shipped with the binary.
    pub fn bundled() -> Self {
        Self::new().with("nifty_wheel.txt", include_str!("../reports/nifty_wheel.txt"))
    }
}

impl ReportSource for MemorySource {
    fn list_names(&self) -> Vec<String> {
        self.reports.keys().cloned().collect()
    }

    fn get_text(&self, name: &str) -> Result<String, ReportError> {
        self.reports
            .get(name)
            .cloned()
            .ok_or_else(|| ReportError::UnknownReport(name.to_string()))
    }
}
