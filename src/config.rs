//! Load runtime configuration.

use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use directories::ProjectDirs;
use tracing::info;

use crate::error::ReportError;
use crate::profile::ReportProfile;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ReportsCfg {
    /// Directory of stored reports; platform data dir when unset.
    pub dir: Option<PathBuf>,
    pub extension: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayCfg {
    pub currency_symbol: String,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub reports: ReportsCfg,
    pub display: DisplayCfg,
    /// Name of the active profile.
    pub profile: String,
    /// Custom profiles; a name shadows the built-in of the same name.
    pub profiles: Vec<ReportProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reports: ReportsCfg::default(),
            display: DisplayCfg::default(),
            profile: ReportProfile::STANDARD.to_string(),
            profiles: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: Self = serde_yaml::from_str(&s)?;
        Ok(cfg)
    }

    /// Defaults when the file does not exist; a present but invalid file is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn reports_dir(&self) -> PathBuf {
        if let Some(dir) = &self.reports.dir {
            return dir.clone();
        }
        ProjectDirs::from("", "", "wheel-report")
            .map(|d| d.data_dir().join("reports"))
            .unwrap_or_else(|| PathBuf::from("reports"))
    }

    pub fn extension(&self) -> &str {
        self.reports.extension.as_deref().unwrap_or("txt")
    }

    pub fn resolve_profile(&self, name: &str) -> Result<ReportProfile, ReportError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .or_else(|| ReportProfile::builtin(name))
            .ok_or_else(|| ReportError::UnknownProfile(name.to_string()))
    }
}
