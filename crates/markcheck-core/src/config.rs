//! markcheck configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level markcheck configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkcheckConfig {
    /// Output directory for generated reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report formats written by `analyze` when none are given.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    /// Outcome success-rate change, in percentage points, that counts as a
    /// regression or improvement when comparing reports.
    #[serde(default = "default_compare_threshold")]
    pub compare_threshold: f64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./markcheck-reports")
}
fn default_formats() -> Vec<String> {
    vec!["json".to_string()]
}
fn default_compare_threshold() -> f64 {
    5.0
}

impl Default for MarkcheckConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            formats: default_formats(),
            compare_threshold: default_compare_threshold(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order when no path is given:
/// 1. `markcheck.toml` in the current directory
/// 2. `~/.config/markcheck/config.toml`
///
/// Environment variable override: `MARKCHECK_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<MarkcheckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("markcheck.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MarkcheckConfig::default(),
    };

    if let Ok(dir) = std::env::var("MARKCHECK_OUTPUT_DIR") {
        if !dir.trim().is_empty() {
            config.output_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

fn parse_config(content: &str) -> Result<MarkcheckConfig> {
    let config: MarkcheckConfig = toml::from_str(content)?;
    anyhow::ensure!(
        config.compare_threshold.is_finite() && config.compare_threshold >= 0.0,
        "compare_threshold must be a non-negative number"
    );
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("markcheck"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MarkcheckConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("./markcheck-reports"));
        assert_eq!(config.formats, vec!["json"]);
        assert_eq!(config.compare_threshold, 5.0);
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config("formats = [\"html\", \"csv\"]\n").unwrap();
        assert_eq!(config.formats, vec!["html", "csv"]);
        assert_eq!(config.compare_threshold, 5.0);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        assert!(parse_config("compare_threshold = -1.0\n").is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markcheck.toml");
        std::fs::write(&path, "output_dir = \"out\"\ncompare_threshold = 2.5\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.compare_threshold, 2.5);
        assert_eq!(config.formats, vec!["json"]);
    }
}
