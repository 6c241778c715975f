//! Configuration loading from deadcss.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::pipeline::EvidencePolicy;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "deadcss.toml";

/// Default text evidence extensions.
pub const DEFAULT_SRC_EXTENSIONS: &[&str] = &[".php", ".py", ".rb", ".js"];

/// Default DOM evidence extensions.
pub const DEFAULT_HTML_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// Main configuration structure for deadcss.toml.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct DeadcssConfig {
    /// Extensions of source files searched for ids and classes.
    pub src_extensions: Option<Vec<String>>,
    /// Extensions of HTML documents used for DOM matching.
    pub html_extensions: Option<Vec<String>>,
    /// Directory names pruned during discovery, on top of the defaults.
    pub exclude_dirs: Option<Vec<String>>,
    /// Abort on the first unreadable file.
    pub fail_fast: Option<bool>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
    /// Path the JSON report is written to.
    pub json_export: Option<String>,
}

impl DeadcssConfig {
    pub fn src_extensions(&self) -> Vec<String> {
        self.src_extensions
            .clone()
            .unwrap_or_else(|| DEFAULT_SRC_EXTENSIONS.iter().map(|s| s.to_string()).collect())
    }

    pub fn html_extensions(&self) -> Vec<String> {
        self.html_extensions
            .clone()
            .unwrap_or_else(|| DEFAULT_HTML_EXTENSIONS.iter().map(|s| s.to_string()).collect())
    }

    pub fn exclude_dirs(&self) -> Vec<String> {
        self.exclude_dirs.clone().unwrap_or_default()
    }

    pub fn evidence_policy(&self) -> EvidencePolicy {
        if self.fail_fast.unwrap_or(false) {
            EvidencePolicy::Abort
        } else {
            EvidencePolicy::Skip
        }
    }

    /// Whether JSON was requested as the stdout format.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }

    pub fn json_export(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.json_export.as_deref())
    }
}

/// Loads configuration from deadcss.toml in `root` if it exists.
pub fn load_config(root: &Path) -> Result<Option<DeadcssConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads configuration from an explicit file, which must exist.
pub fn load_config_file(path: &Path) -> Result<DeadcssConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let cfg: DeadcssConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    if let Some(format) = cfg.output.as_ref().and_then(|o| o.format.as_deref()) {
        if !matches!(format.to_ascii_lowercase().as_str(), "plain" | "json") {
            return Err(crate::error::DeadcssError::config(
                path,
                format!("unknown output format {:?}, expected \"plain\" or \"json\"", format),
            )
            .into());
        }
    }
    Ok(cfg)
}
