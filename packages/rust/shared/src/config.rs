//! Application configuration for jobscout.
//!
//! User config lives at `~/.jobscout/jobscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JobScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "jobscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".jobscout";

// ---------------------------------------------------------------------------
// Config structs (matching jobscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Positional enumeration policy.
    #[serde(default)]
    pub collector: CollectorSection,

    /// Jittered delays between remote interactions.
    #[serde(default)]
    pub pacing: PacingSection,

    /// Page source settings.
    #[serde(default)]
    pub source: SourceSection,

    /// Checkpoint and export locations.
    #[serde(default)]
    pub output: OutputSection,
}

/// `[collector]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorSection {
    /// Hard cap on the position cursor.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u64,

    /// Consecutive failed positions interpreted as "end of listing".
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    /// Tries per position when activating the found element.
    #[serde(default = "default_activation_attempts")]
    pub activation_attempts: u32,

    /// Query parameter carrying the position.
    #[serde(default = "default_position_param")]
    pub position_param: String,

    /// CSS selectors for the listing's first item, tried in order.
    #[serde(default = "default_card_selectors")]
    pub card_selectors: Vec<String>,

    /// Regexes (one capture group) that pull an identifier out of a location.
    #[serde(default = "default_identifier_patterns")]
    pub identifier_patterns: Vec<String>,

    /// Write the identifier checkpoint every N new identifiers.
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            max_consecutive_failures: default_max_consecutive_failures(),
            activation_attempts: default_activation_attempts(),
            position_param: default_position_param(),
            card_selectors: default_card_selectors(),
            identifier_patterns: default_identifier_patterns(),
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

fn default_max_attempts() -> u64 {
    2000
}
fn default_max_consecutive_failures() -> u32 {
    5
}
fn default_activation_attempts() -> u32 {
    3
}
fn default_position_param() -> String {
    "start".into()
}
fn default_card_selectors() -> Vec<String> {
    [
        ".jobs-search-results__list-item",
        ".job-card-container",
        ".jobs-search-results-list__list-item",
        ".jobs-search-two-pane__job-card-container",
        "li.jobs-search-results__list-item",
        ".artdeco-list__item",
        ".base-card",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_identifier_patterns() -> Vec<String> {
    vec![r"currentJobId=(\d+)".into(), r"jobs/view/(?:[^/?#]*-)?(\d+)".into()]
}
fn default_checkpoint_every() -> usize {
    10
}

/// `[pacing]` section. All values in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingSection {
    #[serde(default = "default_position_min_ms")]
    pub position_min_ms: u64,
    #[serde(default = "default_position_max_ms")]
    pub position_max_ms: u64,
    #[serde(default = "default_record_min_ms")]
    pub record_min_ms: u64,
    #[serde(default = "default_record_max_ms")]
    pub record_max_ms: u64,
}

impl Default for PacingSection {
    fn default() -> Self {
        Self {
            position_min_ms: default_position_min_ms(),
            position_max_ms: default_position_max_ms(),
            record_min_ms: default_record_min_ms(),
            record_max_ms: default_record_max_ms(),
        }
    }
}

fn default_position_min_ms() -> u64 {
    1000
}
fn default_position_max_ms() -> u64 {
    2000
}
fn default_record_min_ms() -> u64 {
    2000
}
fn default_record_max_ms() -> u64 {
    3000
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// Listing page that bare query strings are joined onto.
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Document URL for one identifier; `{id}` is substituted.
    #[serde(default = "default_item_url_template")]
    pub item_url_template: String,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Name of the env var holding a session cookie header (never store the cookie itself).
    #[serde(default = "default_cookie_env")]
    pub cookie_env: String,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            item_url_template: default_item_url_template(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            cookie_env: default_cookie_env(),
        }
    }
}

fn default_listing_url() -> String {
    "https://www.linkedin.com/jobs/search/".into()
}
fn default_item_url_template() -> String {
    "https://www.linkedin.com/jobs/view/{id}/".into()
}
fn default_user_agent() -> String {
    concat!("jobscout/", env!("CARGO_PKG_VERSION")).into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_cookie_env() -> String {
    "JOBSCOUT_COOKIE".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Identifier checkpoint file (one identifier per line).
    #[serde(default = "default_checkpoint_file")]
    pub checkpoint_file: String,

    /// Directory for CSV exports.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            checkpoint_file: default_checkpoint_file(),
            export_dir: default_export_dir(),
        }
    }
}

fn default_checkpoint_file() -> String {
    "job_ids.txt".into()
}
fn default_export_dir() -> String {
    ".".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime collector policy.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub max_attempts: u64,
    pub max_consecutive_failures: u32,
    pub activation_attempts: u32,
    pub position_param: String,
    pub card_selectors: Vec<String>,
    pub identifier_patterns: Vec<String>,
    pub checkpoint_every: usize,
}

impl From<&AppConfig> for CollectorConfig {
    fn from(config: &AppConfig) -> Self {
        let c = &config.collector;
        Self {
            max_attempts: c.max_attempts,
            max_consecutive_failures: c.max_consecutive_failures,
            activation_attempts: c.activation_attempts.max(1),
            position_param: c.position_param.clone(),
            card_selectors: c.card_selectors.clone(),
            identifier_patterns: c.identifier_patterns.clone(),
            checkpoint_every: c.checkpoint_every,
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime pacing: `(min, max)` bounds for each jittered delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    pub between_positions: (Duration, Duration),
    pub between_records: (Duration, Duration),
}

impl PacingConfig {
    /// No delays at all (tests, offline extraction).
    pub fn none() -> Self {
        Self {
            between_positions: (Duration::ZERO, Duration::ZERO),
            between_records: (Duration::ZERO, Duration::ZERO),
        }
    }
}

impl From<&AppConfig> for PacingConfig {
    fn from(config: &AppConfig) -> Self {
        let p = &config.pacing;
        Self {
            between_positions: (
                Duration::from_millis(p.position_min_ms),
                Duration::from_millis(p.position_max_ms.max(p.position_min_ms)),
            ),
            between_records: (
                Duration::from_millis(p.record_min_ms),
                Duration::from_millis(p.record_max_ms.max(p.record_min_ms)),
            ),
        }
    }
}

/// Runtime page source settings.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub listing_url: String,
    pub item_url_template: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Cookie header resolved from the configured env var, if set.
    pub cookie: Option<String>,
}

impl SourceConfig {
    /// Document URL for one identifier.
    pub fn item_url(&self, id: &str) -> String {
        self.item_url_template.replace("{id}", id)
    }
}

impl From<&AppConfig> for SourceConfig {
    fn from(config: &AppConfig) -> Self {
        let s = &config.source;
        Self {
            listing_url: s.listing_url.clone(),
            item_url_template: s.item_url_template.clone(),
            user_agent: s.user_agent.clone(),
            timeout: Duration::from_secs(s.timeout_secs),
            cookie: std::env::var(&s.cookie_env).ok().filter(|v| !v.is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.jobscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| JobScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.jobscout/jobscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| JobScoutError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        JobScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| JobScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| JobScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| JobScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_consecutive_failures"));
        assert!(toml_str.contains("JOBSCOUT_COOKIE"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.collector.max_attempts, 2000);
        assert_eq!(parsed.collector.max_consecutive_failures, 5);
        assert_eq!(parsed.source.cookie_env, "JOBSCOUT_COOKIE");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[collector]
max_consecutive_failures = 8
position_param = "offset"

[pacing]
position_min_ms = 0
position_max_ms = 0
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.collector.max_consecutive_failures, 8);
        assert_eq!(config.collector.position_param, "offset");
        assert_eq!(config.collector.activation_attempts, 3);
        assert_eq!(config.pacing.record_max_ms, 3000);
        assert!(!config.collector.card_selectors.is_empty());
    }

    #[test]
    fn collector_config_from_app_config() {
        let mut app = AppConfig::default();
        app.collector.activation_attempts = 0;
        let collector = CollectorConfig::from(&app);
        assert_eq!(collector.max_attempts, 2000);
        // At least one activation attempt is always made.
        assert_eq!(collector.activation_attempts, 1);
        assert_eq!(collector.identifier_patterns.len(), 2);
    }

    #[test]
    fn pacing_bounds_are_ordered() {
        let mut app = AppConfig::default();
        app.pacing.position_min_ms = 500;
        app.pacing.position_max_ms = 100;
        let pacing = PacingConfig::from(&app);
        assert_eq!(pacing.between_positions.0, Duration::from_millis(500));
        assert_eq!(pacing.between_positions.1, Duration::from_millis(500));
    }

    #[test]
    fn item_url_substitutes_id() {
        let source = SourceConfig::from(&AppConfig::default());
        assert_eq!(
            source.item_url("4176105597"),
            "https://www.linkedin.com/jobs/view/4176105597/"
        );
    }

    #[test]
    fn listing_url_defaults_when_section_is_partial() {
        let config: AppConfig = toml::from_str("[source]\ntimeout_secs = 10\n").expect("parse");
        assert_eq!(config.source.listing_url, "https://www.linkedin.com/jobs/search/");
        assert_eq!(SourceConfig::from(&config).listing_url, config.source.listing_url);
    }

    #[test]
    fn load_config_from_reads_file_and_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[collector]\nmax_attempts = 40\n").expect("write");
        assert_eq!(load_config_from(&good).expect("load").collector.max_attempts, 40);

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[collector\n").expect("write");
        assert!(matches!(load_config_from(&bad), Err(JobScoutError::Config { .. })));
    }
}
