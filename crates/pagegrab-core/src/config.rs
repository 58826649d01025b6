//! Injected configuration for a single fetch.
//!
//! Every knob that used to be a literal in the fetch scripts (launch flags,
//! selector lists, the paywall allow-list, timeouts) lives here so callers
//! and tests can substitute their own values. All records deserialize from
//! JSON with per-field defaults, so a config file only needs the keys it
//! overrides.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Placeholder substituted with the percent-encoded target URL.
pub const URL_PLACEHOLDER: &str = "{url}";

/// How the target URL is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Navigate straight to the target URL.
    Direct,
    /// Route through the archive only when the host is on the allow-list.
    #[default]
    ArchiveRouting,
    /// Route every URL through the archive.
    ArchiveForced,
    /// Navigate directly and scroll before extracting to trigger lazy content.
    ScrollThenExtract,
}

impl FetchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchPolicy::Direct => "direct",
            FetchPolicy::ArchiveRouting => "archive-routing",
            FetchPolicy::ArchiveForced => "archive-forced",
            FetchPolicy::ScrollThenExtract => "scroll-then-extract",
        }
    }

    /// Whether the page is scrolled before extraction.
    pub fn scrolls(&self) -> bool {
        matches!(self, FetchPolicy::ScrollThenExtract)
    }
}

impl std::fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(FetchPolicy::Direct),
            "archive-routing" => Ok(FetchPolicy::ArchiveRouting),
            "archive-forced" => Ok(FetchPolicy::ArchiveForced),
            "scroll-then-extract" => Ok(FetchPolicy::ScrollThenExtract),
            other => Err(AppError::ConfigError(format!(
                "Unknown fetch policy '{other}' (expected direct, archive-routing, \
                 archive-forced or scroll-then-extract)"
            ))),
        }
    }
}

/// What to do when extracted text is shorter than the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityPolicy {
    /// Log a warning, still print the text and exit successfully.
    #[default]
    Warn,
    /// Fail the run with a low-quality error.
    Reject,
}

/// Browser launch and tab settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub headless: bool,
    pub no_sandbox: bool,
    /// Extra Chromium command-line flags.
    pub args: Vec<String>,
    /// Explicit Chrome/Chromium binary. `None` lets the backend look one up.
    pub executable: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: Option<String>,
    /// Headers sent with every request from the tab.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        let extra_headers = BTreeMap::from([
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
            ("Upgrade-Insecure-Requests".to_string(), "1".to_string()),
        ]);

        Self {
            headless: true,
            no_sandbox: true,
            args: vec![
                "--disable-setuid-sandbox".to_string(),
                "--disable-blink-features=AutomationControlled".to_string(),
            ],
            executable: None,
            window_width: 1280,
            window_height: 800,
            user_agent: None,
            extra_headers,
        }
    }
}

/// Archive snapshot service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Endpoint template; must contain `{url}`.
    pub url_template: String,
    /// Hard-paywall domains routed through the archive under
    /// [`FetchPolicy::ArchiveRouting`]. Subdomains match too.
    pub domains: Vec<String>,
    /// Navigation budget for archive pages. Archiving a page on demand
    /// can take minutes.
    pub timeout_secs: u64,
}

impl ArchiveConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            url_template: "https://archive.ph/?run=1&url={url}".to_string(),
            domains: ["bloomberg.com", "wsj.com", "ft.com", "nytimes.com"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout_secs: 180,
        }
    }
}

/// Direct navigation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub timeout_secs: u64,
    /// Hard deadline for the whole run (launch to extraction).
    pub deadline_secs: u64,
}

impl NavigationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            deadline_secs: 300,
        }
    }
}

/// Content extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Candidate content containers, most specific first.
    pub selectors: Vec<String>,
    pub selector_wait_ms: u64,
    pub poll_interval_ms: u64,
    /// Trimmed text shorter than this is considered low quality.
    pub min_chars: usize,
    pub quality: QualityPolicy,
}

impl ExtractionConfig {
    pub fn selector_wait(&self) -> Duration {
        Duration::from_millis(self.selector_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            selectors: ["#maincontent", ".ARTICLE", ".article-body", "article", "body"]
                .into_iter()
                .map(String::from)
                .collect(),
            selector_wait_ms: 10_000,
            poll_interval_ms: 100,
            min_chars: 50,
            quality: QualityPolicy::Warn,
        }
    }
}

/// Paywall overlay removal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub selectors: Vec<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            selectors: [".paywall", ".overlay", ".modal", ".subscribe-banner"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Lazy-content scrolling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub steps: u32,
    pub distance_px: i64,
    pub pause_ms: u64,
    /// Random extra pause (uniform `[0, jitter_ms)`) between steps.
    pub jitter_ms: u64,
}

impl ScrollConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            steps: 10,
            distance_px: 500,
            pause_ms: 300,
            jitter_ms: 300,
        }
    }
}

/// Everything a [`crate::fetch::FetchService`] needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub policy: FetchPolicy,
    pub launch: LaunchConfig,
    pub archive: ArchiveConfig,
    pub navigation: NavigationConfig,
    pub extraction: ExtractionConfig,
    pub overlays: OverlayConfig,
    pub scroll: ScrollConfig,
}

impl FetchConfig {
    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigError(format!("Invalid JSON in config file {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The longest navigation budget any route can be given.
    ///
    /// Browser backends with their own per-command timeout must allow at
    /// least this much.
    pub fn longest_navigation(&self) -> Duration {
        self.archive.timeout().max(self.navigation.timeout())
    }

    /// Reject configurations that can never produce a result.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.extraction.selectors.is_empty() {
            return Err(AppError::ConfigError(
                "extraction.selectors must not be empty".into(),
            ));
        }
        if let Some(blank) = self
            .extraction
            .selectors
            .iter()
            .find(|s| s.trim().is_empty())
        {
            return Err(AppError::ConfigError(format!(
                "extraction.selectors contains a blank selector: {blank:?}"
            )));
        }
        if !self.archive.url_template.contains(URL_PLACEHOLDER) {
            return Err(AppError::ConfigError(format!(
                "archive.url_template must contain {URL_PLACEHOLDER}"
            )));
        }
        if self.archive.timeout_secs == 0
            || self.navigation.timeout_secs == 0
            || self.navigation.deadline_secs == 0
        {
            return Err(AppError::ConfigError(
                "navigation and archive timeouts must be at least 1 second".into(),
            ));
        }
        if self.extraction.selector_wait_ms == 0 || self.extraction.poll_interval_ms == 0 {
            return Err(AppError::ConfigError(
                "extraction.selector_wait_ms and poll_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}
