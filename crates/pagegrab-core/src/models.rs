use std::time::Duration;

use serde::Serialize;

/// Where the browser navigates and how long it may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub navigation_url: String,
    pub via_archive: bool,
    pub timeout: Duration,
}

/// Result of removing one overlay selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayRemoval {
    pub selector: String,
    /// Elements removed, or the script error.
    pub result: Result<usize, String>,
}

/// Observable outcome of the best-effort overlay removal step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OverlayReport {
    /// Removal did not run (disabled, or an archive snapshot).
    Skipped,
    Attempted(Vec<OverlayRemoval>),
}

impl OverlayReport {
    /// Total number of elements removed.
    pub fn removed(&self) -> usize {
        match self {
            OverlayReport::Skipped => 0,
            OverlayReport::Attempted(items) => {
                items.iter().filter_map(|r| r.result.as_ref().ok()).sum()
            }
        }
    }
}

/// Observable outcome of the lazy-content scroll step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollReport {
    pub steps_requested: u32,
    pub steps_completed: u32,
    /// Error that stopped scrolling early, if any.
    pub failure: Option<String>,
}

impl ScrollReport {
    pub fn skipped() -> Self {
        Self {
            steps_requested: 0,
            steps_completed: 0,
            failure: None,
        }
    }
}

/// What happened when a candidate selector was tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectorOutcome {
    Matched,
    /// The selector never appeared within its wait budget.
    TimedOut,
    /// The element appeared but had no visible text.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorAttempt {
    pub selector: String,
    pub outcome: SelectorOutcome,
}

/// Text pulled from the first matching content selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub selector: String,
    pub text: String,
    pub attempts: Vec<SelectorAttempt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentQuality {
    Ok,
    TooShort { chars: usize, minimum: usize },
}

/// Everything a successful fetch produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    pub route: Route,
    pub overlays: OverlayReport,
    pub scroll: ScrollReport,
    pub extraction: Extraction,
    pub quality: ContentQuality,
}

impl FetchOutcome {
    pub fn text(&self) -> &str {
        &self.extraction.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_report_counts_only_successes() {
        let report = OverlayReport::Attempted(vec![
            OverlayRemoval {
                selector: ".paywall".into(),
                result: Ok(2),
            },
            OverlayRemoval {
                selector: ".modal".into(),
                result: Ok(0),
            },
            OverlayRemoval {
                selector: ".overlay".into(),
                result: Err("script failed".into()),
            },
        ]);
        assert_eq!(report.removed(), 2);
        assert_eq!(OverlayReport::Skipped.removed(), 0);
    }
}
