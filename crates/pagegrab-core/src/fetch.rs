use crate::config::{FetchConfig, QualityPolicy};
use crate::error::AppError;
use crate::extract::{assess_quality, extract_content};
use crate::models::{ContentQuality, FetchOutcome, OverlayReport, Route, ScrollReport};
use crate::overlay::remove_overlays;
use crate::routing::plan_route;
use crate::scroll::scroll_page;
use crate::traits::{Browser, BrowserLauncher, Page};

/// Runs a single fetch: route → launch → navigate → clean up overlays →
/// scroll → extract → close.
///
/// Generic over the browser backend, so the whole pipeline runs against
/// the in-memory mock in tests.
pub struct FetchService<L>
where
    L: BrowserLauncher,
{
    launcher: L,
    config: FetchConfig,
}

impl<L> FetchService<L>
where
    L: BrowserLauncher,
{
    pub fn new(launcher: L, config: FetchConfig) -> Self {
        Self { launcher, config }
    }

    /// Fetches the visible text of `target`.
    ///
    /// The browser is closed exactly once on every path after a
    /// successful launch, including when the run deadline elapses.
    pub async fn fetch(&self, target: &str) -> Result<FetchOutcome, AppError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(AppError::Usage("No URL provided. Usage: pagegrab <URL>".into()));
        }

        let route = plan_route(target, self.config.policy, &self.config);
        if route.via_archive {
            tracing::info!(url = %route.navigation_url, "Routing through archive snapshot");
        } else {
            tracing::info!(
                url = %route.navigation_url,
                policy = %self.config.policy,
                "Navigating directly"
            );
        }

        let browser = self.launcher.launch(&self.config.launch).await?;

        let deadline = self.config.navigation.deadline();
        let result = match tokio::time::timeout(deadline, self.run(&browser, route)).await {
            Ok(inner) => inner,
            Err(_) => Err(AppError::Timeout(deadline.as_secs())),
        };

        // Close failures never mask the primary outcome.
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "Failed to close browser");
        }

        result
    }

    async fn run(&self, browser: &L::Browser, route: Route) -> Result<FetchOutcome, AppError> {
        let page = browser.open_page(&self.config.launch).await?;

        page.goto(&route.navigation_url, route.timeout).await?;
        tracing::debug!(url = %route.navigation_url, "Page loaded");

        let overlays = if self.config.overlays.enabled && !route.via_archive {
            remove_overlays(&page, &self.config.overlays.selectors).await
        } else {
            OverlayReport::Skipped
        };

        let scroll = if self.config.policy.scrolls() {
            scroll_page(&page, &self.config.scroll).await
        } else {
            ScrollReport::skipped()
        };

        let extraction = extract_content(&page, &self.config.extraction).await?;

        let quality = assess_quality(&extraction.text, self.config.extraction.min_chars);
        if let ContentQuality::TooShort { chars, minimum } = quality {
            match self.config.extraction.quality {
                QualityPolicy::Warn => {
                    tracing::warn!(chars, minimum, "Article content too short or missing")
                }
                QualityPolicy::Reject => {
                    return Err(AppError::LowQualityContent { chars, minimum });
                }
            }
        }

        Ok(FetchOutcome {
            route,
            overlays,
            scroll,
            extraction,
            quality,
        })
    }
}
