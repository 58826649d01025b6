use std::time::Duration;

use pagegrab_core::error::AppError;
use reqwest::Client;

/// Follows HTTP redirects to find the final article URL.
///
/// News aggregators hand out redirect links (`news.google.com/rss/articles/...`)
/// that the archive service cannot snapshot and the paywall allow-list
/// cannot match. Resolving them first lets routing see the real host.
#[derive(Clone)]
pub struct RedirectResolver {
    client: Client,
}

impl RedirectResolver {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(10))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; pagegrab/0.1)")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Generic(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Returns the URL the redirect chain ends at, or `url` unchanged if
    /// the request fails for any reason.
    pub async fn resolve(&self, url: &str) -> String {
        match self.client.get(url).send().await {
            Ok(response) => {
                let resolved = response.url().to_string();
                if resolved != url {
                    tracing::info!(from = %url, to = %resolved, "Resolved redirect");
                }
                resolved
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Redirect resolution failed; using original URL");
                url.to_string()
            }
        }
    }
}
