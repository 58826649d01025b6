use std::future::Future;
use std::time::Duration;

use crate::config::LaunchConfig;
use crate::error::AppError;

/// Starts browser processes.
pub trait BrowserLauncher: Send + Sync {
    type Browser: Browser;

    fn launch(
        &self,
        config: &LaunchConfig,
    ) -> impl Future<Output = Result<Self::Browser, AppError>> + Send;
}

/// A running browser instance. Exclusively owned by one fetch.
pub trait Browser: Send + Sync {
    type Page: Page;

    /// Opens a blank tab with the configured user agent and headers applied.
    fn open_page(
        &self,
        config: &LaunchConfig,
    ) -> impl Future<Output = Result<Self::Page, AppError>> + Send;

    /// Shuts the browser process down.
    fn close(self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// One tab, the DOM-level primitives the fetch pipeline needs.
pub trait Page: Send + Sync {
    /// Navigates and waits for the document to be parsed.
    fn goto(&self, url: &str, timeout: Duration)
    -> impl Future<Output = Result<(), AppError>> + Send;

    /// Polls for `selector` until it exists or `timeout` elapses.
    ///
    /// Returns `Ok(false)` on timeout; `Err` only for protocol failures.
    fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Rendered `innerText` of the first element matching `selector`.
    fn inner_text(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    /// Removes every element matching `selector`, returning how many were removed.
    fn remove_elements(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<usize, AppError>> + Send;

    /// Scrolls the window vertically by `pixels`.
    fn scroll_by(&self, pixels: i64) -> impl Future<Output = Result<(), AppError>> + Send;
}
