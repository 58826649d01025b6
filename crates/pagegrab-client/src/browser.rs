use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, Headers, SetExtraHttpHeadersParams,
};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{BrowserConfig, Page as CdpPage};
use futures::StreamExt;
use pagegrab_core::config::{FetchConfig, LaunchConfig};
use pagegrab_core::error::AppError;
use pagegrab_core::traits::{Browser, BrowserLauncher, Page};
use tokio::task::JoinHandle;

/// How often `document.readyState` is checked after navigation commits.
const READY_POLL: Duration = Duration::from_millis(100);

/// Launches headless Chromium via the Chrome DevTools Protocol.
///
/// Requires a Chromium / Chrome binary: either [`LaunchConfig::executable`],
/// `$CHROME_BIN`, one of the well-known install locations, or whatever
/// `chromiumoxide` finds on its own.
///
/// # Example
///
/// ```rust,no_run
/// use pagegrab_client::ChromiumLauncher;
/// use pagegrab_core::{FetchConfig, FetchService};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FetchConfig::default();
/// let service = FetchService::new(ChromiumLauncher::for_config(&config), config);
/// let outcome = service.fetch("https://example.com").await?;
/// println!("{}", outcome.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChromiumLauncher {
    /// CDP command timeout. chromiumoxide drops any command still pending
    /// after this long, so it bounds every navigation.
    request_timeout: Duration,
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self::for_config(&FetchConfig::default())
    }
}

impl ChromiumLauncher {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    /// A launcher whose command timeout fits the longest route in `config`.
    pub fn for_config(config: &FetchConfig) -> Self {
        Self::new(config.longest_navigation())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Tries to locate the real Chrome/Chromium binary.
    ///
    /// On systems where Chromium is installed via **snap**, the wrapper at
    /// `/snap/bin/chromium` strips unknown CLI flags, breaking headless mode,
    /// so the binary inside the snap is preferred. Returns `None` to let
    /// `chromiumoxide` do its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        let candidates: &[&str] = &[
            // Snap (Ubuntu default)
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            // Flatpak
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            // Common apt / manual installs
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            // macOS
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        ];

        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }

    fn browser_config(&self, config: &LaunchConfig) -> Result<BrowserConfig, AppError> {
        let mut builder = BrowserConfig::builder()
            .disable_default_args()
            .request_timeout(self.request_timeout)
            .window_size(config.window_width, config.window_height);

        if config.no_sandbox {
            builder = builder.no_sandbox();
        }

        if config.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        let executable = config
            .executable
            .as_ref()
            .map(PathBuf::from)
            .or_else(Self::find_chrome_binary);
        if let Some(bin) = executable {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-translate")
            .arg("--no-first-run")
            .args(config.args.iter().map(String::as_str))
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))
    }
}

impl BrowserLauncher for ChromiumLauncher {
    type Browser = ChromiumBrowser;

    async fn launch(&self, config: &LaunchConfig) -> Result<ChromiumBrowser, AppError> {
        let browser_config = self.browser_config(config)?;

        let (browser, mut handler) = chromiumoxide::Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::debug!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        tracing::debug!("Browser launched");
        Ok(ChromiumBrowser { browser, handler })
    }
}

/// A running Chromium process and its CDP handler task.
pub struct ChromiumBrowser {
    browser: chromiumoxide::Browser,
    handler: JoinHandle<()>,
}

impl Browser for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn open_page(&self, config: &LaunchConfig) -> Result<ChromiumPage, AppError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to open tab: {e}")))?;

        if let Some(user_agent) = &config.user_agent {
            page.execute(SetUserAgentOverrideParams::new(user_agent.clone()))
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to set user agent: {e}")))?;
        }

        if !config.extra_headers.is_empty() {
            let headers = serde_json::to_value(&config.extra_headers)
                .map_err(|e| AppError::BrowserError(format!("Invalid extra headers: {e}")))?;
            page.execute(EnableParams::default())
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to enable network: {e}")))?;
            page.execute(SetExtraHttpHeadersParams::new(Headers::new(headers)))
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to set headers: {e}")))?;
        }

        Ok(ChromiumPage { page })
    }

    async fn close(self) -> Result<(), AppError> {
        let Self {
            mut browser,
            handler,
        } = self;

        let result = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| AppError::BrowserError(format!("Failed to close browser: {e}")));
        // Reap the child process so no zombie outlives the run.
        if let Err(e) = browser.wait().await {
            tracing::debug!("Failed to reap browser process: {e}");
        }
        handler.abort();

        tracing::debug!("Browser closed");
        result
    }
}

/// One Chromium tab.
pub struct ChromiumPage {
    page: CdpPage,
}

impl ChromiumPage {
    async fn eval_count(&self, script: String) -> Result<usize, AppError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| AppError::BrowserError(format!("Script evaluation failed: {e}")))?
            .into_value::<usize>()
            .map_err(|e| AppError::BrowserError(format!("Unexpected script result: {e}")))
    }
}

/// Quotes `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl Page for ChromiumPage {
    /// Issues `Page.navigate` directly rather than `Page::goto`, whose
    /// built-in 30 s load wait would cut archive navigations short. The
    /// page counts as loaded once the document is parsed.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), AppError> {
        let deadline = tokio::time::Instant::now() + timeout;

        let navigate = self.page.execute(NavigateParams::new(url));
        let response = match tokio::time::timeout_at(deadline, navigate).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(AppError::NavigationError(format!(
                    "Failed to navigate to {url}: {e}"
                )));
            }
            Err(_) => return Err(AppError::Timeout(timeout.as_secs())),
        };
        if let Some(error) = &response.result.error_text {
            return Err(AppError::NavigationError(format!(
                "Failed to navigate to {url}: {error}"
            )));
        }

        // The old execution context may be torn down mid-poll, so evaluate
        // errors only count once the deadline is reached.
        let mut last_error = None;
        loop {
            match self.page.evaluate("document.readyState !== 'loading'").await {
                Ok(result) => match result.into_value::<bool>() {
                    Ok(true) => return Ok(()),
                    Ok(false) => {}
                    Err(e) => last_error = Some(e.to_string()),
                },
                Err(e) => last_error = Some(e.to_string()),
            }
            if tokio::time::Instant::now() + READY_POLL > deadline {
                return Err(match last_error {
                    Some(e) => AppError::NavigationError(format!(
                        "Document at {url} never became ready: {e}"
                    )),
                    None => AppError::Timeout(timeout.as_secs()),
                });
            }
            tokio::time::sleep(READY_POLL).await;
        }
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<bool, AppError> {
        let deadline = tokio::time::Instant::now() + timeout;
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        loop {
            let present = self
                .page
                .evaluate(script.as_str())
                .await
                .map_err(|e| {
                    AppError::BrowserError(format!("Presence check for {selector} failed: {e}"))
                })?
                .into_value::<bool>()
                .map_err(|e| {
                    AppError::BrowserError(format!("Unexpected presence check result: {e}"))
                })?;
            if present {
                return Ok(true);
            }
            if tokio::time::Instant::now() + poll > deadline {
                return Ok(false);
            }
            tokio::time::sleep(poll).await;
        }
    }

    async fn inner_text(&self, selector: &str) -> Result<Option<String>, AppError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| AppError::BrowserError(format!("Element {selector} vanished: {e}")))?;
        element
            .inner_text()
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to read text of {selector}: {e}")))
    }

    async fn remove_elements(&self, selector: &str) -> Result<usize, AppError> {
        let script = format!(
            "(() => {{ const els = document.querySelectorAll({}); \
             els.forEach(el => el.remove()); return els.length; }})()",
            js_string(selector)
        );
        self.eval_count(script).await
    }

    async fn scroll_by(&self, pixels: i64) -> Result<(), AppError> {
        self.page
            .evaluate(format!("window.scrollBy(0, {pixels})"))
            .await
            .map(|_| ())
            .map_err(|e| AppError::BrowserError(format!("Scroll failed: {e}")))
    }
}
