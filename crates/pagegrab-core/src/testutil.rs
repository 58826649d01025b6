//! Test utilities: a scripted in-memory browser.
//!
//! Handwritten mocks for the browser traits. All state lives behind a
//! shared `Arc<Mutex<_>>` so tests can assert on recorded calls (launch and
//! close counts, navigations, which selectors were waited for) after the
//! browser itself has been consumed by `close`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::LaunchConfig;
use crate::error::AppError;
use crate::traits::{Browser, BrowserLauncher, Page};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything the mock browser has been asked to do.
#[derive(Default)]
pub struct MockState {
    /// `(selector, inner text)` pairs present in the document.
    pub elements: Vec<(String, String)>,
    pub launches: usize,
    pub closes: usize,
    pub pages_opened: usize,
    pub navigations: Vec<String>,
    /// Timeout passed with each navigation, in call order.
    pub goto_timeouts: Vec<Duration>,
    pub waited_for: Vec<String>,
    pub removed: Vec<String>,
    pub scrolls: Vec<i64>,
    pub launch_error: Option<AppError>,
    pub open_error: Option<AppError>,
    pub goto_error: Option<AppError>,
    pub close_error: Option<AppError>,
    /// Selector whose presence check fails with a protocol error.
    pub failing_wait: Option<String>,
    /// Selector whose removal script fails.
    pub failing_removal: Option<String>,
    /// Scroll step (0-based) that fails.
    pub failing_scroll_step: Option<usize>,
    /// Navigation sleeps this long before succeeding.
    pub goto_delay: Option<Duration>,
}

// ---------------------------------------------------------------------------
// MockLauncher
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockLauncher {
    pub state: Arc<Mutex<MockState>>,
}

impl MockLauncher {
    /// A document containing the given `(selector, text)` elements.
    pub fn with_elements(elements: &[(&str, &str)]) -> Self {
        let launcher = Self::default();
        launcher.state.lock().unwrap().elements = elements
            .iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect();
        launcher
    }

    /// Applies `f` to the shared state, for configuring failures.
    pub fn configure(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn launches(&self) -> usize {
        self.state.lock().unwrap().launches
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn goto_timeouts(&self) -> Vec<Duration> {
        self.state.lock().unwrap().goto_timeouts.clone()
    }

    pub fn waited_for(&self) -> Vec<String> {
        self.state.lock().unwrap().waited_for.clone()
    }
}

impl BrowserLauncher for MockLauncher {
    type Browser = MockBrowser;

    async fn launch(&self, _config: &LaunchConfig) -> Result<MockBrowser, AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.launch_error.take() {
            return Err(e);
        }
        state.launches += 1;
        Ok(MockBrowser {
            state: Arc::clone(&self.state),
        })
    }
}

// ---------------------------------------------------------------------------
// MockBrowser
// ---------------------------------------------------------------------------

pub struct MockBrowser {
    state: Arc<Mutex<MockState>>,
}

impl Browser for MockBrowser {
    type Page = MockPage;

    async fn open_page(&self, _config: &LaunchConfig) -> Result<MockPage, AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.open_error.take() {
            return Err(e);
        }
        state.pages_opened += 1;
        Ok(MockPage {
            state: Arc::clone(&self.state),
        })
    }

    async fn close(self) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.closes += 1;
        match state.close_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// MockPage
// ---------------------------------------------------------------------------

pub struct MockPage {
    state: Arc<Mutex<MockState>>,
}

impl Page for MockPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), AppError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.navigations.push(url.to_string());
            state.goto_timeouts.push(timeout);
            if let Some(e) = state.goto_error.take() {
                return Err(e);
            }
            state.goto_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
        _poll: Duration,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        state.waited_for.push(selector.to_string());
        if state.failing_wait.as_deref() == Some(selector) {
            return Err(AppError::BrowserError("target closed".into()));
        }
        Ok(state.elements.iter().any(|(s, _)| s == selector))
    }

    async fn inner_text(&self, selector: &str) -> Result<Option<String>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .elements
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, text)| text.clone()))
    }

    async fn remove_elements(&self, selector: &str) -> Result<usize, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_removal.as_deref() == Some(selector) {
            return Err(AppError::BrowserError("evaluate failed".into()));
        }
        let before = state.elements.len();
        state.elements.retain(|(s, _)| s != selector);
        let removed = before - state.elements.len();
        state.removed.push(selector.to_string());
        Ok(removed)
    }

    async fn scroll_by(&self, pixels: i64) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_scroll_step == Some(state.scrolls.len()) {
            return Err(AppError::BrowserError("scroll failed".into()));
        }
        state.scrolls.push(pixels);
        Ok(())
    }
}
