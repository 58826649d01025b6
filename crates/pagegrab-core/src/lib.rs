pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod output;
pub mod overlay;
pub mod routing;
pub mod scroll;
pub mod traits;

#[cfg(test)]
mod testutil;

pub use config::{FetchConfig, FetchPolicy, QualityPolicy};
pub use error::AppError;
pub use fetch::FetchService;
pub use models::{ContentQuality, FetchOutcome, Route};
pub use traits::{Browser, BrowserLauncher, Page};
