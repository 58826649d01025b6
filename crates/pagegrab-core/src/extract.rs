//! Content extraction policy.
//!
//! Candidate selectors are tried in order. Each gets a bounded wait; the
//! first one whose element yields visible text wins and later candidates
//! are never tried. An element that exists but is blank only wins when
//! nothing better turns up, leaving the verdict to the quality policy.

use crate::config::ExtractionConfig;
use crate::error::AppError;
use crate::models::{ContentQuality, Extraction, SelectorAttempt, SelectorOutcome};
use crate::traits::Page;

/// Extracts the visible text of the primary content region.
///
/// If only blank elements matched, the last of them is returned and its
/// text is left to [`assess_quality`]. Fails with
/// [`AppError::ContentNotFound`] when no candidate matched at all.
/// Protocol errors on one selector are recorded and the next candidate is
/// tried.
pub async fn extract_content<P: Page>(
    page: &P,
    config: &ExtractionConfig,
) -> Result<Extraction, AppError> {
    let mut attempts = Vec::with_capacity(config.selectors.len());
    let mut blank: Option<(String, String)> = None;

    for selector in &config.selectors {
        let outcome = match try_selector(page, selector, config).await {
            Ok(text) if text.trim().is_empty() => {
                blank = Some((selector.clone(), text));
                SelectorOutcome::Empty
            }
            Ok(text) => {
                tracing::info!(%selector, chars = text.chars().count(), "Extracted content");
                attempts.push(SelectorAttempt {
                    selector: selector.clone(),
                    outcome: SelectorOutcome::Matched,
                });
                return Ok(Extraction {
                    selector: selector.clone(),
                    text,
                    attempts,
                });
            }
            Err(TryError::TimedOut) => SelectorOutcome::TimedOut,
            Err(TryError::Failed(e)) => SelectorOutcome::Failed(e.to_string()),
        };

        match &outcome {
            SelectorOutcome::TimedOut => tracing::warn!(%selector, "Selector not found"),
            SelectorOutcome::Empty => tracing::warn!(%selector, "Selector matched but had no text"),
            SelectorOutcome::Failed(error) => {
                tracing::warn!(%selector, %error, "Selector check failed")
            }
            SelectorOutcome::Matched => {}
        }

        attempts.push(SelectorAttempt {
            selector: selector.clone(),
            outcome,
        });
    }

    if let Some((selector, text)) = blank {
        tracing::warn!(%selector, "Only blank content containers matched");
        return Ok(Extraction {
            selector,
            text,
            attempts,
        });
    }

    Err(AppError::ContentNotFound {
        tried: attempts.into_iter().map(|a| a.selector).collect(),
    })
}

enum TryError {
    TimedOut,
    Failed(AppError),
}

async fn try_selector<P: Page>(
    page: &P,
    selector: &str,
    config: &ExtractionConfig,
) -> Result<String, TryError> {
    let present = page
        .wait_for_selector(selector, config.selector_wait(), config.poll_interval())
        .await
        .map_err(TryError::Failed)?;
    if !present {
        return Err(TryError::TimedOut);
    }

    let text = page.inner_text(selector).await.map_err(TryError::Failed)?;
    Ok(text.unwrap_or_default())
}

/// Compares the trimmed character count against `minimum`.
pub fn assess_quality(text: &str, minimum: usize) -> ContentQuality {
    let chars = text.trim().chars().count();
    if chars < minimum {
        ContentQuality::TooShort { chars, minimum }
    } else {
        ContentQuality::Ok
    }
}
