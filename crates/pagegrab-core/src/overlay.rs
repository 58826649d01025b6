use crate::models::{OverlayRemoval, OverlayReport};
use crate::traits::Page;

/// Best-effort removal of paywall overlays.
///
/// Never fails: a missing overlay is recorded as zero removals and a
/// failing removal script as an error entry.
pub async fn remove_overlays<P: Page>(page: &P, selectors: &[String]) -> OverlayReport {
    let mut removals = Vec::with_capacity(selectors.len());

    for selector in selectors {
        let result = page
            .remove_elements(selector)
            .await
            .map_err(|e| e.to_string());

        match &result {
            Ok(0) => tracing::debug!(%selector, "Overlay not found"),
            Ok(n) => tracing::info!(%selector, removed = n, "Removed overlay"),
            Err(error) => tracing::warn!(%selector, %error, "Overlay removal failed"),
        }

        removals.push(OverlayRemoval {
            selector: selector.clone(),
            result,
        });
    }

    OverlayReport::Attempted(removals)
}
