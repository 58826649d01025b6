use std::time::Duration;

use crate::config::ScrollConfig;
use crate::models::ScrollReport;
use crate::traits::Page;

/// Scrolls the page step by step to trigger lazy-loaded content.
///
/// A failing step stops the loop; the failure is reported, not returned.
pub async fn scroll_page<P: Page>(page: &P, config: &ScrollConfig) -> ScrollReport {
    let mut report = ScrollReport {
        steps_requested: config.steps,
        steps_completed: 0,
        failure: None,
    };

    for step in 0..config.steps {
        if let Err(e) = page.scroll_by(config.distance_px).await {
            tracing::warn!(step, error = %e, "Scrolling stopped early");
            report.failure = Some(e.to_string());
            break;
        }
        report.steps_completed += 1;

        if step + 1 < config.steps {
            tokio::time::sleep(step_pause(config)).await;
        }
    }

    tracing::debug!(
        steps = report.steps_completed,
        requested = report.steps_requested,
        "Scrolling finished"
    );
    report
}

/// Base pause plus random jitter in `[0, jitter_ms)`.
fn step_pause(config: &ScrollConfig) -> Duration {
    config.pause() + Duration::from_millis(rand_jitter_ms(config.jitter_ms))
}

// Xorshift seeded from the clock; enough to make scroll timing uneven.
fn rand_jitter_ms(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x % max_ms
}
