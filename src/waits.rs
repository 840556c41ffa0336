//! Fixed waits and bounded polling. These are the only suspension points:
//! post-navigation settle, progressive scroll steps and inter-page pacing.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::PacingSettings;
use crate::driver::{Driver, DriverError};

pub const SCROLL_OFFSET: &str = "window.pageYOffset || document.documentElement.scrollTop";
pub const SCROLL_HEIGHT: &str = "document.body.scrollHeight";
pub const SCROLL_TO_END: &str = "window.scrollTo(0, document.body.scrollHeight)";

#[derive(Debug, Clone)]
pub struct Pacing {
    pub settle: Duration,
    pub scroll_step: i64,
    pub scroll_wait: Duration,
    pub max_scroll_steps: usize,
    pub page_pause: Duration,
    pub view_pause: Duration,
    pub consent_timeout: Duration,
    pub poll_interval: Duration,
}

impl Pacing {
    /// No waiting at all; used against in-memory pages.
    pub fn immediate() -> Self {
        Pacing {
            settle: Duration::ZERO,
            scroll_step: 500,
            scroll_wait: Duration::ZERO,
            max_scroll_steps: 10,
            page_pause: Duration::ZERO,
            view_pause: Duration::ZERO,
            consent_timeout: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }

    /// Let asynchronously loaded content land after a navigation.
    pub async fn settle(&self) {
        pause(self.settle).await;
    }

    pub async fn pause_between_pages(&self) {
        pause(self.page_pause).await;
    }

    pub async fn pause_between_views(&self) {
        pause(self.view_pause).await;
    }

    /// Poll for `selector` until it appears or `timeout` elapses.
    pub async fn wait_for<D: Driver>(
        &self,
        driver: &D,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<D::Element>, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = driver.find_all(selector).await?.into_iter().next() {
                return Ok(Some(element));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            pause(self.poll_interval.max(Duration::from_millis(1))).await;
        }
    }

    /// Step down the page so lazily loaded tiles render, then jump to the end.
    pub async fn scroll_to_bottom<D: Driver>(&self, driver: &D) -> Result<(), DriverError> {
        let start = number(driver.execute(SCROLL_OFFSET).await?);
        let height = number(driver.execute(SCROLL_HEIGHT).await?);
        debug!(start, height, "scrolling listing");

        let step = self.scroll_step.max(1) as usize;
        for position in (start..height).step_by(step).take(self.max_scroll_steps) {
            driver
                .execute(&format!("window.scrollTo(0, {position})"))
                .await?;
            pause(self.scroll_wait).await;
        }

        driver.execute(SCROLL_TO_END).await?;
        pause(self.scroll_wait).await;
        Ok(())
    }
}

impl From<&PacingSettings> for Pacing {
    fn from(s: &PacingSettings) -> Self {
        Pacing {
            settle: Duration::from_millis(s.settle_ms),
            scroll_step: s.scroll_step_px,
            scroll_wait: Duration::from_millis(s.scroll_wait_ms),
            max_scroll_steps: s.max_scroll_steps,
            page_pause: Duration::from_millis(s.page_pause_ms),
            view_pause: Duration::from_millis(s.view_pause_ms),
            consent_timeout: Duration::from_millis(s.consent_timeout_ms),
            poll_interval: Duration::from_millis(s.poll_interval_ms),
        }
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}

fn number(value: serde_json::Value) -> i64 {
    value.as_f64().map(|v| v as i64).unwrap_or(0)
}
