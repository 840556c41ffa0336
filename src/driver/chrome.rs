use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Driver, DriverError};

/// Chrome over the DevTools protocol, driving a single tab.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeDriver {
    pub async fn launch(show_browser: bool) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder();
        if show_browser {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser event loop stopped");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(protocol)?;
        info!(headless = !show_browser, "browser session started");
        Ok(ChromeDriver {
            browser,
            page,
            handler,
        })
    }

    /// Shut the browser down. Errors are logged, never returned.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser did not close cleanly");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "waiting for browser process failed");
        }
        self.handler.abort();
        info!("browser session closed");
    }
}

fn protocol(e: CdpError) -> DriverError {
    DriverError::Protocol(e.to_string())
}

#[async_trait]
impl Driver for ChromeDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        self.page.find_elements(selector).await.map_err(protocol)
    }

    async fn find_within(&self, parent: &Element, selector: &str) -> Result<Vec<Element>, DriverError> {
        parent.find_elements(selector).await.map_err(protocol)
    }

    async fn text(&self, element: &Element) -> Result<String, DriverError> {
        Ok(element.inner_text().await.map_err(protocol)?.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, DriverError> {
        element.attribute(name).await.map_err(protocol)
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.click().await.map_err(protocol)?;
        Ok(())
    }

    async fn execute(&self, script: &str) -> Result<Value, DriverError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}
