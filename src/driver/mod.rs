//! Browser capability surface the scrapers are written against.

mod chrome;

pub use chrome::ChromeDriver;

use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("no element matches `{0}`")]
    NotFound(String),
    #[error("`{selector}` has no `{name}` attribute")]
    MissingAttribute { selector: String, name: String },
    #[error("script failed: {0}")]
    Script(String),
    #[error("browser protocol error: {0}")]
    Protocol(String),
}

/// One browser tab. Selectors are CSS.
#[async_trait]
pub trait Driver: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, DriverError>;

    async fn find_within(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, DriverError>;

    /// Rendered text of the element.
    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    /// Evaluate a JavaScript expression in the page and return its value.
    async fn execute(&self, script: &str) -> Result<Value, DriverError>;
}

pub async fn first<D: Driver>(driver: &D, selector: &str) -> Result<D::Element, DriverError> {
    driver
        .find_all(selector)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| DriverError::NotFound(selector.to_string()))
}

pub async fn first_within<D: Driver>(
    driver: &D,
    parent: &D::Element,
    selector: &str,
) -> Result<D::Element, DriverError> {
    driver
        .find_within(parent, selector)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| DriverError::NotFound(selector.to_string()))
}

pub async fn has_within<D: Driver>(
    driver: &D,
    parent: &D::Element,
    selector: &str,
) -> Result<bool, DriverError> {
    Ok(!driver.find_within(parent, selector).await?.is_empty())
}

pub async fn text_within<D: Driver>(
    driver: &D,
    parent: &D::Element,
    selector: &str,
) -> Result<String, DriverError> {
    let element = first_within(driver, parent, selector).await?;
    driver.text(&element).await
}

/// Text of the first match, or `None` when nothing matches.
pub async fn optional_text_within<D: Driver>(
    driver: &D,
    parent: &D::Element,
    selector: &str,
) -> Result<Option<String>, DriverError> {
    match driver.find_within(parent, selector).await?.first() {
        Some(element) => Ok(Some(driver.text(element).await?)),
        None => Ok(None),
    }
}

pub async fn attribute_of<D: Driver>(
    driver: &D,
    element: &D::Element,
    selector: &str,
    name: &str,
) -> Result<String, DriverError> {
    driver
        .attribute(element, name)
        .await?
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DriverError::MissingAttribute {
            selector: selector.to_string(),
            name: name.to_string(),
        })
}

pub async fn attribute_within<D: Driver>(
    driver: &D,
    parent: &D::Element,
    selector: &str,
    name: &str,
) -> Result<String, DriverError> {
    let element = first_within(driver, parent, selector).await?;
    attribute_of(driver, &element, selector, name).await
}
