//! Per-site knowledge: where listings live, how entries look, and how a
//! detail page is turned into `MovieDetails`.

pub mod epika;
pub mod fields;
pub mod mediateka;

pub use epika::Epika;
pub use mediateka::Mediateka;

use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

use crate::driver::{Driver, DriverError};
use crate::model::{Candidate, MovieDetails};
use crate::site::Site;
use crate::waits::Pacing;

#[async_trait]
pub trait SiteSession: Send + Sync {
    fn site(&self) -> Site;

    /// Page opened once per browser session to get past the cookie dialog.
    fn landing_url(&self) -> &str;

    /// Best effort; a missing dialog is not an error.
    async fn dismiss_consent<D: Driver>(&self, driver: &D, pacing: &Pacing);
}

/// Shallow pass: listing views and the entries on them.
#[async_trait]
pub trait ListingSource: SiteSession {
    fn listing_urls(&self) -> Vec<String>;

    /// Trigger progressive loading on the current listing view.
    async fn load_listing<D: Driver>(&self, driver: &D, pacing: &Pacing) -> Result<(), DriverError>;

    /// One result per movie entry on the current view. Entries that are not
    /// movies are left out; entries missing a required field come back as
    /// errors so the caller can log and skip them.
    async fn read_entries<D: Driver>(
        &self,
        driver: &D,
        base: &Url,
    ) -> Result<Vec<Result<Candidate, DriverError>>, DriverError>;
}

/// Deep pass: one implementation per site.
#[async_trait]
pub trait FieldExtractor: SiteSession {
    /// Runs after navigation, before `extract`.
    async fn prepare_page<D: Driver>(&self, _driver: &D, _pacing: &Pacing) {}

    /// Read whatever the loaded detail page offers. Never fails; missing
    /// fields stay `None`.
    async fn extract<D: Driver>(&self, driver: &D, candidate: &Candidate) -> MovieDetails;
}

/// Open the landing page and deal with the consent dialog.
pub async fn open_session<S: SiteSession, D: Driver>(site: &S, driver: &D, pacing: &Pacing) {
    let url = site.landing_url();
    if let Err(e) = driver.navigate(url).await {
        warn!(site = %site.site(), %url, error = %e, "landing page did not load");
        return;
    }
    pacing.settle().await;
    site.dismiss_consent(driver, pacing).await;
    info!(site = %site.site(), "session ready");
}

/// Click the first element matching `selector` once it shows up.
pub(crate) async fn click_when_ready<D: Driver>(
    driver: &D,
    pacing: &Pacing,
    selector: &str,
) -> Result<bool, DriverError> {
    match pacing.wait_for(driver, selector, pacing.consent_timeout).await? {
        Some(button) => {
            driver.click(&button).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Resolve a possibly relative link against the listing page.
pub(crate) fn absolutize(base: &Url, href: &str) -> String {
    base.join(href.trim())
        .map(String::from)
        .unwrap_or_else(|_| href.trim().to_string())
}
