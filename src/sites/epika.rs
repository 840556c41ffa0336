use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::fields::parse_meta_strip;
use super::{absolutize, click_when_ready, FieldExtractor, ListingSource, SiteSession};
use crate::config::EpikaSettings;
use crate::driver::{self, Driver, DriverError};
use crate::model::{Candidate, MovieDetails};
use crate::site::Site;
use crate::waits::Pacing;

pub const LANDING_URL: &str = "https://epika.lrt.lt/search";

pub mod selectors {
    pub const CONSENT_ACCEPT: &str = "button[aria-label='Sutikti ir judėti toliau']";
    pub const TILE: &str = ".tile--vod.tile";
    pub const TILE_TITLE: &str = ".headline-4.tile__title";
    pub const TILE_LINK: &str = ".tile__link";
    pub const TILE_COVER: &str = ".cover";
    pub const META_STRIP: &str = "div.metadata__product-meta";
    pub const META_ELEMENT: &str = "span.metadata__product-meta-element";
    pub const DESCRIPTION: &str = "div.metadata-content__description";
}

use selectors::*;

/// epika.lrt.lt: searched once per configured term, metadata strip on the
/// detail page.
#[derive(Debug, Clone)]
pub struct Epika {
    search_terms: Vec<String>,
}

impl Epika {
    pub fn new(settings: &EpikaSettings) -> Self {
        Epika {
            search_terms: settings.search_terms.clone(),
        }
    }

    pub fn search_url(term: &str) -> String {
        match Url::parse_with_params(LANDING_URL, &[("q", term)]) {
            Ok(url) => url.into(),
            Err(_) => format!("{LANDING_URL}?q={term}"),
        }
    }
}

#[async_trait]
impl SiteSession for Epika {
    fn site(&self) -> Site {
        Site::Epika
    }

    fn landing_url(&self) -> &str {
        LANDING_URL
    }

    async fn dismiss_consent<D: Driver>(&self, driver: &D, pacing: &Pacing) {
        match click_when_ready(driver, pacing, CONSENT_ACCEPT).await {
            Ok(true) => debug!("cookies accepted"),
            Ok(false) => debug!("no cookie dialog"),
            Err(e) => warn!(error = %e, "cookie consent handling failed"),
        }
    }
}

#[async_trait]
impl ListingSource for Epika {
    fn listing_urls(&self) -> Vec<String> {
        self.search_terms.iter().map(|t| Self::search_url(t)).collect()
    }

    async fn load_listing<D: Driver>(&self, driver: &D, pacing: &Pacing) -> Result<(), DriverError> {
        pacing.scroll_to_bottom(driver).await
    }

    async fn read_entries<D: Driver>(
        &self,
        driver: &D,
        base: &Url,
    ) -> Result<Vec<Result<Candidate, DriverError>>, DriverError> {
        let tiles = driver.find_all(TILE).await?;
        let mut entries = Vec::with_capacity(tiles.len());
        for tile in &tiles {
            entries.push(read_tile(driver, tile, base).await);
        }
        Ok(entries)
    }
}

async fn read_tile<D: Driver>(driver: &D, tile: &D::Element, base: &Url) -> Result<Candidate, DriverError> {
    let title = driver::text_within(driver, tile, TILE_TITLE).await?;
    let link = driver::attribute_within(driver, tile, TILE_LINK, "href").await?;
    let cover = driver::attribute_within(driver, tile, TILE_COVER, "src").await?;
    Ok(Candidate::new(
        title.trim(),
        absolutize(base, &link),
        absolutize(base, &cover),
    ))
}

#[async_trait]
impl FieldExtractor for Epika {
    async fn extract<D: Driver>(&self, driver: &D, candidate: &Candidate) -> MovieDetails {
        let mut details = MovieDetails::default();

        match meta_tokens(driver).await {
            Ok(tokens) => {
                let strip = parse_meta_strip(tokens.iter().map(String::as_str));
                details.release_year = strip.release_year;
                details.duration_minutes = strip.duration_minutes;
                details.genre = strip.genre;
            }
            Err(e) => debug!(url = %candidate.detail_url, error = %e, "metadata strip unavailable"),
        }

        match description(driver).await {
            Ok(text) => details.description = Some(text).filter(|t| !t.is_empty()),
            Err(e) => debug!(url = %candidate.detail_url, error = %e, "description unavailable"),
        }

        details
    }
}

async fn meta_tokens<D: Driver>(driver: &D) -> Result<Vec<String>, DriverError> {
    let strip = driver::first(driver, META_STRIP).await?;
    let mut tokens = Vec::new();
    for element in driver.find_within(&strip, META_ELEMENT).await? {
        tokens.push(driver.text(&element).await?);
    }
    Ok(tokens)
}

async fn description<D: Driver>(driver: &D) -> Result<String, DriverError> {
    let element = driver::first(driver, DESCRIPTION).await?;
    Ok(driver.text(&element).await?.trim().to_string())
}
