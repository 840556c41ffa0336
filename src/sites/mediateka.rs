use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use super::fields::{match_genre, parse_clock_duration, parse_views, parse_year_suffix};
use super::{absolutize, click_when_ready, FieldExtractor, ListingSource, SiteSession};
use crate::config::MediatekaSettings;
use crate::driver::{self, Driver, DriverError};
use crate::model::{Candidate, MovieDetails};
use crate::site::Site;
use crate::waits::Pacing;

pub const LANDING_URL: &str = "https://www.lrt.lt/tema/filmai";

pub mod selectors {
    pub const CONSENT_DECLINE: &str = "#CybotCookiebotDialogBodyButtonDecline";
    pub const LOAD_MORE: &str = "a.btn.btn--lg.section__button";
    pub const BLOCK: &str = ".news";
    /// Badges that mark galleries and other non-movie entries.
    pub const NOT_MOVIE: [&str; 2] = ["svg.svg-icon.badge-light", "i.icon.icon-photo"];
    pub const TITLE_LINK: &str = "h3.news__title a";
    pub const IMAGE: &str = ".media-block__image";
    pub const DURATION: &str = ".media-block__duration";
    pub const VIEWS: &str = ".badge-list.media-block__badge-list .badge.badge-light > span:last-child";
    pub const DESCRIPTION_PARAGRAPHS: &str = ".article-content.article-content--sm.mt-16.js-text-selection p";
}

use selectors::*;

const PAUSE_VIDEO: &str = "document.querySelectorAll('video').forEach(v => v.pause())";

// Age gates ("Man jau yra 7/14/18 metų") and the "Daugiau" link that expands
// the description. Returns how many were clicked.
const CLICK_OPTIONAL: &str = r#"(() => {
    let clicked = 0;
    document.querySelectorAll('button').forEach(b => {
        if (b.innerText.trim().startsWith('Man jau yra')) { b.click(); clicked++; }
    });
    document.querySelectorAll('a').forEach(a => {
        if (a.innerText.trim() === 'Daugiau') { a.click(); clicked++; }
    });
    return clicked;
})()"#;

/// www.lrt.lt/tema/filmai: one "load more" listing, metadata on the tile,
/// genre and year mined from the description.
#[derive(Debug, Clone)]
pub struct Mediateka {
    listing_urls: Vec<String>,
    genres: Vec<String>,
    max_load_more: usize,
}

impl Mediateka {
    pub fn new(settings: &MediatekaSettings) -> Self {
        Mediateka {
            listing_urls: settings.listing_urls.clone(),
            genres: settings.genres.clone(),
            max_load_more: settings.max_load_more,
        }
    }
}

#[async_trait]
impl SiteSession for Mediateka {
    fn site(&self) -> Site {
        Site::Mediateka
    }

    fn landing_url(&self) -> &str {
        LANDING_URL
    }

    async fn dismiss_consent<D: Driver>(&self, driver: &D, pacing: &Pacing) {
        match click_when_ready(driver, pacing, CONSENT_DECLINE).await {
            Ok(true) => debug!("cookies declined"),
            Ok(false) => debug!("no cookie dialog"),
            Err(e) => warn!(error = %e, "cookie consent handling failed"),
        }
    }
}

#[async_trait]
impl ListingSource for Mediateka {
    fn listing_urls(&self) -> Vec<String> {
        self.listing_urls.clone()
    }

    async fn load_listing<D: Driver>(&self, driver: &D, pacing: &Pacing) -> Result<(), DriverError> {
        pacing.scroll_to_bottom(driver).await?;
        for clicks in 1..=self.max_load_more {
            let Some(button) = driver.find_all(LOAD_MORE).await?.into_iter().next() else {
                info!("no more 'load more' buttons");
                break;
            };
            if let Err(e) = driver.click(&button).await {
                info!(error = %e, "'load more' not clickable");
                break;
            }
            debug!(clicks, "'load more' clicked");
            pacing.settle().await;
            pacing.scroll_to_bottom(driver).await?;
        }
        Ok(())
    }

    async fn read_entries<D: Driver>(
        &self,
        driver: &D,
        base: &Url,
    ) -> Result<Vec<Result<Candidate, DriverError>>, DriverError> {
        let blocks = driver.find_all(BLOCK).await?;
        info!(blocks = blocks.len(), "listing blocks loaded");

        let mut entries = Vec::with_capacity(blocks.len());
        for block in &blocks {
            match read_block(driver, block, base).await {
                Ok(Some(candidate)) => entries.push(Ok(candidate)),
                Ok(None) => {}
                Err(e) => entries.push(Err(e)),
            }
        }
        Ok(entries)
    }
}

/// `Ok(None)` for blocks that are not movies.
async fn read_block<D: Driver>(
    driver: &D,
    block: &D::Element,
    base: &Url,
) -> Result<Option<Candidate>, DriverError> {
    for marker in NOT_MOVIE {
        if driver::has_within(driver, block, marker).await? {
            return Ok(None);
        }
    }

    let link = driver::first_within(driver, block, TITLE_LINK).await?;
    let title = driver.text(&link).await?;
    let href = driver::attribute_of(driver, &link, TITLE_LINK, "href").await?;
    let image = driver::attribute_within(driver, block, IMAGE, "src").await?;
    let duration = driver::optional_text_within(driver, block, DURATION).await?;
    let views = driver::optional_text_within(driver, block, VIEWS).await?;

    let candidate = Candidate::new(title.trim(), absolutize(base, &href), absolutize(base, &image))
        .with_duration(duration)
        .with_views(views);

    // Neither a duration nor a view counter: an article, not a video.
    if candidate.duration_text().is_none() && candidate.views_text().is_none() {
        debug!(url = %candidate.detail_url, "skipping entry without duration and views");
        return Ok(None);
    }
    Ok(Some(candidate))
}

#[async_trait]
impl FieldExtractor for Mediateka {
    async fn prepare_page<D: Driver>(&self, driver: &D, _pacing: &Pacing) {
        if let Err(e) = driver.execute(PAUSE_VIDEO).await {
            debug!(error = %e, "could not pause video");
        }
        match driver.execute(CLICK_OPTIONAL).await {
            Ok(clicked) => debug!(clicked = clicked.as_u64().unwrap_or(0), "optional buttons"),
            Err(e) => debug!(error = %e, "optional buttons not handled"),
        }
    }

    async fn extract<D: Driver>(&self, driver: &D, candidate: &Candidate) -> MovieDetails {
        let mut details = MovieDetails {
            duration_minutes: candidate.duration_text().and_then(parse_clock_duration),
            views: candidate.views_text().and_then(parse_views),
            ..MovieDetails::default()
        };

        match description(driver).await {
            Ok(text) if !text.is_empty() => {
                let lower = text.to_lowercase();
                details.genre = match_genre(&lower, &self.genres);
                details.release_year = parse_year_suffix(&lower);
                details.description = Some(text);
            }
            Ok(_) => debug!(url = %candidate.detail_url, "empty description"),
            Err(e) => debug!(url = %candidate.detail_url, error = %e, "description unavailable"),
        }

        details
    }
}

async fn description<D: Driver>(driver: &D) -> Result<String, DriverError> {
    let mut paragraphs = Vec::new();
    for p in driver.find_all(DESCRIPTION_PARAGRAPHS).await? {
        paragraphs.push(driver.text(&p).await?);
    }
    Ok(paragraphs.join(" ").trim().to_string())
}
