//! Shallow pass: walk every listing view of a site and collect candidates.

use std::collections::HashSet;

use tracing::{info, warn};
use url::Url;

use crate::driver::{Driver, DriverError};
use crate::model::Candidate;
use crate::sites::{open_session, ListingSource};
use crate::waits::Pacing;

/// Candidates in discovery order, unique by detail url. Titles may repeat.
#[derive(Debug, Default)]
pub struct CandidateSet {
    seen: HashSet<String>,
    items: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the url was already collected.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if !self.seen.insert(candidate.detail_url.clone()) {
            return false;
        }
        self.items.push(candidate);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.items
    }
}

/// Run the shallow pass. Broken entries and views are logged and skipped.
pub async fn discover<S: ListingSource, D: Driver>(source: &S, driver: &D, pacing: &Pacing) -> Vec<Candidate> {
    let site = source.site();
    info!(%site, "starting shallow pass");
    open_session(source, driver, pacing).await;

    let views = source.listing_urls();
    let mut found = CandidateSet::new();

    for (idx, url) in views.iter().enumerate() {
        info!(%site, view = idx + 1, of = views.len(), %url, "scanning listing");
        match scan_view(source, driver, pacing, url).await {
            Ok(entries) => {
                let returned = entries.len();
                let mut used = 0usize;
                for entry in entries {
                    match entry {
                        Ok(candidate) => {
                            if found.insert(candidate) {
                                used += 1;
                            }
                        }
                        Err(e) => warn!(%site, %url, error = %e, "listing entry skipped"),
                    }
                }
                info!(%site, %url, returned, used, "listing scanned");
            }
            Err(e) => warn!(%site, %url, error = %e, "listing view skipped"),
        }

        if idx + 1 < views.len() {
            pacing.pause_between_views().await;
        }
    }

    info!(%site, candidates = found.len(), "shallow pass finished");
    found.into_vec()
}

async fn scan_view<S: ListingSource, D: Driver>(
    source: &S,
    driver: &D,
    pacing: &Pacing,
    url: &str,
) -> Result<Vec<Result<Candidate, DriverError>>, DriverError> {
    let base = Url::parse(url).map_err(|e| DriverError::Navigation {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    driver.navigate(url).await?;
    pacing.settle().await;
    source.load_listing(driver, pacing).await?;
    source.read_entries(driver, &base).await
}
