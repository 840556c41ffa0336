//! Per-site orchestration: discover → stage → enrich → commit → clean up.

use rusqlite::Connection;
use tracing::info;

use crate::config::Settings;
use crate::db::{self, CommitOutcome};
use crate::discover;
use crate::driver::Driver;
use crate::enrich::Enricher;
use crate::images::ImageSource;
use crate::site::Site;
use crate::sites::{Epika, FieldExtractor, ListingSource, Mediateka};
use crate::staging::{StagingError, StagingStore};
use crate::waits::Pacing;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error("store error, batch rolled back: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Shallow pass only.
    Discover,
    /// Deep pass and commit of an existing staging artifact.
    Enrich,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    pub found: usize,
    pub staged: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOutcome {
    pub staged: usize,
    pub enriched: usize,
    pub commit: CommitOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub site: Site,
    /// `None` when discovery did not run or was skipped for an existing artifact.
    pub discovery: Option<DiscoveryOutcome>,
    pub enrichment: Option<EnrichOutcome>,
}

impl RunReport {
    pub fn print(&self) {
        match self.discovery {
            Some(d) => println!(
                "[{}] discovered {} candidates, {} new staged",
                self.site, d.found, d.staged
            ),
            None => println!("[{}] discovery skipped", self.site),
        }
        if let Some(e) = self.enrichment {
            println!(
                "[{}] enriched {} of {} staged, {} new movies added ({} already stored)",
                self.site, e.enriched, e.staged, e.commit.inserted, e.commit.skipped
            );
        }
    }
}

/// Everything one site's run needs. Borrowed for the duration of the run.
pub struct Pipeline<'a, D, I: ?Sized> {
    driver: &'a D,
    images: &'a I,
    conn: &'a Connection,
    staging: &'a StagingStore,
    pacing: Pacing,
    accept_partial: bool,
}

impl<'a, D: Driver, I: ImageSource + ?Sized> Pipeline<'a, D, I> {
    pub fn new(
        driver: &'a D,
        images: &'a I,
        conn: &'a Connection,
        staging: &'a StagingStore,
        pacing: Pacing,
    ) -> Self {
        Pipeline {
            driver,
            images,
            conn,
            staging,
            pacing,
            accept_partial: true,
        }
    }

    pub fn accept_partial(mut self, accept: bool) -> Self {
        self.accept_partial = accept;
        self
    }

    /// Pick the site implementation and run the requested phase.
    pub async fn run_phase(&self, site: Site, phase: Phase, settings: &Settings) -> Result<RunReport, PipelineError> {
        match site {
            Site::Epika => self.run_with(&Epika::new(&settings.epika), phase).await,
            Site::Mediateka => self.run_with(&Mediateka::new(&settings.mediateka), phase).await,
        }
    }

    pub async fn run_with<S: ListingSource + FieldExtractor>(&self, scraper: &S, phase: Phase) -> Result<RunReport, PipelineError> {
        let site = scraper.site();
        let discovery = match phase {
            Phase::Discover | Phase::Full => self.discover(scraper).await?,
            Phase::Enrich => None,
        };
        let enrichment = match phase {
            Phase::Enrich | Phase::Full => Some(self.enrich(scraper).await?),
            Phase::Discover => None,
        };
        Ok(RunReport {
            site,
            discovery,
            enrichment,
        })
    }

    /// Shallow pass into a new staging artifact. Skipped when one exists.
    pub async fn discover<S: ListingSource>(&self, source: &S) -> Result<Option<DiscoveryOutcome>, PipelineError> {
        let site = source.site();
        if self.staging.exists(site) {
            info!(%site, path = %self.staging.path(site).display(), "staging artifact present, skipping discovery");
            return Ok(None);
        }

        let candidates = discover::discover(source, self.driver, &self.pacing).await;
        let found = candidates.len();
        let fresh = db::retain_unseen(self.conn, candidates)?;
        let staged = fresh.len();
        let path = self.staging.write(site, &fresh)?;
        info!(%site, found, staged, path = %path.display(), "candidates staged");
        Ok(Some(DiscoveryOutcome { found, staged }))
    }

    /// Deep pass over the staged batch, one transactional commit, then the
    /// artifact is removed. A failed commit leaves the artifact in place.
    pub async fn enrich<X: FieldExtractor>(&self, extractor: &X) -> Result<EnrichOutcome, PipelineError> {
        let site = extractor.site();
        let candidates = self.staging.read(site)?;
        let records = Enricher::new(self.driver, self.images, &self.pacing, self.accept_partial)
            .enrich(extractor, &candidates)
            .await;

        let commit = db::commit_movies(self.conn, &records)?;
        info!(%site, inserted = commit.inserted, skipped = commit.skipped, "batch committed");
        self.staging.delete(site)?;

        Ok(EnrichOutcome {
            staged: candidates.len(),
            enriched: records.len(),
            commit,
        })
    }
}
