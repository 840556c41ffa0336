//! Deep pass: visit each staged candidate and build movie records.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::driver::{Driver, DriverError};
use crate::images::ImageSource;
use crate::model::{Candidate, Extraction, MovieRecord};
use crate::sites::{open_session, FieldExtractor};
use crate::waits::Pacing;

pub struct Enricher<'a, D, I: ?Sized> {
    driver: &'a D,
    images: &'a I,
    pacing: &'a Pacing,
    accept_partial: bool,
}

impl<'a, D: Driver, I: ImageSource + ?Sized> Enricher<'a, D, I> {
    pub fn new(driver: &'a D, images: &'a I, pacing: &'a Pacing, accept_partial: bool) -> Self {
        Enricher {
            driver,
            images,
            pacing,
            accept_partial,
        }
    }

    /// Visit candidates one by one. A candidate whose page fails to load is
    /// logged and skipped; it never stops the run.
    pub async fn enrich<X: FieldExtractor>(&self, extractor: &X, candidates: &[Candidate]) -> Vec<MovieRecord> {
        let site = extractor.site();
        info!(%site, candidates = candidates.len(), "starting deep pass");
        open_session(extractor, self.driver, self.pacing).await;

        let pb = ProgressBar::new(candidates.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let mut records = Vec::with_capacity(candidates.len());
        for (idx, candidate) in candidates.iter().enumerate() {
            match self.visit(extractor, candidate).await {
                Ok(Extraction::Complete(record)) => records.push(record),
                Ok(Extraction::Partial { record, missing }) => {
                    let missing: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
                    if self.accept_partial {
                        info!(%site, url = %record.source_url, ?missing, "keeping partial record");
                        records.push(record);
                    } else {
                        info!(%site, url = %record.source_url, ?missing, "dropping partial record");
                    }
                }
                Err(e) => warn!(%site, title = %candidate.title, url = %candidate.detail_url, error = %e, "candidate skipped"),
            }
            pb.inc(1);

            if idx + 1 < candidates.len() {
                self.pacing.pause_between_pages().await;
            }
        }

        pb.finish_and_clear();
        info!(%site, records = records.len(), "deep pass finished");
        records
    }

    async fn visit<X: FieldExtractor>(&self, extractor: &X, candidate: &Candidate) -> Result<Extraction, DriverError> {
        self.driver.navigate(&candidate.detail_url).await?;
        self.pacing.settle().await;
        extractor.prepare_page(self.driver, self.pacing).await;

        let details = extractor.extract(self.driver, candidate).await;
        let image = self.images.fetch(&candidate.thumbnail_url).await;
        let record = MovieRecord::assemble(candidate, details, image);
        Ok(Extraction::assess(record, extractor.site().expected_fields()))
    }
}
