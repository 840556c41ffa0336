//! Durable hand-off between the shallow and deep passes.
//!
//! One CSV file per site, no header, columns in `Candidate` field order:
//! `title, detail_url, thumbnail_url, duration_text, views_text`. An absent
//! value is an empty field. The file existing is what tells the next run to
//! skip discovery, so it is removed only after a committed deep pass.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::Candidate;
use crate::site::Site;

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("staging artifact {} already exists; delete it to rediscover", .0.display())]
    AlreadyExists(PathBuf),
    #[error("staging artifact {} not found; run discovery first", .0.display())]
    NotFound(PathBuf),
    #[error("{}:{line}: expected at least 3 columns", .path.display())]
    Malformed { path: PathBuf, line: u64 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone)]
pub struct StagingStore {
    dir: PathBuf,
}

impl StagingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StagingStore { dir: dir.into() }
    }

    pub fn path(&self, site: Site) -> PathBuf {
        self.dir
            .join(format!("shallow_scrape_result_{}.csv", site.slug()))
    }

    pub fn exists(&self, site: Site) -> bool {
        self.path(site).exists()
    }

    /// Create the artifact. Never overwrites an existing one.
    pub fn write(&self, site: Site, candidates: &[Candidate]) -> Result<PathBuf, StagingError> {
        let path = self.path(site);
        if path.exists() {
            return Err(StagingError::AlreadyExists(path));
        }
        fs::create_dir_all(&self.dir)?;

        // Rename into place so an interrupted write never looks like a batch.
        let partial = path.with_extension("csv.partial");
        write_rows(&partial, candidates)?;
        fs::rename(&partial, &path)?;
        Ok(path)
    }

    pub fn read(&self, site: Site) -> Result<Vec<Candidate>, StagingError> {
        let path = self.path(site);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StagingError::NotFound(path)),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut candidates = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() < 3 {
                let line = record.position().map_or(0, |p| p.line());
                return Err(StagingError::Malformed { path, line });
            }
            let optional = |i: usize| record.get(i).map(str::to_string);
            candidates.push(
                Candidate::new(&record[0], &record[1], &record[2])
                    .with_duration(optional(3))
                    .with_views(optional(4)),
            );
        }
        Ok(candidates)
    }

    /// Remove the artifact. Missing is not an error.
    pub fn delete(&self, site: Site) -> Result<(), StagingError> {
        match fs::remove_file(self.path(site)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_rows(path: &Path, candidates: &[Candidate]) -> Result<(), StagingError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for c in candidates {
        writer.write_record([
            c.title.as_str(),
            c.detail_url.as_str(),
            c.thumbnail_url.as_str(),
            c.duration_text().unwrap_or(""),
            c.views_text().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
