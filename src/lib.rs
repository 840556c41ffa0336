//! Two-pass movie catalog scraper for epika.lrt.lt and the lrt.lt mediateka.
//!
//! The shallow pass walks listing views and stages lightweight candidates on
//! disk. The deep pass visits each staged candidate, extracts a movie record
//! and commits the batch to SQLite in a single transaction.

pub mod config;
pub mod db;
pub mod discover;
pub mod driver;
pub mod enrich;
pub mod images;
pub mod model;
pub mod pipeline;
pub mod site;
pub mod sites;
pub mod staging;
pub mod waits;

pub use model::{Candidate, Extraction, Field, MovieDetails, MovieRecord, StoredMovie};
pub use site::Site;
