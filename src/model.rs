use std::fmt;

/// Listing entry found during the shallow pass. Identity is `detail_url`.
///
/// Tile metadata is only set through `with_duration` / `with_views`, so it is
/// always trimmed and never `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub detail_url: String,
    pub thumbnail_url: String,
    duration_text: Option<String>,
    views_text: Option<String>,
}

impl Candidate {
    pub fn new(
        title: impl Into<String>,
        detail_url: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Candidate {
            title: title.into(),
            detail_url: detail_url.into(),
            thumbnail_url: thumbnail_url.into(),
            duration_text: None,
            views_text: None,
        }
    }

    pub fn with_duration(mut self, text: Option<String>) -> Self {
        self.duration_text = non_empty(text);
        self
    }

    pub fn with_views(mut self, text: Option<String>) -> Self {
        self.views_text = non_empty(text);
        self
    }

    /// Raw duration as shown on the listing tile (mediateka only).
    pub fn duration_text(&self) -> Option<&str> {
        self.duration_text.as_deref()
    }

    /// Raw view count as shown on the listing tile (mediateka only).
    pub fn views_text(&self) -> Option<&str> {
        self.views_text.as_deref()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Per-field output of a site extractor. Every field is best effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieDetails {
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub genre: Option<String>,
    pub views: Option<i64>,
}

/// Canonical record produced by the deep pass, keyed by `source_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    pub title: String,
    pub image: Option<Vec<u8>>,
    /// Empty when the page had no description.
    pub description: String,
    pub release_year: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub genre: Option<String>,
    pub source_url: String,
    pub views: Option<i64>,
}

impl MovieRecord {
    pub fn assemble(candidate: &Candidate, details: MovieDetails, image: Option<Vec<u8>>) -> Self {
        MovieRecord {
            title: candidate.title.clone(),
            image,
            description: details.description.unwrap_or_default(),
            release_year: details.release_year,
            duration_minutes: details.duration_minutes,
            genre: details.genre,
            source_url: candidate.detail_url.clone(),
            views: details.views,
        }
    }

    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Image => self.image.is_some(),
            Field::Description => !self.description.is_empty(),
            Field::ReleaseYear => self.release_year.is_some(),
            Field::Duration => self.duration_minutes.is_some(),
            Field::Genre => self.genre.is_some(),
            Field::Views => self.views.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Image,
    Description,
    ReleaseYear,
    Duration,
    Genre,
    Views,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Image => "image",
            Field::Description => "description",
            Field::ReleaseYear => "release_year",
            Field::Duration => "duration",
            Field::Genre => "genre",
            Field::Views => "views",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a deep extraction: either every expected field was found, or
/// the record is partial and names what is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Complete(MovieRecord),
    Partial {
        record: MovieRecord,
        missing: Vec<Field>,
    },
}

impl Extraction {
    pub fn assess(record: MovieRecord, expected: &[Field]) -> Self {
        let missing: Vec<Field> = expected
            .iter()
            .copied()
            .filter(|f| !record.has(*f))
            .collect();
        if missing.is_empty() {
            Extraction::Complete(record)
        } else {
            Extraction::Partial { record, missing }
        }
    }

    pub fn record(&self) -> &MovieRecord {
        match self {
            Extraction::Complete(record) | Extraction::Partial { record, .. } => record,
        }
    }

    pub fn missing(&self) -> &[Field] {
        match self {
            Extraction::Complete(_) => &[],
            Extraction::Partial { missing, .. } => missing,
        }
    }

    pub fn into_record(self) -> MovieRecord {
        match self {
            Extraction::Complete(record) | Extraction::Partial { record, .. } => record,
        }
    }
}

/// A row of the `movies` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMovie {
    pub id: i64,
    pub title: String,
    pub image: Option<Vec<u8>>,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub genre: Option<String>,
    pub source_url: String,
    pub first_seen_at: String,
    pub disappeared_at: Option<String>,
    pub related_persons: Option<String>,
    pub views: Option<i64>,
    pub is_notable: bool,
}
