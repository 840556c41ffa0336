use std::fmt;

use crate::model::Field;

/// Source catalogs the scraper knows how to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    /// epika.lrt.lt, searched term by term.
    Epika,
    /// www.lrt.lt/tema/filmai, a single "load more" listing.
    Mediateka,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::Epika, Site::Mediateka];

    pub fn slug(self) -> &'static str {
        match self {
            Site::Epika => "epika",
            Site::Mediateka => "mediateka",
        }
    }

    /// Fields a fully extracted record of this site carries.
    pub fn expected_fields(self) -> &'static [Field] {
        match self {
            Site::Epika => &[
                Field::Image,
                Field::Description,
                Field::ReleaseYear,
                Field::Duration,
                Field::Genre,
            ],
            Site::Mediateka => &[
                Field::Image,
                Field::Description,
                Field::ReleaseYear,
                Field::Duration,
                Field::Genre,
                Field::Views,
            ],
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
