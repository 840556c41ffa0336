use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::site::Site;

pub const DEFAULT_CONFIG_FILE: &str = "movie_scraper.toml";

/// Runtime settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub pacing: PacingSettings,
    pub epika: EpikaSettings,
    pub mediateka: MediatekaSettings,
    pub storage: StorageSettings,
    pub demo: DemoSettings,
    /// Keep records with missing fields instead of dropping them.
    pub accept_partial: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub show: bool,
}

/// Wait tuning. Durations in milliseconds, scroll step in pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    pub settle_ms: u64,
    pub scroll_step_px: i64,
    pub scroll_wait_ms: u64,
    pub max_scroll_steps: usize,
    pub page_pause_ms: u64,
    pub view_pause_ms: u64,
    pub consent_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EpikaSettings {
    pub search_terms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediatekaSettings {
    pub listing_urls: Vec<String>,
    /// Checked in order against the description; first hit wins.
    pub genres: Vec<String>,
    pub max_load_more: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub epika_db: PathBuf,
    pub mediateka_db: PathBuf,
    pub epika_demo_db: PathBuf,
    pub mediateka_demo_db: PathBuf,
    pub staging_dir: PathBuf,
    pub demo_staging_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub search_terms: Vec<String>,
}

impl Settings {
    /// Defaults, then the TOML file (optional unless given explicitly), then
    /// `MOVIES__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        Config::builder()
            .add_source(File::from(file).required(required))
            .add_source(
                Environment::with_prefix("MOVIES")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("epika.search_terms")
                    .with_list_parse_key("mediateka.genres")
                    .with_list_parse_key("mediateka.listing_urls"),
            )
            .build()?
            .try_deserialize()
    }

    /// Switch to the demo databases and a short epika term list.
    pub fn into_demo(mut self, terms: Option<Vec<String>>) -> Self {
        self.storage.epika_db = self.storage.epika_demo_db.clone();
        self.storage.mediateka_db = self.storage.mediateka_demo_db.clone();
        self.storage.staging_dir = self.storage.demo_staging_dir.clone();
        self.epika.search_terms = terms.unwrap_or_else(|| self.demo.search_terms.clone());
        self
    }

    pub fn database_path(&self, site: Site) -> &Path {
        match site {
            Site::Epika => &self.storage.epika_db,
            Site::Mediateka => &self.storage.mediateka_db,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            browser: BrowserSettings::default(),
            pacing: PacingSettings::default(),
            epika: EpikaSettings::default(),
            mediateka: MediatekaSettings::default(),
            storage: StorageSettings::default(),
            demo: DemoSettings::default(),
            accept_partial: true,
        }
    }
}

impl Default for PacingSettings {
    fn default() -> Self {
        PacingSettings {
            settle_ms: 2000,
            scroll_step_px: 500,
            scroll_wait_ms: 500,
            max_scroll_steps: 400,
            page_pause_ms: 1000,
            view_pause_ms: 2000,
            consent_timeout_ms: 10_000,
            poll_interval_ms: 250,
        }
    }
}

impl Default for EpikaSettings {
    fn default() -> Self {
        EpikaSettings {
            search_terms: to_strings(EPIKA_SEARCH_TERMS),
        }
    }
}

impl Default for MediatekaSettings {
    fn default() -> Self {
        MediatekaSettings {
            listing_urls: vec!["https://www.lrt.lt/tema/filmai".to_string()],
            genres: to_strings(MEDIATEKA_GENRES),
            max_load_more: 2,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            epika_db: PathBuf::from("epika_movies.db"),
            mediateka_db: PathBuf::from("mediateka_movies.db"),
            epika_demo_db: PathBuf::from("epika_movies_demo.db"),
            mediateka_demo_db: PathBuf::from("mediateka_demo.db"),
            staging_dir: PathBuf::from("."),
            demo_staging_dir: PathBuf::from("demo"),
        }
    }
}

impl Default for DemoSettings {
    fn default() -> Self {
        DemoSettings {
            search_terms: vec!["Komedija".to_string()],
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// The search pages have no full listing, so the shallow pass fans out over
// common Lithuanian and English n-grams plus single-letter wildcards.
const EPIKA_SEARCH_TERMS: &[&str] = &[
    // Lithuanian trigrams
    "ant", "ing", "tai", "kur", "dži", "sta", "gal", "sav", "pav", "tar",
    "tik", "lab", "vis", "ger", "tie", "nie", "art", "met", "kas", "tuo",
    "jau", "būt", "vak", "dar", "man", "sen", "aps", "ėjo", "nes", "vie",
    "lia", "jim", "ten", "jos", "šio", "dėl", "kit", "kai", "pas", "sak",
    "prie", "min", "tur", "kie", "buv", "mat", "toj", "ką*", "tam", "žmo",
    "pri", "pat", "dir",
    // Lithuanian bigrams
    "pa*", "pr*", "ne*", "ka*", "te*", "na*", "jo*", "ap*", "da*", "ja*",
    "is*", "ta*", "ma*", "ti*", "ju*", "no*", "ko*", "su*", "sa*", "ki*",
    "me*", "ga*", "to*", "la*", "gr*", "po*", "ge*", "di*", "at*", "ba*",
    "nu*", "se*", "vi*", "ku*", "mi*", "tr*", "pi*", "st*", "va*", "ie*",
    "ri*", "le*", "ra*", "ar*", "am*", "tu*", "re*", "bu*", "as*", "de*",
    "an*", "ir*", "al*", "mo*",
    // Letters and digits
    "a**", "ą**", "b**", "c**", "č**", "d**", "e**", "ę**", "ė**", "f**",
    "g**", "h**", "i**", "į**", "y**", "j**", "k**", "l**", "m**", "n**",
    "o**", "p**", "r**", "s**", "š**", "t**", "u**", "ų**", "ū**", "v**",
    "z**", "ž**", "0**", "1**", "2**", "3**", "4**", "5**", "6**", "7**",
    "8**", "9**",
    // English trigrams
    "the", "and", "her", "ere", "ent", "tha", "nth", "was", "eth", "for",
    "dth", "hat", "sth", "thi", "oft", "ion", "ter", "res", "con", "ver",
    "all", "his", "ate", "ons", "ted", "tho", "int", "est", "hen", "rea",
    "pro", "out", "are", "oun", "ill", "our", "eve", "era", "hes", "ati",
    "ear", "ain", "ess", "ith", "ers", "one", "ast", "not", "tio", "rat",
    "ell", "end", "act",
];

const MEDIATEKA_GENRES: &[&str] = &[
    "komedija",
    "drama",
    "trileris",
    "nuotykių",
    "elito",
    "vaidybinis",
    "pramoginis",
    "trumpametražis",
    "dokumentinis",
    "spektaklis",
    "naujienos",
    "apybraiža",
];
