//! Text-level field parsing shared by the site extractors.

use std::sync::LazyLock;

use regex::Regex;

static COMPACT_DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+)h\s*)?(\d+)m").unwrap());

// "2018 m." is how Lithuanian text writes a year.
static YEAR_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\s*m\.").unwrap());

/// What the epika metadata strip says about a movie.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MetaStrip {
    pub release_year: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub genre: Option<String>,
}

/// Sort strip tokens into year, duration and genre words.
///
/// A four digit token is the year, `1h 25m` or `85m` is the duration, and
/// anything else is part of the genre phrase.
pub fn parse_meta_strip<'a>(tokens: impl IntoIterator<Item = &'a str>) -> MetaStrip {
    let mut strip = MetaStrip::default();
    let mut genre = Vec::new();

    for token in tokens.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
        if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
            strip.release_year = token.parse().ok();
        } else if let Some(minutes) = parse_compact_duration(token) {
            strip.duration_minutes = Some(minutes);
        } else {
            genre.push(token);
        }
    }

    if !genre.is_empty() {
        strip.genre = Some(genre.join(", "));
    }
    strip
}

/// `1h 5m` → 65, `45m` → 45. Hours are optional, minutes are not.
pub fn parse_compact_duration(text: &str) -> Option<i32> {
    let caps = COMPACT_DURATION_RE.captures(text.trim())?;
    let hours: i32 = match caps.get(1) {
        Some(h) => h.as_str().parse().ok()?,
        None => 0,
    };
    let minutes: i32 = caps[2].parse().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// `H:MM:SS` → H*60 + MM, `MM:SS` → MM. Seconds are dropped.
pub fn parse_clock_duration(text: &str) -> Option<i32> {
    let parts: Vec<u32> = text
        .trim()
        .split(':')
        .map(|p| p.trim().parse())
        .collect::<Result<_, _>>()
        .ok()?;
    let minutes = match parts.as_slice() {
        [hours, minutes, _] => hours.checked_mul(60)?.checked_add(*minutes)?,
        [minutes, _] => *minutes,
        _ => return None,
    };
    i32::try_from(minutes).ok()
}

/// First `<year> m.` in the text.
pub fn parse_year_suffix(text: &str) -> Option<i32> {
    YEAR_SUFFIX_RE.captures(text)?[1].parse().ok()
}

/// First vocabulary entry contained in the text. Vocabulary order decides,
/// not position in the text.
pub fn match_genre(text: &str, vocabulary: &[String]) -> Option<String> {
    let haystack = text.to_lowercase();
    vocabulary
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .find(|g| haystack.contains(&g.to_lowercase()))
        .map(str::to_string)
}

/// View counters are plain digits, sometimes space separated.
pub fn parse_views(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn compact_durations() {
        assert_eq!(parse_compact_duration("1h 5m"), Some(65));
        assert_eq!(parse_compact_duration("45m"), Some(45));
        assert_eq!(parse_compact_duration("2h15m"), Some(135));
        assert_eq!(parse_compact_duration("1h"), None);
        assert_eq!(parse_compact_duration("drama"), None);
        assert_eq!(parse_compact_duration(""), None);
    }

    #[test]
    fn clock_durations() {
        assert_eq!(parse_clock_duration("01:30:15"), Some(90));
        assert_eq!(parse_clock_duration("05:20"), Some(5));
        assert_eq!(parse_clock_duration("1:32:10"), Some(92));
        assert_eq!(parse_clock_duration("None"), None);
        assert_eq!(parse_clock_duration("12"), None);
        assert_eq!(parse_clock_duration("1:2:3:4"), None);
        assert_eq!(parse_clock_duration("ab:cd"), None);
        assert_eq!(parse_clock_duration(""), None);
    }

    #[test]
    fn meta_strip_sorts_tokens() {
        let strip = parse_meta_strip(["1972", "1h 25m", "Drama", "Istorinis", "N-14"]);
        assert_eq!(
            strip,
            MetaStrip {
                release_year: Some(1972),
                duration_minutes: Some(85),
                genre: Some("Drama, Istorinis, N-14".into()),
            }
        );
    }

    #[test]
    fn meta_strip_without_genre_words() {
        let strip = parse_meta_strip(["  2004 ", "", "52m"]);
        assert_eq!(strip.release_year, Some(2004));
        assert_eq!(strip.duration_minutes, Some(52));
        assert_eq!(strip.genre, None);
    }

    #[test]
    fn five_digit_numbers_are_not_years() {
        let strip = parse_meta_strip(["20041"]);
        assert_eq!(strip.release_year, None);
        assert_eq!(strip.genre.as_deref(), Some("20041"));
    }

    #[test]
    fn genre_vocabulary_order_wins() {
        let v = vocab(&["drama", "trileris"]);
        assert_eq!(match_genre("puikus trileris ir drama", &v), Some("drama".into()));

        let v = vocab(&["trileris", "drama"]);
        assert_eq!(match_genre("puikus trileris ir drama", &v), Some("trileris".into()));
    }

    #[test]
    fn genre_matches_substrings_case_insensitively() {
        let v = vocab(&["komedija", "dokumentinis"]);
        assert_eq!(
            match_genre("Dokumentinis filmas apie Vilnių", &v),
            Some("dokumentinis".into())
        );
        assert_eq!(match_genre("Tragikomedija", &v), Some("komedija".into()));
        assert_eq!(match_genre("Nieko bendro", &v), None);
    }

    #[test]
    fn blank_vocabulary_entries_never_match() {
        let v = vocab(&["", "  ", "drama"]);
        assert_eq!(match_genre("be žanro", &v), None);
    }

    #[test]
    fn year_suffix() {
        assert_eq!(parse_year_suffix("filmas sukurtas 1984 m. kaune"), Some(1984));
        assert_eq!(parse_year_suffix("1975m. ir 1980 m."), Some(1975));
        assert_eq!(parse_year_suffix("1984 metais"), None);
        assert_eq!(parse_year_suffix("12345 m."), None);
    }

    #[test]
    fn views() {
        assert_eq!(parse_views("5321"), Some(5321));
        assert_eq!(parse_views("12 400"), Some(12400));
        assert_eq!(parse_views("1.2K"), None);
        assert_eq!(parse_views("None"), None);
        assert_eq!(parse_views(""), None);
    }
}
