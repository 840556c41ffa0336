use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{Candidate, MovieRecord, StoredMovie};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn connect(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS movies (
            id                    INTEGER PRIMARY KEY,
            title                 TEXT NOT NULL,
            image                 BLOB,
            description           TEXT,
            release_year          INTEGER,
            duration              INTEGER,
            genre                 TEXT,
            url                   TEXT UNIQUE NOT NULL,
            date_of_first_finding TEXT,
            date_of_disappearance TEXT,
            related_persons       TEXT,
            views_count           INTEGER,
            is_memorable          BOOLEAN NOT NULL DEFAULT 0
        );
        ",
    )?;
    Ok(())
}

pub fn movie_exists(conn: &Connection, url: &str) -> rusqlite::Result<bool> {
    conn.prepare_cached("SELECT 1 FROM movies WHERE url = ?1")?
        .exists(params![url])
}

/// Drop candidates whose detail page is already stored, keeping order.
pub fn retain_unseen(conn: &Connection, candidates: Vec<Candidate>) -> rusqlite::Result<Vec<Candidate>> {
    let mut fresh = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !movie_exists(conn, &c.detail_url)? {
            fresh.push(c);
        }
    }
    Ok(fresh)
}

// ── Commit ──

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommitOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

/// Insert every record whose url is not stored yet, all in one transaction.
///
/// Existing urls are skipped, never updated. Any storage error drops the
/// transaction, which rolls the whole batch back.
pub fn commit_movies(conn: &Connection, records: &[MovieRecord]) -> rusqlite::Result<CommitOutcome> {
    let first_seen = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    let mut outcome = CommitOutcome::default();

    let tx = conn.unchecked_transaction()?;
    {
        let mut exists = tx.prepare("SELECT 1 FROM movies WHERE url = ?1")?;
        let mut insert = tx.prepare(
            "INSERT INTO movies
             (title, image, description, release_year, duration, genre, url,
              date_of_first_finding, date_of_disappearance, related_persons, views_count, is_memorable)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, NULL, ?9, 0)",
        )?;
        for r in records {
            if exists.exists(params![r.source_url])? {
                outcome.skipped += 1;
                continue;
            }
            insert.execute(params![
                r.title, r.image, r.description, r.release_year, r.duration_minutes,
                r.genre, r.source_url, first_seen, r.views,
            ])?;
            outcome.inserted += 1;
        }
    }
    tx.commit()?;
    Ok(outcome)
}

// ── Reading ──

pub fn count_movies(conn: &Connection) -> rusqlite::Result<usize> {
    conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))
}

pub fn fetch_movie(conn: &Connection, url: &str) -> rusqlite::Result<Option<StoredMovie>> {
    conn.query_row(
        &format!("{SELECT_MOVIE} WHERE url = ?1"),
        params![url],
        map_movie,
    )
    .optional()
}

pub fn fetch_movies(conn: &Connection) -> rusqlite::Result<Vec<StoredMovie>> {
    let mut stmt = conn.prepare(&format!("{SELECT_MOVIE} ORDER BY id"))?;
    let rows = stmt
        .query_map([], map_movie)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

const SELECT_MOVIE: &str = "SELECT id, title, image, description, release_year, duration, genre, url,
        date_of_first_finding, date_of_disappearance, related_persons, views_count, is_memorable
     FROM movies";

fn map_movie(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredMovie> {
    Ok(StoredMovie {
        id: row.get(0)?,
        title: row.get(1)?,
        image: row.get(2)?,
        description: row.get(3)?,
        release_year: row.get(4)?,
        duration_minutes: row.get(5)?,
        genre: row.get(6)?,
        source_url: row.get(7)?,
        first_seen_at: row.get(8)?,
        disappeared_at: row.get(9)?,
        related_persons: row.get(10)?,
        views: row.get(11)?,
        is_notable: row.get(12)?,
    })
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub with_image: usize,
    pub with_description: usize,
    pub with_year: usize,
    pub with_duration: usize,
    pub with_genre: usize,
    pub with_views: usize,
}

pub fn get_stats(conn: &Connection) -> rusqlite::Result<Stats> {
    conn.query_row(
        "SELECT COUNT(*),
                COUNT(image),
                COUNT(NULLIF(description, '')),
                COUNT(release_year),
                COUNT(duration),
                COUNT(genre),
                COUNT(views_count)
         FROM movies",
        [],
        |r| {
            Ok(Stats {
                total: r.get(0)?,
                with_image: r.get(1)?,
                with_description: r.get(2)?,
                with_year: r.get(3)?,
                with_duration: r.get(4)?,
                with_genre: r.get(5)?,
                with_views: r.get(6)?,
            })
        },
    )
}
