use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::TanaError;
use crate::models::{ShowDetail, ShowPatch, ShowRecord, SoundtrackRecord, WatchStatus};

const SCHEMA: &str = include_str!("../../../migrations/001_initial.sql");

const SHOW_COLUMNS: &str = "id, english_name, romanji_name, year, num_seasons, is_dubbed, \
     show_path, season_path, soundtrack_path, sonarr_id, sonarr_monitor_status, \
     season_number, episodes, episodes_dl, anilist_progress, release_status, \
     cover_image, watch_status, anilist_score, plex_id";

/// SQLite-backed storage over the curated library database.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open the database at the given path and apply the schema. The
    /// file usually pre-exists; the schema is idempotent.
    pub fn open(path: &Path) -> Result<Self, TanaError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, TanaError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    // ── Shows ───────────────────────────────────────────────────

    /// Get every show in the library.
    pub fn all_shows(&self) -> Result<Vec<ShowRecord>, TanaError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SHOW_COLUMNS} FROM show ORDER BY id"))?;
        let rows = stmt
            .query_map([], |row| Ok(row_to_show(row)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Get a show by its ID.
    pub fn get_show(&self, id: i64) -> Result<Option<ShowRecord>, TanaError> {
        self.conn
            .query_row(
                &format!("SELECT {SHOW_COLUMNS} FROM show WHERE id = ?1"),
                params![id],
                |row| Ok(row_to_show(row)),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a show joined with its soundtrack row, when it has one.
    pub fn get_show_detail(&self, id: i64) -> Result<Option<ShowDetail>, TanaError> {
        self.conn
            .query_row(
                "SELECT s.id, s.english_name, s.romanji_name, s.year, s.num_seasons,
                        s.is_dubbed, s.show_path, s.season_path, s.soundtrack_path,
                        s.sonarr_id, s.sonarr_monitor_status, s.season_number, s.episodes,
                        s.episodes_dl, s.anilist_progress, s.release_status, s.cover_image,
                        s.watch_status, s.anilist_score, s.plex_id,
                        t.soundtrack_path, t.albums_count, t.albums_missing, t.lossless,
                        t.album_list, t.file_formats, t.download_status
                 FROM show s
                 LEFT JOIN soundtrack t ON s.soundtrack_path = t.soundtrack_path
                 WHERE s.id = ?1",
                params![id],
                |row| {
                    Ok(ShowDetail {
                        show: row_to_show_at(row, 0),
                        soundtrack_info: row_to_soundtrack_at(row, 20),
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Search shows by name substring (case-insensitive), over both the
    /// english and romanji columns.
    pub fn search_shows(&self, query: &str) -> Result<Vec<ShowRecord>, TanaError> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SHOW_COLUMNS} FROM show
             WHERE english_name LIKE ?1 OR romanji_name LIKE ?1
             ORDER BY id"
        ))?;
        let rows = stmt
            .query_map(params![pattern], |row| Ok(row_to_show(row)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Apply a partial update to a show, validating progress against the
    /// episode count before anything is written. Returns the re-read row.
    pub fn update_show(&self, id: i64, patch: &ShowPatch) -> Result<ShowRecord, TanaError> {
        let current = self
            .get_show(id)?
            .ok_or_else(|| TanaError::NotFound(format!("show {id}")))?;

        // Cap is unknown when the episode count is NULL; accept then.
        if let (Some(progress), Some(episodes)) = (patch.anilist_progress, current.episodes) {
            if progress > episodes {
                return Err(TanaError::Validation(format!(
                    "progress {progress} exceeds episode count {episodes}"
                )));
            }
        }

        // One statement for the whole patch; absent fields keep their
        // columns.
        self.conn.execute(
            "UPDATE show
             SET anilist_progress = COALESCE(?1, anilist_progress),
                 watch_status = COALESCE(?2, watch_status)
             WHERE id = ?3",
            params![
                patch.anilist_progress,
                patch.watch_status.map(|s| s.as_db_str()),
                id
            ],
        )?;

        self.get_show(id)?
            .ok_or_else(|| TanaError::NotFound(format!("show {id}")))
    }

    /// Insert a show under its externally assigned ID.
    pub fn insert_show(&self, show: &ShowRecord) -> Result<i64, TanaError> {
        self.conn.execute(
            &format!(
                "INSERT INTO show ({SHOW_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                         ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
            ),
            params![
                show.id,
                show.english_name,
                show.romanji_name,
                show.year,
                show.num_seasons,
                show.is_dubbed,
                show.show_path,
                show.season_path,
                show.soundtrack_path,
                show.sonarr_id,
                show.sonarr_monitor_status,
                show.season_number,
                show.episodes,
                show.episodes_dl,
                show.anilist_progress,
                show.release_status,
                show.cover_image,
                show.watch_status.map(|s| s.as_db_str()),
                show.anilist_score,
                show.plex_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Soundtracks ─────────────────────────────────────────────

    /// Get every soundtrack row.
    pub fn all_soundtracks(&self) -> Result<Vec<SoundtrackRecord>, TanaError> {
        let mut stmt = self.conn.prepare(
            "SELECT soundtrack_path, albums_count, albums_missing, lossless,
                    album_list, file_formats, download_status
             FROM soundtrack ORDER BY soundtrack_path",
        )?;
        let rows = stmt
            .query_map([], |row| Ok(row_to_soundtrack(row)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Get a soundtrack row by its path.
    pub fn get_soundtrack(&self, path: &str) -> Result<Option<SoundtrackRecord>, TanaError> {
        self.conn
            .query_row(
                "SELECT soundtrack_path, albums_count, albums_missing, lossless,
                        album_list, file_formats, download_status
                 FROM soundtrack WHERE soundtrack_path = ?1",
                params![path],
                |row| Ok(row_to_soundtrack(row)),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert or replace a soundtrack row. The path must already be
    /// referenced by some show; orphan rows are rejected.
    pub fn insert_soundtrack(&self, soundtrack: &SoundtrackRecord) -> Result<(), TanaError> {
        let referenced: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM show WHERE soundtrack_path = ?1)",
            params![soundtrack.soundtrack_path],
            |row| row.get(0),
        )?;
        if !referenced {
            return Err(TanaError::Validation(format!(
                "no show references soundtrack path {}",
                soundtrack.soundtrack_path
            )));
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO soundtrack (soundtrack_path, albums_count, albums_missing,
             lossless, album_list, file_formats, download_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                soundtrack.soundtrack_path,
                soundtrack.albums_count,
                soundtrack.albums_missing,
                soundtrack.lossless,
                soundtrack.album_list,
                soundtrack.file_formats,
                soundtrack.download_status,
            ],
        )?;
        Ok(())
    }
}

// ── Row mapping helpers ─────────────────────────────────────────

fn row_to_show(row: &rusqlite::Row<'_>) -> ShowRecord {
    row_to_show_at(row, 0)
}

fn row_to_show_at(row: &rusqlite::Row<'_>, off: usize) -> ShowRecord {
    let status_str: Option<String> = row.get(off + 17).unwrap_or(None);

    ShowRecord {
        id: row.get(off).unwrap_or(0),
        english_name: row.get(off + 1).unwrap_or(None),
        romanji_name: row.get(off + 2).unwrap_or(None),
        year: row.get(off + 3).unwrap_or(None),
        num_seasons: row.get(off + 4).unwrap_or(None),
        is_dubbed: row.get(off + 5).unwrap_or(None),
        show_path: row.get(off + 6).unwrap_or(None),
        season_path: row.get(off + 7).unwrap_or(None),
        soundtrack_path: row.get(off + 8).unwrap_or(None),
        sonarr_id: row.get(off + 9).unwrap_or(None),
        sonarr_monitor_status: row.get(off + 10).unwrap_or(None),
        season_number: row.get(off + 11).unwrap_or(None),
        episodes: row.get(off + 12).unwrap_or(None),
        episodes_dl: row.get(off + 13).unwrap_or(None),
        anilist_progress: row.get(off + 14).unwrap_or(None),
        release_status: row.get(off + 15).unwrap_or(None),
        cover_image: row.get(off + 16).unwrap_or(None),
        watch_status: status_str.as_deref().and_then(WatchStatus::from_db_str),
        anilist_score: row.get(off + 18).unwrap_or(None),
        plex_id: row.get(off + 19).unwrap_or(None),
    }
}

fn row_to_soundtrack(row: &rusqlite::Row<'_>) -> SoundtrackRecord {
    SoundtrackRecord {
        soundtrack_path: row.get(0).unwrap_or_default(),
        albums_count: row.get(1).unwrap_or(None),
        albums_missing: row.get(2).unwrap_or(None),
        lossless: row.get(3).unwrap_or(None),
        album_list: row.get(4).unwrap_or(None),
        file_formats: row.get(5).unwrap_or(None),
        download_status: row.get(6).unwrap_or(None),
    }
}

/// Map the soundtrack side of a LEFT JOIN; `None` when the join missed.
fn row_to_soundtrack_at(row: &rusqlite::Row<'_>, off: usize) -> Option<SoundtrackRecord> {
    let soundtrack_path: Option<String> = row.get(off).unwrap_or(None);
    let soundtrack_path = soundtrack_path?;
    Some(SoundtrackRecord {
        soundtrack_path,
        albums_count: row.get(off + 1).unwrap_or(None),
        albums_missing: row.get(off + 2).unwrap_or(None),
        lossless: row.get(off + 3).unwrap_or(None),
        album_list: row.get(off + 4).unwrap_or(None),
        file_formats: row.get(off + 5).unwrap_or(None),
        download_status: row.get(off + 6).unwrap_or(None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_show() -> ShowRecord {
        ShowRecord {
            id: 1535,
            english_name: Some("Death Note".into()),
            romanji_name: Some("Death Note".into()),
            year: Some(2006),
            num_seasons: Some(1),
            is_dubbed: Some(true),
            show_path: Some("/Media/Anime/Death Note".into()),
            season_path: Some("/Media/Anime/Death Note/Season 1".into()),
            soundtrack_path: Some("/Media/Soundtracks/Death Note".into()),
            sonarr_id: Some(42),
            sonarr_monitor_status: Some(false),
            season_number: Some(1),
            episodes: Some(37),
            episodes_dl: Some(37),
            anilist_progress: Some(37),
            release_status: Some("FINISHED".into()),
            cover_image: Some("/Media/Covers/death-note.jpg".into()),
            watch_status: Some(WatchStatus::Completed),
            anilist_score: Some(8.7),
            plex_id: Some(11723),
        }
    }

    fn test_soundtrack() -> SoundtrackRecord {
        SoundtrackRecord {
            soundtrack_path: "/Media/Soundtracks/Death Note".into(),
            albums_count: Some(3),
            albums_missing: Some(1),
            lossless: Some("partial".into()),
            album_list: Some("OST I, OST II, OST III".into()),
            file_formats: Some("flac, mp3".into()),
            download_status: Some("complete".into()),
        }
    }

    #[test]
    fn test_insert_and_get_show() {
        let db = Storage::open_memory().unwrap();
        db.insert_show(&test_show()).unwrap();

        let fetched = db.get_show(1535).unwrap().unwrap();
        assert_eq!(fetched.english_name.as_deref(), Some("Death Note"));
        assert_eq!(fetched.episodes, Some(37));
        assert_eq!(fetched.watch_status, Some(WatchStatus::Completed));
        assert_eq!(fetched.anilist_score, Some(8.7));
        assert_eq!(fetched.is_dubbed, Some(true));

        assert!(db.get_show(999999).unwrap().is_none());
    }

    #[test]
    fn test_all_shows_ordered_by_id() {
        let db = Storage::open_memory().unwrap();
        let mut second = test_show();
        second.id = 20605;
        second.english_name = Some("Tokyo Ghoul".into());
        second.soundtrack_path = None;
        db.insert_show(&second).unwrap();
        db.insert_show(&test_show()).unwrap();

        let all = db.all_shows().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1535);
        assert_eq!(all[1].id, 20605);
    }

    #[test]
    fn test_search_shows() {
        let db = Storage::open_memory().unwrap();
        db.insert_show(&test_show()).unwrap();
        let mut other = test_show();
        other.id = 21;
        other.english_name = Some("One Piece".into());
        other.romanji_name = Some("One Piece".into());
        other.soundtrack_path = None;
        db.insert_show(&other).unwrap();

        let results = db.search_shows("death").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1535);

        // Matches the romanji column too.
        let results = db.search_shows("piece").unwrap();
        assert_eq!(results.len(), 1);

        let results = db.search_shows("nonexistent").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_detail_joins_soundtrack() {
        let db = Storage::open_memory().unwrap();
        db.insert_show(&test_show()).unwrap();
        db.insert_soundtrack(&test_soundtrack()).unwrap();

        let detail = db.get_show_detail(1535).unwrap().unwrap();
        assert_eq!(detail.show.id, 1535);
        let info = detail.soundtrack_info.unwrap();
        assert_eq!(info.albums_count, Some(3));
        assert_eq!(info.download_status.as_deref(), Some("complete"));
    }

    #[test]
    fn test_detail_without_soundtrack() {
        let db = Storage::open_memory().unwrap();
        let mut show = test_show();
        show.soundtrack_path = None;
        db.insert_show(&show).unwrap();

        let detail = db.get_show_detail(1535).unwrap().unwrap();
        assert!(detail.soundtrack_info.is_none());
    }

    #[test]
    fn test_update_show_progress_and_status() {
        let db = Storage::open_memory().unwrap();
        let mut show = test_show();
        show.anilist_progress = Some(10);
        show.watch_status = Some(WatchStatus::Current);
        db.insert_show(&show).unwrap();

        let updated = db
            .update_show(
                1535,
                &ShowPatch {
                    anilist_progress: Some(20),
                    watch_status: Some(WatchStatus::Paused),
                },
            )
            .unwrap();
        assert_eq!(updated.anilist_progress, Some(20));
        assert_eq!(updated.watch_status, Some(WatchStatus::Paused));
    }

    #[test]
    fn test_update_single_field_keeps_the_other() {
        let db = Storage::open_memory().unwrap();
        let mut show = test_show();
        show.anilist_progress = Some(10);
        show.watch_status = Some(WatchStatus::Current);
        db.insert_show(&show).unwrap();

        let updated = db
            .update_show(
                1535,
                &ShowPatch {
                    anilist_progress: Some(12),
                    watch_status: None,
                },
            )
            .unwrap();
        assert_eq!(updated.anilist_progress, Some(12));
        assert_eq!(updated.watch_status, Some(WatchStatus::Current));

        let updated = db
            .update_show(
                1535,
                &ShowPatch {
                    anilist_progress: None,
                    watch_status: Some(WatchStatus::Paused),
                },
            )
            .unwrap();
        assert_eq!(updated.anilist_progress, Some(12));
        assert_eq!(updated.watch_status, Some(WatchStatus::Paused));
    }

    #[test]
    fn test_update_rejects_progress_beyond_episodes() {
        let db = Storage::open_memory().unwrap();
        let mut show = test_show();
        show.episodes = Some(24);
        show.anilist_progress = Some(10);
        db.insert_show(&show).unwrap();

        let result = db.update_show(
            1535,
            &ShowPatch {
                anilist_progress: Some(30),
                watch_status: Some(WatchStatus::Current),
            },
        );
        assert!(matches!(result, Err(TanaError::Validation(_))));

        // Nothing was written, including the status half of the patch.
        let unchanged = db.get_show(1535).unwrap().unwrap();
        assert_eq!(unchanged.anilist_progress, Some(10));
        assert_eq!(unchanged.watch_status, Some(WatchStatus::Completed));
    }

    #[test]
    fn test_update_accepts_progress_when_episodes_unknown() {
        let db = Storage::open_memory().unwrap();
        let mut show = test_show();
        show.episodes = None;
        show.anilist_progress = Some(10);
        db.insert_show(&show).unwrap();

        let updated = db
            .update_show(
                1535,
                &ShowPatch {
                    anilist_progress: Some(500),
                    watch_status: None,
                },
            )
            .unwrap();
        assert_eq!(updated.anilist_progress, Some(500));
    }

    #[test]
    fn test_update_unknown_show() {
        let db = Storage::open_memory().unwrap();
        let result = db.update_show(999999, &ShowPatch::default());
        assert!(matches!(result, Err(TanaError::NotFound(_))));
    }

    #[test]
    fn test_orphan_soundtrack_rejected() {
        let db = Storage::open_memory().unwrap();
        let mut orphan = test_soundtrack();
        orphan.soundtrack_path = "/Media/Soundtracks/Nothing".into();

        let result = db.insert_soundtrack(&orphan);
        assert!(matches!(result, Err(TanaError::Validation(_))));
        assert!(db.all_soundtracks().unwrap().is_empty());
    }

    #[test]
    fn test_all_soundtracks() {
        let db = Storage::open_memory().unwrap();
        db.insert_show(&test_show()).unwrap();
        db.insert_soundtrack(&test_soundtrack()).unwrap();

        let all = db.all_soundtracks().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].soundtrack_path, "/Media/Soundtracks/Death Note");

        let one = db
            .get_soundtrack("/Media/Soundtracks/Death Note")
            .unwrap()
            .unwrap();
        assert_eq!(one.albums_missing, Some(1));
    }

    #[test]
    fn test_unknown_watch_status_maps_to_none() {
        let db = Storage::open_memory().unwrap();
        db.insert_show(&test_show()).unwrap();
        db.conn
            .execute("UPDATE show SET watch_status = 'BINGEING' WHERE id = 1535", [])
            .unwrap();

        let fetched = db.get_show(1535).unwrap().unwrap();
        assert_eq!(fetched.watch_status, None);
    }
}
