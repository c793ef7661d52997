use serde::{Deserialize, Serialize};

use super::soundtrack::SoundtrackRecord;

/// Watch status for a show, stored and serialized as the uppercase
/// AniList status strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchStatus {
    Current,
    Planning,
    Completed,
    Repeating,
    Paused,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "Watching",
            Self::Planning => "Planning",
            Self::Completed => "Completed",
            Self::Repeating => "Rewatching",
            Self::Paused => "Paused",
        }
    }

    /// Database string representation (same strings as the JSON form).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Planning => "PLANNING",
            Self::Completed => "COMPLETED",
            Self::Repeating => "REPEATING",
            Self::Paused => "PAUSED",
        }
    }

    /// Parse a database value. Unknown strings map to `None`; the table
    /// is curated externally and may carry values we don't model.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CURRENT" => Some(Self::Current),
            "PLANNING" => Some(Self::Planning),
            "COMPLETED" => Some(Self::Completed),
            "REPEATING" => Some(Self::Repeating),
            "PAUSED" => Some(Self::Paused),
            _ => None,
        }
    }

    pub const ALL: &[WatchStatus] = &[
        Self::Current,
        Self::Planning,
        Self::Completed,
        Self::Repeating,
        Self::Paused,
    ];
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the `show` table, consumed as-is. The `id` shares
/// AniList's identifier space by curation convention, and the
/// `romanji_name` spelling is the schema's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowRecord {
    pub id: i64,
    pub english_name: Option<String>,
    pub romanji_name: Option<String>,
    pub year: Option<i32>,
    pub num_seasons: Option<u32>,
    pub is_dubbed: Option<bool>,
    pub show_path: Option<String>,
    pub season_path: Option<String>,
    pub soundtrack_path: Option<String>,
    pub sonarr_id: Option<i64>,
    pub sonarr_monitor_status: Option<bool>,
    pub season_number: Option<u32>,
    pub episodes: Option<u32>,
    pub episodes_dl: Option<u32>,
    pub anilist_progress: Option<u32>,
    pub release_status: Option<String>,
    pub cover_image: Option<String>,
    pub watch_status: Option<WatchStatus>,
    pub anilist_score: Option<f32>,
    pub plex_id: Option<i64>,
}

/// A show joined with its soundtrack row, as served by the detail
/// endpoint. The `soundtrack_info` key only appears in the JSON when
/// the show has a tracked soundtrack directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowDetail {
    #[serde(flatten)]
    pub show: ShowRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soundtrack_info: Option<SoundtrackRecord>,
}

/// Partial update carrying the only two fields this system may write.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ShowPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anilist_progress: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_status: Option<WatchStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_status_db_roundtrip() {
        for status in WatchStatus::ALL {
            assert_eq!(WatchStatus::from_db_str(status.as_db_str()), Some(*status));
        }
        assert_eq!(WatchStatus::from_db_str("BINGEING"), None);
    }

    #[test]
    fn test_watch_status_serializes_uppercase() {
        let json = serde_json::to_string(&WatchStatus::Current).unwrap();
        assert_eq!(json, "\"CURRENT\"");
        let back: WatchStatus = serde_json::from_str("\"REPEATING\"").unwrap();
        assert_eq!(back, WatchStatus::Repeating);
    }

    #[test]
    fn test_detail_flattens_show_fields() {
        let show = ShowRecord {
            id: 1535,
            english_name: Some("Death Note".into()),
            romanji_name: Some("Death Note".into()),
            year: Some(2006),
            num_seasons: Some(1),
            is_dubbed: Some(true),
            show_path: None,
            season_path: None,
            soundtrack_path: None,
            sonarr_id: None,
            sonarr_monitor_status: None,
            season_number: Some(1),
            episodes: Some(37),
            episodes_dl: Some(37),
            anilist_progress: Some(37),
            release_status: Some("FINISHED".into()),
            cover_image: None,
            watch_status: Some(WatchStatus::Completed),
            anilist_score: Some(8.7),
            plex_id: None,
        };
        let detail = ShowDetail {
            show,
            soundtrack_info: None,
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["id"], 1535);
        assert_eq!(value["english_name"], "Death Note");
        assert_eq!(value["watch_status"], "COMPLETED");
        // The key only appears when a soundtrack row exists.
        assert!(value.get("soundtrack_info").is_none());
        // Flattened, so no nested "show" object.
        assert!(value.get("show").is_none());
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = ShowPatch {
            anilist_progress: Some(12),
            watch_status: None,
        };
        let value = serde_json::to_value(patch).unwrap();
        assert_eq!(value["anilist_progress"], 12);
        assert!(value.get("watch_status").is_none());
    }
}
