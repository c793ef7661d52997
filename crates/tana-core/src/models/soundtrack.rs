use serde::{Deserialize, Serialize};

/// One row of the `soundtrack` table, keyed by the filesystem path a
/// show's `soundtrack_path` points at. A row without a referencing show
/// is an orphan and never written by this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundtrackRecord {
    pub soundtrack_path: String,
    pub albums_count: Option<u32>,
    pub albums_missing: Option<u32>,
    pub lossless: Option<String>,
    pub album_list: Option<String>,
    pub file_formats: Option<String>,
    pub download_status: Option<String>,
}
