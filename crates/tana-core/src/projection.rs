//! Pure filtering and ordering for library lists.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;

use crate::models::{ShowRecord, WatchStatus};

/// Field a library list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    EnglishName,
    RomanjiName,
    Score,
}

impl SortField {
    pub const ALL: &[SortField] = &[
        Self::Id,
        Self::EnglishName,
        Self::RomanjiName,
        Self::Score,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::EnglishName => "english_name",
            Self::RomanjiName => "romanji_name",
            Self::Score => "anilist_score",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Self::Id),
            "english_name" => Some(Self::EnglishName),
            "romanji_name" => Some(Self::RomanjiName),
            "anilist_score" => Some(Self::Score),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Status tab selection: the ALL sentinel or one concrete status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Status(WatchStatus),
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Status(s) => s.as_db_str(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        if s == "ALL" {
            return Some(Self::All);
        }
        WatchStatus::from_db_str(s).map(Self::Status)
    }

    fn matches(&self, show: &ShowRecord) -> bool {
        match self {
            Self::All => true,
            Self::Status(wanted) => show.watch_status == Some(*wanted),
        }
    }
}

/// Apply search, status filter, and ordering to a list of shows.
///
/// Pure over its input: the slice is untouched and the same arguments
/// always produce the same output. The sort is stable, so equal keys
/// keep their incoming relative order in either direction.
pub fn project(
    shows: &[ShowRecord],
    search: &str,
    status: StatusFilter,
    field: SortField,
    direction: SortDirection,
) -> Vec<ShowRecord> {
    let needle = fold(search.trim());

    let mut out: Vec<ShowRecord> = shows
        .iter()
        .filter(|s| status.matches(s))
        .filter(|s| needle.is_empty() || matches_search(s, &needle))
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    out
}

fn compare(a: &ShowRecord, b: &ShowRecord, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::EnglishName => fold(a.english_name.as_deref().unwrap_or_default())
            .cmp(&fold(b.english_name.as_deref().unwrap_or_default())),
        SortField::RomanjiName => fold(a.romanji_name.as_deref().unwrap_or_default())
            .cmp(&fold(b.romanji_name.as_deref().unwrap_or_default())),
        // Absent scores compare as zero, so they sort first ascending.
        SortField::Score => a
            .anilist_score
            .unwrap_or(0.0)
            .total_cmp(&b.anilist_score.unwrap_or(0.0)),
    }
}

fn matches_search(show: &ShowRecord, needle: &str) -> bool {
    fold(show.english_name.as_deref().unwrap_or_default()).contains(needle)
        || fold(show.romanji_name.as_deref().unwrap_or_default()).contains(needle)
}

/// Collation key: NFKC-normalized and lowercased. Deterministic across
/// platforms, which matters more here than full locale tailoring.
fn fold(s: &str) -> String {
    s.nfkc().flat_map(char::to_lowercase).collect()
}
