//! Response types for the AniList GraphQL API.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Text shown when AniList has no description for a show.
pub const NO_DESCRIPTION: &str = "No description available.";

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct MediaResponse {
    /// `null` when the queried id does not exist.
    #[serde(rename = "Media")]
    pub media: Option<AniListMedia>,
}

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: PageData,
}

#[derive(Debug, Deserialize)]
pub struct PageData {
    pub media: Vec<AniListMedia>,
}

/// One anime as AniList describes it. Every field beyond the id is
/// optional; list queries request a narrower slice than detail queries,
/// so most of these arrive as `None` some of the time.
#[derive(Debug, Deserialize)]
pub struct AniListMedia {
    pub id: i64,
    pub title: Option<AniListTitle>,
    pub description: Option<String>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<CoverImage>,
    #[serde(rename = "averageScore")]
    pub average_score: Option<u32>,
    #[serde(rename = "seasonYear")]
    pub season_year: Option<i32>,
    pub season: Option<AnimeSeason>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub genres: Option<Vec<String>>,
    pub studios: Option<StudioConnection>,
    #[serde(rename = "startDate")]
    pub start_date: Option<FuzzyDate>,
    pub format: Option<String>,
    pub duration: Option<u32>,
    #[serde(rename = "nextAiringEpisode")]
    pub next_airing_episode: Option<NextAiringEpisode>,
}

impl AniListMedia {
    /// Average score on a 0-10 scale, as AniList's site shows it.
    pub fn score_out_of_ten(&self) -> Option<f32> {
        self.average_score.map(|s| s as f32 / 10.0)
    }

    /// Name of the studio flagged as main, falling back to the first
    /// listed one.
    pub fn main_studio(&self) -> Option<&str> {
        let nodes = self.studios.as_ref()?.nodes.as_ref()?;
        nodes
            .iter()
            .find(|s| s.is_main == Some(true))
            .or_else(|| nodes.first())
            .map(|s| s.name.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct AniListTitle {
    pub english: Option<String>,
    pub romaji: Option<String>,
}

impl AniListTitle {
    /// English title when AniList has one, otherwise romaji.
    pub fn preferred(&self) -> Option<&str> {
        self.english.as_deref().or(self.romaji.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StudioConnection {
    pub nodes: Option<Vec<StudioNode>>,
}

#[derive(Debug, Deserialize)]
pub struct StudioNode {
    pub name: String,
    #[serde(rename = "isMain")]
    pub is_main: Option<bool>,
}

/// AniList's partial date. Any of the parts can be missing.
#[derive(Debug, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl FuzzyDate {
    /// `YYYY-MM-DD` when the date is complete, `None` otherwise.
    pub fn to_string_opt(&self) -> Option<String> {
        match (self.year, self.month, self.day) {
            (Some(y), Some(m), Some(d)) => Some(format!("{y:04}-{m:02}-{d:02}")),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NextAiringEpisode {
    /// Unix timestamp of the broadcast.
    #[serde(rename = "airingAt")]
    pub airing_at: i64,
    pub episode: u32,
}

impl NextAiringEpisode {
    /// Broadcast time as a UTC datetime.
    pub fn airs_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.airing_at, 0)
    }
}

/// Broadcast season, mirroring AniList's `MediaSeason` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimeSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl AnimeSeason {
    pub const ALL: [AnimeSeason; 4] = [
        AnimeSeason::Winter,
        AnimeSeason::Spring,
        AnimeSeason::Summer,
        AnimeSeason::Fall,
    ];

    /// The value AniList expects in query variables.
    pub fn to_anilist_str(self) -> &'static str {
        match self {
            AnimeSeason::Winter => "WINTER",
            AnimeSeason::Spring => "SPRING",
            AnimeSeason::Summer => "SUMMER",
            AnimeSeason::Fall => "FALL",
        }
    }

    /// Season a calendar month falls in.
    pub fn for_month(month: u32) -> Self {
        match month {
            1..=3 => AnimeSeason::Winter,
            4..=6 => AnimeSeason::Spring,
            7..=9 => AnimeSeason::Summer,
            _ => AnimeSeason::Fall,
        }
    }

    /// Season the current month falls in.
    pub fn current() -> Self {
        use chrono::Datelike;
        Self::for_month(chrono::Utc::now().month())
    }
}

impl std::fmt::Display for AnimeSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnimeSeason::Winter => "Winter",
            AnimeSeason::Spring => "Spring",
            AnimeSeason::Summer => "Summer",
            AnimeSeason::Fall => "Fall",
        };
        write!(f, "{name}")
    }
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n+").expect("valid regex"));

/// Strip the markup AniList embeds in descriptions and collapse runs of
/// blank lines. A missing or empty description becomes a fixed
/// placeholder rather than an empty string.
pub fn clean_description(description: Option<&str>) -> String {
    match description {
        None | Some("") => NO_DESCRIPTION.to_string(),
        Some(raw) => {
            let stripped = TAG_RE.replace_all(raw, "");
            let collapsed = BLANK_RUN_RE.replace_all(&stripped, "\n\n");
            collapsed.trim().to_string()
        }
    }
}
