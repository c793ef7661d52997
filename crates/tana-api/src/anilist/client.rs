use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::covers;
use super::error::AniListError;
use super::types::{
    AniListMedia, AnimeSeason, CoverImage, GraphQLResponse, MediaResponse, PageResponse,
};

const API_URL: &str = "https://graphql.anilist.co";

/// Upper bound on the narrow cover lookup, which sits on the render
/// path and must fail fast.
const COVER_TIMEOUT: Duration = Duration::from_secs(5);

const ANIME_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id, type: ANIME) {
        id
        title { english romaji }
        description(asHtml: false)
        coverImage { large }
        averageScore
        seasonYear
        season
        episodes
        status
        genres
        studios { nodes { name isMain } }
        startDate { year month day }
        format
        duration
        nextAiringEpisode { airingAt episode }
    }
}
"#;

const SEASON_QUERY: &str = r#"
query ($season: MediaSeason, $year: Int) {
    Page(page: 1, perPage: 20) {
        media(season: $season, seasonYear: $year, type: ANIME, sort: TRENDING_DESC, isAdult: false) {
            id
            title { english romaji }
            description(asHtml: false)
            coverImage { large }
            averageScore
            seasonYear
            season
            episodes
            status
            genres
        }
    }
}
"#;

const SEARCH_QUERY: &str = r#"
query ($search: String) {
    Page(page: 1, perPage: 20) {
        media(search: $search, type: ANIME, isAdult: false) {
            id
            title { english romaji }
            description(asHtml: false)
            coverImage { large }
            averageScore
            seasonYear
            season
            episodes
            status
            genres
        }
    }
}
"#;

const AIRING_QUERY: &str = r#"
query {
    Page(page: 1, perPage: 50) {
        media(type: ANIME, status: RELEASING, sort: POPULARITY_DESC) {
            id
            title { english romaji }
            coverImage { medium }
            episodes
            nextAiringEpisode { airingAt episode }
        }
    }
}
"#;

const COVER_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id, type: ANIME) {
        coverImage { large }
        averageScore
    }
}
"#;

#[derive(Debug, Deserialize)]
struct CoverResponse {
    #[serde(rename = "Media")]
    media: Option<CoverMedia>,
}

#[derive(Debug, Deserialize)]
struct CoverMedia {
    #[serde(rename = "coverImage")]
    cover_image: Option<CoverImage>,
    #[serde(rename = "averageScore")]
    average_score: Option<u32>,
}

/// AniList GraphQL client. Everything queried here is public data, so
/// no authentication is carried.
pub struct AniListClient {
    http: Client,
}

impl AniListClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    async fn graphql_request<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, AniListError> {
        let mut request = self
            .http
            .post(API_URL)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }));
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(AniListError::Api { status, message });
        }

        resp.json::<T>()
            .await
            .map_err(|e| AniListError::Parse(e.to_string()))
    }

    /// Fetch one anime by AniList id. A missing id is `None`, not an
    /// error; AniList reports it as a 404.
    pub async fn get_anime(&self, id: i64) -> Result<Option<AniListMedia>, AniListError> {
        let result: Result<GraphQLResponse<MediaResponse>, AniListError> = self
            .graphql_request(ANIME_QUERY, serde_json::json!({ "id": id }), None)
            .await;

        match absent_on_404(result)? {
            Some(resp) => Ok(resp.data.media),
            None => {
                tracing::debug!(id, "anime not found on AniList");
                Ok(None)
            }
        }
    }

    /// Trending anime for one season, most trending first. Adult
    /// entries are excluded.
    pub async fn season_trending(
        &self,
        season: AnimeSeason,
        year: i32,
    ) -> Result<Vec<AniListMedia>, AniListError> {
        let resp: GraphQLResponse<PageResponse> = self
            .graphql_request(
                SEASON_QUERY,
                serde_json::json!({ "season": season.to_anilist_str(), "year": year }),
                None,
            )
            .await?;
        tracing::debug!(%season, year, count = resp.data.page.media.len(), "fetched seasonal anime");
        Ok(resp.data.page.media)
    }

    /// Full-text search. Empty or whitespace-only input short-circuits
    /// to an empty list without a network call.
    pub async fn search(&self, text: &str) -> Result<Vec<AniListMedia>, AniListError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let resp: GraphQLResponse<PageResponse> = self
            .graphql_request(SEARCH_QUERY, serde_json::json!({ "search": text }), None)
            .await?;
        Ok(resp.data.page.media)
    }

    /// Popular currently-airing shows that have a scheduled next
    /// episode.
    pub async fn currently_airing(&self) -> Result<Vec<AniListMedia>, AniListError> {
        let resp: GraphQLResponse<PageResponse> = self
            .graphql_request(AIRING_QUERY, serde_json::json!({}), None)
            .await?;
        let airing: Vec<AniListMedia> = resp
            .data
            .page
            .media
            .into_iter()
            .filter(|m| m.next_airing_episode.is_some())
            .collect();
        tracing::debug!(count = airing.len(), "fetched airing schedule");
        Ok(airing)
    }

    /// Cover URL for a show: the built-in cache first, then one bounded
    /// lookup. `None` means AniList does not know the id or has no
    /// large cover for it.
    pub async fn cover_url(&self, id: i64) -> Result<Option<String>, AniListError> {
        if let Some(url) = covers::cached_cover(id) {
            return Ok(Some(url.to_string()));
        }

        let result: Result<GraphQLResponse<CoverResponse>, AniListError> = self
            .graphql_request(
                COVER_QUERY,
                serde_json::json!({ "id": id }),
                Some(COVER_TIMEOUT),
            )
            .await;

        let Some(resp) = absent_on_404(result)? else {
            tracing::debug!(id, "anime not found on AniList");
            return Ok(None);
        };
        let Some(media) = resp.data.media else {
            return Ok(None);
        };
        if let Some(score) = media.average_score {
            tracing::trace!(id, score, "cover lookup");
        }
        Ok(media.cover_image.and_then(|c| c.large))
    }
}

impl Default for AniListClient {
    fn default() -> Self {
        Self::new()
    }
}

/// AniList signals an unknown id with an HTTP 404 rather than a null
/// payload; fold that into the absent case.
fn absent_on_404<T>(result: Result<T, AniListError>) -> Result<Option<T>, AniListError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AniListError::Api { status: 404, .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
