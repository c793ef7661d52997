use reqwest::Client;
use url::Url;

use tana_core::models::{ShowDetail, ShowPatch, ShowRecord, SoundtrackRecord};

use super::error::LibraryError;

/// REST client for the library backend.
pub struct LibraryClient {
    base: Url,
    http: Client,
}

impl LibraryClient {
    /// `base` is the API root including the `/api` segment, e.g.
    /// `http://localhost:5000/api`.
    pub fn new(base: &str) -> Result<Self, LibraryError> {
        let base = Url::parse(base).map_err(|e| LibraryError::Parse(e.to_string()))?;
        Ok(Self {
            base,
            http: Client::new(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, LibraryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| LibraryError::Parse("API base URL cannot hold a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, LibraryError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            Err(LibraryError::Api { status, message })
        }
    }

    /// Every show in the library.
    pub async fn list(&self) -> Result<Vec<ShowRecord>, LibraryError> {
        let url = self.endpoint(&["anime"])?;
        let resp = Self::check_response(self.http.get(url).send().await?).await?;
        resp.json()
            .await
            .map_err(|e| LibraryError::Parse(e.to_string()))
    }

    /// One show with its soundtrack info, or `None` when the library
    /// does not hold it.
    pub async fn get(&self, id: i64) -> Result<Option<ShowDetail>, LibraryError> {
        let url = self.endpoint(&["anime", &id.to_string()])?;
        let resp = self.http.get(url).send().await?;
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map(Some)
            .map_err(|e| LibraryError::Parse(e.to_string()))
    }

    /// Substring search over both name columns. Empty input falls back
    /// to the full list, matching the backend's contract.
    pub async fn search(&self, query: &str) -> Result<Vec<ShowRecord>, LibraryError> {
        if query.is_empty() {
            return self.list().await;
        }
        let url = self.endpoint(&["anime", "search", query])?;
        let resp = Self::check_response(self.http.get(url).send().await?).await?;
        resp.json()
            .await
            .map_err(|e| LibraryError::Parse(e.to_string()))
    }

    /// Apply a watch-progress patch and return the stored row.
    pub async fn update(&self, id: i64, patch: &ShowPatch) -> Result<ShowRecord, LibraryError> {
        let url = self.endpoint(&["anime", &id.to_string()])?;
        let resp = Self::check_response(self.http.patch(url).json(patch).send().await?).await?;
        resp.json()
            .await
            .map_err(|e| LibraryError::Parse(e.to_string()))
    }

    /// Every tracked soundtrack directory.
    pub async fn soundtracks(&self) -> Result<Vec<SoundtrackRecord>, LibraryError> {
        let url = self.endpoint(&["soundtracks"])?;
        let resp = Self::check_response(self.http.get(url).send().await?).await?;
        resp.json()
            .await
            .map_err(|e| LibraryError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = LibraryClient::new("http://localhost:5000/api").unwrap();
        let url = client.endpoint(&["anime", "1535"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/anime/1535");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = LibraryClient::new("http://localhost:5000/api/").unwrap();
        let url = client.endpoint(&["anime"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/anime");
    }

    #[test]
    fn test_endpoint_escapes_search_text() {
        let client = LibraryClient::new("http://localhost:5000/api").unwrap();
        let url = client.endpoint(&["anime", "search", "death note"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/anime/search/death%20note"
        );
    }

    #[test]
    fn test_rejects_unusable_base() {
        assert!(LibraryClient::new("not a url").is_err());
    }
}
