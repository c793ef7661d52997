pub mod view_state;

use tana_api::anilist::types::AniListMedia;
use tana_api::anilist::{AniListClient, AniListError};
use tana_api::library::LibraryClient;
use tana_api::links::{external_links, rewrite_cover_path, ExternalLinks};
use tana_core::config::{AppConfig, LinksConfig, MediaConfig};
use tana_core::models::ShowDetail;

pub use view_state::{FileStore, KeyValueStore, MemoryStore, ViewState};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("config error: {0}")]
    Config(String),
    #[error("anime {0} not found")]
    NotFound(i64),
    #[error("metadata service error: {0}")]
    Metadata(#[from] AniListError),
}

/// Whether the library holds a show.
#[derive(Debug)]
pub enum LibraryPresence {
    InLibrary(ShowDetail),
    RemoteOnly,
}

impl LibraryPresence {
    pub fn in_library(&self) -> bool {
        matches!(self, LibraryPresence::InLibrary(_))
    }

    /// The library row, when there is one.
    pub fn detail(&self) -> Option<&ShowDetail> {
        match self {
            LibraryPresence::InLibrary(detail) => Some(detail),
            LibraryPresence::RemoteOnly => None,
        }
    }
}

/// One show as the views consume it: the remote record, the library
/// row when it exists, and display fields merged across both.
#[derive(Debug)]
pub struct ResolvedAnime {
    /// `None` only when the metadata service was unreachable and the
    /// library row carried the result alone.
    pub remote: Option<AniListMedia>,
    pub presence: LibraryPresence,
    pub title: String,
    pub secondary_title: Option<String>,
    pub score: Option<f32>,
    /// `None` when neither side has a cover; callers pick a placeholder.
    pub cover_url: Option<String>,
    pub links: ExternalLinks,
}

/// Joins the metadata service with the local library. Stateless; every
/// `resolve` call fetches both sides fresh.
pub struct Resolver {
    anilist: AniListClient,
    library: LibraryClient,
    links: LinksConfig,
    media: MediaConfig,
}

impl Resolver {
    pub fn from_config(config: &AppConfig) -> Result<Self, ResolveError> {
        let library = LibraryClient::new(&config.client.api_base)
            .map_err(|e| ResolveError::Config(e.to_string()))?;
        Ok(Self {
            anilist: AniListClient::new(),
            library,
            links: config.links.clone(),
            media: config.media.clone(),
        })
    }

    /// Fetch one show from both sides at once and merge. The metadata
    /// service decides existence; either gateway going down only
    /// degrades the result to the other side's data.
    pub async fn resolve(&self, id: i64) -> Result<ResolvedAnime, ResolveError> {
        let (remote, local) = tokio::join!(self.anilist.get_anime(id), self.library.get(id));

        let local = match local {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(id, error = %e, "library unreachable, serving remote data only");
                None
            }
        };
        let remote = remote_or_degrade(id, remote, local.is_some())?;

        Ok(compose(id, remote, local, &self.links, &self.media))
    }
}

/// What the remote side contributes. The metadata service stays
/// authoritative for existence, so an id it answers "absent" for is
/// `NotFound` regardless of the library; but when the service cannot be
/// reached at all, an existing library row still renders on its own.
fn remote_or_degrade(
    id: i64,
    remote: Result<Option<AniListMedia>, AniListError>,
    have_local: bool,
) -> Result<Option<AniListMedia>, ResolveError> {
    match remote {
        Ok(Some(media)) => Ok(Some(media)),
        Ok(None) => Err(ResolveError::NotFound(id)),
        Err(e) if have_local => {
            tracing::warn!(id, error = %e, "metadata service unreachable, serving library data only");
            Ok(None)
        }
        Err(e) => Err(ResolveError::Metadata(e)),
    }
}

/// Merge the remote record with whatever the library holds. Local
/// values win wherever both sides carry one. The id is the shared
/// identifier both sides were queried with.
fn compose(
    id: i64,
    remote: Option<AniListMedia>,
    local: Option<ShowDetail>,
    links: &LinksConfig,
    media: &MediaConfig,
) -> ResolvedAnime {
    let title = merge_title(remote.as_ref(), local.as_ref());
    let secondary_title = merge_secondary_title(remote.as_ref(), local.as_ref(), &title);
    let score = merge_score(remote.as_ref(), local.as_ref());
    let cover_url = merge_cover(remote.as_ref(), local.as_ref(), media);
    let links = external_links(
        links,
        id,
        local.as_ref().and_then(|d| d.show.plex_id),
        local.as_ref().and_then(|d| d.show.sonarr_id),
    );

    let presence = match local {
        Some(detail) => LibraryPresence::InLibrary(detail),
        None => LibraryPresence::RemoteOnly,
    };

    ResolvedAnime {
        remote,
        presence,
        title,
        secondary_title,
        score,
        cover_url,
        links,
    }
}

fn merge_title(remote: Option<&AniListMedia>, local: Option<&ShowDetail>) -> String {
    local
        .and_then(|d| d.show.english_name.clone())
        .or_else(|| local.and_then(|d| d.show.romanji_name.clone()))
        .or_else(|| remote.and_then(|m| m.title.as_ref()?.english.clone()))
        .or_else(|| remote.and_then(|m| m.title.as_ref()?.romaji.clone()))
        .unwrap_or_else(|| "Unknown Title".to_string())
}

/// Romaji subtitle line, dropped when it would just repeat the title.
fn merge_secondary_title(
    remote: Option<&AniListMedia>,
    local: Option<&ShowDetail>,
    primary: &str,
) -> Option<String> {
    local
        .and_then(|d| d.show.romanji_name.clone())
        .or_else(|| remote.and_then(|m| m.title.as_ref()?.romaji.clone()))
        .filter(|secondary| secondary != primary)
}

fn merge_score(remote: Option<&AniListMedia>, local: Option<&ShowDetail>) -> Option<f32> {
    local
        .and_then(|d| d.show.anilist_score)
        .or_else(|| remote.and_then(|m| m.score_out_of_ten()))
}

fn merge_cover(
    remote: Option<&AniListMedia>,
    local: Option<&ShowDetail>,
    media: &MediaConfig,
) -> Option<String> {
    local
        .and_then(|d| d.show.cover_image.as_deref())
        .map(|path| rewrite_cover_path(media, path))
        .or_else(|| remote.and_then(|m| m.cover_image.as_ref()?.large.clone()))
}
