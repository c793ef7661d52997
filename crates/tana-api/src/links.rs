//! Deep links into external services and cover-path rewriting.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use tana_core::config::{LinksConfig, MediaConfig};

/// Escape set for cover paths: every byte a browser address bar would
/// keep verbatim stays, the rest is percent-encoded.
const COVER_PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Links a detail view offers for one show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLinks {
    /// Always present; AniList URLs follow directly from the id.
    pub anilist_url: String,
    pub plex_url: Option<String>,
    pub sonarr_url: Option<String>,
}

/// Build the external links for a show. Plex and Sonarr links need both
/// a configured base URL and a stored id, and are omitted otherwise.
pub fn external_links(
    config: &LinksConfig,
    id: i64,
    plex_id: Option<i64>,
    sonarr_id: Option<i64>,
) -> ExternalLinks {
    ExternalLinks {
        anilist_url: format!("https://anilist.co/anime/{id}"),
        plex_url: match (&config.plex_web_base, plex_id) {
            (Some(base), Some(plex_id)) => Some(format!("{base}{plex_id}")),
            _ => None,
        },
        sonarr_url: match (&config.sonarr_base, sonarr_id) {
            (Some(base), Some(sonarr_id)) => Some(format!("{base}/series/{sonarr_id}")),
            _ => None,
        },
    }
}

/// Rewrite a stored cover path into a servable URL. Paths under the
/// configured media prefix map into the media base URL with the prefix
/// dropped; anything else is already a URL and passes through.
pub fn rewrite_cover_path(media: &MediaConfig, cover_image: &str) -> String {
    match cover_image.strip_prefix(&media.path_prefix) {
        Some(relative) => {
            let encoded = utf8_percent_encode(relative, COVER_PATH_SET);
            format!("{}{}", media.base_url, encoded)
        }
        None => cover_image.to_string(),
    }
}
