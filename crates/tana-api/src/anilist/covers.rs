//! Cover art for the shows the UI renders on every visit, pinned so
//! they never cost an AniList round-trip.

/// Built-in cover cache, keyed by AniList id.
pub fn cached_cover(id: i64) -> Option<&'static str> {
    let url = match id {
        1535 => "https://s4.anilist.co/file/anilistcdn/media/anime/cover/medium/bx1535-kUgkcrfOrkUM.jpg",
        101922 => "https://s4.anilist.co/file/anilistcdn/media/anime/cover/medium/bx101922-WBsBl0ClmgYL.jpg",
        20605 => "https://s4.anilist.co/file/anilistcdn/media/anime/cover/medium/b20605-k665mVkSug8D.jpg",
        21459 => "https://s4.anilist.co/file/anilistcdn/media/anime/cover/medium/bx21459-nYh85uj2Fuwr.jpg",
        20958 => "https://s4.anilist.co/file/anilistcdn/media/anime/cover/medium/bx20958-HuFJyr54Mmir.jpg",
        _ => return None,
    };
    Some(url)
}

/// Deterministic stand-in image for a show with no cover anywhere.
pub fn placeholder(id: i64) -> String {
    format!("https://source.unsplash.com/featured/?anime,{id}")
}
