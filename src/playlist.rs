//! Playlist ranking.
//!
//! Picks the tracks tagged with an emotion and orders them by popularity.

use crate::track::Track;
use log::debug;
use serde::Serialize;

/// Default number of tracks in a playlist.
pub const DEFAULT_LIMIT: usize = 10;

/// Ranking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistConfig {
    /// Maximum number of tracks returned.
    pub limit: usize,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT }
    }
}

/// Ranked tracks, most popular first. Serializes as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }
}

/// Top tracks tagged `emotion`, with the default limit of ten.
///
/// # Examples
///
/// ```
/// use moodtune::playlist::generate_playlist;
/// use moodtune::track::{parse_tracks, Popularity};
///
/// let tracks = parse_tracks(r#"[
///     {"tags": ["Happy"], "popularity": 50},
///     {"tags": ["Sad"], "popularity": 90}
/// ]"#)?;
///
/// let playlist = generate_playlist("Happy", &tracks);
/// assert_eq!(playlist.len(), 1);
/// assert_eq!(playlist.tracks()[0].popularity(), Popularity::Int(50));
/// # Ok::<(), moodtune::track::TrackError>(())
/// ```
#[must_use]
pub fn generate_playlist(emotion: &str, tracks: &[Track]) -> Playlist {
    generate_playlist_with(emotion, tracks, &PlaylistConfig::default())
}

/// Filters on exact tag membership, stable-sorts by descending popularity,
/// then truncates to `config.limit`.
#[must_use]
pub fn generate_playlist_with(emotion: &str, tracks: &[Track], config: &PlaylistConfig) -> Playlist {
    let mut ranked: Vec<&Track> = tracks.iter().filter(|track| track.has_tag(emotion)).collect();

    // `sort_by` is stable: equal popularity keeps input order.
    ranked.sort_by(|a, b| b.popularity().cmp(&a.popularity()));

    debug!(
        "{} of {} tracks tagged `{emotion}', keeping at most {}",
        ranked.len(),
        tracks.len(),
        config.limit
    );

    Playlist {
        tracks: ranked.into_iter().take(config.limit).cloned().collect(),
    }
}
