use std::time::Duration;

use music_bingo_core::{TrackId, TrackSource};
use serde::Deserialize;

/// Track listing read from a TOML file.
///
/// ```toml
/// [game]
/// tickets = 24
///
/// [[track]]
/// title = "Heroes"
/// artist = "David Bowie"
/// duration_secs = 371
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Listing {
    /// Game settings stored alongside the tracks.
    #[serde(default)]
    pub(crate) game: GameSection,
    /// Tracks eligible for the game, in listing order.
    #[serde(default, rename = "track")]
    pub(crate) tracks: Vec<ListedTrack>,
}

/// Optional `[game]` table of a listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GameSection {
    pub(crate) tickets: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) columns: Option<u32>,
    pub(crate) minimum_pool: Option<usize>,
    pub(crate) shuffle: Option<bool>,
    pub(crate) seed: Option<u64>,
}

/// Single `[[track]]` entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListedTrack {
    pub(crate) title: String,
    pub(crate) artist: String,
    #[serde(default)]
    pub(crate) duration_secs: u64,
}

impl Listing {
    /// Parses a listing from TOML text.
    pub(crate) fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Converts the listed tracks into sources identified by listing position.
    #[must_use]
    pub(crate) fn sources(&self) -> Vec<TrackSource> {
        self.tracks
            .iter()
            .zip(0..)
            .map(|(track, index)| {
                TrackSource::new(
                    TrackId::new(index),
                    track.title.as_str(),
                    track.artist.as_str(),
                    Duration::from_secs(track.duration_secs),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tracks_and_game_table() {
        let listing = Listing::parse(
            r#"
            [game]
            tickets = 30
            shuffle = false

            [[track]]
            title = "Heroes"
            artist = "David Bowie"
            duration_secs = 371

            [[track]]
            title = "Atlantis"
            artist = "Donovan"
            "#,
        )
        .expect("listing parses");

        assert_eq!(listing.game.tickets, Some(30));
        assert_eq!(listing.game.shuffle, Some(false));
        assert_eq!(listing.game.rows, None);

        let sources = listing.sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].id(), TrackId::new(0));
        assert_eq!(sources[0].title(), "Heroes");
        assert_eq!(sources[0].duration(), Duration::from_secs(371));
        assert_eq!(sources[1].id(), TrackId::new(1));
        assert_eq!(sources[1].duration(), Duration::ZERO);
    }

    #[test]
    fn empty_listing_has_no_tracks() {
        let listing = Listing::parse("").expect("listing parses");
        assert_eq!(listing, Listing::default());
        assert!(listing.sources().is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Listing::parse("[game]\nticket = 3\n").is_err());
        assert!(Listing::parse("[[track]]\ntitle = \"A\"\n").is_err());
    }
}
