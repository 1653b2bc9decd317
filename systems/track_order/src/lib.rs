#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Track order generation for a single game.

use music_bingo_core::{Track, TrackOrder};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

/// Selects how the playback order is derived from the track pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrderMode {
    /// Uniformly random permutation of the pool.
    #[default]
    Shuffled,
    /// Pool order is played unchanged.
    Sequential,
}

/// Pure system producing the one playback order used by a game.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackOrderGenerator {
    mode: OrderMode,
}

impl TrackOrderGenerator {
    /// Creates a generator using the provided mode.
    #[must_use]
    pub const fn new(mode: OrderMode) -> Self {
        Self { mode }
    }

    /// Mode the generator was configured with.
    #[must_use]
    pub const fn mode(&self) -> OrderMode {
        self.mode
    }

    /// Produces the playback order for `tracks`.
    ///
    /// The generator drives a Fisher-Yates shuffle, so production callers pass
    /// an unpredictable generator while tests pass a seeded one.
    pub fn generate<R>(&self, tracks: &[Track], rng: &mut R) -> TrackOrder
    where
        R: Rng + ?Sized,
    {
        let mut ordered = tracks.to_vec();
        if self.mode == OrderMode::Shuffled {
            ordered.shuffle(rng);
        }
        debug!(tracks = ordered.len(), mode = ?self.mode, "generated track order");
        TrackOrder::new(ordered)
    }
}
