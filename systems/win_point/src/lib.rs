#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Win-point evaluation: where in a track order a ticket completes.

use std::collections::HashSet;

use music_bingo_core::{GenerationError, Prime, Track, TrackOrder, WinPoint};

/// Pure system resolving the win point of track sets against an order.
///
/// The evaluator keeps a scratch set between calls so the scheduler can
/// evaluate thousands of draws without reallocating. Results depend only on
/// the inputs, which are never mutated.
#[derive(Debug, Default)]
pub struct WinPointEvaluator {
    remaining: HashSet<Prime>,
}

impl WinPointEvaluator {
    /// Creates an evaluator with an empty scratch set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the one-based position at which the last of `tracks` plays.
    ///
    /// Runs in `O(order.len())`. Fails with
    /// [`GenerationError::IncompleteCoverage`] when some of `tracks` never
    /// play; an empty track set never completes and is reported the same way.
    pub fn evaluate(
        &mut self,
        order: &TrackOrder,
        tracks: &[Track],
    ) -> Result<WinPoint, GenerationError> {
        self.remaining.clear();
        self.remaining.extend(tracks.iter().map(Track::prime));

        if !self.remaining.is_empty() {
            for (index, track) in order.tracks().iter().enumerate() {
                if self.remaining.remove(&track.prime()) && self.remaining.is_empty() {
                    return Ok(WinPoint::new(index + 1));
                }
            }
        }

        Err(GenerationError::IncompleteCoverage {
            missing: self.remaining.len(),
        })
    }
}

/// Convenience wrapper evaluating a single track set with a fresh scratch set.
pub fn win_point(order: &TrackOrder, tracks: &[Track]) -> Result<WinPoint, GenerationError> {
    WinPointEvaluator::new().evaluate(order, tracks)
}

#[cfg(test)]
mod tests {
    use super::{win_point, WinPointEvaluator};
    use music_bingo_core::{GenerationError, Prime, Track, TrackId, TrackOrder, TrackSource, WinPoint};
    use std::time::Duration;

    fn track(name: &str, prime: u32) -> Track {
        Track::from_source(
            TrackSource::new(TrackId::new(prime), name, "Artist", Duration::ZERO),
            Prime::new(prime),
        )
    }

    fn abcde() -> (TrackOrder, Vec<Track>) {
        let tracks = vec![
            track("A", 2),
            track("B", 3),
            track("C", 5),
            track("D", 7),
            track("E", 11),
        ];
        (TrackOrder::new(tracks.clone()), tracks)
    }

    #[test]
    fn returns_position_of_last_member() {
        let (order, tracks) = abcde();
        let ticket = vec![tracks[1].clone(), tracks[3].clone()];
        assert_eq!(win_point(&order, &ticket), Ok(WinPoint::new(4)));
    }

    #[test]
    fn ticket_order_is_irrelevant() {
        let (order, tracks) = abcde();
        let forward = vec![tracks[0].clone(), tracks[4].clone()];
        let reversed = vec![tracks[4].clone(), tracks[0].clone()];
        assert_eq!(win_point(&order, &forward), win_point(&order, &reversed));
        assert_eq!(win_point(&order, &forward), Ok(WinPoint::new(5)));
    }

    #[test]
    fn repeated_evaluation_is_idempotent() {
        let (order, tracks) = abcde();
        let ticket = vec![tracks[2].clone(), tracks[0].clone()];
        let snapshot = (order.clone(), ticket.clone());

        let mut evaluator = WinPointEvaluator::new();
        let first = evaluator.evaluate(&order, &ticket);
        let second = evaluator.evaluate(&order, &ticket);

        assert_eq!(first, Ok(WinPoint::new(3)));
        assert_eq!(first, second);
        assert_eq!(snapshot, (order, ticket), "inputs must not be mutated");
    }

    #[test]
    fn missing_tracks_are_reported() {
        let (order, tracks) = abcde();
        let ticket = vec![tracks[1].clone(), track("Z", 13), track("Y", 17)];
        assert_eq!(
            win_point(&order, &ticket),
            Err(GenerationError::IncompleteCoverage { missing: 2 })
        );
    }

    #[test]
    fn empty_track_set_never_completes() {
        let (order, _) = abcde();
        assert_eq!(
            win_point(&order, &[]),
            Err(GenerationError::IncompleteCoverage { missing: 0 })
        );
    }
}
