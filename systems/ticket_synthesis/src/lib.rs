#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ticket synthesis: random fixed-size track subsets with unique fingerprints.

use music_bingo_core::{
    AttemptBudget, CancellationToken, DraftTicket, Fingerprint, Track, UsedFingerprints,
};
use rand::{seq::index, Rng};
use tracing::trace;

/// Result of a single synthesizer draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Draw {
    /// A ticket with a previously unused fingerprint; the fingerprint is now claimed.
    Ticket(DraftTicket),
    /// The attempt budget ran out before an unused track set was found.
    Exhausted,
    /// Cancellation was observed between attempts.
    Aborted,
}

/// Pure system drawing random track subsets for tickets.
#[derive(Debug, Default)]
pub struct TicketSynthesizer {
    collisions: u64,
}

impl TicketSynthesizer {
    /// Creates a synthesizer with no recorded collisions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of draws discarded because their fingerprint was taken.
    #[must_use]
    pub const fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Draws `size` distinct tracks from `pool` until the set is unused.
    ///
    /// A collision discards the whole draw and samples again. Every attempt
    /// consumes one unit of `budget`; cancellation is polled before each
    /// attempt. On success the fingerprint is claimed in `used` before the
    /// ticket is returned. A request that cannot be satisfied at all
    /// (`size` of zero or larger than the pool) reports
    /// [`Draw::Exhausted`] immediately.
    pub fn draw<R>(
        &mut self,
        pool: &[Track],
        size: usize,
        used: &mut UsedFingerprints,
        budget: &mut AttemptBudget,
        cancel: &CancellationToken,
        rng: &mut R,
    ) -> Draw
    where
        R: Rng + ?Sized,
    {
        if size == 0 || size > pool.len() {
            return Draw::Exhausted;
        }

        loop {
            if cancel.is_cancelled() {
                return Draw::Aborted;
            }
            if !budget.try_consume() {
                return Draw::Exhausted;
            }

            let indices = index::sample(rng, pool.len(), size);
            let fingerprint = Fingerprint::from_primes(indices.iter().map(|at| pool[at].prime()));
            if used.contains(&fingerprint) {
                self.collisions += 1;
                trace!(collisions = self.collisions, "fingerprint collision, redrawing");
                continue;
            }

            let draft = DraftTicket::new(indices.iter().map(|at| pool[at].clone()).collect());
            let claimed = used.claim(draft.fingerprint().clone());
            debug_assert!(claimed, "fingerprint was checked as unused");
            return Draw::Ticket(draft);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Draw, TicketSynthesizer};
    use music_bingo_core::{
        AttemptBudget, CancellationToken, Prime, Track, TrackId, TrackSource, UsedFingerprints,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::{collections::HashSet, time::Duration};

    fn pool(primes: &[u32]) -> Vec<Track> {
        primes
            .iter()
            .map(|&prime| {
                Track::from_source(
                    TrackSource::new(TrackId::new(prime), "Song", "Artist", Duration::ZERO),
                    Prime::new(prime),
                )
            })
            .collect()
    }

    #[test]
    fn drawn_tickets_hold_distinct_pool_tracks() {
        let pool = pool(&[2, 3, 5, 7, 11, 13, 17, 19]);
        let mut synthesizer = TicketSynthesizer::new();
        let mut used = UsedFingerprints::new();
        let mut budget = AttemptBudget::new(1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let draft = match synthesizer.draw(
            &pool,
            4,
            &mut used,
            &mut budget,
            &CancellationToken::new(),
            &mut rng,
        ) {
            Draw::Ticket(draft) => draft,
            other => panic!("expected a ticket, got {other:?}"),
        };

        assert_eq!(draft.tracks().len(), 4);
        let primes: HashSet<Prime> = draft.tracks().iter().map(Track::prime).collect();
        assert_eq!(primes.len(), 4);
        assert!(used.contains(draft.fingerprint()));
    }

    #[test]
    fn whole_space_is_drawn_then_exhausted() {
        let pool = pool(&[2, 3, 5, 7]);
        let mut synthesizer = TicketSynthesizer::new();
        let mut used = UsedFingerprints::new();
        let mut budget = AttemptBudget::new(10_000);
        let cancel = CancellationToken::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        for _ in 0..4 {
            let draw = synthesizer.draw(&pool, 3, &mut used, &mut budget, &cancel, &mut rng);
            assert!(matches!(draw, Draw::Ticket(_)), "unexpected {draw:?}");
        }
        assert_eq!(used.len(), 4);

        let draw = synthesizer.draw(&pool, 3, &mut used, &mut budget, &cancel, &mut rng);
        assert_eq!(draw, Draw::Exhausted);
        assert_eq!(budget.spent(), budget.limit());
        assert!(synthesizer.collisions() > 0);
    }

    #[test]
    fn cancellation_aborts_before_drawing() {
        let pool = pool(&[2, 3, 5]);
        let mut used = UsedFingerprints::new();
        let mut budget = AttemptBudget::new(10);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let draw = TicketSynthesizer::new().draw(
            &pool,
            2,
            &mut used,
            &mut budget,
            &cancel,
            &mut ChaCha8Rng::seed_from_u64(1),
        );
        assert_eq!(draw, Draw::Aborted);
        assert!(used.is_empty());
        assert_eq!(budget.spent(), 0);
    }

    #[test]
    fn oversized_request_is_exhausted() {
        let pool = pool(&[2, 3]);
        let draw = TicketSynthesizer::new().draw(
            &pool,
            3,
            &mut UsedFingerprints::new(),
            &mut AttemptBudget::new(10),
            &CancellationToken::new(),
            &mut ChaCha8Rng::seed_from_u64(1),
        );
        assert_eq!(draw, Draw::Exhausted);
    }
}
