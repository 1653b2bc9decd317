//! Ticket-checking read path: recompute a win point from a persisted record.

use std::collections::HashMap;

use music_bingo_core::{
    GenerationError, Prime, TicketNumber, TicketRecord, Track, TrackOrder, WinPoint,
};
use music_bingo_system_primes::factor;
use music_bingo_system_win_point::win_point;

/// Result of checking a persisted ticket against its game's track order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketCheck {
    number: TicketNumber,
    tracks: Vec<Track>,
    win_point: WinPoint,
}

impl TicketCheck {
    /// Number printed on the checked ticket.
    #[must_use]
    pub const fn number(&self) -> TicketNumber {
        self.number
    }

    /// Tracks recovered from the fingerprint, in playback order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Position in the order at which the ticket completes.
    #[must_use]
    pub const fn win_point(&self) -> WinPoint {
        self.win_point
    }

    /// Reports whether the ticket is complete after `played` tracks.
    #[must_use]
    pub const fn has_won_after(&self, played: usize) -> bool {
        self.win_point.get() <= played
    }
}

/// Factors the record's fingerprint, maps the primes back to tracks of
/// `order` and re-evaluates the win point.
///
/// Fails with [`GenerationError::UnknownFactor`] when a prime does not
/// belong to the order and with [`GenerationError::DuplicateTrack`] when a
/// prime repeats.
pub fn check_ticket(
    order: &TrackOrder,
    record: &TicketRecord,
) -> Result<TicketCheck, GenerationError> {
    let primes = factor(record.fingerprint())?;
    if let Some(pair) = primes.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(GenerationError::DuplicateTrack { prime: pair[0] });
    }

    let positions: HashMap<Prime, usize> = order
        .tracks()
        .iter()
        .enumerate()
        .map(|(position, track)| (track.prime(), position))
        .collect();
    let mut located = Vec::with_capacity(primes.len());
    for prime in &primes {
        let position = positions
            .get(prime)
            .copied()
            .ok_or_else(|| GenerationError::UnknownFactor {
                fingerprint: record.fingerprint().clone(),
            })?;
        located.push(position);
    }
    located.sort_unstable();

    let tracks: Vec<Track> = located
        .into_iter()
        .map(|position| order.tracks()[position].clone())
        .collect();
    let win_point = win_point(order, &tracks)?;

    Ok(TicketCheck {
        number: record.number(),
        tracks,
        win_point,
    })
}
