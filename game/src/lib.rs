#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game orchestration for music bingo.
//!
//! A [`Game`] is produced by one call to [`generate`]: the request is
//! validated up front, primes are assigned, the playback order is drawn, the
//! tickets are scheduled and numbered. Read access goes through the [`query`]
//! module and the [`check`] module recomputes win points from persisted
//! ticket records.

pub mod check;

use music_bingo_core::{
    combinations, BingoTicket, CancellationToken, GenerationError, Outcome, TicketSize, Track,
    TrackOrder, TrackSource,
};
use music_bingo_system_primes::PrimeRegistry;
use music_bingo_system_track_order::{OrderMode, TrackOrderGenerator};
use music_bingo_system_win_distribution::{AttemptPolicy, CohortPlan, WinDistribution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{info, warn};

const DEFAULT_TICKET_COUNT: u32 = 24;

/// Parameters of a single generation run.
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    ticket_count: u32,
    ticket_size: TicketSize,
    order_mode: OrderMode,
    minimum_pool: Option<usize>,
    attempt_policy: AttemptPolicy,
    seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TICKET_COUNT)
    }
}

impl GameConfig {
    /// Creates a configuration for `ticket_count` tickets of the default size.
    #[must_use]
    pub fn new(ticket_count: u32) -> Self {
        Self {
            ticket_count,
            ticket_size: TicketSize::default(),
            order_mode: OrderMode::Shuffled,
            minimum_pool: None,
            attempt_policy: AttemptPolicy::default(),
            seed: None,
        }
    }

    /// Overrides the ticket grid.
    #[must_use]
    pub fn with_ticket_size(mut self, ticket_size: TicketSize) -> Self {
        self.ticket_size = ticket_size;
        self
    }

    /// Overrides how the playback order is derived.
    #[must_use]
    pub fn with_order_mode(mut self, order_mode: OrderMode) -> Self {
        self.order_mode = order_mode;
        self
    }

    /// Requires at least `tracks` tracks in the pool, in addition to one ticket's worth.
    #[must_use]
    pub fn with_minimum_pool(mut self, tracks: usize) -> Self {
        self.minimum_pool = Some(tracks);
        self
    }

    /// Overrides the retry bounds used while scheduling tickets.
    #[must_use]
    pub fn with_attempt_policy(mut self, attempt_policy: AttemptPolicy) -> Self {
        self.attempt_policy = attempt_policy;
        self
    }

    /// Fixes the random stream so the game can be replayed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of tickets to generate.
    #[must_use]
    pub const fn ticket_count(&self) -> u32 {
        self.ticket_count
    }

    /// Grid printed on every ticket.
    #[must_use]
    pub const fn ticket_size(&self) -> TicketSize {
        self.ticket_size
    }

    /// How the playback order is derived.
    #[must_use]
    pub const fn order_mode(&self) -> OrderMode {
        self.order_mode
    }

    /// Smallest pool accepted for a game.
    #[must_use]
    pub fn minimum_pool(&self) -> usize {
        self.minimum_pool
            .unwrap_or(0)
            .max(self.ticket_size.cells())
    }

    /// Random generator for the run: seeded when a seed is configured,
    /// otherwise ChaCha20 keyed from the operating system.
    #[must_use]
    pub fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

/// Everything produced by one generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    tracks: Vec<Track>,
    order: TrackOrder,
    tickets: Vec<BingoTicket>,
    ticket_size: TicketSize,
}

/// Validates the request, then generates the order and tickets of a new game.
///
/// Every request-level failure is reported before any prime is assigned or
/// any ticket drawn. Cancellation yields [`Outcome::Aborted`] and discards
/// all partial work.
pub fn generate<R>(
    config: &GameConfig,
    sources: Vec<TrackSource>,
    rng: &mut R,
    cancel: &CancellationToken,
) -> Result<Outcome<Game>, GenerationError>
where
    R: Rng + ?Sized,
{
    validate(config, sources.len())?;

    let mut registry = PrimeRegistry::new();
    let tracks = registry.assign(sources)?;
    if cancel.is_cancelled() {
        warn!("game generation aborted before scheduling");
        return Ok(Outcome::Aborted);
    }

    let order = TrackOrderGenerator::new(config.order_mode).generate(&tracks, rng);
    let outcome = WinDistribution::new(config.attempt_policy).schedule(
        &tracks,
        &order,
        config.ticket_size,
        config.ticket_count,
        cancel,
        rng,
    )?;
    let Outcome::Completed(tickets) = outcome else {
        return Ok(Outcome::Aborted);
    };

    info!(
        tracks = tracks.len(),
        tickets = tickets.len(),
        "generated game"
    );
    Ok(Outcome::Completed(Game {
        tracks,
        order,
        tickets,
        ticket_size: config.ticket_size,
    }))
}

fn validate(config: &GameConfig, pool: usize) -> Result<(), GenerationError> {
    let required = config.minimum_pool();
    if pool < required {
        return Err(GenerationError::InsufficientTracks {
            available: pool,
            required,
        });
    }

    let _ = CohortPlan::for_ticket_count(config.ticket_count)?;

    let maximum = combinations(pool, config.ticket_size.cells());
    if u128::from(config.ticket_count) > maximum {
        return Err(GenerationError::RequestExceedsCombinatorialSpace {
            requested: config.ticket_count,
            maximum,
        });
    }
    Ok(())
}

/// Read-only queries over a generated [`Game`].
pub mod query {
    use music_bingo_core::{
        BingoTicket, TicketNumber, TicketRecord, TicketSize, Track, TrackOrder,
    };
    use music_bingo_system_page_layout::sequence_for_print;

    use super::Game;

    /// Tracks of the game in pool order, each bound to its prime.
    #[must_use]
    pub fn tracks(game: &Game) -> &[Track] {
        &game.tracks
    }

    /// Playback order handed to the audio pipeline.
    #[must_use]
    pub fn track_order(game: &Game) -> &TrackOrder {
        &game.order
    }

    /// Grid printed on every ticket.
    #[must_use]
    pub fn ticket_size(game: &Game) -> TicketSize {
        game.ticket_size
    }

    /// Tickets sorted by ticket number.
    #[must_use]
    pub fn tickets(game: &Game) -> &[BingoTicket] {
        &game.tickets
    }

    /// Looks up a ticket by its number.
    #[must_use]
    pub fn ticket(game: &Game, number: TicketNumber) -> Option<&BingoTicket> {
        let index = usize::try_from(number.get()).ok()?.checked_sub(1)?;
        game.tickets.get(index)
    }

    /// Tickets in the order the document generator should print them.
    #[must_use]
    pub fn tickets_in_print_order(game: &Game) -> Vec<&BingoTicket> {
        sequence_for_print(game.tickets.iter().collect())
    }

    /// Minimal records to persist for later ticket checks.
    #[must_use]
    pub fn ticket_records(game: &Game) -> Vec<TicketRecord> {
        game.tickets.iter().map(BingoTicket::record).collect()
    }

    /// Numbers of the tickets complete once `played` tracks have played.
    #[must_use]
    pub fn winners_after(game: &Game, played: usize) -> Vec<TicketNumber> {
        game.tickets
            .iter()
            .filter(|ticket| ticket.win_point().get() <= played)
            .map(BingoTicket::number)
            .collect()
    }
}
