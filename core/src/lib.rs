#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the music bingo generation engine.
//!
//! This crate defines the value types that flow between the pure systems:
//! tracks carrying their prime identity, the playback [`TrackOrder`], draft
//! and numbered tickets, and the caller-owned state (`UsedFingerprints`,
//! [`CancellationToken`], [`AttemptBudget`]) that every generation run passes
//! explicitly instead of relying on process-wide registries. Systems consume
//! these types, never mutate their inputs, and report failures through
//! [`GenerationError`].

use std::{
    collections::HashSet,
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows printed on a ticket unless configured otherwise.
pub const DEFAULT_TICKET_ROWS: u32 = 3;
/// Number of columns printed on a ticket unless configured otherwise.
pub const DEFAULT_TICKET_COLUMNS: u32 = 5;

/// Identifier of a source track supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(u32);

impl TrackId {
    /// Creates a new track identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Prime number handed out by the prime registry as a multiplicative track identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Prime(u32);

impl Prime {
    /// Wraps a value taken from the prime table.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value of the prime.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Prime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Track metadata supplied by the caller before any prime has been assigned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSource {
    id: TrackId,
    title: String,
    artist: String,
    duration: Duration,
}

impl TrackSource {
    /// Creates a new unassigned track record.
    #[must_use]
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            duration,
        }
    }

    /// Identifier of the source track.
    #[must_use]
    pub const fn id(&self) -> TrackId {
        self.id
    }

    /// Title printed on tickets and listings.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Performing artist printed on tickets and listings.
    #[must_use]
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Playback length of the clip.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

/// Track taking part in one game, bound to the prime that identifies it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    id: TrackId,
    prime: Prime,
    title: String,
    artist: String,
    duration: Duration,
}

impl Track {
    /// Binds a source record to the prime assigned by the registry.
    #[must_use]
    pub fn from_source(source: TrackSource, prime: Prime) -> Self {
        Self {
            id: source.id,
            prime,
            title: source.title,
            artist: source.artist,
            duration: source.duration,
        }
    }

    /// Identifier of the source track.
    #[must_use]
    pub const fn id(&self) -> TrackId {
        self.id
    }

    /// Prime identity assigned for the current game.
    #[must_use]
    pub const fn prime(&self) -> Prime {
        self.prime
    }

    /// Title printed on tickets and listings.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Performing artist printed on tickets and listings.
    #[must_use]
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Playback length of the clip.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

/// Product of the primes of a ticket's tracks.
///
/// Distinct prime sets always produce distinct products, so the fingerprint
/// identifies a ticket's track set. Fifteen primes from the table overflow
/// 128 bits, hence the arbitrary precision representation. The serialised
/// form is the decimal string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint(BigUint);

impl Fingerprint {
    /// Multiplies the provided primes together.
    #[must_use]
    pub fn from_primes<I>(primes: I) -> Self
    where
        I: IntoIterator<Item = Prime>,
    {
        let mut product = BigUint::from(1u32);
        for prime in primes {
            product *= prime.get();
        }
        Self(product)
    }

    /// Computes the fingerprint of a track set.
    #[must_use]
    pub fn of(tracks: &[Track]) -> Self {
        Self::from_primes(tracks.iter().map(Track::prime))
    }

    /// Exposes the underlying integer value.
    #[must_use]
    pub const fn value(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for Fingerprint {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0.to_string()
    }
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let parsed = trimmed
            .parse::<BigUint>()
            .map_err(|_| ParseFingerprintError(trimmed.to_owned()))?;
        if parsed == BigUint::from(0u32) {
            return Err(ParseFingerprintError(trimmed.to_owned()));
        }
        Ok(Self(parsed))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ParseFingerprintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error returned when a fingerprint string is not a positive decimal integer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("fingerprint '{0}' is not a positive decimal integer")]
pub struct ParseFingerprintError(String);

/// Dimensions of the grid printed on every ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketSize {
    rows: u32,
    columns: u32,
}

impl TicketSize {
    /// Creates a ticket size, rejecting grids without cells.
    pub fn new(rows: u32, columns: u32) -> Result<Self, GenerationError> {
        if rows == 0 || columns == 0 {
            return Err(GenerationError::EmptyTicketSize { rows, columns });
        }
        Ok(Self { rows, columns })
    }

    /// Number of rows on the ticket.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns on the ticket.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tracks bound to each ticket.
    #[must_use]
    pub const fn cells(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

impl Default for TicketSize {
    fn default() -> Self {
        Self {
            rows: DEFAULT_TICKET_ROWS,
            columns: DEFAULT_TICKET_COLUMNS,
        }
    }
}

/// Number of tracks from the end of the order at which a ticket should win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WinTarget(usize);

impl WinTarget {
    /// Creates a target the given number of tracks before the final track.
    #[must_use]
    pub const fn from_end(tracks: usize) -> Self {
        Self(tracks)
    }

    /// Number of tracks between the winning track and the end of the order.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// One-based position in a track order at which a ticket completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WinPoint(usize);

impl WinPoint {
    /// Creates a win point from a one-based position.
    #[must_use]
    pub const fn new(position: usize) -> Self {
        Self(position)
    }

    /// One-based position of the winning track.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback sequence covering every track of the game exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackOrder {
    tracks: Vec<Track>,
}

impl TrackOrder {
    /// Wraps an ordered list of tracks.
    #[must_use]
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Tracks in playback order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks in the order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Reports whether the order is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Resolves the win point that corresponds to a target, if the order is long enough.
    #[must_use]
    pub fn win_point_for(&self, target: WinTarget) -> Option<WinPoint> {
        self.tracks
            .len()
            .checked_sub(target.get())
            .filter(|position| *position > 0)
            .map(WinPoint::new)
    }

    /// Expresses a win point as a distance from the end of the order.
    #[must_use]
    pub fn target_for(&self, win_point: WinPoint) -> WinTarget {
        WinTarget::from_end(self.tracks.len().saturating_sub(win_point.get()))
    }
}

/// Ticket drawn by the synthesizer, not yet evaluated or numbered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftTicket {
    fingerprint: Fingerprint,
    tracks: Vec<Track>,
}

impl DraftTicket {
    /// Creates a draft from its track set, computing the fingerprint.
    #[must_use]
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            fingerprint: Fingerprint::of(&tracks),
            tracks,
        }
    }

    /// Fingerprint of the drafted track set.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Tracks bound to the draft.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

/// Dense ticket number assigned once every ticket of the game exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketNumber(u32);

impl TicketNumber {
    /// Creates a ticket number with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the ticket number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numbered ticket bound to exactly one ticket size worth of distinct tracks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BingoTicket {
    number: TicketNumber,
    fingerprint: Fingerprint,
    tracks: Vec<Track>,
    win_point: WinPoint,
}

impl BingoTicket {
    /// Numbers a draft, validating that it holds `size` distinct tracks.
    pub fn new(
        number: TicketNumber,
        draft: DraftTicket,
        win_point: WinPoint,
        size: TicketSize,
    ) -> Result<Self, GenerationError> {
        if draft.tracks.len() != size.cells() {
            return Err(GenerationError::TicketSizeMismatch {
                expected: size.cells(),
                actual: draft.tracks.len(),
            });
        }

        let mut seen = HashSet::with_capacity(draft.tracks.len());
        for track in &draft.tracks {
            if !seen.insert(track.prime()) {
                return Err(GenerationError::DuplicateTrack {
                    prime: track.prime(),
                });
            }
        }

        Ok(Self {
            number,
            fingerprint: draft.fingerprint,
            tracks: draft.tracks,
            win_point,
        })
    }

    /// Dense number printed on the ticket.
    #[must_use]
    pub const fn number(&self) -> TicketNumber {
        self.number
    }

    /// Fingerprint identifying the ticket's track set.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Tracks printed on the ticket.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Position in the track order at which the ticket completes.
    #[must_use]
    pub const fn win_point(&self) -> WinPoint {
        self.win_point
    }

    /// Reports whether the ticket contains the track with the provided prime.
    #[must_use]
    pub fn contains(&self, prime: Prime) -> bool {
        self.tracks.iter().any(|track| track.prime() == prime)
    }

    /// Minimal record persisted for the ticket-checking read path.
    #[must_use]
    pub fn record(&self) -> TicketRecord {
        TicketRecord::new(self.number, self.fingerprint.clone())
    }
}

/// Persisted identity of a ticket from which its win point can be recomputed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketRecord {
    number: TicketNumber,
    fingerprint: Fingerprint,
}

impl TicketRecord {
    /// Creates a record from a ticket number and fingerprint.
    #[must_use]
    pub const fn new(number: TicketNumber, fingerprint: Fingerprint) -> Self {
        Self {
            number,
            fingerprint,
        }
    }

    /// Number printed on the ticket.
    #[must_use]
    pub const fn number(&self) -> TicketNumber {
        self.number
    }

    /// Fingerprint of the ticket's track set.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Fingerprints already taken by tickets of one game.
#[derive(Debug, Default)]
pub struct UsedFingerprints {
    fingerprints: HashSet<Fingerprint>,
}

impl UsedFingerprints {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the fingerprint is already taken.
    #[must_use]
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    /// Claims a fingerprint, returning `false` when it was already taken.
    pub fn claim(&mut self, fingerprint: Fingerprint) -> bool {
        self.fingerprints.insert(fingerprint)
    }

    /// Returns a previously claimed fingerprint to the pool.
    pub fn release(&mut self, fingerprint: &Fingerprint) -> bool {
        self.fingerprints.remove(fingerprint)
    }

    /// Number of claimed fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// Reports whether no fingerprint has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

/// Cooperative cancellation flag shared between a run and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that every run observing this token stops at its next poll.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Reports whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Upper bound on the number of draws a retry loop may perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptBudget {
    limit: u64,
    spent: u64,
}

impl AttemptBudget {
    /// Creates a budget allowing `limit` attempts.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit, spent: 0 }
    }

    /// Consumes one attempt, returning `false` once the budget is exhausted.
    pub fn try_consume(&mut self) -> bool {
        if self.spent >= self.limit {
            return false;
        }
        self.spent += 1;
        true
    }

    /// Number of attempts consumed so far.
    #[must_use]
    pub const fn spent(&self) -> u64 {
        self.spent
    }

    /// Maximum number of attempts.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }
}

/// Result of a cancellable unit of work.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The work ran to completion.
    Completed(T),
    /// Cancellation was observed; partial state has been discarded.
    Aborted,
}

impl<T> Outcome<T> {
    /// Transforms the completed value.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Aborted => Outcome::Aborted,
        }
    }

    /// Returns the completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Aborted => None,
        }
    }

    /// Reports whether the work was aborted.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Failures surfaced by ticket generation and checking.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The configured ticket grid has no cells.
    #[error("ticket size {rows}x{columns} has no cells")]
    EmptyTicketSize {
        /// Configured row count.
        rows: u32,
        /// Configured column count.
        columns: u32,
    },
    /// The track pool is smaller than a ticket or the configured minimum.
    #[error("track pool holds {available} tracks but at least {required} are required")]
    InsufficientTracks {
        /// Tracks supplied by the caller.
        available: usize,
        /// Tracks the request needs.
        required: usize,
    },
    /// More tickets were requested than distinct track sets exist.
    #[error("requested {requested} tickets but at most {maximum} distinct tickets can be generated")]
    RequestExceedsCombinatorialSpace {
        /// Tickets requested.
        requested: u32,
        /// Distinct tickets available for the request.
        maximum: u128,
    },
    /// Too few tickets were requested to shape the win distribution.
    #[error("requested {requested} tickets but at least {minimum} are required")]
    TicketCountBelowMinimum {
        /// Tickets requested.
        requested: u32,
        /// Smallest viable ticket count.
        minimum: u32,
    },
    /// The prime registry ran out of primes.
    #[error("cannot assign {requested} primes, only {capacity} remain in the prime table")]
    CapacityExceeded {
        /// Primes requested.
        requested: usize,
        /// Primes still available.
        capacity: usize,
    },
    /// A ticket referenced tracks absent from the track order.
    #[error("track order is missing {missing} of the ticket's tracks")]
    IncompleteCoverage {
        /// Number of ticket tracks never found in the order.
        missing: usize,
    },
    /// A ticket did not hold exactly one ticket size worth of tracks.
    #[error("ticket holds {actual} tracks but the ticket size requires {expected}")]
    TicketSizeMismatch {
        /// Tracks required by the ticket size.
        expected: usize,
        /// Tracks held by the ticket.
        actual: usize,
    },
    /// A ticket listed the same track twice.
    #[error("ticket lists the track with prime {prime} more than once")]
    DuplicateTrack {
        /// Prime of the repeated track.
        prime: Prime,
    },
    /// A fingerprint did not decompose into tracks of the game.
    #[error("fingerprint {fingerprint} does not factor into tracks of this game")]
    UnknownFactor {
        /// Fingerprint that failed to factor.
        fingerprint: Fingerprint,
    },
}

/// Number of ways to choose `k` items from `n`, saturating at `u128::MAX`.
#[must_use]
pub fn combinations(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }

    let k = k.min(n - k);
    let mut result: u128 = 1;
    for step in 0..k {
        let numerator = (n - step) as u128;
        let denominator = (step + 1) as u128;
        result = match result.checked_mul(numerator) {
            Some(product) => product / denominator,
            None => return u128::MAX,
        };
    }
    result
}
