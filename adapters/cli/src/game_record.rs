use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use music_bingo_core::{TicketNumber, TicketRecord, TrackOrder};
use music_bingo_game::{query, Game};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const RECORD_DOMAIN: &str = "bingo";
const RECORD_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded record payload.
pub(crate) const RECORD_HEADER: &str = "bingo:v1";
const FIELD_DELIMITER: char = ':';

/// Everything needed to check tickets after the generating run has exited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct GameRecord {
    /// Playback order, each track carrying its prime.
    pub(crate) order: TrackOrder,
    /// Number and fingerprint of every ticket.
    pub(crate) tickets: Vec<TicketRecord>,
}

impl GameRecord {
    /// Captures the order and ticket records of a generated game.
    #[must_use]
    pub(crate) fn of(game: &Game) -> Self {
        Self {
            order: query::track_order(game).clone(),
            tickets: query::ticket_records(game),
        }
    }

    /// Finds the record of the ticket printed with `number`.
    #[must_use]
    pub(crate) fn ticket(&self, number: TicketNumber) -> Option<&TicketRecord> {
        self.tickets.iter().find(|record| record.number() == number)
    }

    /// Encodes the record into a single line suitable for saving or pasting.
    pub(crate) fn encode(&self) -> Result<String, GameRecordError> {
        let json = serde_json::to_vec(self).map_err(GameRecordError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{RECORD_HEADER}:{}x{}:{encoded}",
            self.order.len(),
            self.tickets.len()
        ))
    }

    /// Decodes a record from its single-line representation.
    pub(crate) fn decode(value: &str) -> Result<Self, GameRecordError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GameRecordError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(GameRecordError::MissingPrefix)?;
        let version = parts.next().ok_or(GameRecordError::MissingVersion)?;
        let counts = parts.next().ok_or(GameRecordError::MissingCounts)?;
        let payload = parts.next().ok_or(GameRecordError::MissingPayload)?;

        if domain != RECORD_DOMAIN {
            return Err(GameRecordError::InvalidPrefix(domain.to_owned()));
        }
        if version != RECORD_VERSION {
            return Err(GameRecordError::UnsupportedVersion(version.to_owned()));
        }

        let (tracks, tickets) = parse_counts(counts)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(GameRecordError::InvalidEncoding)?;
        let record: Self =
            serde_json::from_slice(&bytes).map_err(GameRecordError::InvalidPayload)?;

        if record.order.len() != tracks || record.tickets.len() != tickets {
            return Err(GameRecordError::CountMismatch(counts.to_owned()));
        }
        Ok(record)
    }
}

/// Errors that can occur while decoding game record strings.
#[derive(Debug, Error)]
pub(crate) enum GameRecordError {
    /// The provided string was empty or contained only whitespace.
    #[error("game record was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("game record is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("game record is missing the version")]
    MissingVersion,
    /// The track and ticket counts were missing.
    #[error("game record is missing the track and ticket counts")]
    MissingCounts,
    /// The payload segment was missing.
    #[error("game record is missing the payload")]
    MissingPayload,
    /// The prefix segment named another format.
    #[error("game record prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment named an unknown revision.
    #[error("game record version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The counts segment was malformed.
    #[error("could not parse track and ticket counts '{0}'")]
    InvalidCounts(String),
    /// The counts segment disagreed with the payload.
    #[error("counts '{0}' do not match the record payload")]
    CountMismatch(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode game record payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse game record payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_counts(counts: &str) -> Result<(usize, usize), GameRecordError> {
    let invalid = || GameRecordError::InvalidCounts(counts.to_owned());
    let (tracks, tickets) = counts.split_once(['x', 'X']).ok_or_else(invalid)?;

    let tracks = tracks.trim().parse::<usize>().map_err(|_| invalid())?;
    let tickets = tickets.trim().parse::<usize>().map_err(|_| invalid())?;
    if tracks == 0 || tickets == 0 {
        return Err(invalid());
    }
    Ok((tracks, tickets))
}
