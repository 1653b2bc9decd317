#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Prime registry that gives every track of a game a multiplicative identity.
//!
//! Primes are handed out in ascending table order, so a fresh registry always
//! assigns `2, 3, 5, ...` to the tracks of a game in the order they are
//! supplied. The registry is owned by the caller and reset per game.

use music_bingo_core::{Fingerprint, GenerationError, Prime, Track, TrackSource};
use num_bigint::BigUint;
use tracing::debug;

/// Every prime below 3000 in ascending order.
#[rustfmt::skip]
pub const PRIME_TABLE: [u32; 430] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37,
    41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151,
    157, 163, 167, 173, 179, 181, 191, 193, 197, 199, 211, 223,
    227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281,
    283, 293, 307, 311, 313, 317, 331, 337, 347, 349, 353, 359,
    367, 373, 379, 383, 389, 397, 401, 409, 419, 421, 431, 433,
    439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503,
    509, 521, 523, 541, 547, 557, 563, 569, 571, 577, 587, 593,
    599, 601, 607, 613, 617, 619, 631, 641, 643, 647, 653, 659,
    661, 673, 677, 683, 691, 701, 709, 719, 727, 733, 739, 743,
    751, 757, 761, 769, 773, 787, 797, 809, 811, 821, 823, 827,
    829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911,
    919, 929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
    1_009, 1_013, 1_019, 1_021, 1_031, 1_033, 1_039, 1_049, 1_051, 1_061, 1_063, 1_069,
    1_087, 1_091, 1_093, 1_097, 1_103, 1_109, 1_117, 1_123, 1_129, 1_151, 1_153, 1_163,
    1_171, 1_181, 1_187, 1_193, 1_201, 1_213, 1_217, 1_223, 1_229, 1_231, 1_237, 1_249,
    1_259, 1_277, 1_279, 1_283, 1_289, 1_291, 1_297, 1_301, 1_303, 1_307, 1_319, 1_321,
    1_327, 1_361, 1_367, 1_373, 1_381, 1_399, 1_409, 1_423, 1_427, 1_429, 1_433, 1_439,
    1_447, 1_451, 1_453, 1_459, 1_471, 1_481, 1_483, 1_487, 1_489, 1_493, 1_499, 1_511,
    1_523, 1_531, 1_543, 1_549, 1_553, 1_559, 1_567, 1_571, 1_579, 1_583, 1_597, 1_601,
    1_607, 1_609, 1_613, 1_619, 1_621, 1_627, 1_637, 1_657, 1_663, 1_667, 1_669, 1_693,
    1_697, 1_699, 1_709, 1_721, 1_723, 1_733, 1_741, 1_747, 1_753, 1_759, 1_777, 1_783,
    1_787, 1_789, 1_801, 1_811, 1_823, 1_831, 1_847, 1_861, 1_867, 1_871, 1_873, 1_877,
    1_879, 1_889, 1_901, 1_907, 1_913, 1_931, 1_933, 1_949, 1_951, 1_973, 1_979, 1_987,
    1_993, 1_997, 1_999, 2_003, 2_011, 2_017, 2_027, 2_029, 2_039, 2_053, 2_063, 2_069,
    2_081, 2_083, 2_087, 2_089, 2_099, 2_111, 2_113, 2_129, 2_131, 2_137, 2_141, 2_143,
    2_153, 2_161, 2_179, 2_203, 2_207, 2_213, 2_221, 2_237, 2_239, 2_243, 2_251, 2_267,
    2_269, 2_273, 2_281, 2_287, 2_293, 2_297, 2_309, 2_311, 2_333, 2_339, 2_341, 2_347,
    2_351, 2_357, 2_371, 2_377, 2_381, 2_383, 2_389, 2_393, 2_399, 2_411, 2_417, 2_423,
    2_437, 2_441, 2_447, 2_459, 2_467, 2_473, 2_477, 2_503, 2_521, 2_531, 2_539, 2_543,
    2_549, 2_551, 2_557, 2_579, 2_591, 2_593, 2_609, 2_617, 2_621, 2_633, 2_647, 2_657,
    2_659, 2_663, 2_671, 2_677, 2_683, 2_687, 2_689, 2_693, 2_699, 2_707, 2_711, 2_713,
    2_719, 2_729, 2_731, 2_741, 2_749, 2_753, 2_767, 2_777, 2_789, 2_791, 2_797, 2_801,
    2_803, 2_819, 2_833, 2_837, 2_843, 2_851, 2_857, 2_861, 2_879, 2_887, 2_897, 2_903,
    2_909, 2_917, 2_927, 2_939, 2_953, 2_957, 2_963, 2_969, 2_971, 2_999,
];

/// Hands out table primes in ascending order without ever repeating one.
#[derive(Debug, Default)]
pub struct PrimeRegistry {
    next: usize,
}

impl PrimeRegistry {
    /// Creates a registry positioned at the smallest prime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of primes the registry can hand out per game.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        PRIME_TABLE.len()
    }

    /// Number of primes still available before the table is exhausted.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        PRIME_TABLE.len() - self.next
    }

    /// Binds each source record to the next unassigned prime.
    ///
    /// Nothing is assigned when the table cannot cover every record.
    pub fn assign(&mut self, sources: Vec<TrackSource>) -> Result<Vec<Track>, GenerationError> {
        if sources.len() > self.remaining() {
            return Err(GenerationError::CapacityExceeded {
                requested: sources.len(),
                capacity: self.remaining(),
            });
        }

        let first = self.next;
        let tracks: Vec<Track> = sources
            .into_iter()
            .zip(&PRIME_TABLE[first..])
            .map(|(source, value)| Track::from_source(source, Prime::new(*value)))
            .collect();
        self.next += tracks.len();

        debug!(
            assigned = tracks.len(),
            remaining = self.remaining(),
            "assigned track primes"
        );
        Ok(tracks)
    }

    /// Returns the registry to the smallest prime for a new game.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Decomposes a fingerprint into table primes, smallest first.
///
/// Repeated factors are reported once per occurrence. Fails when a factor
/// outside the table remains.
pub fn factor(fingerprint: &Fingerprint) -> Result<Vec<Prime>, GenerationError> {
    let one = BigUint::from(1u32);
    let zero = BigUint::from(0u32);
    let mut residue = fingerprint.value().clone();
    let mut primes = Vec::new();

    for &value in &PRIME_TABLE {
        if residue == one {
            break;
        }
        let divisor = BigUint::from(value);
        while &residue % &divisor == zero {
            residue /= &divisor;
            primes.push(Prime::new(value));
        }
    }

    if residue != one {
        return Err(GenerationError::UnknownFactor {
            fingerprint: fingerprint.clone(),
        });
    }
    Ok(primes)
}

#[cfg(test)]
mod tests {
    use super::{factor, PRIME_TABLE};
    use music_bingo_core::{Fingerprint, GenerationError, Prime};

    #[test]
    fn table_is_strictly_ascending_primes() {
        assert!(PRIME_TABLE.windows(2).all(|pair| pair[0] < pair[1]));
        for value in PRIME_TABLE {
            let is_prime = (2..value).take_while(|d| d * d <= value).all(|d| value % d != 0);
            assert!(is_prime, "{value} is not prime");
        }
        assert_eq!(PRIME_TABLE[0], 2);
        assert_eq!(PRIME_TABLE[PRIME_TABLE.len() - 1], 2_999);
    }

    #[test]
    fn factor_rejects_primes_outside_table() {
        let fingerprint = Fingerprint::from_primes([Prime::new(2), Prime::new(3_001)]);
        assert_eq!(
            factor(&fingerprint),
            Err(GenerationError::UnknownFactor { fingerprint })
        );
    }

    #[test]
    fn factor_reports_repeated_primes() {
        let fingerprint = Fingerprint::from_primes([Prime::new(7), Prime::new(7), Prime::new(2)]);
        assert_eq!(
            factor(&fingerprint),
            Ok(vec![Prime::new(2), Prime::new(7), Prime::new(7)])
        );
    }
}
