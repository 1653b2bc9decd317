#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Win-distribution scheduling for a game's tickets.
//!
//! The scheduler decides how many tickets win on the final track, the one
//! before it, and so on, using a geometric decay. It then asks the
//! synthesizer for tickets until each cohort is filled with draws whose win
//! point hits the cohort's target exactly, and interleaves the cohorts so the
//! earliest winners are spread across the ticket numbers instead of
//! clustering.

use music_bingo_core::{
    combinations, AttemptBudget, BingoTicket, CancellationToken, DraftTicket, GenerationError,
    Outcome, TicketNumber, TicketSize, Track, TrackOrder, UsedFingerprints, WinPoint, WinTarget,
};
use music_bingo_system_ticket_synthesis::{Draw, TicketSynthesizer};
use music_bingo_system_win_point::WinPointEvaluator;
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info, warn};

/// Share of the remaining tickets assigned to each successive cohort, in percent.
pub const DECAY_PERCENT: u64 = 65;
/// Smallest ticket count for which the decay schedule leaves a final-track cohort.
pub const MINIMUM_TICKET_COUNT: u32 = 5;

const TRAILING_COHORTS: usize = 4;

/// Number of tickets assigned to each win target for one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CohortPlan {
    at_end: [u32; TRAILING_COHORTS],
    offset_base: u32,
}

impl CohortPlan {
    /// Sizes the cohorts for `ticket_count` tickets.
    ///
    /// Each of the four trailing cohorts receives 65% (rounded down) of the
    /// tickets not yet allocated. A fourth cohort of at most one ticket is
    /// folded into the final-track cohort and the offset base drops from 4 to
    /// 3. The final-track cohort then absorbs whatever drift keeps the
    /// remainder from matching the offset base.
    pub fn for_ticket_count(ticket_count: u32) -> Result<Self, GenerationError> {
        let total = i64::from(ticket_count);
        let mut at_0 = decay(total);
        let at_1 = decay(total - at_0);
        let at_2 = decay(total - at_0 - at_1);
        let mut at_3 = decay(total - at_0 - at_1 - at_2);

        let offset_base = if at_3 <= 1 {
            at_3 = 0;
            at_0 += 1;
            3
        } else {
            4
        };

        let remainder = total - at_0 - at_1 - at_2 - at_3;
        at_0 += remainder - offset_base;

        if at_0 < 1 {
            return Err(GenerationError::TicketCountBelowMinimum {
                requested: ticket_count,
                minimum: MINIMUM_TICKET_COUNT,
            });
        }

        let narrow = |value: i64| u32::try_from(value).unwrap_or(0);
        Ok(Self {
            at_end: [narrow(at_0), narrow(at_1), narrow(at_2), narrow(at_3)],
            offset_base: narrow(offset_base),
        })
    }

    /// Tickets that win `from_end` tracks before the end of the order, for `from_end < 4`.
    #[must_use]
    pub fn count_at(&self, from_end: usize) -> u32 {
        self.at_end.get(from_end).copied().unwrap_or(0)
    }

    /// Number of offset tickets, each winning at its own target past the trailing cohorts.
    #[must_use]
    pub const fn offset_base(&self) -> u32 {
        self.offset_base
    }

    /// Total number of tickets the plan produces.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.at_end.iter().sum::<u32>() + self.offset_base
    }
}

fn decay(count: i64) -> i64 {
    count.max(0) * DECAY_PERCENT as i64 / 100
}

/// Bounds on how many draws the scheduler spends finding one on-target ticket.
#[derive(Clone, Copy, Debug)]
pub struct AttemptPolicy {
    /// Attempts granted per expected draw; the expectation is the ratio of all
    /// track sets to the track sets still unclaimed at the target.
    pub multiplier: u64,
    /// Minimum attempts granted regardless of the expectation.
    pub floor: u64,
    /// Hard cap on attempts for a single ticket.
    pub ceiling: u64,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            multiplier: 32,
            floor: 1_024,
            ceiling: 20_000_000,
        }
    }
}

impl AttemptPolicy {
    fn budget_for(&self, total_space: u128, open_space: u128) -> AttemptBudget {
        let expected = if open_space == 0 {
            total_space
        } else {
            total_space.div_ceil(open_space)
        };
        let granted = expected
            .saturating_mul(u128::from(self.multiplier))
            .clamp(u128::from(self.floor), u128::from(self.ceiling.max(self.floor)));
        AttemptBudget::new(u64::try_from(granted).unwrap_or(u64::MAX))
    }
}

/// Ticket whose win point has been verified but which has no number yet.
#[derive(Debug)]
struct Placement {
    draft: DraftTicket,
    win_point: WinPoint,
}

/// Pure system producing the numbered tickets of a game.
#[derive(Debug, Default)]
pub struct WinDistribution {
    policy: AttemptPolicy,
    synthesizer: TicketSynthesizer,
    evaluator: WinPointEvaluator,
}

impl WinDistribution {
    /// Creates a scheduler using the provided attempt policy.
    #[must_use]
    pub fn new(policy: AttemptPolicy) -> Self {
        Self {
            policy,
            synthesizer: TicketSynthesizer::new(),
            evaluator: WinPointEvaluator::new(),
        }
    }

    /// Number of synthesizer draws discarded as fingerprint collisions so far.
    #[must_use]
    pub const fn collisions(&self) -> u64 {
        self.synthesizer.collisions()
    }

    /// Generates `ticket_count` tickets drawn from `pool` and shaped against `order`.
    ///
    /// Tickets are numbered `1..=ticket_count` in their final insertion order
    /// only once every cohort has been placed. Cancellation is polled before
    /// every ticket and every draw; an aborted run discards all partial work.
    pub fn schedule<R>(
        &mut self,
        pool: &[Track],
        order: &TrackOrder,
        size: TicketSize,
        ticket_count: u32,
        cancel: &CancellationToken,
        rng: &mut R,
    ) -> Result<Outcome<Vec<BingoTicket>>, GenerationError>
    where
        R: Rng + ?Sized,
    {
        if pool.len() < size.cells() {
            return Err(GenerationError::InsufficientTracks {
                available: pool.len(),
                required: size.cells(),
            });
        }
        let total_space = combinations(pool.len(), size.cells());
        if u128::from(ticket_count) > total_space {
            return Err(GenerationError::RequestExceedsCombinatorialSpace {
                requested: ticket_count,
                maximum: total_space,
            });
        }
        let plan = CohortPlan::for_ticket_count(ticket_count)?;
        debug!(?plan, "sized win cohorts");

        let mut used = UsedFingerprints::new();
        let mut run = CohortRun {
            pool,
            order,
            size,
            total_space,
            used: &mut used,
            cancel,
        };

        let Outcome::Completed(mut placed) =
            self.generate_cohort(&mut run, WinTarget::from_end(0), plan.count_at(0), rng)?
        else {
            return Ok(Outcome::Aborted);
        };

        for from_end in 1..TRAILING_COHORTS {
            let count = plan.count_at(from_end);
            if count == 0 {
                continue;
            }
            let target = WinTarget::from_end(from_end);
            let Outcome::Completed(cohort) = self.generate_cohort(&mut run, target, count, rng)?
            else {
                return Ok(Outcome::Aborted);
            };
            let window = (placed.len() + cohort.len()) / cohort.len();
            insert_spread(&mut placed, cohort, window, rng);
        }

        let base = plan.offset_base() as usize;
        let mut offsets = Vec::with_capacity(base);
        for step in 0..base {
            let target = WinTarget::from_end(base + step);
            let Outcome::Completed(cohort) = self.generate_cohort(&mut run, target, 1, rng)?
            else {
                return Ok(Outcome::Aborted);
            };
            offsets.extend(cohort);
        }
        offsets.shuffle(rng);
        let slot = (ticket_count as usize / base).max(1);
        insert_spread(&mut placed, offsets, slot, rng);

        let tickets = placed
            .into_iter()
            .zip(1..)
            .map(|(placement, number)| {
                BingoTicket::new(
                    TicketNumber::new(number),
                    placement.draft,
                    placement.win_point,
                    size,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug_assert_eq!(tickets.len(), ticket_count as usize);

        info!(
            tickets = tickets.len(),
            collisions = self.synthesizer.collisions(),
            "scheduled ticket wins"
        );
        Ok(Outcome::Completed(tickets))
    }

    fn generate_cohort<R>(
        &mut self,
        run: &mut CohortRun<'_>,
        target: WinTarget,
        count: u32,
        rng: &mut R,
    ) -> Result<Outcome<Vec<Placement>>, GenerationError>
    where
        R: Rng + ?Sized,
    {
        let cells = run.size.cells();
        let target_space = run
            .order
            .win_point_for(target)
            .map_or(0, |point| combinations(point.get() - 1, cells - 1));
        let win_point = match run.order.win_point_for(target) {
            Some(point) if u128::from(count) <= target_space => point,
            _ => {
                warn!(
                    from_end = target.get(),
                    count, target_space, "win target cannot hold the cohort"
                );
                return Err(GenerationError::RequestExceedsCombinatorialSpace {
                    requested: count,
                    maximum: target_space,
                });
            }
        };

        let mut cohort = Vec::with_capacity(count as usize);
        let mut attempts = 0u64;
        while cohort.len() < count as usize {
            if run.cancel.is_cancelled() {
                warn!(from_end = target.get(), "ticket generation aborted");
                return Ok(Outcome::Aborted);
            }

            let open_space = target_space.saturating_sub(cohort.len() as u128);
            let mut budget = self.policy.budget_for(run.total_space, open_space);
            loop {
                match self.synthesizer.draw(
                    run.pool,
                    cells,
                    run.used,
                    &mut budget,
                    run.cancel,
                    rng,
                ) {
                    Draw::Ticket(draft) => {
                        let actual = self.evaluator.evaluate(run.order, draft.tracks())?;
                        if actual == win_point {
                            cohort.push(Placement { draft, win_point });
                            break;
                        }
                        let _ = run.used.release(draft.fingerprint());
                    }
                    Draw::Exhausted => {
                        warn!(
                            from_end = target.get(),
                            accepted = cohort.len(),
                            attempts = budget.spent(),
                            "attempt budget exhausted"
                        );
                        return Err(GenerationError::RequestExceedsCombinatorialSpace {
                            requested: count,
                            maximum: cohort.len() as u128,
                        });
                    }
                    Draw::Aborted => {
                        warn!(from_end = target.get(), "ticket generation aborted");
                        return Ok(Outcome::Aborted);
                    }
                }
            }
            attempts += budget.spent();
        }

        debug!(
            from_end = target.get(),
            win_point = win_point.get(),
            count,
            attempts,
            "generated win cohort"
        );
        Ok(Outcome::Completed(cohort))
    }
}

/// Inputs shared by every cohort of one scheduling run.
struct CohortRun<'a> {
    pool: &'a [Track],
    order: &'a TrackOrder,
    size: TicketSize,
    total_space: u128,
    used: &'a mut UsedFingerprints,
    cancel: &'a CancellationToken,
}

/// Inserts each item at a random offset inside consecutive windows of `width` slots.
fn insert_spread<T, R>(placed: &mut Vec<T>, items: Vec<T>, width: usize, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let width = width.max(1);
    let mut start = 0;
    for item in items {
        let position = (start + rng.gen_range(0..width)).min(placed.len());
        placed.insert(position, item);
        start += width;
    }
}

#[cfg(test)]
mod tests {
    use super::{insert_spread, AttemptPolicy, CohortPlan, MINIMUM_TICKET_COUNT};
    use music_bingo_core::GenerationError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn plan_for_twenty_four_tickets() {
        let plan = CohortPlan::for_ticket_count(24).expect("viable");
        assert_eq!(plan.count_at(0), 14);
        assert_eq!(plan.count_at(1), 5);
        assert_eq!(plan.count_at(2), 2);
        assert_eq!(plan.count_at(3), 0);
        assert_eq!(plan.offset_base(), 3);
    }

    #[test]
    fn plan_keeps_fourth_cohort_when_large_enough() {
        let plan = CohortPlan::for_ticket_count(100).expect("viable");
        assert_eq!(plan.count_at(0), 63);
        assert_eq!(plan.count_at(1), 22);
        assert_eq!(plan.count_at(2), 8);
        assert_eq!(plan.count_at(3), 3);
        assert_eq!(plan.offset_base(), 4);
    }

    #[test]
    fn plan_always_covers_every_ticket() {
        for count in MINIMUM_TICKET_COUNT..=5_000 {
            let plan = CohortPlan::for_ticket_count(count).expect("viable");
            assert_eq!(plan.total(), count, "plan for {count} tickets");
            assert!(plan.count_at(0) >= 1);
        }
    }

    #[test]
    fn plan_rejects_tiny_games() {
        for count in 0..MINIMUM_TICKET_COUNT {
            assert_eq!(
                CohortPlan::for_ticket_count(count),
                Err(GenerationError::TicketCountBelowMinimum {
                    requested: count,
                    minimum: MINIMUM_TICKET_COUNT,
                })
            );
        }
    }

    #[test]
    fn budget_scales_with_target_rarity() {
        let policy = AttemptPolicy::default();
        assert_eq!(policy.budget_for(15_504, 15_504).limit(), 1_024);
        assert_eq!(policy.budget_for(15_504, 1).limit(), 15_504 * 32);
        assert_eq!(policy.budget_for(u128::MAX, 1).limit(), 20_000_000);
    }

    #[test]
    fn budget_grows_as_the_target_fills() {
        let policy = AttemptPolicy::default();
        let fresh = policy.budget_for(3_003, 1_287).limit();
        let last_open_set = policy.budget_for(3_003, 1).limit();
        assert_eq!(fresh, 1_024);
        assert_eq!(last_open_set, 3_003 * 32);
    }

    #[test]
    fn spread_insertion_keeps_every_item() {
        let mut placed: Vec<u32> = (0..10).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        insert_spread(&mut placed, vec![100, 101, 102], 4, &mut rng);

        assert_eq!(placed.len(), 13);
        let first = placed.iter().position(|value| *value == 100).expect("inserted");
        let last = placed.iter().position(|value| *value == 102).expect("inserted");
        assert!(first < 4);
        assert!(first < last);
    }
}
