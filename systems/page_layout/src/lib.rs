#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Print sequencing that keeps consecutive ticket numbers on different pages.

/// Tickets printed on a single page by the document generator.
pub const TICKETS_PER_PAGE: usize = 3;

/// Rearranges items sorted by ticket number into print order.
///
/// The input is split into three consecutive runs of `ceil(n / 3)`,
/// `floor(n / 3)` and the remaining items. The output takes the next item of
/// the first run, then of the second and third runs when they still hold
/// items, and repeats until every item is placed. Ticket 1 therefore shares a
/// page with tickets `ceil(n / 3) + 1` and `ceil(n / 3) + floor(n / 3) + 1`.
#[must_use]
pub fn sequence_for_print<T>(items: Vec<T>) -> Vec<T> {
    let total = items.len();
    let first_len = total.div_ceil(TICKETS_PER_PAGE);
    let second_len = total / TICKETS_PER_PAGE;

    let mut remaining = items.into_iter();
    let first: Vec<T> = remaining.by_ref().take(first_len).collect();
    let second: Vec<T> = remaining.by_ref().take(second_len).collect();
    let third: Vec<T> = remaining.collect();

    let mut first = first.into_iter();
    let mut second = second.into_iter();
    let mut third = third.into_iter();
    let mut sequenced = Vec::with_capacity(total);
    while sequenced.len() < total {
        sequenced.extend(first.next());
        sequenced.extend(second.next());
        sequenced.extend(third.next());
    }
    sequenced
}

#[cfg(test)]
mod tests {
    use super::sequence_for_print;

    #[test]
    fn interleaves_thirds() {
        let sequenced = sequence_for_print((1..=9).collect());
        assert_eq!(sequenced, vec![1, 4, 7, 2, 5, 8, 3, 6, 9]);
    }

    #[test]
    fn uneven_counts_drain_every_run() {
        assert_eq!(sequence_for_print((1..=7).collect()), vec![1, 4, 6, 2, 5, 7, 3]);
        assert_eq!(
            sequence_for_print((1..=8).collect()),
            vec![1, 4, 6, 2, 5, 7, 3, 8]
        );
    }

    #[test]
    fn tiny_inputs_pass_through() {
        assert_eq!(sequence_for_print(Vec::<u32>::new()), Vec::<u32>::new());
        assert_eq!(sequence_for_print(vec![1]), vec![1]);
        assert_eq!(sequence_for_print(vec![1, 2]), vec![1, 2]);
    }
}
