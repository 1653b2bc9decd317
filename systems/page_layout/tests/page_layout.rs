use music_bingo_system_page_layout::{sequence_for_print, TICKETS_PER_PAGE};

#[test]
fn print_order_is_a_permutation() {
    for total in 0..200u32 {
        let mut sequenced = sequence_for_print((1..=total).collect());
        sequenced.sort_unstable();
        assert_eq!(sequenced, (1..=total).collect::<Vec<_>>(), "count {total}");
    }
}

#[test]
fn consecutive_numbers_never_touch() {
    for total in 6..300u32 {
        let sequenced = sequence_for_print((1..=total).collect());

        for pair in sequenced.windows(2) {
            assert_ne!(
                pair[0].abs_diff(pair[1]),
                1,
                "count {total}: {pair:?} printed side by side"
            );
        }

        for page in sequenced.chunks(TICKETS_PER_PAGE) {
            for number in page {
                assert!(
                    !page.contains(&(number + 1)),
                    "count {total}: page {page:?} holds consecutive tickets"
                );
            }
        }
    }
}

#[test]
fn page_leaders_come_from_each_third() {
    let sequenced = sequence_for_print((1..=24).collect::<Vec<u32>>());
    assert_eq!(&sequenced[..3], &[1, 9, 17]);
    assert_eq!(&sequenced[21..], &[8, 16, 24]);
}
