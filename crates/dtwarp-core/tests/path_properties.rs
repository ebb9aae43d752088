//! Property tests for alignment paths over random multivariate sequences.

use dtwarp_core::{Dtw, DtwError, FeatureSequence, euclidean};
use proptest::prelude::*;

fn sequence(dim: usize, max_len: usize) -> impl Strategy<Value = FeatureSequence> {
    (1..=max_len)
        .prop_flat_map(move |len| prop::collection::vec(-10.0f32..10.0, len * dim))
        .prop_map(move |values| FeatureSequence::new(values, dim).expect("generated sequence is valid"))
}

fn sequence_pair() -> impl Strategy<Value = (FeatureSequence, FeatureSequence)> {
    (1usize..=4).prop_flat_map(|dim| (sequence(dim, 12), sequence(dim, 12)))
}

proptest! {
    #[test]
    fn path_runs_corner_to_corner((a, b) in sequence_pair(), w in 0.0f32..3.0) {
        let dtw = Dtw::unconstrained().with_diagonal_weight(w).unwrap();
        let alignment = dtw.compute_path(a.as_view(), b.as_view()).unwrap();
        let steps = alignment.path().steps();

        let first = steps.first().unwrap();
        prop_assert_eq!((first.seq1, first.seq2), (0, 0));
        prop_assert_eq!(first.distance, euclidean(a.frame(0), b.frame(0)));

        let last = steps.last().unwrap();
        prop_assert_eq!((last.seq1, last.seq2), (a.len() - 1, b.len() - 1));
    }

    #[test]
    fn consecutive_steps_advance_by_unit_moves((a, b) in sequence_pair(), w in 0.0f32..3.0) {
        let dtw = Dtw::unconstrained().with_diagonal_weight(w).unwrap();
        let alignment = dtw.compute_path(a.as_view(), b.as_view()).unwrap();
        for pair in alignment.path().steps().windows(2) {
            let di = pair[1].seq1 - pair[0].seq1;
            let dj = pair[1].seq2 - pair[0].seq2;
            prop_assert!(matches!((di, dj), (1, 0) | (0, 1) | (1, 1)), "bad move ({}, {})", di, dj);
        }
    }

    #[test]
    fn path_length_is_bounded((a, b) in sequence_pair()) {
        let alignment = Dtw::unconstrained().compute_path(a.as_view(), b.as_view()).unwrap();
        let len = alignment.len();
        prop_assert!(len >= a.len().max(b.len()));
        prop_assert!(len < a.len() + b.len());
    }

    #[test]
    fn distances_are_local_and_non_negative((a, b) in sequence_pair(), window in 0usize..4) {
        if let Ok(alignment) = Dtw::with_sakoe_chiba(window).compute_path(a.as_view(), b.as_view()) {
            prop_assert!(alignment.total_cost().is_finite());
            prop_assert!(alignment.total_cost() >= 0.0);
            for step in alignment.path() {
                prop_assert!(step.distance >= 0.0);
                prop_assert_eq!(step.distance, euclidean(a.frame(step.seq1), b.frame(step.seq2)));
            }
        }
    }

    #[test]
    fn identical_sequences_follow_the_diagonal(a in (1usize..=4).prop_flat_map(|d| sequence(d, 12))) {
        let alignment = Dtw::unconstrained().compute_path(a.as_view(), a.as_view()).unwrap();
        prop_assert_eq!(alignment.len(), a.len());
        for (k, step) in alignment.path().steps().iter().enumerate() {
            prop_assert_eq!((step.seq1, step.seq2), (k, k));
            prop_assert_eq!(step.distance, 0.0);
        }
    }

    #[test]
    fn widening_the_band_never_loses_a_path((a, b) in sequence_pair(), window in 0usize..6) {
        let narrow = Dtw::with_sakoe_chiba(window).distance(a.as_view(), b.as_view());
        let wider = Dtw::with_sakoe_chiba(window + 1).distance(a.as_view(), b.as_view());
        let full = Dtw::unconstrained().distance(a.as_view(), b.as_view());

        prop_assert!(full.is_ok());
        match narrow {
            Ok(narrow_cost) => {
                let wider_cost = wider.unwrap();
                prop_assert!(wider_cost <= narrow_cost);
                prop_assert!(full.unwrap() <= wider_cost);
            }
            Err(err) => prop_assert!(
                matches!(err, DtwError::NoPathFound { .. }),
                "unexpected error {:?}", err
            ),
        }
    }

    #[test]
    fn equal_lengths_never_miss_with_any_band(
        (a, b) in (1usize..=3, 1usize..=12).prop_flat_map(|(dim, len)| {
            let s = prop::collection::vec(-10.0f32..10.0, len * dim)
                .prop_map(move |v| FeatureSequence::new(v, dim).unwrap());
            (s.clone(), s)
        }),
        window in 0usize..3,
    ) {
        let alignment = Dtw::with_sakoe_chiba(window).compute_path(a.as_view(), b.as_view());
        prop_assert!(alignment.is_ok());
    }

    #[test]
    fn distance_agrees_with_path_cost((a, b) in sequence_pair(), window in 0usize..4, w in 0.0f32..2.0) {
        let dtw = Dtw::with_sakoe_chiba(window).with_diagonal_weight(w).unwrap();
        let rolling = dtw.distance(a.as_view(), b.as_view());
        let full = dtw.compute_path(a.as_view(), b.as_view()).map(|al| al.total_cost());
        prop_assert_eq!(rolling, full);
    }
}
