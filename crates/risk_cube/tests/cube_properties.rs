//! Property tests for cube algebra.
//!
//! Covers merge associativity over tag columns, positional difference of a
//! cube with itself, and sort determinism.

use proptest::prelude::*;
use risk_cube::{CubeValue, ResultCube, Schema};

fn cube_strategy() -> impl Strategy<Value = ResultCube> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["T1", "T2", "T3", "T4"]),
            prop::sample::select(vec!["1M", "6M", "1Y", "5Y"]),
            -1.0e6..1.0e6f64,
        ),
        0..40,
    )
    .prop_map(|rows| {
        let schema = Schema::builder()
            .string("TradeId")
            .string("PillarLabel")
            .build()
            .unwrap();
        let mut cube = ResultCube::new(schema);
        for (trade, pillar, value) in rows {
            cube.add_row(vec![trade.into(), pillar.into()], value)
                .unwrap();
        }
        cube
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_merge_tags_associative(
        cube in cube_strategy(),
        v1 in "[A-Z]{1,6}",
        v2 in "[A-Z]{1,6}",
    ) {
        let k1: CubeValue = v1.as_str().into();
        let k2: CubeValue = v2.as_str().into();

        let nested = ResultCube::empty()
            .merge(
                &ResultCube::empty().merge(&cube, &[("Metric", k1.clone())], false).unwrap(),
                &[("Desk", k2.clone())],
                false,
            )
            .unwrap();
        let flat = ResultCube::empty()
            .merge(&cube, &[("Metric", k1), ("Desk", k2)], false)
            .unwrap();

        prop_assert_eq!(nested, flat);
    }

    #[test]
    fn test_quick_difference_self_all_zero(cube in cube_strategy()) {
        let diff = cube.quick_difference(&cube).unwrap();
        prop_assert_eq!(diff.len(), cube.len());
        prop_assert!(diff.rows().iter().all(|r| r.value() == 0.0));

        let mut filtered = diff.clone();
        filtered.retain_non_zero();
        prop_assert!(filtered.is_empty());
    }

    #[test]
    fn test_keyed_difference_self_all_zero(cube in cube_strategy()) {
        let diff = cube.difference(&cube).unwrap();
        prop_assert_eq!(diff.len(), cube.len());
        prop_assert!(diff.rows().iter().all(|r| r.value() == 0.0));
    }

    #[test]
    fn test_sort_deterministic_under_permutation(cube in cube_strategy()) {
        let mut forward = cube.clone();
        forward.sort_by_columns(&["TradeId", "PillarLabel"]).unwrap();

        let mut reversed_rows = cube.clone();
        let mut reversed = ResultCube::with_shared_schema(reversed_rows.shared_schema());
        for row in cube.rows().iter().rev() {
            reversed.add_row(row.metadata().to_vec(), row.value()).unwrap();
        }
        reversed.sort_by_columns(&["TradeId", "PillarLabel"]).unwrap();
        reversed_rows.sort_by_columns(&["TradeId", "PillarLabel"]).unwrap();

        let keys = |c: &ResultCube| -> Vec<Vec<CubeValue>> {
            c.rows().iter().map(|r| r.metadata().to_vec()).collect()
        };
        prop_assert_eq!(keys(&forward), keys(&reversed));
        prop_assert_eq!(forward, reversed_rows);
    }

    #[test]
    fn test_pivot_preserves_total(cube in cube_strategy()) {
        let pivot = cube.pivot(&["TradeId"], risk_cube::Aggregation::Sum).unwrap();
        prop_assert!((pivot.sum_of_all_rows() - cube.sum_of_all_rows()).abs() < 1e-3);
    }
}
