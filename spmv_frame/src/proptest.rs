use proptest::prelude::*;

use crate::{Frame, JoinPair};

const MAX_ROWS: usize = 8;
const MAX_COLUMNS: usize = 4;

pub fn arb_label() -> impl Strategy<Value = String> {
    "[a-f]{1,2}\\.mtx"
}

// mostly positive durations, with the occasional zero that makes a ratio blow up
pub fn arb_cell() -> impl Strategy<Value = f64> {
    prop_oneof![9 => 1e-3f64..1e6, 1 => Just(0.0)]
}

pub fn arb_columns() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[A-Z]{1,3}", 1..MAX_COLUMNS)
        .prop_map(|columns| columns.into_iter().collect())
}

pub fn arb_frame_with_columns(columns: Vec<String>) -> impl Strategy<Value = Frame> {
    let width = columns.len();
    proptest::collection::btree_map(
        arb_label(),
        proptest::collection::vec(arb_cell(), width),
        0..MAX_ROWS,
    )
    .prop_map(move |rows| Frame::from_rows(columns.clone(), rows).unwrap())
}

pub fn arb_frame() -> impl Strategy<Value = Frame> {
    arb_columns().prop_flat_map(arb_frame_with_columns)
}

pub fn arb_join_pair() -> impl Strategy<Value = JoinPair> {
    (arb_frame(), arb_frame()).prop_map(|(left, right)| JoinPair(left, right))
}
