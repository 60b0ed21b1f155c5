#![no_main]
use libfuzzer_sys::fuzz_target;
use spmv_frame::JoinPair;

fuzz_target!(|p: JoinPair| {
    let JoinPair(left, right) = p;
    if let Ok(m) = left.inner_join(&right) {
        assert!(m.len() <= left.len().min(right.len()));
        assert_eq!(m.columns().len(), left.columns().len() + right.columns().len());
        for label in m.labels() {
            assert!(left.row(label).is_some() && right.row(label).is_some());
        }
    }
});
