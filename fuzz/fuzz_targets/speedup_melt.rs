#![no_main]
use libfuzzer_sys::fuzz_target;
use spmv_frame::Frame;
use spmv_results::calculate_speedup;

fuzz_target!(|m: Frame| {
    let Some(baseline) = m.columns().first().cloned() else {
        return;
    };
    let speedup = calculate_speedup(&m, &m, &baseline).unwrap();
    assert_eq!(speedup.len(), m.len());
    assert_eq!(speedup.columns(), m.columns());
    assert_eq!(speedup.melt().len(), m.len() * m.columns().len());
    for row in speedup.rows() {
        let base = m.get(row.label(), &baseline).unwrap();
        if base.is_finite() && base != 0.0 {
            assert_eq!(row.get(&baseline), Some(1.0));
        }
    }
});
