#![no_main]
use libfuzzer_sys::fuzz_target;
use spmv_results::parse_table;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(m) = parse_table(input) {
            for row in m.rows() {
                assert_eq!(row.values().len(), m.columns().len());
            }
        }
    }
});
