use crate::{
    calculate_speedup, filter_min_nnz, parse_table, stats_report, with_nnzpr, LoadError,
    SpeedupError, DEFAULT_BASELINE, NNZ, NNZPR, ROWS,
};
use proptest::{prelude::*, test_runner::TestRunner};
use spmv_frame::{proptest::arb_frame_with_columns, Frame, FrameError};

const TIMINGS: &str = r#"{"A": {"CPU CSR": 10, "GPU COO": 2}}"#;
const INFO: &str = r#"{"A": {"nnz": 500, "rows": 100, "cols": 100}}"#;

fn merge(timings: &str, info: &str) -> (Frame, Frame) {
    let source = parse_table(timings).unwrap();
    let info = parse_table(info).unwrap();
    let merged = with_nnzpr(source.inner_join(&info).unwrap()).unwrap();
    (source, merged)
}

#[test]
fn worked_example() {
    let (source, merged) = merge(TIMINGS, INFO);
    let speedup = calculate_speedup(&merged, &source, DEFAULT_BASELINE).unwrap();
    assert_eq!(speedup.get("A", "GPU COO"), Ok(5.0));
    assert_eq!(speedup.get("A", DEFAULT_BASELINE), Ok(1.0));
    assert_eq!(speedup.get("A", NNZPR), Ok(5.0));
    assert_eq!(speedup.get("A", NNZ), Ok(500.0));
    assert_eq!(
        speedup.columns(),
        ["CPU CSR", "GPU COO", "nnz", "rows", "cols", "nnzpr"]
    );
}

#[test]
fn parse_keeps_first_seen_column_order_and_fills_gaps() {
    let m = parse_table(
        r#"{"b.mtx": {"GPU ELL": 3.5, "CPU CSR": 1},
            "a.mtx": {"CPU CSR": 2, "GPU CSR-Adaptive": null}}"#,
    )
    .unwrap();
    assert_eq!(m.columns(), ["GPU ELL", "CPU CSR", "GPU CSR-Adaptive"]);
    assert_eq!(m.labels().collect::<Vec<_>>(), ["a.mtx", "b.mtx"]);
    assert!(m.get("a.mtx", "GPU ELL").unwrap().is_nan());
    assert!(m.get("a.mtx", "GPU CSR-Adaptive").unwrap().is_nan());
    assert_eq!(m.get("b.mtx", "GPU ELL"), Ok(3.5));
}

#[test]
fn parse_rejects_bad_input() {
    assert!(matches!(parse_table("{"), Err(LoadError::Json(_))));
    assert!(matches!(parse_table("[1, 2]"), Err(LoadError::Shape(_))));
    assert!(matches!(
        parse_table(r#"{"a": 3}"#),
        Err(LoadError::Shape(_))
    ));
    match parse_table(r#"{"a": {"CPU CSR": "fast"}}"#) {
        Err(LoadError::NonNumeric { row, column }) => {
            assert_eq!((row.as_str(), column.as_str()), ("a", "CPU CSR"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn empty_object_is_an_empty_table() {
    let m = parse_table("{}").unwrap();
    assert!(m.is_empty());
    assert!(m.columns().is_empty());
}

#[test]
fn merge_drops_unmatched_matrices() {
    let (source, merged) = merge(
        r#"{"A": {"CPU CSR": 1}, "B": {"CPU CSR": 2}}"#,
        r#"{"B": {"nnz": 4, "rows": 2}, "C": {"nnz": 9, "rows": 3}}"#,
    );
    assert_eq!(source.len(), 2);
    assert_eq!(merged.labels().collect::<Vec<_>>(), ["B"]);
}

#[test]
fn metadata_without_rows_is_rejected() {
    let source = parse_table(TIMINGS).unwrap();
    let info = parse_table(r#"{"A": {"nnz": 500}}"#).unwrap();
    assert_eq!(
        with_nnzpr(source.inner_join(&info).unwrap()),
        Err(FrameError::MissingColumn(ROWS.to_string()))
    );
}

#[test]
fn missing_baseline() {
    let (source, merged) = merge(TIMINGS, INFO);
    assert_eq!(
        calculate_speedup(&merged, &source, "CPU CSR (mkl)"),
        Err(SpeedupError::MissingBaseline("CPU CSR (mkl)".to_string()))
    );
}

#[test]
fn zero_duration_passes_through() {
    let (source, merged) = merge(r#"{"A": {"CPU CSR": 10, "GPU COO": 0}}"#, INFO);
    let speedup = calculate_speedup(&merged, &source, DEFAULT_BASELINE).unwrap();
    assert_eq!(speedup.get("A", "GPU COO"), Ok(f64::INFINITY));

    let (source, merged) = merge(r#"{"A": {"CPU CSR": 0, "GPU COO": 0}}"#, INFO);
    let speedup = calculate_speedup(&merged, &source, DEFAULT_BASELINE).unwrap();
    assert!(speedup.get("A", DEFAULT_BASELINE).unwrap().is_nan());
}

#[test]
fn filter_is_strict_and_needs_nnz() {
    let (_, merged) = merge(TIMINGS, INFO);
    assert_eq!(filter_min_nnz(&merged, 499.0).unwrap().len(), 1);
    assert_eq!(filter_min_nnz(&merged, 500.0).unwrap().len(), 0);
    assert_eq!(
        filter_min_nnz(&parse_table(TIMINGS).unwrap(), 0.0),
        Err(FrameError::MissingColumn(NNZ.to_string()))
    );
}

#[test]
fn report_lists_largest_speedups() {
    let (source, merged) = merge(
        r#"{"A": {"CPU CSR": 10, "GPU COO": 2},
            "B": {"CPU CSR": 10, "GPU COO": 1},
            "C": {"CPU CSR": 10, "GPU COO": 5}}"#,
        r#"{"A": {"nnz": 5, "rows": 1}, "B": {"nnz": 6, "rows": 2}, "C": {"nnz": 7, "rows": 7}}"#,
    );
    let speedup = calculate_speedup(&merged, &source, DEFAULT_BASELINE).unwrap();
    let report = stats_report("float", &speedup, Some("GPU COO"), Some(2), DEFAULT_BASELINE).unwrap();
    assert_eq!(report.matrices, 3);
    assert_eq!(report.description.len(), 1);
    let top = report.top.as_ref().unwrap();
    let names: Vec<_> = top.rows.iter().map(|r| r.matrix.as_str()).collect();
    assert_eq!(names, ["B", "A"]);
    assert_eq!(top.rows[0].value, 10.0);
    assert_eq!(top.rows[0].nnz, 6.0);

    let text = report.to_string();
    assert!(text.starts_with("Data for float => "));
    assert!(text.contains("Largest 2 by GPU COO:"));

    let whole = stats_report("double", &speedup, None, Some(2), DEFAULT_BASELINE).unwrap();
    assert!(whole.top.is_none());
    assert_eq!(whole.description.len(), speedup.columns().len());
}

#[test]
fn report_of_empty_table_has_zero_count() {
    let (source, merged) = merge(TIMINGS, INFO);
    let speedup = calculate_speedup(&merged, &source, DEFAULT_BASELINE).unwrap();
    let empty = filter_min_nnz(&speedup, 1e9).unwrap();
    let report = stats_report("float", &empty, None, None, DEFAULT_BASELINE).unwrap();
    assert!(report.description.iter().all(|(_, s)| s.count == 0));
}

#[test]
fn report_json_keeps_infinite_speedups() {
    let (source, merged) = merge(
        r#"{"A": {"CPU CSR": 10, "GPU COO": 0}, "B": {"CPU CSR": 10, "GPU COO": 2}}"#,
        r#"{"A": {"nnz": 5, "rows": 1}, "B": {"nnz": 6, "rows": 2}}"#,
    );
    let speedup = calculate_speedup(&merged, &source, DEFAULT_BASELINE).unwrap();
    let report = stats_report("float", &speedup, Some("GPU COO"), Some(1), DEFAULT_BASELINE).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    let stats = &json["description"]["GPU COO"];
    assert_eq!(stats["count"], 2);
    assert_eq!(stats["min"], 5.0);
    assert_eq!(stats["mean"], "inf");
    assert_eq!(stats["max"], "inf");
    assert_eq!(stats["std"], "NaN");
    assert_eq!(json["top"]["rows"][0]["matrix"], "A");
    assert_eq!(json["top"]["rows"][0]["value"], "inf");
    assert_eq!(json["top"]["rows"][0]["baseline"], 1.0);
}

fn arb_results() -> impl Strategy<Value = (Frame, Frame)> {
    let timings = vec!["CPU CSR".to_string(), "GPU COO".to_string(), "GPU ELL".to_string()];
    let info = vec![NNZ.to_string(), ROWS.to_string()];
    (arb_frame_with_columns(timings), arb_frame_with_columns(info)).prop_map(|(source, info)| {
        let merged = with_nnzpr(source.inner_join(&info).unwrap()).unwrap();
        (source, merged)
    })
}

#[test]
fn baseline_speedup_is_one() {
    let mut runner = TestRunner::default();
    runner
        .run(&arb_results(), |(source, merged)| {
            let speedup = calculate_speedup(&merged, &source, DEFAULT_BASELINE).unwrap();
            prop_assert_eq!(speedup.len(), merged.len());
            for row in speedup.rows() {
                let base = source.get(row.label(), DEFAULT_BASELINE).unwrap();
                if base != 0.0 {
                    prop_assert_eq!(row.get(DEFAULT_BASELINE), Some(1.0));
                }
            }
            Ok(())
        })
        .unwrap();
}

proptest! {
    #[test]
    fn nnzpr_is_nnz_over_rows((_, merged) in arb_results()) {
        for row in merged.rows() {
            let (nnz, rows, nnzpr) = (row.get(NNZ).unwrap(), row.get(ROWS).unwrap(), row.get(NNZPR).unwrap());
            let expected = nnz / rows;
            prop_assert!(nnzpr == expected || (nnzpr.is_nan() && expected.is_nan()));
        }
    }

    #[test]
    fn filter_is_monotonic((_, merged) in arb_results(), t1 in 0f64..1e6, dt in 0f64..1e6) {
        let low = filter_min_nnz(&merged, t1).unwrap();
        let high = filter_min_nnz(&merged, t1 + dt).unwrap();
        prop_assert!(high.len() <= low.len());
        prop_assert!(high.labels().all(|l| low.row(l).is_some()));
    }
}
