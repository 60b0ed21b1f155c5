use criterion::{black_box, Criterion};
use spmv_frame::Frame;
use spmv_results::{
    calculate_speedup, describe, filter_min_nnz, parse_table, with_nnzpr, DEFAULT_BASELINE,
};

const KERNELS: [&str; 8] = [
    "CPU CSR",
    "CPU CSR Parallel",
    "GPU CSR",
    "GPU CSR (vector)",
    "GPU CSR-Adaptive",
    "GPU COO",
    "GPU SCOO",
    "GPU ELL",
];

// deterministic stand-in for a results directory with `n` matrices
fn synthetic_json(n: usize) -> (String, String) {
    let timings = (0..n)
        .map(|i| {
            let cells = KERNELS
                .iter()
                .enumerate()
                .map(|(k, name)| format!("{:?}: {}", name, 1e-3 * (1 + (i * 7 + k * 13) % 97) as f64))
                .collect::<Vec<_>>()
                .join(", ");
            format!("\"m{}.mtx\": {{{}}}", i, cells)
        })
        .collect::<Vec<_>>()
        .join(",\n");
    let info = (0..n)
        .map(|i| {
            let rows = 100 + i * 31 % 5000;
            format!(
                "\"m{}.mtx\": {{\"rows\": {}, \"cols\": {}, \"nnz\": {}}}",
                i,
                rows,
                rows,
                rows * (1 + i % 40)
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");
    (format!("{{{}}}", timings), format!("{{{}}}", info))
}

fn load(timings: &str, info: &str) -> (Frame, Frame) {
    let source = parse_table(timings).unwrap();
    let info = parse_table(info).unwrap();
    let merged = with_nnzpr(source.inner_join(&info).unwrap()).unwrap();
    (source, merged)
}

fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    for n in [100, 2_000] {
        let (timings, info) = synthetic_json(n);
        criterion.bench_function(&format!("parse and merge {} matrices", n), |b| {
            b.iter(|| load(black_box(&timings), black_box(&info)))
        });

        let (source, merged) = load(&timings, &info);
        criterion.bench_function(&format!("speedup {} matrices", n), |b| {
            b.iter(|| calculate_speedup(black_box(&merged), &source, DEFAULT_BASELINE).unwrap())
        });

        let speedup = calculate_speedup(&merged, &source, DEFAULT_BASELINE).unwrap();
        criterion.bench_function(&format!("filter and describe {} matrices", n), |b| {
            b.iter(|| describe(&filter_min_nnz(black_box(&speedup), 5_000.0).unwrap(), None))
        });
    }
    criterion.final_summary();
}
