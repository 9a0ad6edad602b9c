use criterion::{Criterion, criterion_group, criterion_main};
use sqltree::{
    parser::parse_sql,
    test_utils::{PARSING_TESTS_FILE, TestParsingData},
};
use std::hint::black_box;

fn bench_parsing(sqls: &[&String]) {
    for sql in sqls {
        let _ = parse_sql(sql);
    }
}

fn bench_round_trip(sqls: &[&String]) {
    for sql in sqls {
        if let Ok(select) = parse_sql(sql) {
            let _ = parse_sql(&select.to_sql());
        }
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let parsing_test_file =
        std::fs::read_to_string(PARSING_TESTS_FILE).expect("Cannot open parsing test cases");
    let test_parsing_data: TestParsingData =
        toml::from_str(&parsing_test_file).expect("Cannot parse test cases defined in toml");

    let sqls = test_parsing_data
        .tests
        .iter()
        .map(|t| &t.sql)
        .collect::<Vec<_>>();

    c.bench_function("bench parsing tests", |b| {
        b.iter(|| bench_parsing(black_box(&sqls)))
    });
    c.bench_function("bench round trip tests", |b| {
        b.iter(|| bench_round_trip(black_box(&sqls)))
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(1000);
    targets = criterion_benchmark
);
criterion_main!(benches);
