use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tours_query::*;

fn query_string(n: usize) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("sort".to_string(), "price,-ratingsAverage".to_string()),
        ("fields".to_string(), "name,price,ratingsAverage".to_string()),
        ("page".to_string(), "3".to_string()),
        ("limit".to_string(), "20".to_string()),
    ];
    for i in 0..n {
        pairs.push((format!("field_{i}[gte]"), i.to_string()));
        pairs.push((format!("field_{i}[lt]"), (i * 10).to_string()));
    }
    pairs
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_params");
    for n in [4, 64] {
        let pairs = query_string(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &pairs, |b, pairs| {
            b.iter(|| {
                RawParams::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                    .sanitized()
                    .without_pollution(&["price"])
            })
        });
    }
    group.finish();
}

fn bench_refine(c: &mut Criterion) {
    let mut group = c.benchmark_group("refine");
    for n in [4, 64] {
        let params = RawParams::from_pairs(query_string(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &params, |b, params| {
            b.iter(|| {
                QueryRefiner::new(RefinedQuery::new(), params)
                    .refine()
                    .into_query()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_refine);
criterion_main!(benches);
