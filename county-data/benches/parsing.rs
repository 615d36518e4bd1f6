//! Benchmarks du chargement des sources comtés/population

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use county_data::{parse_sources, AlreadyGeographic, LoadOptions};

/// Comtés circulaires de `vertices` sommets sur une grille carrée
fn synthetic_sources(side: usize, vertices: usize) -> (String, String) {
    let mut counties = String::from("GEOID,STATE,COUNTY,BORDERS\n");
    let mut population = String::from("GEOID,POP_ESTIMATE_2023\n");

    for k in 0..side * side {
        let (cx, cy) = (-120.0 + (k % side) as f64 * 0.5, 30.0 + (k / side) as f64 * 0.5);
        let ring: Vec<String> = (0..=vertices)
            .map(|v| {
                let t = 2.0 * std::f64::consts::PI * (v % vertices) as f64 / vertices as f64;
                format!("{:.6} {:.6}", cx + 0.24 * t.cos(), cy + 0.24 * t.sin())
            })
            .collect();
        counties.push_str(&format!(
            "{:05},State,County {},\"POLYGON(({}))\"\n",
            k + 1,
            k,
            ring.join(",")
        ));
        population.push_str(&format!("{:05},{}\n", k + 1, 1000 + k));
    }

    (counties, population)
}

fn bench_parse_sources(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_sources");
    let options = LoadOptions::default();

    for &vertices in &[32usize, 256, 1024] {
        let (counties, population) = synthetic_sources(20, vertices);
        group.throughput(Throughput::Bytes((counties.len() + population.len()) as u64));

        group.bench_with_input(BenchmarkId::from_parameter(vertices), &vertices, |b, _| {
            b.iter(|| {
                let result = parse_sources(
                    black_box(counties.as_bytes()),
                    black_box(population.as_bytes()),
                    &options,
                    &AlreadyGeographic,
                )
                .unwrap();
                black_box(result)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_sources);
criterion_main!(benches);
