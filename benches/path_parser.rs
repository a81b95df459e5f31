use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vectorfx::path::PathBuilder;
use vectorfx::path_parser::Lexer;
use vectorfx::{PathVector, PathVectorSatellites, Satellite, SatelliteType};

static INPUT: &str = "M10 20 C 30,40 50 60-70,80,90 100,110 120,130,140 Z m 5 5 h 10 v 10 h -10 z";

fn lex_path(input: &str) {
    let lexer = Lexer::new(black_box(input));

    for (_pos, _token) in lexer {
        // no-op
    }
}

fn path_parser(c: &mut Criterion) {
    c.bench_function("parse path into builder", |b| {
        let input = black_box(INPUT);

        b.iter(|| {
            let mut builder = PathBuilder::default();
            let _ = builder.parse(input);
        });
    });

    c.bench_function("lex str", |b| {
        let input = black_box(INPUT);

        b.iter(|| {
            lex_path(input);
        });
    });

    c.bench_function("recalculate satellites", |b| {
        let path = PathVector::from_path_data(INPUT).unwrap();
        let mut pvs = PathVectorSatellites::default();

        b.iter(|| {
            pvs.recalculate_for_new_path_vector(
                black_box(path.clone()),
                Satellite::new(SatelliteType::Chamfer),
            );
        });
    });
}

criterion_group!(benches, path_parser);
criterion_main!(benches);
