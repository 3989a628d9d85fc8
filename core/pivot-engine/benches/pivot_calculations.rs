//! FILENAME: benches/pivot_calculations.rs
//! Benchmarks for pivoting and reconstructing large cubes.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cube::{Category, Cube, CubeMetadata, Dimension, Roles};
use pivot_engine::{pivot, reconstruct_values, IdColumns, PivotFormat, PivotOptions};

/// Statistic(4) x Year(20) x Area(500) x Sex(3).
fn large_cube() -> Cube {
    let dimension = |code: &str, n: usize| {
        Dimension::new(
            code,
            code,
            (0..n)
                .map(|i| Category::new(format!("{}{}", code, i), format!("{} {}", code, i)))
                .collect(),
        )
    };
    let dims = vec![
        dimension("Statistic", 4),
        dimension("Year", 20),
        dimension("Area", 500),
        dimension("Sex", 3),
    ];
    let len = 4 * 20 * 500 * 3;
    let values = (0..len)
        .map(|v| if v % 11 == 0 { None } else { Some(v as f64) })
        .collect();
    let roles = Roles {
        statistic: Some(0),
        time: Some(1),
        geographic: Some(2),
    };
    Cube::new(dims, values, roles, CubeMetadata::default()).unwrap()
}

fn bench_pivot(c: &mut Criterion) {
    let cube = large_cube();
    for format in PivotFormat::ALL {
        let options = PivotOptions::new(format).with_ids(IdColumns::SpatialOnly);
        c.bench_function(&format!("pivot_{}", format), |b| {
            b.iter(|| pivot(black_box(&cube), black_box(&options)).unwrap())
        });
    }
}

fn bench_reconstruct(c: &mut Criterion) {
    let cube = large_cube();
    let table = pivot(&cube, &PivotOptions::default()).unwrap();
    c.bench_function("reconstruct_long", |b| {
        b.iter(|| reconstruct_values(black_box(&table)).unwrap())
    });
}

criterion_group!(benches, bench_pivot, bench_reconstruct);
criterion_main!(benches);
