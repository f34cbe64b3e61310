use ark_std::rand::{rngs::StdRng, SeedableRng};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use epid_math::{
    ecc::{Curve, NamedCurve},
    montgomery::{ExpMethod, Montgomery},
    BigNum,
};

fn mod_exp(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0u64);
    let one = BigNum::from_u64(1, 1).unwrap();

    for method in [ExpMethod::Fast, ExpMethod::ConstantTime] {
        let mut group = c.benchmark_group(format!("Montgomery exponentiation {:?}", method));
        for name in [NamedCurve::P256, NamedCurve::P384] {
            let curve = Curve::new(name).unwrap();
            let modulus = curve.order();
            let ctx = Montgomery::new(modulus, method).unwrap();
            let base = BigNum::random_in_range(&one, modulus, &mut rng).unwrap();
            let exp = BigNum::random_in_range(&one, modulus, &mut rng).unwrap();
            group.bench_with_input(
                BenchmarkId::from_parameter(modulus.bit_len()),
                &(base, exp),
                |b, (base, exp)| b.iter(|| ctx.mod_exp(black_box(base), black_box(exp)).unwrap()),
            );
        }
        group.finish();
    }
}

criterion_group!(benches, mod_exp);
criterion_main!(benches);
