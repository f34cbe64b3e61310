use ark_std::rand::{rngs::StdRng, SeedableRng};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use epid_math::{
    ecc::{Curve, NamedCurve, Reduction, ScalarMulMethod},
    ecdsa::Ecdsa,
    BigNum,
};

fn sign_verify(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0u64);
    let msg = [7u8; 256];

    let mut sign_group = c.benchmark_group("ECDSA signing");
    let mut keys = Vec::new();
    for name in NamedCurve::ALL {
        let ecdsa = Ecdsa::new(name).unwrap();
        let (sk, pk) = ecdsa.keygen(&mut rng).unwrap();
        sign_group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", name)),
            &sk,
            |b, sk| b.iter(|| ecdsa.sign(sk, black_box(&msg), &mut rng).unwrap()),
        );
        let sig = ecdsa.sign(&sk, &msg, &mut rng).unwrap();
        keys.push((ecdsa, pk, sig));
    }
    sign_group.finish();

    let mut verify_group = c.benchmark_group("ECDSA verifying");
    for (ecdsa, pk, sig) in &keys {
        verify_group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", ecdsa.curve().name())),
            sig,
            |b, sig| b.iter(|| ecdsa.verify(pk, black_box(&msg), black_box(sig)).unwrap()),
        );
    }
    verify_group.finish();
}

/// Dedicated prime reduction against the generic Montgomery one, with both scalar mul methods.
fn reductions(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0u64);
    let one = BigNum::from_u64(1, 1).unwrap();
    let mut group = c.benchmark_group("P-256 scalar multiplication");
    for (label, reduction) in [("named", Reduction::P256), ("montgomery", Reduction::Montgomery)] {
        let curve = Curve::with_reduction(NamedCurve::P256, reduction).unwrap();
        let k = BigNum::random_in_range(&one, curve.order(), &mut rng).unwrap();
        for method in [ScalarMulMethod::Window, ScalarMulMethod::Scrambled] {
            group.bench_with_input(
                BenchmarkId::new(label, format!("{:?}", method)),
                &k,
                |b, k| b.iter(|| curve.mul_generator(black_box(k), method).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, sign_verify, reductions);
criterion_main!(benches);
