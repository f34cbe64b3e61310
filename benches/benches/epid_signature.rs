use ark_std::rand::{rngs::StdRng, SeedableRng};
use benches::setup_epid;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use epid::VerifierCtx;

fn sign_verify(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0u64);
    setup_epid!(rng, setup, rl_size_range, sig_rl_range);
    let (mut member, _) = setup.member(&mut rng);
    let msg = b"test message";

    let mut sign_group = c.benchmark_group("EPID signing");
    for (i, count) in rl_size_range.iter().enumerate() {
        sign_group.bench_with_input(BenchmarkId::from_parameter(*count), &i, |b, &i| {
            b.iter(|| {
                member
                    .sign(black_box(msg), None, Some(&sig_rl_range[i]), &mut rng)
                    .unwrap()
            });
        });
    }
    sign_group.finish();

    let sigs_range = sig_rl_range
        .iter()
        .map(|rl| member.sign(msg, None, Some(rl), &mut rng).unwrap())
        .collect::<Vec<_>>();

    let mut verify_group = c.benchmark_group("EPID verifying");
    for (i, count) in rl_size_range.iter().enumerate() {
        let mut verifier = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
        verifier.set_sig_rl(&sig_rl_range[i]).unwrap();
        verify_group.bench_with_input(BenchmarkId::from_parameter(*count), &i, |b, &i| {
            b.iter(|| verifier.verify(black_box(&sigs_range[i]), msg).unwrap());
        });
    }
    verify_group.finish();
}

fn pre_signature(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = test_utils::epid::group_setup(&mut rng, 2);
    let (mut member, _) = setup.member(&mut rng);
    c.bench_function("EPID pre-signature", |b| {
        b.iter(|| member.add_pre_sigs(1, &mut rng).unwrap())
    });
}

criterion_group!(benches, sign_verify, pre_signature);
criterion_main!(benches);
