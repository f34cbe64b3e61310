use ark_bls12_381::Fr;
use ark_std::{
    rand::{rngs::StdRng, RngCore, SeedableRng},
    UniformRand,
};
use epid::{
    are_sigs_linked, issuer::IssuerKey, precomp::MemberPrecomp, sig_size, EpidError, GroupId,
    HashAlg, MemberCtx, Signature, VerifierCtx,
};
use epid_utils::{BeDecode, BeEncode};
use std::time::Instant;
use test_utils::epid::group_setup;

#[test]
fn hello_with_sig_rl() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 1);
    let (mut revoked, _) = setup.member(&mut rng);
    let (mut honest, _) = setup.member(&mut rng);

    let sig = revoked.sign(b"hello", None, None, &mut rng).unwrap();
    let mut verifier = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
    verifier.verify(&sig, b"hello").unwrap();
    assert_eq!(sig.to_be_bytes().len(), sig_size(None));

    let sig_rl = setup.issuer.sig_rl(1, &[&sig.sigma0]);

    // the revoked member notices it is listed
    assert_eq!(
        revoked
            .sign(b"hello", None, Some(&sig_rl), &mut rng)
            .unwrap_err(),
        EpidError::SigRevokedInSigRl
    );

    let fresh = revoked.sign(b"hello", None, None, &mut rng).unwrap();
    let other = honest.sign(b"hello", None, Some(&sig_rl), &mut rng).unwrap();
    assert_eq!(other.proofs.len(), 1);
    assert_eq!(other.rl_ver, 1);
    assert_eq!(other.to_be_bytes().len(), sig_size(Some(&sig_rl)));

    let plain = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
    verifier.set_sig_rl(&sig_rl).unwrap();
    assert_eq!(
        verifier.verify(&fresh, b"hello").unwrap_err(),
        EpidError::SigRevokedInSigRl
    );
    verifier.verify_basic_sig(&fresh.sigma0, b"hello").unwrap();
    plain.verify(&fresh, b"hello").unwrap();
    verifier.verify(&other, b"hello").unwrap();
}

#[test]
fn many_members_and_messages() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 2);
    let verifier = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
    let mut members = setup.members(&mut rng, 3, &[]);

    let mut long = vec![0u8; 1000];
    rng.fill_bytes(&mut long);
    let msgs: [&[u8]; 4] = [b"", b"a", b"test message", &long];

    for member in members.iter_mut() {
        for msg in msgs {
            let start = Instant::now();
            let sig = member.sign(msg, None, None, &mut rng).unwrap();
            println!("Time to sign {} byte message: {:?}", msg.len(), start.elapsed());
            let start = Instant::now();
            verifier.verify(&sig, msg).unwrap();
            println!("Time to verify: {:?}", start.elapsed());

            let parsed = Signature::from_be_bytes(&sig.to_be_bytes()).unwrap();
            verifier.verify(&parsed, msg).unwrap();
        }
    }
}

#[test]
fn wrong_group_key_fails() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 3);
    let (mut member, _) = setup.member(&mut rng);
    let other = IssuerKey::new(GroupId([3; 16]), &mut rng).unwrap();
    let verifier = VerifierCtx::new(other.group_pub_key(), None).unwrap();
    let sig = member.sign(b"m", None, None, &mut rng).unwrap();
    assert_eq!(verifier.verify(&sig, b"m").unwrap_err(), EpidError::SigInvalid);
}

#[test]
fn linkability() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 4);
    let mut members = setup.members(&mut rng, 2, &[&b"bsn0"[..], &b"bsn1"[..]]);
    let (first, second) = members.split_at_mut(1);
    let (a, b) = (&mut first[0], &mut second[0]);

    let a1 = a.sign(b"m1", Some(b"bsn0"), None, &mut rng).unwrap();
    let a2 = a.sign(b"m2", Some(b"bsn0"), None, &mut rng).unwrap();
    let a3 = a.sign(b"m1", Some(b"bsn1"), None, &mut rng).unwrap();
    let a4 = a.sign(b"m1", None, None, &mut rng).unwrap();
    let a5 = a.sign(b"m1", None, None, &mut rng).unwrap();
    let b1 = b.sign(b"m1", Some(b"bsn0"), None, &mut rng).unwrap();

    assert!(are_sigs_linked(&a1.sigma0, &a2.sigma0));
    assert!(!are_sigs_linked(&a1.sigma0, &a3.sigma0));
    assert!(!are_sigs_linked(&a4.sigma0, &a5.sigma0));
    assert!(!are_sigs_linked(&a1.sigma0, &b1.sigma0));

    let mut verifier = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
    verifier.set_basename(Some(b"bsn0")).unwrap();
    for (s, m) in [(&a1, b"m1"), (&a2, b"m2"), (&b1, b"m1")] {
        verifier.verify(s, m).unwrap();
    }
}

#[test]
fn every_hash_algorithm() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 5);
    let (mut member, _) = setup.member(&mut rng);
    member.register_basename(b"bsn").unwrap();
    let sig_rl = setup
        .issuer
        .sig_rl(1, &[&member.sign(b"x", None, None, &mut rng).unwrap().sigma0]);
    let (mut other, _) = setup.member(&mut rng);
    other.register_basename(b"bsn").unwrap();

    let mut verifier = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
    verifier.set_basename(Some(b"bsn")).unwrap();
    verifier.set_sig_rl(&sig_rl).unwrap();

    for alg in [HashAlg::Sha256, HashAlg::Sha384, HashAlg::Sha512] {
        other.set_hash_alg(alg).unwrap();
        verifier.set_hash_alg(alg).unwrap();
        let sig = other.sign(b"msg", Some(b"bsn"), Some(&sig_rl), &mut rng).unwrap();
        verifier.verify(&sig, b"msg").unwrap();
    }
}

#[test]
fn compressed_member() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 6);
    let compressed = setup.issuer.issue_compressed_member(&mut rng).unwrap();
    let mut member = MemberCtx::new_from_compressed(setup.pub_key.clone(), &compressed, None).unwrap();
    let verifier = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
    let sig = member.sign(b"compressed", None, None, &mut rng).unwrap();
    verifier.verify(&sig, b"compressed").unwrap();

    let other = IssuerKey::new(GroupId([6; 16]), &mut rng).unwrap();
    assert_eq!(
        MemberCtx::new_from_compressed(other.group_pub_key(), &compressed, None).err(),
        Some(EpidError::BadArg)
    );
}

#[test]
fn pre_signatures_and_precomp() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 7);
    let (member, key) = setup.member(&mut rng);
    let precomp = MemberPrecomp::from_be_bytes(&member.write_precomp().to_be_bytes()).unwrap();

    let mut member = MemberCtx::new(setup.pub_key.clone(), key, Some(precomp)).unwrap();
    member.register_basename(b"bsn").unwrap();
    let verifier = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
    let verifier = VerifierCtx::new(setup.pub_key.clone(), Some(verifier.write_precomp())).unwrap();

    let start = Instant::now();
    member.add_pre_sigs(4, &mut rng).unwrap();
    println!("Time to compute 4 pre-signatures: {:?}", start.elapsed());
    assert_eq!(member.num_pre_sigs(), 4);

    let sig_rl = setup.issuer.sig_rl(
        1,
        &[&setup
            .member(&mut rng)
            .0
            .sign_basic(b"x", None, &mut rng)
            .unwrap()],
    );
    let mut verifier_with_rl = verifier.clone();
    verifier_with_rl.set_sig_rl(&sig_rl).unwrap();

    for i in 0..4u8 {
        let msg = [i; 8];
        let bsn: Option<&[u8]> = if i % 2 == 0 { Some(b"bsn") } else { None };
        let sig = member.sign(&msg, bsn, Some(&sig_rl), &mut rng).unwrap();
        verifier.verify(&sig, &msg).unwrap();
        verifier_with_rl.verify(&sig, &msg).unwrap();
        assert_eq!(member.num_pre_sigs(), 3 - i as usize);
    }
}

#[test]
fn tampered_signatures_fail() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 8);
    let (mut member, _) = setup.member(&mut rng);
    let verifier = VerifierCtx::new(setup.pub_key.clone(), None).unwrap();
    let sig = member.sign(b"m", None, None, &mut rng).unwrap();

    let mut bad = sig.clone();
    bad.sigma0.c = Fr::rand(&mut rng);
    assert_eq!(verifier.verify(&bad, b"m").unwrap_err(), EpidError::SigInvalid);

    let mut bad = sig.clone();
    bad.sigma0.t = sig.sigma0.b;
    assert_eq!(verifier.verify(&bad, b"m").unwrap_err(), EpidError::SigInvalid);

    let mut bytes = sig.to_be_bytes();
    bytes[0] ^= 1;
    assert_eq!(Signature::from_be_bytes(&bytes).unwrap_err(), EpidError::BadArg);
}
