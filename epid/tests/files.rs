use ark_std::rand::{rngs::StdRng, SeedableRng};
use epid::{
    file::{envelope_size, CaCertificate},
    parse_group_pub_key_file, parse_priv_key,
    rl::{parse_group_rl_file, parse_priv_rl_file, parse_sig_rl_file},
    EpidError, GroupPubKey, GroupRl, MemberCtx, MemberKey, Signature, VerifierCtx,
};
use epid_utils::{BeDecode, BeEncode};
use test_utils::epid::group_setup;

#[test]
fn member_and_verifier_from_files() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 1);
    let (mut revoked, leaked) = setup.member(&mut rng);

    // what the issuer ships
    let cert_file = setup.cert.to_bytes().unwrap();
    let pub_key_file = setup.pub_key_file(&mut rng);
    let member_key_file = setup.member_key(&mut rng).to_be_bytes();
    let compressed_key_file = setup
        .issuer
        .issue_compressed_member(&mut rng)
        .unwrap()
        .to_be_bytes();
    let listed = revoked.sign_basic(b"x", None, &mut rng).unwrap();
    let sig_rl_file = setup
        .ca
        .seal_sig_rl(&setup.issuer.sig_rl(3, &[&listed]), &mut rng)
        .unwrap();
    let priv_rl_file = setup
        .ca
        .seal_priv_rl(&setup.issuer.priv_rl(1, &[leaked]), &mut rng)
        .unwrap();
    let group_rl_file = setup
        .ca
        .seal_group_rl(&GroupRl::new(1, Vec::new()), &mut rng)
        .unwrap();
    assert_eq!(pub_key_file.len(), envelope_size(GroupPubKey::SIZE));

    // member side
    let cert = CaCertificate::parse(&cert_file).unwrap();
    let pub_key = parse_group_pub_key_file(&pub_key_file, &cert).unwrap();
    let sig_rl = parse_sig_rl_file(&sig_rl_file, &cert).unwrap();
    let key = parse_priv_key(&member_key_file).unwrap();
    assert!(matches!(key, MemberKey::Full(_)));
    let compressed = parse_priv_key(&compressed_key_file).unwrap();
    assert!(matches!(compressed, MemberKey::Compressed(_)));

    let mut members = vec![
        MemberCtx::new(pub_key.clone(), key.into_full(&pub_key).unwrap(), None).unwrap(),
        MemberCtx::new(
            pub_key.clone(),
            compressed.into_full(&pub_key).unwrap(),
            None,
        )
        .unwrap(),
    ];
    let wire = members
        .iter_mut()
        .map(|m| {
            m.sign(b"attest", None, Some(&sig_rl), &mut rng)
                .unwrap()
                .to_be_bytes()
        })
        .collect::<Vec<_>>();
    let revoked_wire = revoked
        .sign(b"attest", None, None, &mut rng)
        .unwrap()
        .to_be_bytes();

    // verifier side
    let priv_rl = parse_priv_rl_file(&priv_rl_file, &cert).unwrap();
    let group_rl = parse_group_rl_file(&group_rl_file, &cert).unwrap();
    let mut verifier = VerifierCtx::new(pub_key, None).unwrap();
    verifier.set_sig_rl(&sig_rl).unwrap();
    verifier.set_priv_rl(&priv_rl).unwrap();
    verifier.set_group_rl(&group_rl).unwrap();
    for bytes in &wire {
        let sig = Signature::from_be_bytes(bytes).unwrap();
        verifier.verify(&sig, b"attest").unwrap();
    }
    let sig = Signature::from_be_bytes(&revoked_wire).unwrap();
    assert_eq!(
        verifier.verify_basic_sig(&sig.sigma0, b"attest"),
        Ok(())
    );
    assert_eq!(
        verifier.verify(&sig, b"attest").unwrap_err(),
        EpidError::SigRevokedInPrivRl
    );
}

#[test]
fn tampered_files_are_rejected() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 2);
    let file = setup.pub_key_file(&mut rng);

    for i in [4, 20, 100, file.len() - 70] {
        let mut tampered = file.clone();
        tampered[i] ^= 0x80;
        assert_eq!(
            parse_group_pub_key_file(&tampered, &setup.cert).unwrap_err(),
            EpidError::SigInvalid
        );
    }
    // the header is checked before the signature
    let mut tampered = file.clone();
    tampered[3] ^= 1;
    assert_eq!(
        parse_group_pub_key_file(&tampered, &setup.cert).unwrap_err(),
        EpidError::BadArg
    );
    let mut tampered = file.clone();
    tampered[0] = 1;
    assert_eq!(
        parse_group_pub_key_file(&tampered, &setup.cert).unwrap_err(),
        EpidError::BadArg
    );

    let mut longer = file.clone();
    longer.push(0);
    assert!(parse_group_pub_key_file(&longer, &setup.cert).is_err());
    assert_eq!(parse_group_pub_key_file(&file, &setup.cert).unwrap(), setup.pub_key);
}

#[test]
fn bad_private_keys() {
    let mut rng = StdRng::seed_from_u64(0u64);
    let setup = group_setup(&mut rng, 3);
    let bytes = setup.member_key(&mut rng).to_be_bytes();
    assert_eq!(
        parse_priv_key(&bytes[..bytes.len() - 1]).unwrap_err(),
        EpidError::BadArg
    );

    // a valid encoding of a key from someone else's group
    let other = group_setup(&mut rng, 4);
    let foreign = other.member_key(&mut rng);
    assert_eq!(
        MemberCtx::new(setup.pub_key.clone(), foreign, None).err(),
        Some(EpidError::BadArg)
    );
}
