//! Group public key and member private keys.
//!
//! A member of group `(h1, h2, w = g2^gamma)` holds `(A, x, f)` with
//! `e(A, w·g2^x) = e(g1·h1^f, g2)`, i.e. `A = (g1·h1^f)^(1/(x+gamma))`.

use crate::{
    ct,
    error::EpidError,
    file::{CaCertificate, FileType},
    groups::{read_fp, read_fq, read_g1, read_g2, write_fp, write_fq, write_g1, write_g2},
    groups::{FP_SIZE, FQ_SIZE, G1_SIZE, G2_SIZE},
    hash::{fp_hash, HashAlg},
};
use ark_bls12_381::{g1::Config as G1Config, Bls12_381, Fq, Fr, G1Affine, G2Affine};
use ark_ec::{short_weierstrass::SWCurveConfig, AffineRepr, CurveGroup};
use ark_ff::{Field, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use epid_utils::{
    impl_be_decode_via, multi_pairing, serde_utils::ArkObjectBytes, BeDecode, BeEncode,
    ByteReader, ByteWriter,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const GROUP_ID_SIZE: usize = 16;
pub const SEED_SIZE: usize = 32;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    CanonicalSerialize,
    CanonicalDeserialize,
    Zeroize,
    Serialize,
    Deserialize,
)]
pub struct GroupId(pub [u8; GROUP_ID_SIZE]);

impl GroupId {
    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self(r.read_array()?))
    }

    pub fn write(&self, w: &mut ByteWriter) {
        w.put(&self.0);
    }
}

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct GroupPubKey {
    pub gid: GroupId,
    #[serde_as(as = "ArkObjectBytes")]
    pub h1: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub h2: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub w: G2Affine,
}

impl GroupPubKey {
    pub const SIZE: usize = GROUP_ID_SIZE + 2 * G1_SIZE + G2_SIZE;

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self {
            gid: GroupId::read_from(r)?,
            h1: read_g1(r)?,
            h2: read_g1(r)?,
            w: read_g2(r)?,
        })
    }
}

impl BeEncode for GroupPubKey {
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.gid.write(w);
        write_g1(w, &self.h1);
        write_g1(w, &self.h2);
        write_g2(w, &self.w);
    }
}

impl_be_decode_via!(GroupPubKey, EpidError);

/// Authenticates a signed group public key file with the CA certificate and parses it.
pub fn parse_group_pub_key_file(
    bytes: &[u8],
    ca: &CaCertificate,
) -> Result<GroupPubKey, EpidError> {
    let payload = ca.open_envelope(bytes, FileType::GroupPubKey)?;
    GroupPubKey::from_be_bytes(payload)
}

/// Full member private key.
#[serde_as]
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Zeroize,
    ZeroizeOnDrop,
    Serialize,
    Deserialize,
)]
pub struct PrivKey {
    pub gid: GroupId,
    #[serde_as(as = "ArkObjectBytes")]
    pub a: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub x: Fr,
    #[serde_as(as = "ArkObjectBytes")]
    pub f: Fr,
}

impl PrivKey {
    pub const SIZE: usize = GROUP_ID_SIZE + G1_SIZE + 2 * FP_SIZE;

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self {
            gid: GroupId::read_from(r)?,
            a: read_g1(r)?,
            x: read_fp(r)?,
            f: read_fp(r)?,
        })
    }
}

impl BeEncode for PrivKey {
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.gid.write(w);
        write_g1(w, &self.a);
        write_fp(w, &self.x);
        write_fp(w, &self.f);
    }
}

impl_be_decode_via!(PrivKey, EpidError);

/// Member private key in compressed form: the x-coordinate of `A` and a seed from which `x` and
/// `f` are derived.
#[serde_as]
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Zeroize,
    ZeroizeOnDrop,
    Serialize,
    Deserialize,
)]
pub struct CompressedPrivKey {
    pub gid: GroupId,
    #[serde_as(as = "ArkObjectBytes")]
    pub ax: Fq,
    pub seed: [u8; SEED_SIZE],
}

impl CompressedPrivKey {
    pub const SIZE: usize = GROUP_ID_SIZE + FQ_SIZE + SEED_SIZE;

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self {
            gid: GroupId::read_from(r)?,
            ax: read_fq(r)?,
            seed: r.read_array()?,
        })
    }

    /// `(x, f)` as derived from the seed.
    pub fn derive_secrets(seed: &[u8; SEED_SIZE]) -> Result<(Fr, Fr), EpidError> {
        let x = fp_hash(HashAlg::Sha256, &[&seed[..], &[0u8][..]])?;
        let f = fp_hash(HashAlg::Sha256, &[&seed[..], &[1u8][..]])?;
        Ok((x, f))
    }

    /// Expands to the full key. `A`'s y-coordinate is whichever root of the curve equation makes
    /// the key a member of `pub_key`'s group; [`EpidError::BadArg`] if neither does.
    pub fn decompress(&self, pub_key: &GroupPubKey) -> Result<PrivKey, EpidError> {
        if self.gid != pub_key.gid {
            return Err(EpidError::BadArg);
        }
        let (x, f) = Self::derive_secrets(&self.seed)?;
        let rhs = self.ax.square() * self.ax + G1Config::COEFF_B;
        let y = rhs.sqrt().ok_or(EpidError::BadArg)?;
        for y in [y, -y] {
            let a = G1Affine::new_unchecked(self.ax, y);
            if a.is_in_correct_subgroup_assuming_on_curve() && is_member(pub_key, &a, &x, &f) {
                return Ok(PrivKey {
                    gid: self.gid,
                    a,
                    x,
                    f,
                });
            }
        }
        Err(EpidError::BadArg)
    }
}

impl BeEncode for CompressedPrivKey {
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.gid.write(w);
        write_fq(w, &self.ax);
        w.put(&self.seed);
    }
}

impl_be_decode_via!(CompressedPrivKey, EpidError);

/// Either private key form, as told apart by [`parse_priv_key`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKey {
    Full(PrivKey),
    Compressed(CompressedPrivKey),
}

impl MemberKey {
    pub fn gid(&self) -> GroupId {
        match self {
            MemberKey::Full(k) => k.gid,
            MemberKey::Compressed(k) => k.gid,
        }
    }

    /// The full key, decompressing against `pub_key` if needed.
    pub fn into_full(self, pub_key: &GroupPubKey) -> Result<PrivKey, EpidError> {
        match self {
            MemberKey::Full(k) => Ok(k),
            MemberKey::Compressed(k) => k.decompress(pub_key),
        }
    }
}

/// Parses a private key, selecting the form by length.
pub fn parse_priv_key(bytes: &[u8]) -> Result<MemberKey, EpidError> {
    match bytes.len() {
        PrivKey::SIZE => Ok(MemberKey::Full(PrivKey::from_be_bytes(bytes)?)),
        CompressedPrivKey::SIZE => Ok(MemberKey::Compressed(CompressedPrivKey::from_be_bytes(
            bytes,
        )?)),
        _ => Err(EpidError::BadArg),
    }
}

/// Whether `priv_key` is a member of the group of `pub_key`.
pub fn is_priv_key_in_group(pub_key: &GroupPubKey, priv_key: &PrivKey) -> bool {
    priv_key.gid == pub_key.gid && is_member(pub_key, &priv_key.a, &priv_key.x, &priv_key.f)
}

/// `e(A, w·g2^x) · e(g1·h1^f, g2)^(-1) == 1`
fn is_member(pub_key: &GroupPubKey, a: &G1Affine, x: &Fr, f: &Fr) -> bool {
    if a.is_zero() {
        return false;
    }
    let w_g2x = (ct::affine_mul(&G2Affine::generator(), x) + pub_key.w).into_affine();
    let g1h1f = (ct::affine_mul(&pub_key.h1, f) + G1Affine::generator()).into_affine();
    multi_pairing!(using Bls12_381: *a, w_g2x; -g1h1f, G2Affine::generator()).is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::IssuerKey;
    use ark_std::{
        rand::{rngs::StdRng, SeedableRng},
        UniformRand,
    };
    use test_utils::test_serialization;

    #[test]
    fn sizes_and_codecs() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let issuer = IssuerKey::new(GroupId([7; GROUP_ID_SIZE]), &mut rng).unwrap();
        let pk = issuer.group_pub_key();
        let sk = issuer.issue_member(&mut rng).unwrap();
        assert_eq!(GroupPubKey::SIZE, 400);
        assert_eq!(PrivKey::SIZE, 176);
        assert_eq!(CompressedPrivKey::SIZE, 96);

        let bytes = pk.to_be_bytes();
        assert_eq!(bytes.len(), 400);
        assert_eq!(GroupPubKey::from_be_bytes(&bytes).unwrap(), pk);
        assert_eq!(
            GroupPubKey::from_be_bytes(&bytes[..399]).unwrap_err(),
            EpidError::BadArg
        );

        let bytes = sk.to_be_bytes();
        assert_eq!(parse_priv_key(&bytes).unwrap(), MemberKey::Full(sk.clone()));
        assert_eq!(parse_priv_key(&bytes[1..]).unwrap_err(), EpidError::BadArg);

        test_serialization!(GroupPubKey, pk);
        test_serialization!(PrivKey, sk);
    }

    #[test]
    fn membership() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let issuer = IssuerKey::new(GroupId([1; GROUP_ID_SIZE]), &mut rng).unwrap();
        let pk = issuer.group_pub_key();
        let sk = issuer.issue_member(&mut rng).unwrap();
        assert!(is_priv_key_in_group(&pk, &sk));

        let mut wrong_f = sk.clone();
        wrong_f.f = Fr::rand(&mut rng);
        assert!(!is_priv_key_in_group(&pk, &wrong_f));

        let mut wrong_gid = sk.clone();
        wrong_gid.gid = GroupId([2; GROUP_ID_SIZE]);
        assert!(!is_priv_key_in_group(&pk, &wrong_gid));

        let other = IssuerKey::new(GroupId([1; GROUP_ID_SIZE]), &mut rng).unwrap();
        assert!(!is_priv_key_in_group(&other.group_pub_key(), &sk));
    }

    #[test]
    fn compressed_keys_expand() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let issuer = IssuerKey::new(GroupId([3; GROUP_ID_SIZE]), &mut rng).unwrap();
        let pk = issuer.group_pub_key();
        let compressed = issuer.issue_compressed_member(&mut rng).unwrap();

        let bytes = compressed.to_be_bytes();
        assert_eq!(bytes.len(), CompressedPrivKey::SIZE);
        let parsed = parse_priv_key(&bytes).unwrap();
        assert_eq!(parsed, MemberKey::Compressed(compressed.clone()));

        let full = parsed.into_full(&pk).unwrap();
        assert!(is_priv_key_in_group(&pk, &full));
        assert_eq!(full.a.x, compressed.ax);
        let (x, f) = CompressedPrivKey::derive_secrets(&compressed.seed).unwrap();
        assert_eq!((full.x, full.f), (x, f));

        let mut tampered = compressed.clone();
        tampered.seed[0] ^= 1;
        assert_eq!(tampered.decompress(&pk).unwrap_err(), EpidError::BadArg);

        test_serialization!(CompressedPrivKey, compressed);
    }
}
