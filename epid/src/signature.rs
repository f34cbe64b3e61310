//! Signatures and the Fiat-Shamir challenges both parties compute over them.

use crate::{
    error::EpidError,
    groups::{
        fp_to_bytes, g1_to_bytes, g2_to_bytes, gt_to_bytes, read_fp, read_g1, write_fp, write_g1,
        Gt, FP_SIZE, G1_SIZE,
    },
    hash::{fp_hash, HashAlg},
    keys::GroupPubKey,
    rl::SigRl,
};
use ark_bls12_381::{Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use epid_utils::{
    impl_be_decode_via, serde_utils::ArkObjectBytes, BeEncode, ByteReader, ByteWriter,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Proof of membership: knowledge of `(A, x, f)` under the group key and of `f` with `K = B^f`.
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct BasicSignature {
    #[serde_as(as = "ArkObjectBytes")]
    pub b: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub k: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub t: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub c: Fr,
    #[serde_as(as = "ArkObjectBytes")]
    pub sx: Fr,
    #[serde_as(as = "ArkObjectBytes")]
    pub sf: Fr,
    #[serde_as(as = "ArkObjectBytes")]
    pub sa: Fr,
    #[serde_as(as = "ArkObjectBytes")]
    pub sb: Fr,
}

impl BasicSignature {
    pub const SIZE: usize = 3 * G1_SIZE + 5 * FP_SIZE;

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self {
            b: read_g1(r)?,
            k: read_g1(r)?,
            t: read_g1(r)?,
            c: read_fp(r)?,
            sx: read_fp(r)?,
            sf: read_fp(r)?,
            sa: read_fp(r)?,
            sb: read_fp(r)?,
        })
    }
}

impl BeEncode for BasicSignature {
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, w: &mut ByteWriter) {
        for p in [&self.b, &self.k, &self.t] {
            write_g1(w, p);
        }
        for s in [&self.c, &self.sx, &self.sf, &self.sa, &self.sb] {
            write_fp(w, s);
        }
    }
}

impl_be_decode_via!(BasicSignature, EpidError);

/// Proof that the signer's `f` is not the one behind one SigRl entry.
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct NrProof {
    #[serde_as(as = "ArkObjectBytes")]
    pub t: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub c: Fr,
    #[serde_as(as = "ArkObjectBytes")]
    pub smu: Fr,
    #[serde_as(as = "ArkObjectBytes")]
    pub snu: Fr,
}

impl NrProof {
    pub const SIZE: usize = G1_SIZE + 3 * FP_SIZE;

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self {
            t: read_g1(r)?,
            c: read_fp(r)?,
            smu: read_fp(r)?,
            snu: read_fp(r)?,
        })
    }
}

impl BeEncode for NrProof {
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, w: &mut ByteWriter) {
        write_g1(w, &self.t);
        write_fp(w, &self.c);
        write_fp(w, &self.smu);
        write_fp(w, &self.snu);
    }
}

impl_be_decode_via!(NrProof, EpidError);

/// A basic signature followed by one non-revocation proof per entry of the SigRl it was made
/// against. Wire form is `sigma0 || rl_ver || n2 || proofs[n2]`.
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Signature {
    pub sigma0: BasicSignature,
    /// Version of the SigRl the proofs were made against, 0 without one.
    pub rl_ver: u32,
    pub proofs: Vec<NrProof>,
}

impl Signature {
    pub fn n2(&self) -> usize {
        self.proofs.len()
    }

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        let sigma0 = BasicSignature::read_from(r)?;
        let rl_ver = r.read_u32()?;
        let n2 = r.read_u32()? as usize;
        if n2.checked_mul(NrProof::SIZE) != Some(r.remaining()) {
            return Err(EpidError::BadArg);
        }
        let proofs = (0..n2)
            .map(|_| NrProof::read_from(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            sigma0,
            rl_ver,
            proofs,
        })
    }
}

impl BeEncode for Signature {
    fn encoded_size(&self) -> usize {
        BasicSignature::SIZE + 8 + self.proofs.len() * NrProof::SIZE
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.sigma0.encode(w);
        w.put_u32(self.rl_ver).put_u32(self.proofs.len() as u32);
        for p in &self.proofs {
            p.encode(w);
        }
    }
}

impl_be_decode_via!(Signature, EpidError);

/// Encoded size of a signature made against `sig_rl`.
pub fn sig_size(sig_rl: Option<&SigRl>) -> usize {
    let n2 = sig_rl.map_or(0, |rl| rl.entries.len());
    BasicSignature::SIZE + 8 + n2 * NrProof::SIZE
}

/// Two signatures made under the same basename are linked when they come from the same member.
pub fn are_sigs_linked(sig1: &BasicSignature, sig2: &BasicSignature) -> bool {
    sig1.k == sig2.k
}

fn order_bytes() -> Vec<u8> {
    Fr::MODULUS.to_bytes_be()
}

/// `c = Fp.hash(t3 || msg)` with
/// `t3 = Fp.hash(p || g1 || g2 || h1 || h2 || w || B || K || T || R1 || R2)`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn basic_challenge(
    alg: HashAlg,
    pub_key: &GroupPubKey,
    b: &G1Affine,
    k: &G1Affine,
    t: &G1Affine,
    r1: &G1Affine,
    r2: &Gt,
    msg: &[u8],
) -> Result<Fr, EpidError> {
    let t3 = fp_hash(
        alg,
        &[
            &order_bytes()[..],
            &g1_to_bytes(&G1Affine::generator())[..],
            &g2_to_bytes(&G2Affine::generator())[..],
            &g1_to_bytes(&pub_key.h1)[..],
            &g1_to_bytes(&pub_key.h2)[..],
            &g2_to_bytes(&pub_key.w)[..],
            &g1_to_bytes(b)[..],
            &g1_to_bytes(k)[..],
            &g1_to_bytes(t)[..],
            &g1_to_bytes(r1)[..],
            &gt_to_bytes(r2)[..],
        ],
    )?;
    fp_hash(alg, &[&fp_to_bytes(&t3)[..], msg])
}

/// `c = Fp.hash(p || g1 || B || K || B_i || K_i || T || R1 || R2 || msg)`
#[allow(clippy::too_many_arguments)]
pub(crate) fn nr_challenge(
    alg: HashAlg,
    basic: &BasicSignature,
    b_i: &G1Affine,
    k_i: &G1Affine,
    t: &G1Affine,
    r1: &G1Affine,
    r2: &G1Affine,
    msg: &[u8],
) -> Result<Fr, EpidError> {
    fp_hash(
        alg,
        &[
            &order_bytes()[..],
            &g1_to_bytes(&G1Affine::generator())[..],
            &g1_to_bytes(&basic.b)[..],
            &g1_to_bytes(&basic.k)[..],
            &g1_to_bytes(b_i)[..],
            &g1_to_bytes(k_i)[..],
            &g1_to_bytes(t)[..],
            &g1_to_bytes(r1)[..],
            &g1_to_bytes(r2)[..],
            msg,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        groups::random_fp,
        keys::GroupId,
        rl::SigRlEntry,
    };
    use ark_ec::CurveGroup;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use epid_utils::BeDecode;
    use test_utils::test_serialization;

    fn random_basic(rng: &mut StdRng) -> BasicSignature {
        let mut g1 = || (G1Affine::generator() * random_fp(rng).unwrap()).into_affine();
        let (b, k, t) = (g1(), g1(), g1());
        BasicSignature {
            b,
            k,
            t,
            c: random_fp(rng).unwrap(),
            sx: random_fp(rng).unwrap(),
            sf: random_fp(rng).unwrap(),
            sa: random_fp(rng).unwrap(),
            sb: random_fp(rng).unwrap(),
        }
    }

    #[test]
    fn signature_layout() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let sigma0 = random_basic(&mut rng);
        let proof = NrProof {
            t: sigma0.t,
            c: sigma0.c,
            smu: sigma0.sx,
            snu: sigma0.sf,
        };
        let sig = Signature {
            sigma0,
            rl_ver: 5,
            proofs: vec![proof.clone(), proof],
        };
        assert_eq!(BasicSignature::SIZE, 448);
        assert_eq!(NrProof::SIZE, 192);

        let bytes = sig.to_be_bytes();
        let sig_rl = SigRl::new(
            GroupId::default(),
            5,
            vec![
                SigRlEntry {
                    b: G1Affine::generator(),
                    k: G1Affine::generator(),
                };
                2
            ],
        );
        assert_eq!(bytes.len(), sig_size(Some(&sig_rl)));
        assert_eq!(sig_size(None), 456);
        assert_eq!(Signature::from_be_bytes(&bytes).unwrap(), sig);
        assert_eq!(&bytes[448..456], &[0, 0, 0, 5, 0, 0, 0, 2]);

        // a proof short
        assert_eq!(
            Signature::from_be_bytes(&bytes[..bytes.len() - NrProof::SIZE]).unwrap_err(),
            EpidError::BadArg
        );

        test_serialization!(Signature, sig);
    }

    #[test]
    fn linkability_compares_k() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let s1 = random_basic(&mut rng);
        let mut s2 = random_basic(&mut rng);
        assert!(!are_sigs_linked(&s1, &s2));
        s2.k = s1.k;
        assert!(are_sigs_linked(&s1, &s2));
    }
}
