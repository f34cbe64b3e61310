//! Fixed pairings each party would otherwise recompute for every signature.
//!
//! Both blobs are plain byte images. Decoding checks field ranges only; a blob is trusted to have
//! been computed for the key it is loaded with.

use crate::{
    error::EpidError,
    groups::{pairing, read_gt, write_gt, Gt, GT_SIZE},
    keys::{GroupId, GroupPubKey, PrivKey, GROUP_ID_SIZE},
};
use ark_bls12_381::{G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{end_timer, start_timer};
use epid_utils::{
    impl_be_decode_via, serde_utils::ArkObjectBytes, BeEncode, ByteReader, ByteWriter,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct MemberPrecomp {
    pub gid: GroupId,
    /// `e(A, g2)`
    #[serde_as(as = "ArkObjectBytes")]
    pub ea2: Gt,
    /// `e(h1, g2)`
    #[serde_as(as = "ArkObjectBytes")]
    pub e12: Gt,
    /// `e(h2, g2)`
    #[serde_as(as = "ArkObjectBytes")]
    pub e22: Gt,
    /// `e(h2, w)`
    #[serde_as(as = "ArkObjectBytes")]
    pub e2w: Gt,
}

impl MemberPrecomp {
    pub const SIZE: usize = GROUP_ID_SIZE + 4 * GT_SIZE;

    pub fn compute(pub_key: &GroupPubKey, priv_key: &PrivKey) -> Self {
        let timer = start_timer!(|| "Precompute member pairings");
        let g2 = G2Affine::generator();
        let out = Self {
            gid: pub_key.gid,
            ea2: pairing(&priv_key.a, &g2),
            e12: pairing(&pub_key.h1, &g2),
            e22: pairing(&pub_key.h2, &g2),
            e2w: pairing(&pub_key.h2, &pub_key.w),
        };
        end_timer!(timer);
        out
    }

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self {
            gid: GroupId::read_from(r)?,
            ea2: read_gt(r)?,
            e12: read_gt(r)?,
            e22: read_gt(r)?,
            e2w: read_gt(r)?,
        })
    }
}

impl BeEncode for MemberPrecomp {
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.gid.write(w);
        for e in [&self.ea2, &self.e12, &self.e22, &self.e2w] {
            write_gt(w, e);
        }
    }
}

impl_be_decode_via!(MemberPrecomp, EpidError);

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct VerifierPrecomp {
    pub gid: GroupId,
    #[serde_as(as = "ArkObjectBytes")]
    pub e12: Gt,
    #[serde_as(as = "ArkObjectBytes")]
    pub e22: Gt,
    #[serde_as(as = "ArkObjectBytes")]
    pub e2w: Gt,
    /// `e(g1, g2)`
    #[serde_as(as = "ArkObjectBytes")]
    pub eg12: Gt,
}

impl VerifierPrecomp {
    pub const SIZE: usize = GROUP_ID_SIZE + 4 * GT_SIZE;

    pub fn compute(pub_key: &GroupPubKey) -> Self {
        let timer = start_timer!(|| "Precompute verifier pairings");
        let g2 = G2Affine::generator();
        let out = Self {
            gid: pub_key.gid,
            e12: pairing(&pub_key.h1, &g2),
            e22: pairing(&pub_key.h2, &g2),
            e2w: pairing(&pub_key.h2, &pub_key.w),
            eg12: pairing(&G1Affine::generator(), &g2),
        };
        end_timer!(timer);
        out
    }

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self {
            gid: GroupId::read_from(r)?,
            e12: read_gt(r)?,
            e22: read_gt(r)?,
            e2w: read_gt(r)?,
            eg12: read_gt(r)?,
        })
    }
}

impl BeEncode for VerifierPrecomp {
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.gid.write(w);
        for e in [&self.e12, &self.e22, &self.e2w, &self.eg12] {
            write_gt(w, e);
        }
    }
}

impl_be_decode_via!(VerifierPrecomp, EpidError);
