//! The four revocation lists.
//!
//! * [`PrivRl`]: leaked member secrets `f`. Issuer signed.
//! * [`SigRl`]: `(B, K)` pairs of signatures whose signer is revoked. Issuer signed.
//! * [`GroupRl`]: revoked groups. Issuer signed.
//! * [`VerifierRl`]: `K` values a verifier has blacklisted under one basename. Written by the
//!   verifier itself and not signed.
//!
//! Every list carries a version. A verifier only ever replaces a loaded list with a newer one.

use crate::{
    error::EpidError,
    file::{CaCertificate, FileHeader, FileType, HEADER_SIZE},
    groups::{read_fp, read_g1, write_fp, write_g1, FP_SIZE, G1_SIZE},
    keys::{GroupId, GROUP_ID_SIZE},
};
use ark_bls12_381::{Fr, G1Affine};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use epid_utils::{
    impl_be_decode_via, serde_utils::ArkObjectBytes, BeDecode, BeEncode, ByteReader, ByteWriter,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Reads `n (u32) || entry[n]` where the entries must exactly fill the rest of the input.
fn read_entries<T>(
    r: &mut ByteReader<'_>,
    entry_size: usize,
    mut read: impl FnMut(&mut ByteReader<'_>) -> Result<T, EpidError>,
) -> Result<Vec<T>, EpidError> {
    let n = r.read_u32()? as usize;
    if n.checked_mul(entry_size) != Some(r.remaining()) {
        return Err(EpidError::BadArg);
    }
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(read(r)?);
    }
    Ok(out)
}

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct PrivRl {
    pub gid: GroupId,
    pub version: u32,
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub f: Vec<Fr>,
}

impl PrivRl {
    pub fn new(gid: GroupId, version: u32, f: Vec<Fr>) -> Self {
        Self { gid, version, f }
    }

    pub fn size(n: usize) -> usize {
        GROUP_ID_SIZE + 8 + n * FP_SIZE
    }

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        let gid = GroupId::read_from(r)?;
        let version = r.read_u32()?;
        let f = read_entries(r, FP_SIZE, read_fp)?;
        Ok(Self { gid, version, f })
    }
}

impl BeEncode for PrivRl {
    fn encoded_size(&self) -> usize {
        Self::size(self.f.len())
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.gid.write(w);
        w.put_u32(self.version).put_u32(self.f.len() as u32);
        for f in &self.f {
            write_fp(w, f);
        }
    }
}

impl_be_decode_via!(PrivRl, EpidError);

#[serde_as]
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct SigRlEntry {
    #[serde_as(as = "ArkObjectBytes")]
    pub b: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub k: G1Affine,
}

impl SigRlEntry {
    pub const SIZE: usize = 2 * G1_SIZE;

    fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        Ok(Self {
            b: read_g1(r)?,
            k: read_g1(r)?,
        })
    }
}

#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SigRl {
    pub gid: GroupId,
    pub version: u32,
    pub entries: Vec<SigRlEntry>,
}

impl SigRl {
    pub fn new(gid: GroupId, version: u32, entries: Vec<SigRlEntry>) -> Self {
        Self {
            gid,
            version,
            entries,
        }
    }

    pub fn size(n: usize) -> usize {
        GROUP_ID_SIZE + 8 + n * SigRlEntry::SIZE
    }

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        let gid = GroupId::read_from(r)?;
        let version = r.read_u32()?;
        let entries = read_entries(r, SigRlEntry::SIZE, SigRlEntry::read_from)?;
        Ok(Self {
            gid,
            version,
            entries,
        })
    }
}

impl BeEncode for SigRl {
    fn encoded_size(&self) -> usize {
        Self::size(self.entries.len())
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.gid.write(w);
        w.put_u32(self.version).put_u32(self.entries.len() as u32);
        for e in &self.entries {
            write_g1(w, &e.b);
            write_g1(w, &e.k);
        }
    }
}

impl_be_decode_via!(SigRl, EpidError);

#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct GroupRl {
    pub version: u32,
    pub gids: Vec<GroupId>,
}

impl GroupRl {
    pub fn new(version: u32, gids: Vec<GroupId>) -> Self {
        Self { version, gids }
    }

    pub fn size(n: usize) -> usize {
        8 + n * GROUP_ID_SIZE
    }

    pub fn contains(&self, gid: &GroupId) -> bool {
        self.gids.contains(gid)
    }

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        let version = r.read_u32()?;
        let gids = read_entries(r, GROUP_ID_SIZE, GroupId::read_from)?;
        Ok(Self { version, gids })
    }
}

impl BeEncode for GroupRl {
    fn encoded_size(&self) -> usize {
        Self::size(self.gids.len())
    }

    fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.version).put_u32(self.gids.len() as u32);
        for gid in &self.gids {
            gid.write(w);
        }
    }
}

impl_be_decode_via!(GroupRl, EpidError);

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct VerifierRl {
    pub gid: GroupId,
    /// Hash of the basename the list applies to.
    #[serde_as(as = "ArkObjectBytes")]
    pub b: G1Affine,
    pub version: u32,
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub k: Vec<G1Affine>,
}

impl VerifierRl {
    pub fn size(n: usize) -> usize {
        GROUP_ID_SIZE + G1_SIZE + 8 + n * G1_SIZE
    }

    pub fn read_from(r: &mut ByteReader<'_>) -> Result<Self, EpidError> {
        let gid = GroupId::read_from(r)?;
        let b = read_g1(r)?;
        let version = r.read_u32()?;
        let k = read_entries(r, G1_SIZE, read_g1)?;
        Ok(Self { gid, b, version, k })
    }

    /// `header || list`, the unsigned file form.
    pub fn to_file_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(HEADER_SIZE + self.encoded_size());
        FileHeader::new(FileType::VerifierRl).write(&mut w);
        self.encode(&mut w);
        w.into_inner()
    }
}

impl BeEncode for VerifierRl {
    fn encoded_size(&self) -> usize {
        Self::size(self.k.len())
    }

    fn encode(&self, w: &mut ByteWriter) {
        self.gid.write(w);
        write_g1(w, &self.b);
        w.put_u32(self.version).put_u32(self.k.len() as u32);
        for k in &self.k {
            write_g1(w, k);
        }
    }
}

impl_be_decode_via!(VerifierRl, EpidError);

pub fn parse_priv_rl_file(bytes: &[u8], ca: &CaCertificate) -> Result<PrivRl, EpidError> {
    PrivRl::from_be_bytes(ca.open_envelope(bytes, FileType::PrivRl)?)
}

pub fn parse_sig_rl_file(bytes: &[u8], ca: &CaCertificate) -> Result<SigRl, EpidError> {
    SigRl::from_be_bytes(ca.open_envelope(bytes, FileType::SigRl)?)
}

pub fn parse_group_rl_file(bytes: &[u8], ca: &CaCertificate) -> Result<GroupRl, EpidError> {
    GroupRl::from_be_bytes(ca.open_envelope(bytes, FileType::GroupRl)?)
}

/// Parses the unsigned file a verifier wrote with [`VerifierRl::to_file_bytes`].
pub fn parse_verifier_rl_file(bytes: &[u8]) -> Result<VerifierRl, EpidError> {
    let mut r = ByteReader::new(bytes);
    FileHeader::read_expecting(&mut r, FileType::VerifierRl)?;
    VerifierRl::from_be_bytes(r.rest())
}
