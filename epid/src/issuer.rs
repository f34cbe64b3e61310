//! Issuer side tooling: group keys, member keys, revocation lists and the CA that signs the files
//! members and verifiers load.

use crate::{
    ct,
    error::EpidError,
    file::{CaCertificate, FileHeader, FileType, ENVELOPE_SIG_SIZE, HEADER_SIZE},
    groups::random_fp,
    keys::{CompressedPrivKey, GroupId, GroupPubKey, PrivKey, SEED_SIZE},
    rl::{GroupRl, PrivRl, SigRl, SigRlEntry},
    signature::BasicSignature,
};
use ark_bls12_381::{Fr, G1Affine, G2Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::Field;
use ark_std::{rand::RngCore, vec::Vec};
use epid_math::{
    bignum::RNG_WATCHDOG,
    ecc::NamedCurve,
    ecdsa::{Ecdsa, EcdsaPrivateKey, EcdsaPublicKey},
};
use epid_utils::{BeEncode, ByteWriter};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Group issuing key: `gamma` and the group public key it belongs to.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct IssuerKey {
    #[zeroize(skip)]
    gid: GroupId,
    gamma: Fr,
    #[zeroize(skip)]
    h1: G1Affine,
    #[zeroize(skip)]
    h2: G1Affine,
    #[zeroize(skip)]
    w: G2Affine,
}

impl IssuerKey {
    pub fn new<R: RngCore>(gid: GroupId, rng: &mut R) -> Result<Self, EpidError> {
        let gamma = random_fp(rng)?;
        let h1 = ct::affine_mul(&G1Affine::generator(), &random_fp(rng)?).into_affine();
        let h2 = ct::affine_mul(&G1Affine::generator(), &random_fp(rng)?).into_affine();
        let w = ct::affine_mul(&G2Affine::generator(), &gamma).into_affine();
        Ok(Self {
            gid,
            gamma,
            h1,
            h2,
            w,
        })
    }

    pub fn group_pub_key(&self) -> GroupPubKey {
        GroupPubKey {
            gid: self.gid,
            h1: self.h1,
            h2: self.h2,
            w: self.w,
        }
    }

    /// `A = (g1·h1^f)^(1/(x+gamma))`, or `None` in the negligible case `x = -gamma`.
    fn credential(&self, x: &Fr, f: &Fr) -> Option<G1Affine> {
        let inv = (*x + self.gamma).inverse()?;
        let base = ct::affine_mul(&self.h1, f) + G1Affine::generator();
        Some(ct::mul(&base, &inv).into_affine())
    }

    pub fn issue_member<R: RngCore>(&self, rng: &mut R) -> Result<PrivKey, EpidError> {
        for _ in 0..RNG_WATCHDOG {
            let x = random_fp(rng)?;
            let f = random_fp(rng)?;
            if let Some(a) = self.credential(&x, &f) {
                return Ok(PrivKey {
                    gid: self.gid,
                    a,
                    x,
                    f,
                });
            }
        }
        Err(EpidError::RandMaxIter)
    }

    /// A compressed key, drawing seeds until one expands to a valid member key.
    pub fn issue_compressed_member<R: RngCore>(
        &self,
        rng: &mut R,
    ) -> Result<CompressedPrivKey, EpidError> {
        let pub_key = self.group_pub_key();
        for _ in 0..RNG_WATCHDOG {
            let mut seed = [0u8; SEED_SIZE];
            rng.fill_bytes(&mut seed);
            let (mut x, mut f) = CompressedPrivKey::derive_secrets(&seed)?;
            let a = self.credential(&x, &f);
            x.zeroize();
            f.zeroize();
            let a = match a {
                Some(a) if !a.is_zero() => a,
                _ => continue,
            };
            let key = CompressedPrivKey {
                gid: self.gid,
                ax: a.x,
                seed,
            };
            seed.zeroize();
            if key.decompress(&pub_key).is_ok() {
                return Ok(key);
            }
        }
        Err(EpidError::RandMaxIter)
    }

    pub fn priv_rl(&self, version: u32, revoked: &[PrivKey]) -> PrivRl {
        PrivRl::new(self.gid, version, revoked.iter().map(|k| k.f).collect())
    }

    pub fn sig_rl(&self, version: u32, revoked: &[&BasicSignature]) -> SigRl {
        SigRl::new(
            self.gid,
            version,
            revoked
                .iter()
                .map(|s| SigRlEntry { b: s.b, k: s.k })
                .collect(),
        )
    }
}

/// The issuing CA: signs issuer files and vouches for its own key with a certificate.
#[derive(Clone)]
pub struct CaSigner {
    ecdsa: Ecdsa,
    secret_key: EcdsaPrivateKey,
    public_key: EcdsaPublicKey,
}

impl CaSigner {
    pub fn new<R: RngCore>(rng: &mut R) -> Result<Self, EpidError> {
        let ecdsa = Ecdsa::new(NamedCurve::P256)?;
        let (secret_key, public_key) = ecdsa.keygen(rng)?;
        Ok(Self {
            ecdsa,
            secret_key,
            public_key,
        })
    }

    pub fn certificate<R: RngCore>(&self, rng: &mut R) -> Result<CaCertificate, EpidError> {
        let signed = CaCertificate::signed_part(&self.ecdsa, &self.public_key)?;
        let signature = self.ecdsa.sign(&self.secret_key, &signed, rng)?;
        Ok(CaCertificate::from_parts(
            self.public_key.clone(),
            signature,
            self.ecdsa.clone(),
        ))
    }

    /// `header || payload || signature`
    pub fn seal<R: RngCore>(
        &self,
        file_type: FileType,
        payload: &[u8],
        rng: &mut R,
    ) -> Result<Vec<u8>, EpidError> {
        let mut w = ByteWriter::with_capacity(HEADER_SIZE + payload.len() + ENVELOPE_SIG_SIZE);
        FileHeader::new(file_type).write(&mut w);
        w.put(payload);
        let signature = self.ecdsa.sign(&self.secret_key, w.as_slice(), rng)?;
        w.put(signature.as_bytes());
        Ok(w.into_inner())
    }

    pub fn seal_group_pub_key<R: RngCore>(
        &self,
        key: &GroupPubKey,
        rng: &mut R,
    ) -> Result<Vec<u8>, EpidError> {
        self.seal(FileType::GroupPubKey, &key.to_be_bytes(), rng)
    }

    pub fn seal_priv_rl<R: RngCore>(&self, rl: &PrivRl, rng: &mut R) -> Result<Vec<u8>, EpidError> {
        self.seal(FileType::PrivRl, &rl.to_be_bytes(), rng)
    }

    pub fn seal_sig_rl<R: RngCore>(&self, rl: &SigRl, rng: &mut R) -> Result<Vec<u8>, EpidError> {
        self.seal(FileType::SigRl, &rl.to_be_bytes(), rng)
    }

    pub fn seal_group_rl<R: RngCore>(
        &self,
        rl: &GroupRl,
        rng: &mut R,
    ) -> Result<Vec<u8>, EpidError> {
        self.seal(FileType::GroupRl, &rl.to_be_bytes(), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        file::envelope_size,
        keys::{is_priv_key_in_group, parse_group_pub_key_file},
        rl::{parse_group_rl_file, parse_priv_rl_file, parse_sig_rl_file},
    };
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn issued_members_belong_to_the_group() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let issuer = IssuerKey::new(GroupId([8; 16]), &mut rng).unwrap();
        let pk = issuer.group_pub_key();
        for _ in 0..3 {
            let sk = issuer.issue_member(&mut rng).unwrap();
            assert!(is_priv_key_in_group(&pk, &sk));
            let compressed = issuer.issue_compressed_member(&mut rng).unwrap();
            assert!(is_priv_key_in_group(&pk, &compressed.decompress(&pk).unwrap()));
        }
    }

    #[test]
    fn certificate_round_trip() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let ca = CaSigner::new(&mut rng).unwrap();
        let cert = ca.certificate(&mut rng).unwrap();
        let bytes = cert.to_bytes().unwrap();
        assert_eq!(bytes.len(), CaCertificate::SIZE);
        let parsed = CaCertificate::parse(&bytes).unwrap();
        assert_eq!(parsed.public_key(), cert.public_key());

        let mut tampered = bytes.clone();
        tampered[10] ^= 1;
        assert!(CaCertificate::parse(&tampered).is_err());

        // a curve parameter off
        let mut tampered = bytes.clone();
        tampered[HEADER_SIZE + 64 + 31] ^= 1;
        assert_eq!(
            CaCertificate::parse(&tampered).unwrap_err(),
            EpidError::BadArg
        );

        let mut tampered = bytes;
        let last = tampered.len() - 1;
        tampered[last] ^= 1;
        assert_eq!(
            CaCertificate::parse(&tampered).unwrap_err(),
            EpidError::SigInvalid
        );
    }

    #[test]
    fn sealed_files_open() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let ca = CaSigner::new(&mut rng).unwrap();
        let cert = ca.certificate(&mut rng).unwrap();
        let issuer = IssuerKey::new(GroupId([8; 16]), &mut rng).unwrap();
        let pk = issuer.group_pub_key();

        let file = ca.seal_group_pub_key(&pk, &mut rng).unwrap();
        assert_eq!(file.len(), envelope_size(GroupPubKey::SIZE));
        assert_eq!(parse_group_pub_key_file(&file, &cert).unwrap(), pk);

        let sk = issuer.issue_member(&mut rng).unwrap();
        let priv_rl = issuer.priv_rl(1, &[sk]);
        let file = ca.seal_priv_rl(&priv_rl, &mut rng).unwrap();
        assert_eq!(parse_priv_rl_file(&file, &cert).unwrap(), priv_rl);
        // a list file is not a key file
        assert_eq!(
            parse_group_pub_key_file(&file, &cert).unwrap_err(),
            EpidError::BadArg
        );

        let sig_rl = issuer.sig_rl(2, &[]);
        let file = ca.seal_sig_rl(&sig_rl, &mut rng).unwrap();
        assert_eq!(parse_sig_rl_file(&file, &cert).unwrap(), sig_rl);

        let group_rl = GroupRl::new(3, vec![pk.gid]);
        let file = ca.seal_group_rl(&group_rl, &mut rng).unwrap();
        assert_eq!(parse_group_rl_file(&file, &cert).unwrap(), group_rl);

        // another CA's files do not open
        let other = CaSigner::new(&mut rng).unwrap().certificate(&mut rng).unwrap();
        assert_eq!(
            parse_group_rl_file(&file, &other).unwrap_err(),
            EpidError::SigInvalid
        );
        assert_eq!(
            parse_group_rl_file(&file[..file.len() - 1], &cert).unwrap_err(),
            EpidError::SigInvalid
        );
        assert_eq!(
            parse_group_rl_file(&file[..5], &cert).unwrap_err(),
            EpidError::BadArg
        );
    }
}
