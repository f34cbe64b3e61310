//! The signing side.
//!
//! A [`MemberCtx`] is built from the group key and a private key that is checked to belong to the
//! group, optionally configured with a hash algorithm and basenames, and then signs. Signing with
//! a basename makes signatures linkable under that basename; signing without one draws a fresh
//! random `B` every time.
//!
//! The randomized part of a signature does not depend on the message and can be computed ahead
//! with [`MemberCtx::add_pre_sigs`]; [`MemberCtx::sign`] consumes those first.

use crate::{
    ct,
    error::EpidError,
    groups::{random_fp, Gt},
    hash::{ec_hash, HashAlg},
    keys::{is_priv_key_in_group, CompressedPrivKey, GroupPubKey, PrivKey},
    precomp::MemberPrecomp,
    rl::{SigRl, SigRlEntry},
    signature::{basic_challenge, nr_challenge, BasicSignature, NrProof, Signature},
};
use ark_bls12_381::{Fr, G1Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_std::{end_timer, format, rand::RngCore, start_timer, vec::Vec};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Random bytes hashed to get the `B` of an unlinkable signature.
const RANDOM_BASENAME_SIZE: usize = 32;

/// Everything about a basic signature that does not depend on the message.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct PreSig {
    b: G1Affine,
    k: G1Affine,
    t: G1Affine,
    a: Fr,
    /// `a·x`
    ax: Fr,
    rx: Fr,
    rf: Fr,
    ra: Fr,
    rb: Fr,
    r1: G1Affine,
    #[zeroize(skip)]
    r2: Gt,
}

pub struct MemberCtx {
    pub_key: GroupPubKey,
    priv_key: PrivKey,
    precomp: MemberPrecomp,
    hash_alg: HashAlg,
    basenames: Vec<Vec<u8>>,
    pre_sigs: Vec<PreSig>,
}

impl MemberCtx {
    /// Fails with [`EpidError::BadArg`] when the key is not a member of the group or the
    /// precomputed blob is for another group.
    pub fn new(
        pub_key: GroupPubKey,
        priv_key: PrivKey,
        precomp: Option<MemberPrecomp>,
    ) -> Result<Self, EpidError> {
        if !is_priv_key_in_group(&pub_key, &priv_key) {
            return Err(EpidError::BadArg);
        }
        let precomp = match precomp {
            Some(p) if p.gid != pub_key.gid => return Err(EpidError::BadArg),
            Some(p) => p,
            None => MemberPrecomp::compute(&pub_key, &priv_key),
        };
        Ok(Self {
            pub_key,
            priv_key,
            precomp,
            hash_alg: HashAlg::default(),
            basenames: Vec::new(),
            pre_sigs: Vec::new(),
        })
    }

    pub fn new_from_compressed(
        pub_key: GroupPubKey,
        priv_key: &CompressedPrivKey,
        precomp: Option<MemberPrecomp>,
    ) -> Result<Self, EpidError> {
        let priv_key = priv_key.decompress(&pub_key)?;
        Self::new(pub_key, priv_key, precomp)
    }

    pub fn set_hash_alg(&mut self, alg: HashAlg) -> Result<(), EpidError> {
        if !alg.is_supported() {
            return Err(EpidError::HashNotSupported);
        }
        self.hash_alg = alg;
        Ok(())
    }

    pub fn hash_alg(&self) -> HashAlg {
        self.hash_alg
    }

    /// Allows signing with `basename`.
    pub fn register_basename(&mut self, basename: &[u8]) -> Result<(), EpidError> {
        if basename.is_empty() {
            return Err(EpidError::BadArg);
        }
        if self.basenames.iter().any(|b| b == basename) {
            return Err(EpidError::Duplicate);
        }
        self.basenames.push(basename.to_vec());
        Ok(())
    }

    pub fn write_precomp(&self) -> MemberPrecomp {
        self.precomp.clone()
    }

    pub fn group_pub_key(&self) -> &GroupPubKey {
        &self.pub_key
    }

    /// Signs `msg`, proving non-revocation against every entry of `sig_rl`.
    ///
    /// Fails with [`EpidError::SigRevokedInSigRl`] if this member is itself listed in `sig_rl`.
    pub fn sign<R: RngCore>(
        &mut self,
        msg: &[u8],
        basename: Option<&[u8]>,
        sig_rl: Option<&SigRl>,
        rng: &mut R,
    ) -> Result<Signature, EpidError> {
        let timer = start_timer!(|| "Member sign");
        if let Some(rl) = sig_rl {
            if rl.gid != self.pub_key.gid {
                return Err(EpidError::BadArg);
            }
        }
        let sigma0 = self.sign_basic(msg, basename, rng)?;
        let (rl_ver, proofs) = match sig_rl {
            Some(rl) => {
                let nr_timer = start_timer!(|| format!("Nr proofs for {} entries", rl.entries.len()));
                let proofs = rl
                    .entries
                    .iter()
                    .map(|entry| self.nr_prove(msg, &sigma0, entry, rng))
                    .collect::<Result<Vec<_>, _>>()?;
                end_timer!(nr_timer);
                (rl.version, proofs)
            }
            None => (0, Vec::new()),
        };
        end_timer!(timer);
        Ok(Signature {
            sigma0,
            rl_ver,
            proofs,
        })
    }

    /// Proof of membership only. A basename must have been registered.
    pub fn sign_basic<R: RngCore>(
        &mut self,
        msg: &[u8],
        basename: Option<&[u8]>,
        rng: &mut R,
    ) -> Result<BasicSignature, EpidError> {
        let b = match basename {
            Some(bsn) => {
                if !self.basenames.iter().any(|b| b == bsn) {
                    return Err(EpidError::BadArg);
                }
                Some(ec_hash(self.hash_alg, bsn)?)
            }
            None => None,
        };
        let pre = match self.pre_sigs.pop() {
            Some(p) => p,
            None => self.compute_pre_sig(rng)?,
        };
        let (b, k, r1) = match b {
            Some(b) => (
                b,
                ct::affine_mul(&b, &self.priv_key.f).into_affine(),
                ct::affine_mul(&b, &pre.rf).into_affine(),
            ),
            None => (pre.b, pre.k, pre.r1),
        };
        let c = basic_challenge(
            self.hash_alg,
            &self.pub_key,
            &b,
            &k,
            &pre.t,
            &r1,
            &pre.r2,
            msg,
        )?;
        Ok(BasicSignature {
            b,
            k,
            t: pre.t,
            c,
            sx: pre.rx + c * self.priv_key.x,
            sf: pre.rf + c * self.priv_key.f,
            sa: pre.ra + c * pre.a,
            sb: pre.rb + c * pre.ax,
        })
    }

    /// Proves that the `f` behind `basic` is not the one behind `entry`.
    pub fn nr_prove<R: RngCore>(
        &self,
        msg: &[u8],
        basic: &BasicSignature,
        entry: &SigRlEntry,
        rng: &mut R,
    ) -> Result<NrProof, EpidError> {
        let mut mu = random_fp(rng)?;
        let mut nu = -(self.priv_key.f * mu);
        // T = (K_i · B_i^(-f))^mu vanishes exactly when K_i = B_i^f
        let t = (ct::affine_mul(&entry.k, &mu) + ct::affine_mul(&entry.b, &nu)).into_affine();
        if t.is_zero() {
            mu.zeroize();
            nu.zeroize();
            return Err(EpidError::SigRevokedInSigRl);
        }
        let mut rmu = random_fp(rng)?;
        let mut rnu = random_fp(rng)?;
        let r1 =
            (ct::affine_mul(&basic.k, &rmu) + ct::affine_mul(&basic.b, &rnu)).into_affine();
        let r2 =
            (ct::affine_mul(&entry.k, &rmu) + ct::affine_mul(&entry.b, &rnu)).into_affine();
        let c = nr_challenge(self.hash_alg, basic, &entry.b, &entry.k, &t, &r1, &r2, msg)?;
        let proof = NrProof {
            t,
            c,
            smu: rmu + c * mu,
            snu: rnu + c * nu,
        };
        mu.zeroize();
        nu.zeroize();
        rmu.zeroize();
        rnu.zeroize();
        Ok(proof)
    }

    /// Computes `n` pre-signatures for later calls to sign.
    pub fn add_pre_sigs<R: RngCore>(&mut self, n: usize, rng: &mut R) -> Result<(), EpidError> {
        let timer = start_timer!(|| format!("Pre-compute {} signatures", n));
        self.pre_sigs.reserve(n);
        for _ in 0..n {
            let p = self.compute_pre_sig(rng)?;
            self.pre_sigs.push(p);
        }
        end_timer!(timer);
        Ok(())
    }

    pub fn num_pre_sigs(&self) -> usize {
        self.pre_sigs.len()
    }

    fn compute_pre_sig<R: RngCore>(&self, rng: &mut R) -> Result<PreSig, EpidError> {
        let mut seed = [0u8; RANDOM_BASENAME_SIZE];
        rng.fill_bytes(&mut seed);
        let b = ec_hash(self.hash_alg, &seed)?;
        let k = ct::affine_mul(&b, &self.priv_key.f).into_affine();

        let a = random_fp(rng)?;
        let rx = random_fp(rng)?;
        let rf = random_fp(rng)?;
        let ra = random_fp(rng)?;
        let rb = random_fp(rng)?;
        let ax = a * self.priv_key.x;
        let t = (ct::affine_mul(&self.pub_key.h2, &a) + self.priv_key.a).into_affine();
        let r1 = ct::affine_mul(&b, &rf).into_affine();
        let p = &self.precomp;
        let r2 = ct::gt_multi_exp(
            &[p.ea2, p.e22, p.e12, p.e2w],
            &[-rx, rb - a * rx, rf, ra],
        );
        Ok(PreSig {
            b,
            k,
            t,
            a,
            ax,
            rx,
            rf,
            ra,
            rb,
            r1,
            r2,
        })
    }
}
