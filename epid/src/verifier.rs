//! The verifying side.
//!
//! A [`VerifierCtx`] borrows the revocation lists it checks against for its own lifetime. Each
//! list can be replaced only by a strictly newer version of itself. With a basename set, the
//! verifier accepts only signatures made under that basename and can blacklist signers, exporting
//! the result as a [`VerifierRl`].

use crate::{
    error::EpidError,
    groups::{gt_multi_exp, pairing},
    hash::{ec_hash, HashAlg},
    keys::GroupPubKey,
    precomp::VerifierPrecomp,
    rl::{GroupRl, PrivRl, SigRl, SigRlEntry, VerifierRl},
    signature::{basic_challenge, nr_challenge, BasicSignature, NrProof, Signature},
};
use ark_bls12_381::{Fr, G1Affine, G2Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_std::{cfg_iter, end_timer, start_timer, vec::Vec};
use epid_utils::BeEncode;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Debug)]
struct Basename {
    bytes: Vec<u8>,
    hash: G1Affine,
}

#[derive(Clone, Debug)]
pub struct VerifierCtx<'a> {
    pub_key: GroupPubKey,
    precomp: VerifierPrecomp,
    hash_alg: HashAlg,
    basename: Option<Basename>,
    priv_rl: Option<&'a PrivRl>,
    sig_rl: Option<&'a SigRl>,
    group_rl: Option<&'a GroupRl>,
    verifier_rl: Option<&'a VerifierRl>,
    /// `K` values blacklisted since the basename was set.
    blacklist: Vec<G1Affine>,
}

/// Accepts `new` in place of `current` only when it is strictly newer.
fn check_newer(current: Option<u32>, new: u32) -> Result<(), EpidError> {
    match current {
        Some(v) if new <= v => Err(EpidError::BadArg),
        _ => Ok(()),
    }
}

impl<'a> VerifierCtx<'a> {
    pub fn new(pub_key: GroupPubKey, precomp: Option<VerifierPrecomp>) -> Result<Self, EpidError> {
        let precomp = match precomp {
            Some(p) if p.gid != pub_key.gid => return Err(EpidError::BadArg),
            Some(p) => p,
            None => VerifierPrecomp::compute(&pub_key),
        };
        Ok(Self {
            pub_key,
            precomp,
            hash_alg: HashAlg::default(),
            basename: None,
            priv_rl: None,
            sig_rl: None,
            group_rl: None,
            verifier_rl: None,
            blacklist: Vec::new(),
        })
    }

    pub fn write_precomp(&self) -> VerifierPrecomp {
        self.precomp.clone()
    }

    pub fn hash_alg(&self) -> HashAlg {
        self.hash_alg
    }

    /// Changes the hash algorithm. Setting the current one is a no-op. Otherwise a basename hash
    /// is recomputed, which invalidates any loaded VerifierRl and the blacklist. On error the
    /// context is left as it was.
    pub fn set_hash_alg(&mut self, alg: HashAlg) -> Result<(), EpidError> {
        if !alg.is_supported() {
            return Err(EpidError::HashNotSupported);
        }
        if alg == self.hash_alg {
            return Ok(());
        }
        let basename = match &self.basename {
            Some(bsn) => Some(Basename {
                bytes: bsn.bytes.clone(),
                hash: ec_hash(alg, &bsn.bytes)?,
            }),
            None => None,
        };
        self.hash_alg = alg;
        if basename.is_some() {
            self.basename = basename;
            self.blacklist.clear();
            self.verifier_rl = None;
        }
        Ok(())
    }

    /// Sets or clears the basename signatures must be made under. The empty basename is a valid
    /// basename. Either way the blacklist and the loaded VerifierRl are dropped.
    pub fn set_basename(&mut self, basename: Option<&[u8]>) -> Result<(), EpidError> {
        self.basename = match basename {
            Some(bytes) => Some(Basename {
                bytes: bytes.to_vec(),
                hash: ec_hash(self.hash_alg, bytes)?,
            }),
            None => None,
        };
        self.blacklist.clear();
        self.verifier_rl = None;
        Ok(())
    }

    pub fn set_priv_rl(&mut self, rl: &'a PrivRl) -> Result<(), EpidError> {
        if rl.gid != self.pub_key.gid {
            return Err(EpidError::BadArg);
        }
        check_newer(self.priv_rl.map(|l| l.version), rl.version)?;
        self.priv_rl = Some(rl);
        Ok(())
    }

    pub fn set_sig_rl(&mut self, rl: &'a SigRl) -> Result<(), EpidError> {
        if rl.gid != self.pub_key.gid {
            return Err(EpidError::BadArg);
        }
        check_newer(self.sig_rl.map(|l| l.version), rl.version)?;
        self.sig_rl = Some(rl);
        Ok(())
    }

    pub fn set_group_rl(&mut self, rl: &'a GroupRl) -> Result<(), EpidError> {
        check_newer(self.group_rl.map(|l| l.version), rl.version)?;
        self.group_rl = Some(rl);
        Ok(())
    }

    /// The list must be for the group and for the basename currently set.
    pub fn set_verifier_rl(&mut self, rl: &'a VerifierRl) -> Result<(), EpidError> {
        let bsn = self
            .basename
            .as_ref()
            .ok_or(EpidError::InconsistentBasename)?;
        if rl.gid != self.pub_key.gid {
            return Err(EpidError::BadArg);
        }
        if rl.b != bsn.hash {
            return Err(EpidError::InconsistentBasename);
        }
        check_newer(self.verifier_rl.map(|l| l.version), rl.version)?;
        self.verifier_rl = Some(rl);
        Ok(())
    }

    /// Full verification: the basic signature, then the group, private key, signature and
    /// verifier revocation lists in that order.
    pub fn verify(&self, sig: &Signature, msg: &[u8]) -> Result<(), EpidError> {
        let timer = start_timer!(|| "Verify");
        let basic = &sig.sigma0;
        self.verify_basic_sig(basic, msg)?;

        if let Some(rl) = self.group_rl {
            if rl.contains(&self.pub_key.gid) {
                return Err(EpidError::SigRevokedInGroupRl);
            }
        }

        if let Some(rl) = self.priv_rl {
            for f in &rl.f {
                self.check_priv_rl_entry(basic, f)?;
            }
        }

        if let Some(rl) = self.sig_rl {
            if sig.rl_ver != rl.version || sig.proofs.len() != rl.entries.len() {
                return Err(EpidError::SigRevokedInSigRl);
            }
            let nr_timer = start_timer!(|| "Verify Nr proofs");
            let all_ok = cfg_iter!(rl.entries)
                .zip(cfg_iter!(sig.proofs))
                .all(|(entry, proof)| self.nr_verify(basic, msg, entry, proof).is_ok());
            end_timer!(nr_timer);
            if !all_ok {
                return Err(EpidError::SigRevokedInSigRl);
            }
        }

        let listed = self.verifier_rl.map_or(false, |rl| rl.k.contains(&basic.k));
        if listed || self.blacklist.contains(&basic.k) {
            return Err(EpidError::SigRevokedInVerifierRl);
        }
        end_timer!(timer);
        Ok(())
    }

    /// Checks the proof of membership alone, ignoring every revocation list.
    pub fn verify_basic_sig(&self, basic: &BasicSignature, msg: &[u8]) -> Result<(), EpidError> {
        if basic.b.is_zero() || basic.k.is_zero() || basic.t.is_zero() {
            return Err(EpidError::SigInvalid);
        }
        if let Some(bsn) = &self.basename {
            if basic.b != bsn.hash {
                return Err(EpidError::SigInvalid);
            }
        }
        let c = basic.c;
        // R1 = B^sf · K^(-c)
        let r1 = (basic.b * basic.sf - basic.k * c).into_affine();
        // R2 = e(T, g2^(-sx) · w^(-c)) · e(h1,g2)^sf · e(h2,g2)^sb · e(h2,w)^sa · e(g1,g2)^c
        let q = (G2Affine::generator() * (-basic.sx) - self.pub_key.w * c).into_affine();
        let p = &self.precomp;
        let r2 = pairing(&basic.t, &q)
            + gt_multi_exp(
                &[p.e12, p.e22, p.e2w, p.eg12],
                &[basic.sf, basic.sb, basic.sa, c],
            );
        let expected = basic_challenge(
            self.hash_alg,
            &self.pub_key,
            &basic.b,
            &basic.k,
            &basic.t,
            &r1,
            &r2,
            msg,
        )?;
        if expected != c {
            return Err(EpidError::SigInvalid);
        }
        Ok(())
    }

    /// Checks one non-revocation proof. A proof with `T` the identity admits the signer is the
    /// one listed and gives [`EpidError::SigRevokedInSigRl`].
    pub fn nr_verify(
        &self,
        basic: &BasicSignature,
        msg: &[u8],
        entry: &SigRlEntry,
        proof: &NrProof,
    ) -> Result<(), EpidError> {
        if proof.t.is_zero() {
            return Err(EpidError::SigRevokedInSigRl);
        }
        let r1 = (basic.k * proof.smu + basic.b * proof.snu).into_affine();
        let r2 = (entry.k * proof.smu + entry.b * proof.snu - proof.t * proof.c).into_affine();
        let c = nr_challenge(
            self.hash_alg,
            basic,
            &entry.b,
            &entry.k,
            &proof.t,
            &r1,
            &r2,
            msg,
        )?;
        if c != proof.c {
            return Err(EpidError::SigInvalid);
        }
        Ok(())
    }

    /// [`EpidError::SigRevokedInPrivRl`] if `basic` was made with the secret `f`.
    pub fn check_priv_rl_entry(&self, basic: &BasicSignature, f: &Fr) -> Result<(), EpidError> {
        if (basic.b * f).into_affine() == basic.k {
            return Err(EpidError::SigRevokedInPrivRl);
        }
        Ok(())
    }

    /// Verifies `sig` and adds its signer to the blacklist of the current basename.
    ///
    /// A signer already blacklisted or listed in the loaded VerifierRl gives
    /// [`EpidError::Duplicate`].
    pub fn blacklist_sig(&mut self, sig: &Signature, msg: &[u8]) -> Result<(), EpidError> {
        if self.basename.is_none() {
            return Err(EpidError::InconsistentBasename);
        }
        match self.verify(sig, msg) {
            Ok(()) => {}
            Err(EpidError::SigRevokedInVerifierRl) => return Err(EpidError::Duplicate),
            Err(e) => return Err(e),
        }
        self.blacklist.push(sig.sigma0.k);
        Ok(())
    }

    /// The loaded VerifierRl, or an empty one of version 0, extended with the blacklist. The
    /// version goes up by one when anything was blacklisted.
    pub fn write_verifier_rl(&self) -> Result<VerifierRl, EpidError> {
        let bsn = self
            .basename
            .as_ref()
            .ok_or(EpidError::InconsistentBasename)?;
        let mut rl = match self.verifier_rl {
            Some(rl) => rl.clone(),
            None => VerifierRl {
                gid: self.pub_key.gid,
                b: bsn.hash,
                version: 0,
                k: Vec::new(),
            },
        };
        if !self.blacklist.is_empty() {
            rl.k.extend_from_slice(&self.blacklist);
            rl.version = rl.version.checked_add(1).ok_or(EpidError::BadArg)?;
        }
        Ok(rl)
    }

    /// Encoded size of what [`Self::write_verifier_rl`] returns, 0 without a basename.
    pub fn verifier_rl_size(&self) -> usize {
        match self.write_verifier_rl() {
            Ok(rl) => rl.encoded_size(),
            Err(_) => 0,
        }
    }
}
