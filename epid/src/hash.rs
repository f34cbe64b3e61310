//! Hash algorithm selection and the two hash-to-group maps of the scheme.

use crate::{
    error::EpidError,
    groups::{base_modulus, fp_from_bignum, fq_from_bignum, order},
};
use ark_bls12_381::{g1::Config as G1Config, Fr, G1Affine};
use ark_ec::{short_weierstrass::SWCurveConfig, AffineRepr};
use ark_ff::{Field, PrimeField};
use ark_std::{end_timer, start_timer, vec::Vec};
use digest::Digest;
use epid_math::BigNum;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};

/// Attempts [`ec_hash`] makes before giving up.
pub const EC_HASH_WATCHDOG: u32 = 50;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlg {
    Sha256,
    Sha384,
    #[default]
    Sha512,
    /// Recognised in encodings but not supported for signing or verification.
    Sha512_256,
}

impl HashAlg {
    pub fn is_supported(self) -> bool {
        !matches!(self, HashAlg::Sha512_256)
    }

    pub fn digest_size(self) -> usize {
        match self {
            HashAlg::Sha256 | HashAlg::Sha512_256 => 32,
            HashAlg::Sha384 => 48,
            HashAlg::Sha512 => 64,
        }
    }

    /// Digest of the concatenation of `parts`.
    pub fn digest(self, parts: &[&[u8]]) -> Result<Vec<u8>, EpidError> {
        match self {
            HashAlg::Sha256 => Ok(digest_parts::<Sha256>(parts)),
            HashAlg::Sha384 => Ok(digest_parts::<Sha384>(parts)),
            HashAlg::Sha512 => Ok(digest_parts::<Sha512>(parts)),
            HashAlg::Sha512_256 => Err(EpidError::HashNotSupported),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut h = D::new();
    for p in parts {
        h.update(p);
    }
    h.finalize().to_vec()
}

/// Digest reduced modulo a number, through the bignum engine.
fn digest_mod(alg: HashAlg, parts: &[&[u8]], modulus: &BigNum) -> Result<BigNum, EpidError> {
    let d = alg.digest(parts)?;
    let wide = BigNum::from_be_bytes(&d, (d.len() + 7) / 8)?;
    let mut out = BigNum::new(modulus.room())?;
    out.set_mod(&wide, modulus)?;
    Ok(out)
}

/// Hash to a scalar: the digest of `parts` modulo `r`.
pub fn fp_hash(alg: HashAlg, parts: &[&[u8]]) -> Result<Fr, EpidError> {
    fp_from_bignum(&digest_mod(alg, parts, &order()?)?)
}

/// Hash to G1 by try-and-increment: for `i = 0, 1, ...` take `x = H(i || msg) mod q` and stop at
/// the first `x` for which `x³ + 4` is a square. Of the two roots the numerically smaller one is
/// used, then the cofactor is cleared.
pub fn ec_hash(alg: HashAlg, msg: &[u8]) -> Result<G1Affine, EpidError> {
    let timer = start_timer!(|| "Hash to G1");
    let q = base_modulus()?;
    for i in 0..EC_HASH_WATCHDOG {
        let x = fq_from_bignum(&digest_mod(alg, &[&i.to_be_bytes()[..], msg], &q)?)?;
        let rhs = x.square() * x + G1Config::COEFF_B;
        let y = match rhs.sqrt() {
            Some(y) => y,
            None => continue,
        };
        let neg = -y;
        let y = if y.into_bigint() <= neg.into_bigint() {
            y
        } else {
            neg
        };
        let p = G1Affine::new_unchecked(x, y).clear_cofactor();
        if p.is_zero() {
            return Err(EpidError::Math);
        }
        end_timer!(timer);
        return Ok(p);
    }
    Err(EpidError::Math)
}
