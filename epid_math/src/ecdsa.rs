//! ECDSA over the named curves of [`crate::ecc`].
//!
//! Signatures are `r || s`, each as wide as the group order. Digests longer than the order are
//! truncated to their leftmost bytes (every supported order is a whole number of bytes). Secret
//! scalars are multiplied with [`ScalarMulMethod::Scrambled`] and the nonce is inverted by a
//! constant-time Montgomery exponentiation.

use crate::{
    bignum::{BigNum, RNG_WATCHDOG},
    ecc::{Curve, EcPoint, NamedCurve, ScalarMulMethod},
    error::MathError,
    montgomery::{ExpMethod, Montgomery},
};
use ark_std::{rand::RngCore, vec::Vec};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EcdsaPrivateKey {
    d: BigNum,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaPublicKey {
    /// `x || y`
    bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaSignature {
    /// `r || s`
    bytes: Vec<u8>,
}

impl EcdsaPublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl EcdsaSignature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn r(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() / 2]
    }

    pub fn s(&self) -> &[u8] {
        &self.bytes[self.bytes.len() / 2..]
    }
}

/// Signer and verifier for one curve.
#[derive(Clone, Debug)]
pub struct Ecdsa {
    curve: Curve,
    /// Arithmetic mod the group order on public values.
    order_ctx: Montgomery,
    /// Arithmetic mod the group order on the nonce.
    order_ctx_ct: Montgomery,
}

impl Ecdsa {
    pub fn new(name: NamedCurve) -> Result<Self, MathError> {
        let curve = Curve::new(name)?;
        let order_ctx = Montgomery::new(curve.order(), ExpMethod::Fast)?;
        let order_ctx_ct = Montgomery::new(curve.order(), ExpMethod::ConstantTime)?;
        Ok(Self {
            curve,
            order_ctx,
            order_ctx_ct,
        })
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Width of a signature in bytes.
    pub fn signature_size(&self) -> usize {
        2 * self.curve.scalar_size()
    }

    /// Width of a public key in bytes.
    pub fn public_key_size(&self) -> usize {
        2 * self.curve.coordinate_size()
    }

    pub fn keygen<R: RngCore>(
        &self,
        rng: &mut R,
    ) -> Result<(EcdsaPrivateKey, EcdsaPublicKey), MathError> {
        let d = BigNum::random_in_range(&self.one()?, self.curve.order(), rng)?;
        let sk = EcdsaPrivateKey { d };
        let pk = self.public_key(&sk)?;
        Ok((sk, pk))
    }

    /// Private key from its big-endian encoding; must be in `[1, n)`.
    pub fn private_key_from_bytes(&self, bytes: &[u8]) -> Result<EcdsaPrivateKey, MathError> {
        let d = self.scalar_in_range(bytes).ok_or(MathError::OutOfRange)?;
        Ok(EcdsaPrivateKey { d })
    }

    /// Public key from `x || y`, checked to be on the curve.
    pub fn public_key_from_bytes(&self, bytes: &[u8]) -> Result<EcdsaPublicKey, MathError> {
        self.curve.point_from_bytes(bytes)?;
        Ok(EcdsaPublicKey {
            bytes: bytes.to_vec(),
        })
    }

    pub fn public_key(&self, sk: &EcdsaPrivateKey) -> Result<EcdsaPublicKey, MathError> {
        let q = self.curve.mul_generator(&sk.d, ScalarMulMethod::Scrambled)?;
        Ok(EcdsaPublicKey {
            bytes: self.curve.point_to_bytes(&q)?,
        })
    }

    pub fn signature_from_bytes(&self, bytes: &[u8]) -> Result<EcdsaSignature, MathError> {
        if bytes.len() != self.signature_size() {
            return Err(MathError::InvalidEncoding);
        }
        Ok(EcdsaSignature {
            bytes: bytes.to_vec(),
        })
    }

    /// Signs the SHA-256 digest of `msg`.
    pub fn sign<R: RngCore>(
        &self,
        sk: &EcdsaPrivateKey,
        msg: &[u8],
        rng: &mut R,
    ) -> Result<EcdsaSignature, MathError> {
        self.sign_digest(sk, &Sha256::digest(msg), rng)
    }

    /// Verifies against the SHA-256 digest of `msg`.
    pub fn verify(
        &self,
        pk: &EcdsaPublicKey,
        msg: &[u8],
        sig: &EcdsaSignature,
    ) -> Result<(), MathError> {
        self.verify_digest(pk, &Sha256::digest(msg), sig)
    }

    /// Draws nonces until both `r` and `s` are non-zero, giving up after [`RNG_WATCHDOG`] tries.
    pub fn sign_digest<R: RngCore>(
        &self,
        sk: &EcdsaPrivateKey,
        digest: &[u8],
        rng: &mut R,
    ) -> Result<EcdsaSignature, MathError> {
        let n = self.curve.order();
        let e = self.digest_to_scalar(digest)?;
        let width = self.curve.scalar_size();
        for _ in 0..RNG_WATCHDOG {
            let mut k = BigNum::random_in_range(&self.one()?, n, rng)?;
            let kg = self.curve.mul_generator(&k, ScalarMulMethod::Scrambled)?;
            let r = self.x_mod_n(&kg)?;
            if r.is_zero() {
                k.zeroize();
                continue;
            }
            let k_inv = self.order_ctx_ct.mod_inv(&k)?;
            k.zeroize();
            let mut rd = self.order_ctx.mod_mul(&r, &sk.d)?;
            let mut sum = BigNum::new(n.size() + 1)?;
            sum.set_add(&e, &rd)?;
            rd.zeroize();
            let s = self.order_ctx.mod_mul(&k_inv, &sum)?;
            sum.zeroize();
            if s.is_zero() {
                continue;
            }
            let mut bytes = r.to_be_bytes(width)?;
            bytes.extend_from_slice(&s.to_be_bytes(width)?);
            return Ok(EcdsaSignature { bytes });
        }
        Err(MathError::RandMaxIter)
    }

    /// Fails with [`MathError::InvalidSignature`] for any signature that does not verify,
    /// including ones with `r` or `s` outside `[1, n)`.
    pub fn verify_digest(
        &self,
        pk: &EcdsaPublicKey,
        digest: &[u8],
        sig: &EcdsaSignature,
    ) -> Result<(), MathError> {
        if sig.bytes.len() != self.signature_size() {
            return Err(MathError::InvalidSignature);
        }
        let r = self
            .scalar_in_range(sig.r())
            .ok_or(MathError::InvalidSignature)?;
        let s = self
            .scalar_in_range(sig.s())
            .ok_or(MathError::InvalidSignature)?;
        let q = self.curve.point_from_bytes(&pk.bytes)?;
        let e = self.digest_to_scalar(digest)?;

        let w = self.order_ctx.mod_inv(&s)?;
        let u1 = self.order_ctx.mod_mul(&e, &w)?;
        let u2 = self.order_ctx.mod_mul(&r, &w)?;
        let x = self.curve.add(
            &self.curve.mul_generator(&u1, ScalarMulMethod::Window)?,
            &self.curve.scalar_mul(&u2, &q, ScalarMulMethod::Window)?,
        );
        if x.is_identity() {
            return Err(MathError::InvalidSignature);
        }
        if self.x_mod_n(&x)? != r {
            return Err(MathError::InvalidSignature);
        }
        Ok(())
    }

    fn one(&self) -> Result<BigNum, MathError> {
        BigNum::from_u64(1, 1)
    }

    /// Leftmost bytes of the digest, as many as the order is wide, reduced mod n.
    fn digest_to_scalar(&self, digest: &[u8]) -> Result<BigNum, MathError> {
        let width = self.curve.scalar_size().min(digest.len());
        let e = BigNum::from_be_bytes(&digest[..width], self.curve.order().room())?;
        let mut out = BigNum::new(self.curve.order().room())?;
        out.set_mod(&e, self.curve.order())?;
        Ok(out)
    }

    fn x_mod_n(&self, p: &EcPoint) -> Result<BigNum, MathError> {
        let (x, _) = self.curve.to_affine(p)?;
        let x = self.curve.field().to_bignum(&x);
        let mut r = BigNum::new(self.curve.order().room())?;
        r.set_mod(&x, self.curve.order())?;
        Ok(r)
    }

    fn scalar_in_range(&self, bytes: &[u8]) -> Option<BigNum> {
        if bytes.len() != self.curve.scalar_size() {
            return None;
        }
        let v = BigNum::from_be_bytes(bytes, self.curve.order().room()).ok()?;
        if v.is_zero() || &v >= self.curve.order() {
            return None;
        }
        Some(v)
    }
}
