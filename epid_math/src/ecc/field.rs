//! Prime fields of up to 384 bits on fixed `[u64; 6]` storage.
//!
//! Multiplication is a schoolbook product into a double-width buffer followed by the reduction the
//! field was built with. The named-curve reductions keep elements in canonical form; the generic
//! [`Reduction::Montgomery`] keeps `a·R mod p` instead. Callers never see the difference as long as
//! they go through [`PrimeField::from_be_bytes`], [`PrimeField::to_be_bytes`] and
//! [`PrimeField::from_u64`].

use super::reduce::{self, Wide};
use crate::{
    bignum::BigNum,
    error::MathError,
    limbs::{self, Limb, LIMB_BITS, LIMB_BYTES},
    montgomery::{ExpMethod, Montgomery},
};
use ark_std::{vec, vec::Vec};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

/// Limbs of the widest supported field, P-384.
pub const MAX_LIMBS: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroize)]
pub struct FieldElement(pub(crate) [Limb; MAX_LIMBS]);

impl FieldElement {
    pub const ZERO: Self = Self([0; MAX_LIMBS]);
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut r = [0; MAX_LIMBS];
        for i in 0..MAX_LIMBS {
            r[i] = Limb::conditional_select(&a.0[i], &b.0[i], choice);
        }
        Self(r)
    }
}

/// How products are folded back below the modulus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reduction {
    /// `p = 2^128 - 2^97 - 1`
    Secp128r1,
    /// `p = 2^192 - 2^64 - 1`
    P192,
    /// `p = 2^256 - 2^224 + 2^192 + 2^96 - 1`
    P256,
    /// Any odd modulus.
    Montgomery,
}

#[derive(Clone, Copy, Debug)]
enum Reducer {
    Secp128r1,
    P192,
    P256,
    Montgomery { m0: Limb, r2: FieldElement },
}

#[derive(Clone, Debug)]
pub struct PrimeField {
    p: [Limb; MAX_LIMBS],
    p_minus_2: [Limb; MAX_LIMBS],
    n: usize,
    reducer: Reducer,
    one: FieldElement,
}

impl PrimeField {
    /// Field of the big-endian `modulus`. Its byte length fixes the element width and must be a
    /// multiple of 8, at most 48. A named reduction is only correct for its own prime.
    pub fn new(modulus: &[u8], reduction: Reduction) -> Result<Self, MathError> {
        if modulus.is_empty() || modulus.len() % LIMB_BYTES != 0 || modulus.len() > MAX_LIMBS * 8 {
            return Err(MathError::OutOfRange);
        }
        let n = modulus.len() / LIMB_BYTES;
        let m = BigNum::from_be_bytes(modulus, n)?;
        if m.is_zero() {
            return Err(MathError::ZeroModulus);
        }
        if m.is_even() {
            return Err(MathError::EvenModulus);
        }
        let mut p = [0; MAX_LIMBS];
        p[..n].copy_from_slice(m.padded_limbs());
        let mut p_minus_2 = [0; MAX_LIMBS];
        limbs::sub(&p[..n], &[2], &mut p_minus_2[..n]);

        let mut one = FieldElement::ZERO;
        let reducer = match reduction {
            Reduction::Secp128r1 => Reducer::Secp128r1,
            Reduction::P192 => Reducer::P192,
            Reduction::P256 => Reducer::P256,
            Reduction::Montgomery => {
                let ctx = Montgomery::new(&m, ExpMethod::Fast)?;
                let mut r2 = FieldElement::ZERO;
                r2.0[..n].copy_from_slice(ctx.r2().padded_limbs());
                one.0[..n].copy_from_slice(ctx.one().padded_limbs());
                Reducer::Montgomery {
                    m0: Montgomery::helper(p[0]),
                    r2,
                }
            }
        };
        if !matches!(reducer, Reducer::Montgomery { .. }) {
            one.0[0] = 1;
        }
        Ok(Self {
            p,
            p_minus_2,
            n,
            reducer,
            one,
        })
    }

    pub fn reduction(&self) -> Reduction {
        match self.reducer {
            Reducer::Secp128r1 => Reduction::Secp128r1,
            Reducer::P192 => Reduction::P192,
            Reducer::P256 => Reduction::P256,
            Reducer::Montgomery { .. } => Reduction::Montgomery,
        }
    }

    /// Limb count of the modulus.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Width of an encoded element.
    pub fn byte_len(&self) -> usize {
        self.n * LIMB_BYTES
    }

    pub fn bit_len(&self) -> usize {
        let top = self.p[self.n - 1];
        (self.n - 1) * LIMB_BITS + (LIMB_BITS - top.leading_zeros() as usize)
    }

    pub fn modulus(&self) -> BigNum {
        BigNum::from_raw(self.p[..self.n].to_vec())
    }

    pub fn zero(&self) -> FieldElement {
        FieldElement::ZERO
    }

    pub fn one(&self) -> FieldElement {
        self.one
    }

    pub fn from_u64(&self, v: u64) -> FieldElement {
        let mut a = FieldElement::ZERO;
        a.0[0] = v;
        // every supported modulus is wider than 64 bits
        self.to_internal(a)
    }

    /// Strict decoding: exactly [`Self::byte_len`] bytes holding a value below the modulus.
    pub fn from_be_bytes(&self, bytes: &[u8]) -> Result<FieldElement, MathError> {
        if bytes.len() != self.byte_len() {
            return Err(MathError::InvalidEncoding);
        }
        let mut a = FieldElement::ZERO;
        for (i, chunk) in bytes.rchunks(LIMB_BYTES).enumerate() {
            let mut buf = [0u8; LIMB_BYTES];
            buf.copy_from_slice(chunk);
            a.0[i] = u64::from_be_bytes(buf);
        }
        if limbs::cmp(&a.0[..self.n], &self.p[..self.n]) != core::cmp::Ordering::Less {
            return Err(MathError::NotReduced);
        }
        Ok(self.to_internal(a))
    }

    pub fn to_be_bytes(&self, a: &FieldElement) -> Vec<u8> {
        let c = self.to_canonical(a);
        let mut out = vec![0u8; self.byte_len()];
        for (i, chunk) in out.rchunks_mut(LIMB_BYTES).enumerate() {
            chunk.copy_from_slice(&c.0[i].to_be_bytes());
        }
        out
    }

    /// The canonical value as a number with room for the modulus.
    pub fn to_bignum(&self, a: &FieldElement) -> BigNum {
        BigNum::from_raw(self.to_canonical(a).0[..self.n].to_vec())
    }

    pub fn is_zero(&self, a: &FieldElement) -> Choice {
        a.ct_eq_limbs(&FieldElement::ZERO, self.n)
    }

    pub fn eq(&self, a: &FieldElement, b: &FieldElement) -> Choice {
        a.ct_eq_limbs(b, self.n)
    }

    pub fn add(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        let n = self.n;
        let mut t = [0; MAX_LIMBS + 1];
        t[n] = limbs::add(&a.0[..n], &b.0[..n], &mut t[..n]);
        let mut r = FieldElement::ZERO;
        limbs::mod_sub_masked(&t[..n + 1], &self.p[..n], &self.p[..n], &mut r.0[..n]);
        r
    }

    pub fn sub(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        let n = self.n;
        let mut r = FieldElement::ZERO;
        let borrow = limbs::sub(&a.0[..n], &b.0[..n], &mut r.0[..n]);
        let mut carry = 0;
        for i in 0..n {
            r.0[i] = limbs::add_limb(r.0[i], self.p[i] & borrow, &mut carry);
        }
        r
    }

    pub fn neg(&self, a: &FieldElement) -> FieldElement {
        self.sub(&FieldElement::ZERO, a)
    }

    pub fn double(&self, a: &FieldElement) -> FieldElement {
        self.add(a, a)
    }

    pub fn mul(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        let mut t: Wide = [0; 2 * MAX_LIMBS];
        limbs::mul(&a.0[..self.n], &b.0[..self.n], &mut t[..2 * self.n]);
        let r = self.reduce(&t);
        t.zeroize();
        r
    }

    pub fn sqr(&self, a: &FieldElement) -> FieldElement {
        let mut t: Wide = [0; 2 * MAX_LIMBS];
        limbs::sqr(&a.0[..self.n], &mut t[..2 * self.n]);
        let r = self.reduce(&t);
        t.zeroize();
        r
    }

    /// `a^(p-2)`. The exponent is public so the ladder branches on it.
    pub fn inv(&self, a: &FieldElement) -> Result<FieldElement, MathError> {
        if bool::from(self.is_zero(a)) {
            return Err(MathError::NotInvertible);
        }
        let e = &self.p_minus_2;
        let bits = limbs::significant_len(&e[..self.n]) * LIMB_BITS;
        let mut acc = self.one;
        for i in (0..bits).rev() {
            acc = self.sqr(&acc);
            if (e[i / LIMB_BITS] >> (i % LIMB_BITS)) & 1 == 1 {
                acc = self.mul(&acc, a);
            }
        }
        Ok(acc)
    }

    fn reduce(&self, t: &Wide) -> FieldElement {
        match self.reducer {
            Reducer::Secp128r1 => reduce::secp128r1(t, &self.p),
            Reducer::P192 => reduce::p192(t, &self.p),
            Reducer::P256 => reduce::p256(t, &self.p),
            Reducer::Montgomery { m0, .. } => reduce::redc(t, &self.p, self.n, m0),
        }
    }

    fn to_internal(&self, a: FieldElement) -> FieldElement {
        match self.reducer {
            Reducer::Montgomery { r2, .. } => self.mul(&a, &r2),
            _ => a,
        }
    }

    fn to_canonical(&self, a: &FieldElement) -> FieldElement {
        match self.reducer {
            Reducer::Montgomery { m0, .. } => {
                let mut t: Wide = [0; 2 * MAX_LIMBS];
                t[..self.n].copy_from_slice(&a.0[..self.n]);
                reduce::redc(&t, &self.p, self.n, m0)
            }
            _ => *a,
        }
    }
}

impl FieldElement {
    fn ct_eq_limbs(&self, other: &Self, n: usize) -> Choice {
        let mut acc = Choice::from(1u8);
        for i in 0..n {
            acc &= self.0[i].ct_eq(&other.0[i]);
        }
        acc
    }
}
