//! Montgomery arithmetic modulo a fixed odd number.
//!
//! With `n` the limb count of the modulus `m` and `R = 2^(64n)`, an element `a` is represented by
//! `a·R mod m`. [`Montgomery::mul`] computes `a·b·R⁻¹ mod m`, so products stay in the representation
//! without any division. The context keeps the encodings of 1, `R²` and `R³` so values can be moved
//! in and out cheaply.
//!
//! Exponentiation is left-to-right binary starting below the most significant set bit of the
//! exponent. The [`ExpMethod`] fixed at construction decides whether the multiply step depends on
//! the exponent bit ([`ExpMethod::Fast`]) or whether every step squares, multiplies and then selects
//! with a mask ([`ExpMethod::ConstantTime`]). Use the latter whenever the exponent is secret.

use crate::{
    bignum::BigNum,
    error::MathError,
    limbs::{self, Limb},
};
use ark_std::{vec, vec::Vec};
use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpMethod {
    /// Multiplies only for set exponent bits. Exponent must be public.
    Fast,
    /// Square and multiply on every bit, keeping the product through a masked select.
    ConstantTime,
}

#[derive(Clone, Debug)]
pub struct Montgomery {
    modulus: BigNum,
    /// Modulus limbs, exactly `n` of them.
    m: Vec<Limb>,
    /// `-m⁻¹ mod 2^64`
    m0: Limb,
    /// `R mod m`, the encoding of 1
    one: Vec<Limb>,
    /// `R² mod m`
    r2: Vec<Limb>,
    /// `R³ mod m`
    r3: Vec<Limb>,
    method: ExpMethod,
}

impl Montgomery {
    /// Sets up the context for `modulus`, which must be odd.
    pub fn new(modulus: &BigNum, method: ExpMethod) -> Result<Self, MathError> {
        if modulus.is_zero() {
            return Err(MathError::ZeroModulus);
        }
        if modulus.is_even() {
            return Err(MathError::EvenModulus);
        }
        let n = modulus.size();
        let m = modulus.limbs().to_vec();
        let m0 = Self::helper(m[0]);

        let mut r = BigNum::new(n)?;
        r.set_mod(&BigNum::pow2(64 * n)?, modulus)?;
        let mut r2 = BigNum::new(n)?;
        r2.set_mod(&BigNum::pow2(128 * n)?, modulus)?;

        let mut ctx = Self {
            modulus: modulus.clone(),
            m,
            m0,
            one: Self::pad(&r, n),
            r2: Self::pad(&r2, n),
            r3: vec![0; n],
            method,
        };
        // R²·R²·R⁻¹ = R³
        let r3 = ctx.mont_mul(&ctx.r2, &ctx.r2);
        ctx.r3 = r3;
        Ok(ctx)
    }

    /// `-m0⁻¹ mod 2^64` by Newton iteration: each step doubles the number of correct low bits,
    /// starting from 1 bit (any odd number is its own inverse mod 2).
    pub(crate) fn helper(m0: Limb) -> Limb {
        let mut inv: Limb = 1;
        for _ in 0..6 {
            inv = inv.wrapping_mul(2u64.wrapping_sub(m0.wrapping_mul(inv)));
        }
        inv.wrapping_neg()
    }

    pub fn modulus(&self) -> &BigNum {
        &self.modulus
    }

    pub fn method(&self) -> ExpMethod {
        self.method
    }

    /// Limb count of the modulus.
    pub fn len(&self) -> usize {
        self.m.len()
    }

    /// Montgomery encoding of 1, `R mod m`.
    pub fn one(&self) -> BigNum {
        self.to_bignum(&self.one)
    }

    /// `R² mod m`
    pub fn r2(&self) -> BigNum {
        self.to_bignum(&self.r2)
    }

    /// `R³ mod m`
    pub fn r3(&self) -> BigNum {
        self.to_bignum(&self.r3)
    }

    /// `a·R mod m`; `a` may be any size, it is reduced first.
    pub fn to_montgomery(&self, a: &BigNum) -> Result<BigNum, MathError> {
        let mut reduced = BigNum::new(self.len())?;
        reduced.set_mod(a, &self.modulus)?;
        let r = self.mont_mul(&Self::pad(&reduced, self.len()), &self.r2);
        Ok(self.to_bignum(&r))
    }

    /// `a·R⁻¹ mod m`
    pub fn from_montgomery(&self, a: &BigNum) -> Result<BigNum, MathError> {
        let a = self.reduced_limbs(a)?;
        let mut unit = vec![0; self.len()];
        unit[0] = 1;
        Ok(self.to_bignum(&self.mont_mul(&a, &unit)))
    }

    /// `a·b·R⁻¹ mod m`; both operands must already be reduced.
    pub fn mul(&self, a: &BigNum, b: &BigNum) -> Result<BigNum, MathError> {
        let a = self.reduced_limbs(a)?;
        let b = self.reduced_limbs(b)?;
        Ok(self.to_bignum(&self.mont_mul(&a, &b)))
    }

    /// `a·a·R⁻¹ mod m`
    pub fn sqr(&self, a: &BigNum) -> Result<BigNum, MathError> {
        let a = self.reduced_limbs(a)?;
        Ok(self.to_bignum(&self.mont_sqr(&a)))
    }

    /// `a^e` in the Montgomery domain: given `a·R` returns `a^e·R`. An exponent of 0 yields the
    /// encoding of 1 and a base of 0 yields 0.
    pub fn exp(&self, a: &BigNum, e: &BigNum) -> Result<BigNum, MathError> {
        let a = self.reduced_limbs(a)?;
        Ok(self.to_bignum(&self.exp_limbs(&a, e)))
    }

    /// Plain-domain modular exponentiation `a^e mod m`.
    pub fn mod_exp(&self, a: &BigNum, e: &BigNum) -> Result<BigNum, MathError> {
        let am = self.to_montgomery(a)?;
        let r = self.exp(&am, e)?;
        self.from_montgomery(&r)
    }

    /// Plain-domain modular multiplication `a·b mod m`.
    pub fn mod_mul(&self, a: &BigNum, b: &BigNum) -> Result<BigNum, MathError> {
        let am = self.to_montgomery(a)?;
        let mut reduced = BigNum::new(self.len())?;
        reduced.set_mod(b, &self.modulus)?;
        self.mul(&am, &reduced)
    }

    /// `a⁻¹ mod m` as `a^(m-2)`. Only meaningful for a prime modulus.
    pub fn mod_inv(&self, a: &BigNum) -> Result<BigNum, MathError> {
        let mut reduced = BigNum::new(self.len())?;
        reduced.set_mod(a, &self.modulus)?;
        if reduced.is_zero() {
            return Err(MathError::NotInvertible);
        }
        let two = BigNum::from_u64(2, 1)?;
        let mut e = BigNum::new(self.len())?;
        e.set_sub(&self.modulus, &two)?;
        self.mod_exp(&reduced, &e)
    }

    pub(crate) fn exp_limbs(&self, a: &[Limb], e: &BigNum) -> Vec<Limb> {
        if e.is_zero() {
            return self.one.clone();
        }
        if a.iter().all(|l| *l == 0) {
            return vec![0; self.len()];
        }
        let mut acc = a.to_vec();
        let bits = e.bit_len();
        match self.method {
            ExpMethod::Fast => {
                for i in (0..bits - 1).rev() {
                    acc = self.mont_sqr(&acc);
                    if e.bit(i) {
                        acc = self.mont_mul(&acc, a);
                    }
                }
            }
            ExpMethod::ConstantTime => {
                let mut prod = vec![0; self.len()];
                for i in (0..bits - 1).rev() {
                    acc = self.mont_sqr(&acc);
                    prod = self.mont_mul(&acc, a);
                    let choice = Choice::from(e.bit(i) as u8);
                    for (x, y) in acc.iter_mut().zip(prod.iter()) {
                        x.conditional_assign(y, choice);
                    }
                }
                prod.zeroize();
            }
        }
        acc
    }

    /// CIOS Montgomery multiplication over exactly `n` limbs. The final subtraction is masked.
    pub(crate) fn mont_mul(&self, a: &[Limb], b: &[Limb]) -> Vec<Limb> {
        let n = self.len();
        let m = &self.m;
        let mut t = vec![0; n + 2];
        for i in 0..n {
            let mut carry = 0;
            for j in 0..n {
                t[j] = limbs::mul_add(a[j], b[i], t[j], &mut carry);
            }
            let mut c2 = 0;
            t[n] = limbs::add_limb(t[n], carry, &mut c2);
            t[n + 1] = c2;

            let u = t[0].wrapping_mul(self.m0);
            let mut carry = 0;
            let _ = limbs::mul_add(u, m[0], t[0], &mut carry);
            for j in 1..n {
                t[j - 1] = limbs::mul_add(u, m[j], t[j], &mut carry);
            }
            let mut c3 = 0;
            t[n - 1] = limbs::add_limb(t[n], carry, &mut c3);
            t[n] = t[n + 1] + c3;
        }
        let mut out = vec![0; n];
        limbs::mod_sub_masked(&t[..n + 1], m, m, &mut out);
        t.zeroize();
        out
    }

    pub(crate) fn mont_sqr(&self, a: &[Limb]) -> Vec<Limb> {
        self.mont_mul(a, a)
    }

    /// Limbs of `a`, padded to the modulus length; `a` must be `< m`.
    fn reduced_limbs(&self, a: &BigNum) -> Result<Vec<Limb>, MathError> {
        if a >= &self.modulus {
            return Err(MathError::NotReduced);
        }
        Ok(Self::pad(a, self.len()))
    }

    fn pad(a: &BigNum, n: usize) -> Vec<Limb> {
        let mut v = vec![0; n];
        v[..a.size()].copy_from_slice(a.limbs());
        v
    }

    fn to_bignum(&self, limbs: &[Limb]) -> BigNum {
        BigNum::from_raw(limbs.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::{rngs::StdRng, RngCore, SeedableRng};
    use num::BigUint;

    fn big(n: &BigUint, room: usize) -> BigNum {
        BigNum::from_be_bytes(&n.to_bytes_be(), room).unwrap()
    }

    fn to_ref(n: &BigNum) -> BigUint {
        BigUint::from_bytes_be(&n.to_be_bytes(n.room() * 8).unwrap())
    }

    fn random_odd(rng: &mut StdRng, bytes: usize) -> BigUint {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        buf[0] |= 0x80;
        buf[bytes - 1] |= 1;
        BigUint::from_bytes_be(&buf)
    }

    #[test]
    fn rejects_even_or_zero_modulus() {
        let even = BigNum::from_u64(10, 1).unwrap();
        assert_eq!(
            Montgomery::new(&even, ExpMethod::Fast).unwrap_err(),
            MathError::EvenModulus
        );
        let zero = BigNum::new(2).unwrap();
        assert_eq!(
            Montgomery::new(&zero, ExpMethod::Fast).unwrap_err(),
            MathError::ZeroModulus
        );
    }

    #[test]
    fn helper_inverts_low_limb() {
        for m0 in [1u64, 3, 0xffff_ffff_ffff_ffff, 0x1234_5678_9abc_def1] {
            let h = Montgomery::helper(m0);
            assert_eq!(m0.wrapping_mul(h), u64::MAX);
        }
        // six doublings from one correct bit reach all 64 for any odd limb
        let mut rng = StdRng::seed_from_u64(0u64);
        for _ in 0..1000 {
            let m0 = rng.next_u64() | 1;
            assert_eq!(m0.wrapping_mul(Montgomery::helper(m0)).wrapping_add(1), 0);
        }
    }

    #[test]
    fn constants() {
        let mut rng = StdRng::seed_from_u64(0u64);
        for bytes in [8usize, 20, 32, 48] {
            let m = random_odd(&mut rng, bytes);
            let n = (bytes + 7) / 8;
            let ctx = Montgomery::new(&big(&m, n), ExpMethod::Fast).unwrap();
            let r = BigUint::from(1u8) << (64 * n);
            assert_eq!(to_ref(&ctx.one()), &r % &m);
            assert_eq!(to_ref(&ctx.r2()), (&r * &r) % &m);
            assert_eq!(to_ref(&ctx.r3()), (&r * &r * &r) % &m);
        }
    }

    #[test]
    fn multiplication_round_trip() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let m = random_odd(&mut rng, 32);
        let ctx = Montgomery::new(&big(&m, 4), ExpMethod::Fast).unwrap();
        for _ in 0..20 {
            let a = random_odd(&mut rng, 40);
            let b = random_odd(&mut rng, 24);
            let am = ctx.to_montgomery(&big(&a, 5)).unwrap();
            let bm = ctx.to_montgomery(&big(&b, 3)).unwrap();
            let p = ctx.from_montgomery(&ctx.mul(&am, &bm).unwrap()).unwrap();
            assert_eq!(to_ref(&p), (&a * &b) % &m);
            let s = ctx.from_montgomery(&ctx.sqr(&am).unwrap()).unwrap();
            assert_eq!(to_ref(&s), (&a * &a) % &m);
            assert_eq!(
                to_ref(&ctx.mod_mul(&big(&a, 5), &big(&b, 3)).unwrap()),
                (&a * &b) % &m
            );
        }
        // operands must be reduced
        let too_big = big(&(&m + BigUint::from(1u8)), 5);
        assert_eq!(ctx.mul(&too_big, &too_big), Err(MathError::NotReduced));
    }

    #[test]
    fn exponentiation_matches_reference_for_both_methods() {
        let mut rng = StdRng::seed_from_u64(0u64);
        for bytes in [8usize, 16, 32, 48, 64] {
            let m = random_odd(&mut rng, bytes);
            let n = (bytes + 7) / 8;
            let fast = Montgomery::new(&big(&m, n), ExpMethod::Fast).unwrap();
            let safe = Montgomery::new(&big(&m, n), ExpMethod::ConstantTime).unwrap();
            for _ in 0..5 {
                let a = random_odd(&mut rng, bytes + 3);
                let e_len = 1 + (rng.next_u32() as usize % bytes);
                let e = random_odd(&mut rng, e_len);
                let expected = a.modpow(&e, &m);
                let a = big(&a, n + 1);
                let e = big(&e, n);
                let r1 = fast.mod_exp(&a, &e).unwrap();
                let r2 = safe.mod_exp(&a, &e).unwrap();
                assert_eq!(to_ref(&r1), expected);
                assert_eq!(r1, r2);
            }
        }
    }

    #[test]
    fn exponentiation_special_cases() {
        let m = BigNum::from_u64(1_000_000_007, 1).unwrap();
        for method in [ExpMethod::Fast, ExpMethod::ConstantTime] {
            let ctx = Montgomery::new(&m, method).unwrap();
            let zero = BigNum::new(1).unwrap();
            let five = ctx.to_montgomery(&BigNum::from_u64(5, 1).unwrap()).unwrap();
            // e == 0 gives the encoding of one
            assert_eq!(ctx.exp(&five, &zero).unwrap(), ctx.one());
            // base 0 gives 0
            let e = BigNum::from_u64(12345, 1).unwrap();
            assert!(ctx.exp(&zero, &e).unwrap().is_zero());
            // e == 1 is the identity map
            let one = BigNum::from_u64(1, 1).unwrap();
            assert_eq!(ctx.exp(&five, &one).unwrap(), five);
        }
    }

    #[test]
    fn inverse_modulo_prime() {
        // P-256 group order
        let n = BigUint::parse_bytes(
            b"ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
            16,
        )
        .unwrap();
        let ctx = Montgomery::new(&big(&n, 4), ExpMethod::ConstantTime).unwrap();
        let mut rng = StdRng::seed_from_u64(0u64);
        for _ in 0..5 {
            let a = random_odd(&mut rng, 31);
            let inv = ctx.mod_inv(&big(&a, 4)).unwrap();
            assert_eq!((&a * to_ref(&inv)) % &n, BigUint::from(1u8));
        }
        assert_eq!(
            ctx.mod_inv(&big(&n, 4)).unwrap_err(),
            MathError::NotInvertible
        );
    }
}
