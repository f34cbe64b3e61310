//! Jacobian points and scalar multiplication.
//!
//! A point `(X, Y, Z)` stands for the affine `(X/Z², Y/Z³)`. The identity carries an explicit flag
//! and, when produced by the arithmetic here, the coordinates `(1, 1, 0)`.
//!
//! [`Curve::add`] is complete: it computes the generic sum and the doubling of the first operand,
//! then picks the right one (or the identity, or an operand when the other is the identity) with
//! masked selects. Scalar multiplication is a fixed-window ladder over the full bit length of the
//! group order, so the schedule of doublings and additions never depends on the scalar. With
//! [`ScalarMulMethod::Scrambled`] the multiples table is stored word-interleaved and every word of
//! every entry is read for each window.

use super::{
    curves::Curve,
    field::{FieldElement, PrimeField, MAX_LIMBS},
};
use crate::{
    bignum::BigNum,
    error::MathError,
    limbs::{Limb, LIMB_BITS},
};
use ark_std::{vec, vec::Vec};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

#[derive(Clone, Copy, Debug)]
pub struct EcPoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) z: FieldElement,
    pub(crate) infinity: Choice,
}

impl EcPoint {
    pub fn identity(field: &PrimeField) -> Self {
        Self {
            x: field.one(),
            y: field.one(),
            z: field.zero(),
            infinity: Choice::from(1u8),
        }
    }

    pub fn is_identity(&self) -> bool {
        bool::from(self.infinity)
    }
}

impl ConditionallySelectable for EcPoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
            infinity: Choice::from(u8::conditional_select(
                &a.infinity.unwrap_u8(),
                &b.infinity.unwrap_u8(),
                choice,
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarMulMethod {
    /// Looks the window value up directly. For public scalars only.
    Window,
    /// Scans the whole scrambled table for every window.
    Scrambled,
}

/// Window width for scalars of `bits` bits: larger scalars amortise a larger table.
pub fn optimal_window_size(bits: usize) -> usize {
    if bits <= 64 {
        3
    } else if bits <= 192 {
        4
    } else {
        5
    }
}

/// `2^w` precomputed multiples stored so that word `l` of coordinate `c` of every entry sits in
/// one contiguous run: `words[(c * MAX_LIMBS + l) * entries + entry]`.
struct ScrambledTable {
    entries: usize,
    words: Vec<Limb>,
    infinity: Vec<u8>,
}

impl ScrambledTable {
    fn new(points: &[EcPoint]) -> Self {
        let entries = points.len();
        let mut words = vec![0; 3 * MAX_LIMBS * entries];
        let mut infinity = vec![0; entries];
        for (e, p) in points.iter().enumerate() {
            for (c, coord) in [&p.x, &p.y, &p.z].iter().enumerate() {
                for l in 0..MAX_LIMBS {
                    words[(c * MAX_LIMBS + l) * entries + e] = coord.0[l];
                }
            }
            infinity[e] = p.infinity.unwrap_u8();
        }
        Self {
            entries,
            words,
            infinity,
        }
    }

    fn select(&self, digit: u64) -> EcPoint {
        let mut coords = [FieldElement::ZERO; 3];
        let mut inf = 0u8;
        for e in 0..self.entries {
            let hit = (e as u64).ct_eq(&digit);
            for (c, coord) in coords.iter_mut().enumerate() {
                for l in 0..MAX_LIMBS {
                    coord.0[l]
                        .conditional_assign(&self.words[(c * MAX_LIMBS + l) * self.entries + e], hit);
                }
            }
            inf.conditional_assign(&self.infinity[e], hit);
        }
        EcPoint {
            x: coords[0],
            y: coords[1],
            z: coords[2],
            infinity: Choice::from(inf),
        }
    }
}

impl Drop for ScrambledTable {
    fn drop(&mut self) {
        self.words.zeroize();
        self.infinity.zeroize();
    }
}

/// Bits `[pos, pos + w)` of the little-endian `limbs`.
fn window(limbs: &[Limb], pos: usize, w: usize) -> u64 {
    let i = pos / LIMB_BITS;
    let s = pos % LIMB_BITS;
    let mut v = limbs.get(i).copied().unwrap_or(0) >> s;
    if s + w > LIMB_BITS {
        v |= limbs.get(i + 1).copied().unwrap_or(0) << (LIMB_BITS - s);
    }
    v & ((1 << w) - 1)
}

impl Curve {
    pub fn identity(&self) -> EcPoint {
        EcPoint::identity(self.field())
    }

    /// Builds a point from big-endian affine coordinates, checking the curve equation.
    pub fn point_from_affine(&self, x: &[u8], y: &[u8]) -> Result<EcPoint, MathError> {
        let f = self.field();
        let p = EcPoint {
            x: f.from_be_bytes(x)?,
            y: f.from_be_bytes(y)?,
            z: f.one(),
            infinity: Choice::from(0u8),
        };
        if !self.is_on_curve(&p) {
            return Err(MathError::NotOnCurve);
        }
        Ok(p)
    }

    /// `x || y`, each [`Curve::coordinate_size`] bytes.
    pub fn point_from_bytes(&self, bytes: &[u8]) -> Result<EcPoint, MathError> {
        let cs = self.coordinate_size();
        if bytes.len() != 2 * cs {
            return Err(MathError::InvalidEncoding);
        }
        self.point_from_affine(&bytes[..cs], &bytes[cs..])
    }

    pub fn point_to_bytes(&self, p: &EcPoint) -> Result<Vec<u8>, MathError> {
        let (x, y) = self.to_affine(p)?;
        let f = self.field();
        let mut out = f.to_be_bytes(&x);
        out.extend_from_slice(&f.to_be_bytes(&y));
        Ok(out)
    }

    pub fn to_affine(&self, p: &EcPoint) -> Result<(FieldElement, FieldElement), MathError> {
        if p.is_identity() {
            return Err(MathError::PointAtInfinity);
        }
        let f = self.field();
        let zi = f.inv(&p.z)?;
        let zi2 = f.sqr(&zi);
        let zi3 = f.mul(&zi2, &zi);
        Ok((f.mul(&p.x, &zi2), f.mul(&p.y, &zi3)))
    }

    /// `Y² = X³ + a·X·Z⁴ + b·Z⁶`; the identity counts as on the curve.
    pub fn is_on_curve(&self, p: &EcPoint) -> bool {
        if p.is_identity() {
            return true;
        }
        let f = self.field();
        let z2 = f.sqr(&p.z);
        let z4 = f.sqr(&z2);
        let z6 = f.mul(&z4, &z2);
        let lhs = f.sqr(&p.y);
        let x3 = f.mul(&f.sqr(&p.x), &p.x);
        let ax = f.mul(&f.mul(&self.a, &p.x), &z4);
        let rhs = f.add(&f.add(&x3, &ax), &f.mul(&self.b, &z6));
        bool::from(f.eq(&lhs, &rhs))
    }

    pub fn eq(&self, p: &EcPoint, q: &EcPoint) -> bool {
        match (p.is_identity(), q.is_identity()) {
            (true, true) => return true,
            (false, false) => (),
            _ => return false,
        }
        let f = self.field();
        let pz2 = f.sqr(&p.z);
        let qz2 = f.sqr(&q.z);
        let x_eq = f.eq(&f.mul(&p.x, &qz2), &f.mul(&q.x, &pz2));
        let y_eq = f.eq(
            &f.mul(&p.y, &f.mul(&qz2, &q.z)),
            &f.mul(&q.y, &f.mul(&pz2, &p.z)),
        );
        bool::from(x_eq & y_eq)
    }

    pub fn neg(&self, p: &EcPoint) -> EcPoint {
        EcPoint {
            y: self.field().neg(&p.y),
            ..*p
        }
    }

    /// Doubling with `dbl-2007-bl`. The identity maps to itself since `Z3 = 0` when `Z1 = 0`.
    pub fn double(&self, p: &EcPoint) -> EcPoint {
        let f = self.field();
        let xx = f.sqr(&p.x);
        let yy = f.sqr(&p.y);
        let yyyy = f.sqr(&yy);
        let zz = f.sqr(&p.z);
        let s = f.double(&f.sub(&f.sub(&f.sqr(&f.add(&p.x, &yy)), &xx), &yyyy));
        let m = f.add(&f.add(&f.double(&xx), &xx), &f.mul(&self.a, &f.sqr(&zz)));
        let t = f.sub(&f.sqr(&m), &f.double(&s));
        let yyyy8 = f.double(&f.double(&f.double(&yyyy)));
        EcPoint {
            x: t,
            y: f.sub(&f.mul(&m, &f.sub(&s, &t)), &yyyy8),
            z: f.sub(&f.sub(&f.sqr(&f.add(&p.y, &p.z)), &yy), &zz),
            infinity: p.infinity,
        }
    }

    /// Complete addition built on `add-2007-bl`.
    pub fn add(&self, p: &EcPoint, q: &EcPoint) -> EcPoint {
        let f = self.field();
        let z1z1 = f.sqr(&p.z);
        let z2z2 = f.sqr(&q.z);
        let u1 = f.mul(&p.x, &z2z2);
        let u2 = f.mul(&q.x, &z1z1);
        let s1 = f.mul(&f.mul(&p.y, &q.z), &z2z2);
        let s2 = f.mul(&f.mul(&q.y, &p.z), &z1z1);
        let h = f.sub(&u2, &u1);
        let i = f.sqr(&f.double(&h));
        let j = f.mul(&h, &i);
        let r = f.double(&f.sub(&s2, &s1));
        let v = f.mul(&u1, &i);
        let x3 = f.sub(&f.sub(&f.sqr(&r), &j), &f.double(&v));
        let y3 = f.sub(&f.mul(&r, &f.sub(&v, &x3)), &f.double(&f.mul(&s1, &j)));
        let z3 = f.mul(
            &f.sub(&f.sub(&f.sqr(&f.add(&p.z, &q.z)), &z1z1), &z2z2),
            &h,
        );
        let sum = EcPoint {
            x: x3,
            y: y3,
            z: z3,
            infinity: Choice::from(0u8),
        };

        let both_finite = !p.infinity & !q.infinity;
        let h_zero = f.is_zero(&h);
        let r_zero = f.is_zero(&r);
        let dbl = self.double(p);
        let mut out = EcPoint::conditional_select(&sum, &dbl, both_finite & h_zero & r_zero);
        out = EcPoint::conditional_select(
            &out,
            &self.identity(),
            both_finite & h_zero & !r_zero,
        );
        out = EcPoint::conditional_select(&out, q, p.infinity);
        EcPoint::conditional_select(&out, p, q.infinity & !p.infinity)
    }

    /// `k·P` for `0 <= k < n`.
    pub fn scalar_mul(
        &self,
        k: &BigNum,
        p: &EcPoint,
        method: ScalarMulMethod,
    ) -> Result<EcPoint, MathError> {
        if k >= self.order() {
            return Err(MathError::NotReduced);
        }
        let bits = self.order().bit_len();
        let w = optimal_window_size(bits);
        let entries = 1usize << w;
        let mut table = Vec::with_capacity(entries);
        table.push(self.identity());
        for i in 1..entries {
            let next = self.add(&table[i - 1], p);
            table.push(next);
        }

        let mut scalar = [0; MAX_LIMBS];
        scalar[..k.size()].copy_from_slice(k.limbs());
        let windows = (bits + w - 1) / w;

        let mut acc = self.identity();
        match method {
            ScalarMulMethod::Window => {
                for win in (0..windows).rev() {
                    for _ in 0..w {
                        acc = self.double(&acc);
                    }
                    let digit = window(&scalar, win * w, w) as usize;
                    acc = self.add(&acc, &table[digit]);
                }
            }
            ScalarMulMethod::Scrambled => {
                let scrambled = ScrambledTable::new(&table);
                for t in table.iter_mut() {
                    t.x.zeroize();
                    t.y.zeroize();
                    t.z.zeroize();
                }
                for win in (0..windows).rev() {
                    for _ in 0..w {
                        acc = self.double(&acc);
                    }
                    let entry = scrambled.select(window(&scalar, win * w, w));
                    acc = self.add(&acc, &entry);
                }
            }
        }
        scalar.zeroize();
        Ok(acc)
    }

    pub fn mul_generator(&self, k: &BigNum, method: ScalarMulMethod) -> Result<EcPoint, MathError> {
        self.scalar_mul(k, self.generator(), method)
    }
}
