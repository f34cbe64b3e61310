//! Reductions of a double-width product back into the field.
//!
//! Each named prime is close to a power of two, so the high half can be folded onto the low half
//! with a handful of additions. All loops run a fixed number of times and the final correction is
//! a masked subtraction.

use super::field::{FieldElement, MAX_LIMBS};
use crate::limbs::{self, add_limb, mul_add, Limb};
use zeroize::Zeroize;

/// A product of two field elements, little-endian.
pub(crate) type Wide = [Limb; 2 * MAX_LIMBS];

/// `2^128 ≡ 2^97 + 1`, so `lo + hi·2^128` folds to `lo + hi + hi·2^97`. Each fold shortens the value
/// by about 31 bits; eight of them bring any 256-bit product below `2^128`.
pub(crate) fn secp128r1(t: &Wide, p: &[Limb; MAX_LIMBS]) -> FieldElement {
    let mut v = [t[0], t[1], t[2], t[3]];
    for _ in 0..8 {
        let (h0, h1) = (v[2], v[3]);
        let mut c = 0;
        let r0 = add_limb(v[0], h0, &mut c);
        let r1 = add_limb(v[1], h1, &mut c);
        let r2 = c;
        // hi << 97 is hi << 33 one limb up
        let s1 = h0 << 33;
        let s2 = (h0 >> 31) | (h1 << 33);
        let s3 = h1 >> 31;
        let mut c = 0;
        v[0] = r0;
        v[1] = add_limb(r1, s1, &mut c);
        v[2] = add_limb(r2, s2, &mut c);
        v[3] = add_limb(0, s3, &mut c);
    }
    let mut r = FieldElement::ZERO;
    limbs::mod_sub_masked(&v[..3], &p[..2], &p[..2], &mut r.0[..2]);
    v.zeroize();
    r
}

/// `2^192 ≡ 2^64 + 1`. With `c0..c5` the 64-bit words of the product the result is
/// `(c2,c1,c0) + (0,c3,c3) + (c4,c4,0) + (c5,c5,c5)`, then the carry is folded twice.
pub(crate) fn p192(t: &Wide, p: &[Limb; MAX_LIMBS]) -> FieldElement {
    let terms = [
        [t[0], t[1], t[2]],
        [t[3], t[3], 0],
        [0, t[4], t[4]],
        [t[5], t[5], t[5]],
    ];
    let mut acc = [0; 3];
    let mut k = 0;
    for s in terms.iter() {
        let mut c = 0;
        for i in 0..3 {
            acc[i] = add_limb(acc[i], s[i], &mut c);
        }
        k += c;
    }
    for _ in 0..2 {
        let mut c = 0;
        acc[0] = add_limb(acc[0], k, &mut c);
        acc[1] = add_limb(acc[1], k, &mut c);
        acc[2] = add_limb(acc[2], 0, &mut c);
        k = c;
    }
    let l = [acc[0], acc[1], acc[2], k];
    let mut r = FieldElement::ZERO;
    limbs::mod_sub_masked(&l, &p[..3], &p[..3], &mut r.0[..3]);
    acc.zeroize();
    r
}

/// FIPS 186 reduction on 32-bit words `c0..c15`:
/// `s1 + 2·s2 + 2·s3 + s4 + s5 - s6 - s7 - s8 - s9`, summed per output word in `i64` and
/// normalised by propagating signed carries. The carry out of the top word is folded back with
/// `2^256 ≡ 2^224 - 2^192 - 2^96 + 1`.
pub(crate) fn p256(t: &Wide, p: &[Limb; MAX_LIMBS]) -> FieldElement {
    let c: [i64; 16] =
        core::array::from_fn(|i| ((t[i / 2] >> (32 * (i % 2))) & 0xffff_ffff) as i64);
    let mut w = [
        c[0] + c[8] + c[9] - c[11] - c[12] - c[13] - c[14],
        c[1] + c[9] + c[10] - c[12] - c[13] - c[14] - c[15],
        c[2] + c[10] + c[11] - c[13] - c[14] - c[15],
        c[3] + 2 * c[11] + 2 * c[12] + c[13] - c[15] - c[8] - c[9],
        c[4] + 2 * c[12] + 2 * c[13] + c[14] - c[9] - c[10],
        c[5] + 2 * c[13] + 2 * c[14] + c[15] - c[10] - c[11],
        c[6] + 3 * c[14] + 2 * c[15] + c[13] - c[8] - c[9],
        c[7] + 3 * c[15] + c[8] - c[10] - c[11] - c[12] - c[13],
    ];
    let mut top = propagate(&mut w);
    for _ in 0..3 {
        w[0] += top;
        w[3] -= top;
        w[6] -= top;
        w[7] += top;
        top = propagate(&mut w);
    }
    let mut l = [0; 5];
    for i in 0..4 {
        l[i] = (w[2 * i] as u64) | ((w[2 * i + 1] as u64) << 32);
    }
    l[4] = top as u64;
    let mut r = FieldElement::ZERO;
    limbs::mod_sub_masked(&l, &p[..4], &p[..4], &mut r.0[..4]);
    w.zeroize();
    l.zeroize();
    r
}

/// Leaves every word in `[0, 2^32)` and returns the signed carry out of the top.
fn propagate(w: &mut [i64; 8]) -> i64 {
    let mut carry = 0;
    for x in w.iter_mut() {
        *x += carry;
        carry = *x >> 32;
        *x &= 0xffff_ffff;
    }
    carry
}

/// Montgomery reduction `t·R⁻¹ mod p` over `n` limbs.
pub(crate) fn redc(t: &Wide, p: &[Limb; MAX_LIMBS], n: usize, m0: Limb) -> FieldElement {
    let mut a = [0; 2 * MAX_LIMBS + 1];
    a[..2 * n].copy_from_slice(&t[..2 * n]);
    for i in 0..n {
        let u = a[i].wrapping_mul(m0);
        let mut carry = 0;
        for j in 0..n {
            a[i + j] = mul_add(u, p[j], a[i + j], &mut carry);
        }
        for k in (i + n)..(2 * n + 1) {
            a[k] = add_limb(a[k], 0, &mut carry);
        }
    }
    let mut r = FieldElement::ZERO;
    limbs::mod_sub_masked(&a[n..2 * n + 1], &p[..n], &p[..n], &mut r.0[..n]);
    a.zeroize();
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::field::tests::{bytes_of, P192_P, P256_P, SECP128R1_P};
    use ark_std::rand::{rngs::StdRng, RngCore, SeedableRng};
    use num::BigUint;

    fn limbs_of(v: &BigUint) -> [Limb; MAX_LIMBS] {
        let mut out = [0; MAX_LIMBS];
        for (i, d) in v.to_u64_digits().iter().enumerate() {
            out[i] = *d;
        }
        out
    }

    fn wide_of(v: &BigUint) -> Wide {
        let mut out = [0; 2 * MAX_LIMBS];
        for (i, d) in v.to_u64_digits().iter().enumerate() {
            out[i] = *d;
        }
        out
    }

    /// Feeds raw double-width values, including ones above `p²`, straight into each reduction.
    #[test]
    fn reductions_of_arbitrary_wide_values() {
        let mut rng = StdRng::seed_from_u64(0u64);
        type Reducer = fn(&Wide, &[Limb; MAX_LIMBS]) -> FieldElement;
        let cases: [(&str, usize, Reducer); 3] = [
            (SECP128R1_P, 2, secp128r1),
            (P192_P, 3, p192),
            (P256_P, 4, p256),
        ];
        for (hex, n, f) in cases {
            let p = BigUint::from_bytes_be(&bytes_of(hex));
            let pl = limbs_of(&p);
            let all_ones = (BigUint::from(1u8) << (128 * n)) - BigUint::from(1u8);
            let mut inputs = vec![BigUint::from(0u8), all_ones, &p * &p, &p - BigUint::from(1u8)];
            for _ in 0..200 {
                let mut buf = vec![0u8; 16 * n];
                rng.fill_bytes(&mut buf);
                inputs.push(BigUint::from_bytes_be(&buf));
            }
            for v in inputs {
                let r = f(&wide_of(&v), &pl);
                assert_eq!(r.0, limbs_of(&(&v % &p)), "{}", v);
            }
        }
    }

    #[test]
    fn redc_divides_by_r() {
        let p = BigUint::from_bytes_be(&bytes_of(P256_P));
        let pl = limbs_of(&p);
        let m0 = crate::montgomery::Montgomery::helper(pl[0]);
        let r = BigUint::from(1u8) << 256;
        let v = (&p - BigUint::from(5u8)) * (&p - BigUint::from(9u8));
        let out = redc(&wide_of(&v), &pl, 4, m0);
        assert_eq!(
            (BigUint::from_slice(
                &out.0[..4]
                    .iter()
                    .flat_map(|l| [*l as u32, (*l >> 32) as u32])
                    .collect::<Vec<_>>()
            ) * r)
                % &p,
            v % &p
        );
    }
}
