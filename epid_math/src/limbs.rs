//! Word-level primitives shared by the bignum, Montgomery and field code. Limbs are little-endian
//! `u64`s; the intermediate arithmetic is done in `u128`.

#![allow(clippy::needless_range_loop)]

use core::cmp::Ordering;

pub(crate) type Limb = u64;
pub(crate) const LIMB_BITS: usize = 64;
pub(crate) const LIMB_BYTES: usize = 8;

#[inline]
pub(crate) fn add_limb(x: u64, y: u64, carry: &mut u64) -> u64 {
    let z = (x as u128) + (y as u128) + (*carry as u128);
    *carry = (z >> 64) as u64;
    z as u64
}

/// `x - y - borrow`; `borrow` is left as 0 or all ones so it doubles as a mask.
#[inline]
pub(crate) fn sub_limb(x: u64, y: u64, borrow: &mut u64) -> u64 {
    let ret = (x as u128).wrapping_sub((y as u128) + ((*borrow & 1) as u128));
    *borrow = (ret >> 64) as u64;
    ret as u64
}

/// `x * y + z + carry`
#[inline]
pub(crate) fn mul_add(x: u64, y: u64, z: u64, carry: &mut u64) -> u64 {
    let ret = ((x as u128) * (y as u128)) + (z as u128) + (*carry as u128);
    *carry = (ret >> 64) as u64;
    ret as u64
}

/// Number of limbs needed to hold `bits` bits, at least one.
pub(crate) fn limbs_for_bits(bits: usize) -> usize {
    ((bits + LIMB_BITS - 1) / LIMB_BITS).max(1)
}

/// Length of `a` with leading zero limbs dropped; zero has length 1.
pub(crate) fn significant_len(a: &[Limb]) -> usize {
    let mut n = a.len();
    while n > 1 && a[n - 1] == 0 {
        n -= 1;
    }
    n.max(1)
}

/// Compares two little-endian numbers of possibly different lengths.
pub(crate) fn cmp(a: &[Limb], b: &[Limb]) -> Ordering {
    let n = a.len().max(b.len());
    for i in (0..n).rev() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            o => return o,
        }
    }
    Ordering::Equal
}

/// `out = a + b`, `out.len() >= max(a.len(), b.len())`. Returns the carry out of `out`.
pub(crate) fn add(a: &[Limb], b: &[Limb], out: &mut [Limb]) -> Limb {
    let mut carry = 0;
    for i in 0..out.len() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        out[i] = add_limb(x, y, &mut carry);
    }
    carry
}

/// `out = a - b` over `out.len()` limbs. Returns the borrow as a mask (0 or all ones).
pub(crate) fn sub(a: &[Limb], b: &[Limb], out: &mut [Limb]) -> Limb {
    let mut borrow = 0;
    for i in 0..out.len() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        out[i] = sub_limb(x, y, &mut borrow);
    }
    borrow
}

/// `a -= b` in place; `b` may be shorter. Returns the borrow mask.
pub(crate) fn sub_assign(a: &mut [Limb], b: &[Limb]) -> Limb {
    let mut borrow = 0;
    for i in 0..a.len() {
        let y = b.get(i).copied().unwrap_or(0);
        a[i] = sub_limb(a[i], y, &mut borrow);
    }
    borrow
}

/// Schoolbook product. `out` must hold at least `a.len() + b.len()` limbs and is overwritten.
pub(crate) fn mul(a: &[Limb], b: &[Limb], out: &mut [Limb]) {
    for o in out.iter_mut() {
        *o = 0;
    }
    for i in 0..a.len() {
        let mut carry = 0;
        for j in 0..b.len() {
            out[i + j] = mul_add(a[i], b[j], out[i + j], &mut carry);
        }
        out[i + b.len()] = carry;
    }
}

/// Square of `a`: cross products are computed once and doubled, then the diagonal is added.
pub(crate) fn sqr(a: &[Limb], out: &mut [Limb]) {
    let n = a.len();
    for o in out.iter_mut() {
        *o = 0;
    }
    for i in 0..n {
        let mut carry = 0;
        for j in (i + 1)..n {
            out[i + j] = mul_add(a[i], a[j], out[i + j], &mut carry);
        }
        out[i + n] = carry;
    }
    // double
    let mut top = 0;
    for o in out[..2 * n].iter_mut() {
        let next = *o >> 63;
        *o = (*o << 1) | top;
        top = next;
    }
    let mut carry = 0;
    for i in 0..n {
        let sq = (a[i] as u128) * (a[i] as u128);
        out[2 * i] = add_limb(out[2 * i], sq as u64, &mut carry);
        out[2 * i + 1] = add_limb(out[2 * i + 1], (sq >> 64) as u64, &mut carry);
    }
}

/// Shifts `a` left by one bit in place, returning the bit shifted out.
pub(crate) fn shl1(a: &mut [Limb]) -> Limb {
    let mut top = 0;
    for x in a.iter_mut() {
        let next = *x >> 63;
        *x = (*x << 1) | top;
        top = next;
    }
    top
}

/// `l - r` if that does not underflow, else `l` unchanged; `l` may carry one extra high limb.
/// Branch-free: the borrow mask decides whether `m` is added back.
pub(crate) fn mod_sub_masked(l: &[Limb], r: &[Limb], m: &[Limb], out: &mut [Limb]) {
    let n = out.len();
    let mut borrow = 0;
    for i in 0..n {
        out[i] = sub_limb(l[i], r.get(i).copied().unwrap_or(0), &mut borrow);
    }
    for i in n..l.len() {
        let _ = sub_limb(l[i], 0, &mut borrow);
    }
    let mut carry = 0;
    for i in 0..n {
        out[i] = add_limb(out[i], m.get(i).copied().unwrap_or(0) & borrow, &mut carry);
    }
}

/// Selects `b` when `mask` is all ones and `a` when it is zero.
#[inline]
pub(crate) fn select(a: &[Limb], b: &[Limb], mask: Limb, out: &mut [Limb]) {
    for i in 0..out.len() {
        out[i] = (a[i] & !mask) | (b[i] & mask);
    }
}
