//! Fixed-capacity unsigned big integers.
//!
//! A [`BigNum`] allocates `room` limbs once, at construction, and never grows. `size` is the number of
//! significant limbs; zero is the single limb `0`. Every operation writes into `self` as the
//! destination and fails with [`MathError::OutOfRange`] if the result does not fit, leaving the
//! destination unchanged.
//!
//! ```ignore
//! let mut r = BigNum::new(8)?;
//! r.set_mul(&a, &b)?;        // room >= a.size() + b.size() always suffices
//! ```

use crate::{
    error::MathError,
    limbs::{self, Limb, LIMB_BITS, LIMB_BYTES},
};
use ark_std::{cmp::Ordering, fmt, rand::RngCore, vec, vec::Vec};
use zeroize::Zeroize;

/// Attempts made by [`BigNum::random_in_range`] before giving up.
pub const RNG_WATCHDOG: usize = 10;

/// Extra random bits drawn above the bound's width so that reducing the draw modulo the bound is
/// statistically uniform.
const RAND_EXTRA_BITS: usize = 128;

#[derive(Clone, Zeroize)]
pub struct BigNum {
    /// `room` limbs, little-endian; limbs at and above `size` are zero.
    limbs: Vec<Limb>,
    size: usize,
}

impl BigNum {
    /// Zero with capacity for `room` limbs.
    pub fn new(room: usize) -> Result<Self, MathError> {
        if room == 0 {
            return Err(MathError::OutOfRange);
        }
        Ok(Self {
            limbs: vec![0; room],
            size: 1,
        })
    }

    /// Zero with capacity for a `bits`-bit value.
    pub fn with_bits(bits: usize) -> Result<Self, MathError> {
        Self::new(limbs::limbs_for_bits(bits))
    }

    pub fn from_u64(v: u64, room: usize) -> Result<Self, MathError> {
        let mut n = Self::new(room)?;
        n.limbs[0] = v;
        Ok(n)
    }

    /// From little-endian limbs; leading zero limbs do not count against `room`.
    pub fn from_limbs(src: &[u64], room: usize) -> Result<Self, MathError> {
        let mut n = Self::new(room)?;
        n.assign_limbs(src)?;
        Ok(n)
    }

    /// From big-endian bytes; leading zero bytes are stripped and do not count against `room`.
    pub fn from_be_bytes(bytes: &[u8], room: usize) -> Result<Self, MathError> {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        let bytes = &bytes[start..];
        let needed = limbs::limbs_for_bits(bytes.len() * 8);
        if needed > room {
            return Err(MathError::OutOfRange);
        }
        let mut n = Self::new(room)?;
        for (i, chunk) in bytes.rchunks(LIMB_BYTES).enumerate() {
            let mut buf = [0u8; LIMB_BYTES];
            buf[LIMB_BYTES - chunk.len()..].copy_from_slice(chunk);
            n.limbs[i] = u64::from_be_bytes(buf);
        }
        n.normalize();
        Ok(n)
    }

    /// Big-endian encoding zero-padded to exactly `width` bytes.
    pub fn to_be_bytes(&self, width: usize) -> Result<Vec<u8>, MathError> {
        let mut out = vec![0u8; width];
        self.write_be_bytes(&mut out)?;
        Ok(out)
    }

    /// Writes the value big-endian into all of `out`, zero padding on the left.
    pub fn write_be_bytes(&self, out: &mut [u8]) -> Result<(), MathError> {
        if (self.bit_len() + 7) / 8 > out.len() {
            return Err(MathError::OutOfRange);
        }
        for b in out.iter_mut() {
            *b = 0;
        }
        let width = out.len();
        for (i, limb) in self.limbs().iter().enumerate() {
            for (k, byte) in limb.to_le_bytes().iter().enumerate() {
                let pos = i * LIMB_BYTES + k;
                if pos < width {
                    out[width - 1 - pos] = *byte;
                }
            }
        }
        Ok(())
    }

    /// Capacity in limbs.
    pub fn room(&self) -> usize {
        self.limbs.len()
    }

    /// Number of significant limbs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The significant limbs, little-endian.
    pub fn limbs(&self) -> &[Limb] {
        &self.limbs[..self.size]
    }

    /// All `room` limbs, including the zero ones above `size`.
    pub fn padded_limbs(&self) -> &[Limb] {
        &self.limbs
    }

    pub fn is_zero(&self) -> bool {
        self.size == 1 && self.limbs[0] == 0
    }

    pub fn is_one(&self) -> bool {
        self.size == 1 && self.limbs[0] == 1
    }

    pub fn is_even(&self) -> bool {
        self.limbs[0] & 1 == 0
    }

    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }

    pub fn bit_len(&self) -> usize {
        let top = self.limbs[self.size - 1];
        (self.size - 1) * LIMB_BITS + (LIMB_BITS - top.leading_zeros() as usize)
    }

    pub fn bit(&self, i: usize) -> bool {
        let limb = i / LIMB_BITS;
        limb < self.size && (self.limbs[limb] >> (i % LIMB_BITS)) & 1 == 1
    }

    /// Copies the value of `a`.
    pub fn set(&mut self, a: &BigNum) -> Result<(), MathError> {
        self.assign_limbs(a.limbs())
    }

    pub fn set_u64(&mut self, v: u64) {
        for l in self.limbs.iter_mut() {
            *l = 0;
        }
        self.limbs[0] = v;
        self.size = 1;
    }

    /// `self = a + b`
    pub fn set_add(&mut self, a: &BigNum, b: &BigNum) -> Result<(), MathError> {
        let mut t = vec![0; a.size.max(b.size) + 1];
        let n = t.len();
        let carry = limbs::add(a.limbs(), b.limbs(), &mut t[..n - 1]);
        t[n - 1] = carry;
        self.assign_limbs(&t)
    }

    /// `self = a - b`; fails with [`MathError::Underflow`] when `a < b`.
    pub fn set_sub(&mut self, a: &BigNum, b: &BigNum) -> Result<(), MathError> {
        if a < b {
            return Err(MathError::Underflow);
        }
        let mut t = vec![0; a.size];
        limbs::sub(a.limbs(), b.limbs(), &mut t);
        self.assign_limbs(&t)
    }

    /// `self = a * b`
    pub fn set_mul(&mut self, a: &BigNum, b: &BigNum) -> Result<(), MathError> {
        let mut t = vec![0; a.size + b.size];
        limbs::mul(a.limbs(), b.limbs(), &mut t);
        self.assign_limbs(&t)
    }

    /// `self = a * a`
    pub fn set_sqr(&mut self, a: &BigNum) -> Result<(), MathError> {
        let mut t = vec![0; 2 * a.size];
        limbs::sqr(a.limbs(), &mut t);
        self.assign_limbs(&t)
    }

    /// `q = a / b` and `r = a mod b`.
    pub fn div_rem(
        a: &BigNum,
        b: &BigNum,
        q: &mut BigNum,
        r: &mut BigNum,
    ) -> Result<(), MathError> {
        let (quot, rem) = Self::long_div(a, b)?;
        if limbs::significant_len(&quot) > q.room() || limbs::significant_len(&rem) > r.room() {
            return Err(MathError::OutOfRange);
        }
        q.assign_limbs(&quot)?;
        r.assign_limbs(&rem)
    }

    /// `self = a mod m`
    pub fn set_mod(&mut self, a: &BigNum, m: &BigNum) -> Result<(), MathError> {
        let (_, rem) = Self::long_div(a, m)?;
        self.assign_limbs(&rem)
    }

    /// `self = 2^n`
    pub fn set_pow2(&mut self, n: usize) -> Result<(), MathError> {
        let mut t = vec![0; n / LIMB_BITS + 1];
        t[n / LIMB_BITS] = 1 << (n % LIMB_BITS);
        self.assign_limbs(&t)
    }

    /// `2^n` in a new number of exactly the needed room.
    pub fn pow2(n: usize) -> Result<Self, MathError> {
        let mut r = Self::new(n / LIMB_BITS + 1)?;
        r.set_pow2(n)?;
        Ok(r)
    }

    /// Uniform value in `[lo, hi)`.
    ///
    /// Draws `bits(hi) + 128` random bits, reduces them modulo `hi` and accepts the result if it is
    /// at least `lo`. Gives up with [`MathError::RandMaxIter`] after [`RNG_WATCHDOG`] draws.
    pub fn random_in_range<R: RngCore>(
        lo: &BigNum,
        hi: &BigNum,
        rng: &mut R,
    ) -> Result<Self, MathError> {
        if hi.is_zero() || lo >= hi {
            return Err(MathError::OutOfRange);
        }
        let nbytes = (hi.bit_len() + RAND_EXTRA_BITS + 7) / 8;
        let mut buf = vec![0u8; nbytes];
        let mut draw = BigNum::new(limbs::limbs_for_bits(nbytes * 8))?;
        let mut out = BigNum::new(hi.size())?;
        for _ in 0..RNG_WATCHDOG {
            rng.fill_bytes(&mut buf);
            draw.assign_be_bytes(&buf)?;
            out.set_mod(&draw, hi)?;
            if &out >= lo {
                buf.zeroize();
                draw.zeroize();
                return Ok(out);
            }
        }
        buf.zeroize();
        Err(MathError::RandMaxIter)
    }

    /// Bitwise restoring division. Returns the quotient and remainder limbs, not normalized.
    fn long_div(a: &BigNum, b: &BigNum) -> Result<(Vec<Limb>, Vec<Limb>), MathError> {
        if b.is_zero() {
            return Err(MathError::DivideByZero);
        }
        if a < b {
            return Ok((vec![0], a.limbs().to_vec()));
        }
        let mut quot = vec![0; a.size];
        // one spare limb: the running remainder is < 2b right after the shift
        let mut rem = vec![0; b.size + 1];
        for i in (0..a.bit_len()).rev() {
            limbs::shl1(&mut rem);
            rem[0] |= a.bit(i) as Limb;
            if limbs::cmp(&rem, b.limbs()) != Ordering::Less {
                limbs::sub_assign(&mut rem, b.limbs());
                quot[i / LIMB_BITS] |= 1 << (i % LIMB_BITS);
            }
        }
        Ok((quot, rem))
    }

    fn assign_be_bytes(&mut self, bytes: &[u8]) -> Result<(), MathError> {
        let tmp = Self::from_be_bytes(bytes, self.room())?;
        self.assign_limbs(tmp.limbs())
    }

    /// Copies `src` into the destination if its significant part fits.
    pub(crate) fn assign_limbs(&mut self, src: &[Limb]) -> Result<(), MathError> {
        let len = limbs::significant_len(src);
        if len > self.room() {
            return Err(MathError::OutOfRange);
        }
        for (i, l) in self.limbs.iter_mut().enumerate() {
            *l = if i < len { src[i] } else { 0 };
        }
        self.size = len;
        Ok(())
    }

    /// Takes ownership of `limbs` as the full buffer; room is its length. `limbs` must not be empty.
    pub(crate) fn from_raw(limbs: Vec<Limb>) -> Self {
        let mut n = Self { limbs, size: 1 };
        if n.limbs.is_empty() {
            n.limbs.push(0);
        }
        n.normalize();
        n
    }

    fn normalize(&mut self) {
        self.size = limbs::significant_len(&self.limbs);
    }
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        self.limbs() == other.limbs()
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> Ordering {
        limbs::cmp(self.limbs(), other.limbs())
    }
}

impl fmt::Debug for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigNum(0x")?;
        for (i, l) in self.limbs().iter().rev().enumerate() {
            if i == 0 {
                write!(f, "{:x}", l)?;
            } else {
                write!(f, "{:016x}", l)?;
            }
        }
        write!(f, ", room {})", self.room())
    }
}
