//! Scalar multiplication in G1 and G2, and exponentiation in GT, for secret scalars.
//!
//! Fixed 4-bit windows: each of the 64 windows doubles four times and adds one table entry, and
//! that entry is found by reading the whole table and masking with [`subtle`]. The table holds the
//! multiples `16·P .. 31·P` rather than `0·P .. 15·P`, so no addition after the first one has the
//! identity as an operand. Every window therefore adds `16·16^i` more than the scalar asks for,
//! and that public offset is taken off at the end.
//!
//! The arkworks `*` operators remain in use for public scalars; they skip leading zeros and add
//! only on set bits.

use crate::groups::Gt;
use ark_bls12_381::{g1, g2, Fq, Fq12, Fq2, Fq6, Fr, G1Projective, G2Projective};
use ark_ec::short_weierstrass::Projective;
use ark_ec::{pairing::PairingOutput, AffineRepr, Group};
use ark_ff::{BigInt, PrimeField, Zero};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

const WINDOW: usize = 4;
const ENTRIES: usize = 1 << WINDOW;
/// Enough windows for a 256-bit scalar.
const WINDOWS: usize = 256 / WINDOW;

/// Branch-free choice between two values, `b` when `choice` is set.
pub trait CtSelect: Sized {
    fn ct_select(a: &Self, b: &Self, choice: Choice) -> Self;
}

impl CtSelect for Fq {
    fn ct_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut limbs = [0u64; 6];
        for (i, l) in limbs.iter_mut().enumerate() {
            *l = u64::conditional_select(&(a.0).0[i], &(b.0).0[i], choice);
        }
        // both inputs are in Montgomery form, and so is any mix of their limbs taken whole
        Fq::new_unchecked(BigInt::new(limbs))
    }
}

impl CtSelect for Fq2 {
    fn ct_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fq2::new(
            Fq::ct_select(&a.c0, &b.c0, choice),
            Fq::ct_select(&a.c1, &b.c1, choice),
        )
    }
}

impl CtSelect for Fq6 {
    fn ct_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fq6::new(
            Fq2::ct_select(&a.c0, &b.c0, choice),
            Fq2::ct_select(&a.c1, &b.c1, choice),
            Fq2::ct_select(&a.c2, &b.c2, choice),
        )
    }
}

impl CtSelect for Fq12 {
    fn ct_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fq12::new(
            Fq6::ct_select(&a.c0, &b.c0, choice),
            Fq6::ct_select(&a.c1, &b.c1, choice),
        )
    }
}

impl CtSelect for Projective<g1::Config> {
    fn ct_select(a: &Self, b: &Self, choice: Choice) -> Self {
        G1Projective::new_unchecked(
            Fq::ct_select(&a.x, &b.x, choice),
            Fq::ct_select(&a.y, &b.y, choice),
            Fq::ct_select(&a.z, &b.z, choice),
        )
    }
}

impl CtSelect for Projective<g2::Config> {
    fn ct_select(a: &Self, b: &Self, choice: Choice) -> Self {
        G2Projective::new_unchecked(
            Fq2::ct_select(&a.x, &b.x, choice),
            Fq2::ct_select(&a.y, &b.y, choice),
            Fq2::ct_select(&a.z, &b.z, choice),
        )
    }
}

impl CtSelect for Gt {
    fn ct_select(a: &Self, b: &Self, choice: Choice) -> Self {
        PairingOutput(Fq12::ct_select(&a.0, &b.0, choice))
    }
}

/// Entry `digit` of `table`, having touched every entry.
fn select<G: CtSelect + Copy>(table: &[G; ENTRIES], digit: u64) -> G {
    let mut out = table[0];
    for (i, entry) in table.iter().enumerate().skip(1) {
        out = G::ct_select(&out, entry, (i as u64).ct_eq(&digit));
    }
    out
}

/// `sum_{i < WINDOWS} ENTRIES^(i+1) mod r`, what the shifted table adds on top of the scalar.
fn table_offset() -> Fr {
    let step = Fr::from(ENTRIES as u64);
    let mut power = step;
    let mut sum = Fr::zero();
    for _ in 0..WINDOWS {
        sum += power;
        power *= step;
    }
    sum
}

/// `k·P`, with the same sequence of group operations for every `k`.
pub fn mul<G: Group<ScalarField = Fr> + CtSelect>(p: &G, k: &Fr) -> G {
    let mut table = [*p; ENTRIES];
    for _ in 0..WINDOW {
        table[0].double_in_place();
    }
    for i in 1..ENTRIES {
        table[i] = table[i - 1] + p;
    }

    let mut limbs = k.into_bigint().0;
    let mut acc = G::zero();
    for win in (0..WINDOWS).rev() {
        for _ in 0..WINDOW {
            acc.double_in_place();
        }
        let pos = win * WINDOW;
        let digit = (limbs[pos / 64] >> (pos % 64)) & (ENTRIES as u64 - 1);
        acc += select(&table, digit);
    }
    limbs.zeroize();
    acc - *p * table_offset()
}

/// [`mul`] on an affine point.
pub fn affine_mul<A>(p: &A, k: &Fr) -> A::Group
where
    A: AffineRepr<ScalarField = Fr>,
    A::Group: CtSelect,
{
    mul(&p.into_group(), k)
}

/// `prod_i bases[i]^exps[i]` for secret exponents.
pub fn gt_multi_exp(bases: &[Gt], exps: &[Fr]) -> Gt {
    bases
        .iter()
        .zip(exps.iter())
        .fold(Gt::zero(), |acc, (b, e)| acc + mul(b, e))
}
