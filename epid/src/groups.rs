//! G1, G2 and GT of the BLS12-381 instantiation, with the fixed big-endian codecs every EPID
//! structure is built from.
//!
//! The pairing itself is taken from `ark-bls12-381` as is. GT is written additively by arkworks,
//! so the product of two GT elements is `a + b` and exponentiation is `a * e`.

use crate::error::EpidError;
use ark_bls12_381::{Bls12_381, Fq, Fq12, Fq2, Fq6, Fr, G1Affine, G2Affine};
use ark_ec::{
    pairing::{Pairing, PairingOutput},
    AffineRepr,
};
use ark_ff::{BigInteger, Field, One, PrimeField, Zero};
use ark_std::{rand::RngCore, vec::Vec};
use epid_math::BigNum;
use epid_utils::{ByteReader, ByteWriter};

pub type Gt = PairingOutput<Bls12_381>;

/// Encoded sizes.
pub const FP_SIZE: usize = 32;
pub const FQ_SIZE: usize = 48;
pub const G1_SIZE: usize = 2 * FQ_SIZE;
pub const G2_SIZE: usize = 4 * FQ_SIZE;
pub const GT_SIZE: usize = 12 * FQ_SIZE;

pub fn pairing(p: &G1Affine, q: &G2Affine) -> Gt {
    Bls12_381::pairing(*p, *q)
}

/// `prod_i bases[i]^exps[i]` for public exponents; [`crate::ct::gt_multi_exp`] for secret ones.
pub fn gt_multi_exp(bases: &[Gt], exps: &[Fr]) -> Gt {
    bases
        .iter()
        .zip(exps.iter())
        .fold(Gt::zero(), |acc, (b, e)| acc + *b * *e)
}

/// The group order `r` as a number, i.e. the modulus of [`Fr`].
pub fn order() -> Result<BigNum, EpidError> {
    Ok(BigNum::from_be_bytes(
        &Fr::MODULUS.to_bytes_be(),
        FP_SIZE / 8,
    )?)
}

/// The base field modulus `q`.
pub fn base_modulus() -> Result<BigNum, EpidError> {
    Ok(BigNum::from_be_bytes(
        &Fq::MODULUS.to_bytes_be(),
        FQ_SIZE / 8,
    )?)
}

/// Uniform non-zero scalar, drawn by rejection with a bounded number of attempts.
pub fn random_fp<R: RngCore>(rng: &mut R) -> Result<Fr, EpidError> {
    let one = BigNum::from_u64(1, 1)?;
    let v = BigNum::random_in_range(&one, &order()?, rng)?;
    fp_from_bignum(&v)
}

/// `v` must already be below `r`.
pub fn fp_from_bignum(v: &BigNum) -> Result<Fr, EpidError> {
    Ok(Fr::from_be_bytes_mod_order(&v.to_be_bytes(FP_SIZE)?))
}

pub fn fq_from_bignum(v: &BigNum) -> Result<Fq, EpidError> {
    Ok(Fq::from_be_bytes_mod_order(&v.to_be_bytes(FQ_SIZE)?))
}

/// Strict decoding: the value must be below the modulus.
fn field_from_be<F: PrimeField>(bytes: &[u8]) -> Result<F, EpidError> {
    let f = F::from_be_bytes_mod_order(bytes);
    if f.into_bigint().to_bytes_be() != bytes {
        return Err(EpidError::BadArg);
    }
    Ok(f)
}

pub fn fp_to_bytes(f: &Fr) -> Vec<u8> {
    f.into_bigint().to_bytes_be()
}

pub fn fq_to_bytes(f: &Fq) -> Vec<u8> {
    f.into_bigint().to_bytes_be()
}

pub fn g1_to_bytes(p: &G1Affine) -> Vec<u8> {
    let mut w = ByteWriter::with_capacity(G1_SIZE);
    write_g1(&mut w, p);
    w.into_inner()
}

pub fn g2_to_bytes(p: &G2Affine) -> Vec<u8> {
    let mut w = ByteWriter::with_capacity(G2_SIZE);
    write_g2(&mut w, p);
    w.into_inner()
}

pub fn gt_to_bytes(e: &Gt) -> Vec<u8> {
    let mut w = ByteWriter::with_capacity(GT_SIZE);
    write_gt(&mut w, e);
    w.into_inner()
}

pub fn read_fp(r: &mut ByteReader<'_>) -> Result<Fr, EpidError> {
    field_from_be(r.take(FP_SIZE)?)
}

pub fn write_fp(w: &mut ByteWriter, f: &Fr) {
    w.put(&fp_to_bytes(f));
}

pub fn read_fq(r: &mut ByteReader<'_>) -> Result<Fq, EpidError> {
    field_from_be(r.take(FQ_SIZE)?)
}

pub fn write_fq(w: &mut ByteWriter, f: &Fq) {
    w.put(&fq_to_bytes(f));
}

/// `x || y`; all zero bytes encode the identity. Anything else must be on the curve and in the
/// prime order subgroup.
pub fn read_g1(r: &mut ByteReader<'_>) -> Result<G1Affine, EpidError> {
    if r.rest().len() >= G1_SIZE && r.rest()[..G1_SIZE].iter().all(|b| *b == 0) {
        r.take(G1_SIZE)?;
        return Ok(G1Affine::identity());
    }
    let x = read_fq(r)?;
    let y = read_fq(r)?;
    let p = G1Affine::new_unchecked(x, y);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(EpidError::BadArg);
    }
    Ok(p)
}

pub fn write_g1(w: &mut ByteWriter, p: &G1Affine) {
    if p.infinity {
        w.put(&[0u8; G1_SIZE]);
    } else {
        write_fq(w, &p.x);
        write_fq(w, &p.y);
    }
}

/// `x.c0 || x.c1 || y.c0 || y.c1`, same conventions as [`read_g1`].
pub fn read_g2(r: &mut ByteReader<'_>) -> Result<G2Affine, EpidError> {
    if r.rest().len() >= G2_SIZE && r.rest()[..G2_SIZE].iter().all(|b| *b == 0) {
        r.take(G2_SIZE)?;
        return Ok(G2Affine::identity());
    }
    let x = Fq2::new(read_fq(r)?, read_fq(r)?);
    let y = Fq2::new(read_fq(r)?, read_fq(r)?);
    let p = G2Affine::new_unchecked(x, y);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(EpidError::BadArg);
    }
    Ok(p)
}

pub fn write_g2(w: &mut ByteWriter, p: &G2Affine) {
    if p.infinity {
        w.put(&[0u8; G2_SIZE]);
    } else {
        for c in [&p.x.c0, &p.x.c1, &p.y.c0, &p.y.c1] {
            write_fq(w, c);
        }
    }
}

/// The twelve base field coefficients in tower order, each checked to be below `q`. The element
/// must lie in the order `r` subgroup of `Fq12*`, i.e. `x^r = 1`.
pub fn read_gt(r: &mut ByteReader<'_>) -> Result<Gt, EpidError> {
    let mut fq2 = || -> Result<Fq2, EpidError> { Ok(Fq2::new(read_fq(r)?, read_fq(r)?)) };
    let c0 = Fq6::new(fq2()?, fq2()?, fq2()?);
    let c1 = Fq6::new(fq2()?, fq2()?, fq2()?);
    let x = Fq12::new(c0, c1);
    if x.is_zero() || !x.pow(Fr::MODULUS).is_one() {
        return Err(EpidError::BadArg);
    }
    Ok(PairingOutput(x))
}

pub fn write_gt(w: &mut ByteWriter, e: &Gt) {
    let f = &e.0;
    for c6 in [&f.c0, &f.c1] {
        for c2 in [&c6.c0, &c6.c1, &c6.c2] {
            write_fq(w, &c2.c0);
            write_fq(w, &c2.c1);
        }
    }
}
