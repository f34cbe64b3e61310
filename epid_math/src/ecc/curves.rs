//! Domain parameters of the supported short Weierstrass curves `y² = x³ + ax + b`.
//!
//! All four have `a = -3` and cofactor 1.

use super::{
    field::{FieldElement, PrimeField, Reduction},
    point::EcPoint,
};
use crate::{bignum::BigNum, error::MathError};
use ark_std::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamedCurve {
    Secp128r1,
    P192,
    P256,
    P384,
}

struct Params {
    p: &'static str,
    b: &'static str,
    gx: &'static str,
    gy: &'static str,
    n: &'static str,
    reduction: Reduction,
}

impl NamedCurve {
    pub const ALL: [NamedCurve; 4] = [
        NamedCurve::Secp128r1,
        NamedCurve::P192,
        NamedCurve::P256,
        NamedCurve::P384,
    ];

    fn params(self) -> Params {
        match self {
            NamedCurve::Secp128r1 => Params {
                p: "FFFFFFFDFFFFFFFFFFFFFFFFFFFFFFFF",
                b: "E87579C11079F43DD824993C2CEE5ED3",
                gx: "161FF7528B899B2D0C28607CA52C5B86",
                gy: "CF5AC8395BAFEB13C02DA292DDED7A83",
                n: "FFFFFFFE0000000075A30D1B9038A115",
                reduction: Reduction::Secp128r1,
            },
            NamedCurve::P192 => Params {
                p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFFFFFFFFFF",
                b: "64210519E59C80E70FA7E9AB72243049FEB8DEECC146B9B1",
                gx: "188DA80EB03090F67CBF20EB43A18800F4FF0AFD82FF1012",
                gy: "07192B95FFC8DA78631011ED6B24CDD573F977A11E794811",
                n: "FFFFFFFFFFFFFFFFFFFFFFFF99DEF836146BC9B1B4D22831",
                reduction: Reduction::P192,
            },
            NamedCurve::P256 => Params {
                p: "FFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFF",
                b: "5AC635D8AA3A93E7B3EBBD55769886BC651D06B0CC53B0F63BCE3C3E27D2604B",
                gx: "6B17D1F2E12C4247F8BCE6E563A440F277037D812DEB33A0F4A13945D898C296",
                gy: "4FE342E2FE1A7F9B8EE7EB4A7C0F9E162BCE33576B315ECECBB6406837BF51F5",
                n: "FFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551",
                reduction: Reduction::P256,
            },
            NamedCurve::P384 => Params {
                p: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFFFF0000000000000000FFFFFFFF",
                b: "B3312FA7E23EE7E4988E056BE3F82D19181D9C6EFE8141120314088F5013875AC656398D8A2ED19D2A85C8EDD3EC2AEF",
                gx: "AA87CA22BE8B05378EB1C71EF320AD746E1D3B628BA79B9859F741E082542A385502F25DBF55296C3A545E3872760AB7",
                gy: "3617DE4A96262C6F5D9E98BF9292DC29F8F41DBD289A147CE9DA3113B5F0B8C00A60B1CE1D7E819D7A431D7C90EA0E5F",
                n: "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFC7634D81F4372DDF581A0DB248B0A77AECEC196ACCC52973",
                reduction: Reduction::Montgomery,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Curve {
    name: NamedCurve,
    field: PrimeField,
    pub(crate) a: FieldElement,
    pub(crate) b: FieldElement,
    generator: EcPoint,
    order: BigNum,
}

impl Curve {
    /// The curve with its dedicated field reduction.
    pub fn new(name: NamedCurve) -> Result<Self, MathError> {
        let reduction = name.params().reduction;
        Self::with_reduction(name, reduction)
    }

    /// The curve with its field reduced by the given method, e.g. [`Reduction::Montgomery`] to
    /// bypass the named-prime shortcut.
    pub fn with_reduction(name: NamedCurve, reduction: Reduction) -> Result<Self, MathError> {
        let params = name.params();
        let field = PrimeField::new(&from_hex(params.p)?, reduction)?;
        let a = field.neg(&field.from_u64(3));
        let b = field.from_be_bytes(&from_hex(params.b)?)?;
        let order_bytes = from_hex(params.n)?;
        let order = BigNum::from_be_bytes(&order_bytes, field.len())?;
        let mut curve = Self {
            name,
            a,
            b,
            generator: EcPoint::identity(&field),
            order,
            field,
        };
        let gx = from_hex(params.gx)?;
        let gy = from_hex(params.gy)?;
        curve.generator = curve.point_from_affine(&gx, &gy)?;
        Ok(curve)
    }

    pub fn name(&self) -> NamedCurve {
        self.name
    }

    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    pub fn generator(&self) -> &EcPoint {
        &self.generator
    }

    /// Order of the generator, which is also the group order.
    pub fn order(&self) -> &BigNum {
        &self.order
    }

    /// Width of an encoded coordinate; a point encodes as two of them.
    pub fn coordinate_size(&self) -> usize {
        self.field.byte_len()
    }

    /// Width of an encoded scalar, which for these curves equals [`Self::coordinate_size`].
    pub fn scalar_size(&self) -> usize {
        (self.order.bit_len() + 7) / 8
    }

    /// `p || a || b || gx || gy || n`, each [`Self::coordinate_size`] bytes.
    pub fn domain_to_bytes(&self) -> Result<Vec<u8>, MathError> {
        let f = &self.field;
        let width = self.coordinate_size();
        let mut out = f.modulus().to_be_bytes(width)?;
        out.extend_from_slice(&f.to_be_bytes(&self.a));
        out.extend_from_slice(&f.to_be_bytes(&self.b));
        out.extend_from_slice(&self.point_to_bytes(&self.generator)?);
        out.extend_from_slice(&self.order.to_be_bytes(width)?);
        Ok(out)
    }
}

fn from_hex(s: &str) -> Result<Vec<u8>, MathError> {
    let digit = |c: u8| match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(MathError::InvalidEncoding),
    };
    let s = s.as_bytes();
    if s.len() % 2 != 0 {
        return Err(MathError::InvalidEncoding);
    }
    s.chunks(2)
        .map(|pair| Ok((digit(pair[0])? << 4) | digit(pair[1])?))
        .collect()
}
