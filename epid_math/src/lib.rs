#![cfg_attr(not(feature = "std"), no_std)]

//! # Arithmetic engine for EPID
//!
//! Everything here works on fixed-size numbers whose capacity is decided up front:
//!
//! 1. [`bignum::BigNum`], an unsigned integer with a fixed limb capacity ("room") and a tracked
//!    significant length ("size"). Operations write into caller-owned destinations and fail rather
//!    than grow.
//! 2. [`montgomery::Montgomery`], a context for an odd modulus with the usual precomputed constants
//!    and an exponentiation strategy fixed at construction, either fast or constant-time in the
//!    exponent.
//! 3. [`ecc`], prime-field and Jacobian point arithmetic over the named curves secp128r1, P-192,
//!    P-256 and P-384. Each curve gets a dedicated reduction for its prime, with Montgomery
//!    reduction as the fallback, and scalar multiplication uses either a plain window or a
//!    scrambled, fully-scanned table for secret scalars.
//! 4. [`ecdsa`] over those curves, used to authenticate EPID issuer files.

extern crate alloc;

pub mod bignum;
pub mod ecc;
pub mod ecdsa;
pub mod error;
mod limbs;
pub mod montgomery;

pub use bignum::BigNum;
pub use error::MathError;
