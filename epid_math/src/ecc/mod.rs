//! Prime-field elliptic-curve arithmetic over a few named curves.
//!
//! - [`field`]: elements on fixed `[u64; 6]` storage, with a reduction chosen per prime
//! - `reduce`: the named-prime folds and the Montgomery fallback
//! - [`curves`]: domain parameters
//! - [`point`]: Jacobian points, complete addition and window/scrambled scalar multiplication
//!
//! Points can only enter through [`Curve::point_from_affine`] or [`Curve::point_from_bytes`],
//! which check the curve equation; arithmetic on anything else is not defined.

pub mod curves;
pub mod field;
pub mod point;
mod reduce;

pub use curves::{Curve, NamedCurve};
pub use field::{FieldElement, PrimeField, Reduction};
pub use point::{optimal_window_size, EcPoint, ScalarMulMethod};
