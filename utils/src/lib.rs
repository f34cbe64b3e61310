#![cfg_attr(not(feature = "std"), no_std)]

//! Helpers shared by the EPID crates: a big-endian cursor codec used by every binary format and serde
//! adapters for arkworks objects.

#[macro_use]
pub mod macros;
pub mod codec;
pub mod serde_utils;

pub use codec::{BeDecode, BeEncode, ByteReader, ByteWriter, CodecError};
