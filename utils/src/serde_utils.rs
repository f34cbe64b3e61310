//! Serde adapters for values that only implement arkworks' canonical serialization.
//!
//! Use with `serde_with`: `#[serde_as(as = "ArkObjectBytes")]` on a field, or
//! `#[serde_as(as = "Vec<ArkObjectBytes>")]` on a list.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DeserializeAs, SerializeAs};

/// Compressed canonical bytes of an arkworks object, serialized as a byte sequence.
pub struct ArkObjectBytes;

impl<T: CanonicalSerialize> SerializeAs<T> for ArkObjectBytes {
    fn serialize_as<S: Serializer>(x: &T, serializer: S) -> Result<S::Ok, S::Error> {
        let mut bytes = Vec::with_capacity(x.compressed_size());
        x.serialize_compressed(&mut bytes)
            .map_err(serde::ser::Error::custom)?;
        Serialize::serialize(&bytes, serializer)
    }
}

impl<'de, T: CanonicalDeserialize> DeserializeAs<'de, T> for ArkObjectBytes {
    fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        T::deserialize_compressed(bytes.as_slice()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Fr, G1Affine};
    use ark_ec::AffineRepr;
    use serde_with::serde_as;

    #[serde_as]
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde_as(as = "ArkObjectBytes")]
        scalar: Fr,
        #[serde_as(as = "Vec<ArkObjectBytes>")]
        points: Vec<G1Affine>,
    }

    #[test]
    fn json_round_trip() {
        let h = Holder {
            scalar: Fr::from(42u64),
            points: vec![G1Affine::generator(), G1Affine::identity()],
        };
        let s = serde_json::to_string(&h).unwrap();
        assert_eq!(serde_json::from_str::<Holder>(&s).unwrap(), h);
    }
}
