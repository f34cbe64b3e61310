/// Product of pairings of the supplied pairs in the target group.
/// ```compile_fail
/// multi_pairing!(using Bls12_381: a, c; b, d)
/// ```
/// expands to `Bls12_381::multi_pairing([a, b], [c, d])`, each side converted to the engine's
/// prepared form. Caller needs `ark_ec` in scope.
#[macro_export]
macro_rules! multi_pairing {
    (using $pairing_engine: path: $($g1: expr, $g2: expr);+) => {
        <$pairing_engine as ark_ec::pairing::Pairing>::multi_pairing(
            [
                $(<<$pairing_engine as ark_ec::pairing::Pairing>::G1Prepared>::from($g1)),+
            ],
            [
                $(<<$pairing_engine as ark_ec::pairing::Pairing>::G2Prepared>::from($g2)),+
            ]
        )
    };
}

/// Implements `BeDecode` for a type whose decoder error converts from `CodecError`, forwarding to an
/// inherent `read_from(&mut ByteReader)` function.
#[macro_export]
macro_rules! impl_be_decode_via {
    ($ty: ty, $err: ty) => {
        impl $crate::codec::BeDecode for $ty {
            type Error = $err;

            fn decode(r: &mut $crate::codec::ByteReader<'_>) -> Result<Self, Self::Error> {
                <$ty>::read_from(r)
            }
        }
    };
}
