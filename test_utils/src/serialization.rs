/// Round trips `$obj` through every encoding an EPID structure has: the fixed big-endian wire
/// format of [`epid_utils::BeEncode`]/[`epid_utils::BeDecode`], both arkworks forms, JSON and
/// MessagePack. The calling crate must depend on `epid_utils`.
#[macro_export]
macro_rules! test_serialization {
    (@ark_serde $obj_type:ty, $obj: expr) => {
        let mut serz = vec![];
        CanonicalSerialize::serialize_compressed(&$obj, &mut serz).unwrap();
        let deserz: $obj_type = CanonicalDeserialize::deserialize_compressed(&serz[..]).unwrap();
        assert_eq!(deserz, $obj);

        let mut serz = vec![];
        $obj.serialize_uncompressed(&mut serz).unwrap();
        let deserz: $obj_type = CanonicalDeserialize::deserialize_uncompressed(&serz[..]).unwrap();
        assert_eq!(deserz, $obj);

        let ser = serde_json::to_string(&$obj).unwrap();
        let deser = serde_json::from_str::<$obj_type>(&ser).unwrap();
        assert_eq!($obj, deser);

        let ser = rmp_serde::to_vec_named(&$obj).unwrap();
        let deser = rmp_serde::from_slice::<$obj_type>(&ser).unwrap();
        assert_eq!($obj, deser);
    };
    ($obj_type:ty, $obj: expr) => {
        // Wire format: exactly `encoded_size` bytes, and a decoder that takes all of them
        let wire = epid_utils::BeEncode::to_be_bytes(&$obj);
        println!("Encoded byte size: {}", wire.len());
        assert_eq!(wire.len(), epid_utils::BeEncode::encoded_size(&$obj));
        let decoded = <$obj_type as epid_utils::BeDecode>::from_be_bytes(&wire).unwrap();
        assert_eq!(decoded, $obj);
        assert_eq!(epid_utils::BeEncode::to_be_bytes(&decoded), wire);

        let mut longer = wire.clone();
        longer.push(0);
        assert!(<$obj_type as epid_utils::BeDecode>::from_be_bytes(&longer).is_err());
        assert!(
            <$obj_type as epid_utils::BeDecode>::from_be_bytes(&wire[..wire.len() - 1]).is_err()
        );

        $crate::test_serialization!(@ark_serde $obj_type, $obj);
    };
}
