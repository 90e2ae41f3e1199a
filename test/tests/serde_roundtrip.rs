//! Round-trip properties for every wire primitive: deserialize(serialize(v))
//! must reproduce v exactly, consuming every encoded byte.

use proptest::prelude::*;

use tether_serde::{ByteReader, ByteWriter, Serde};

fn round_trip<T: Serde + PartialEq + std::fmt::Debug>(value: &T) {
    let mut writer = ByteWriter::new();
    value.ser(&mut writer).unwrap();

    let bytes = writer.to_bytes();
    let mut reader = ByteReader::new(&bytes);
    let read = T::de(&mut reader).unwrap();

    assert_eq!(*value, read);
    assert_eq!(reader.remaining(), 0);
}

proptest! {
    #[test]
    fn bytes_round_trip(value in any::<u8>()) {
        round_trip(&value);
    }

    #[test]
    fn bools_round_trip(value in any::<bool>()) {
        round_trip(&value);
    }

    #[test]
    fn u16s_round_trip(value in any::<u16>()) {
        round_trip(&value);
    }

    #[test]
    fn i32s_round_trip(value in any::<i32>()) {
        round_trip(&value);
    }

    #[test]
    fn i64s_round_trip(value in any::<i64>()) {
        round_trip(&value);
    }

    #[test]
    fn f32s_round_trip(value in any::<f32>()) {
        // NaN payloads must survive bit-exactly even though NaN != NaN
        let mut writer = ByteWriter::new();
        value.ser(&mut writer).unwrap();
        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        let read = f32::de(&mut reader).unwrap();
        prop_assert_eq!(value.to_bits(), read.to_bits());
    }

    #[test]
    fn f64s_round_trip(value in any::<f64>()) {
        let mut writer = ByteWriter::new();
        value.ser(&mut writer).unwrap();
        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        let read = f64::de(&mut reader).unwrap();
        prop_assert_eq!(value.to_bits(), read.to_bits());
    }

    #[test]
    fn strings_round_trip(value in ".{0,256}") {
        round_trip(&value);
    }

    #[test]
    fn payloads_round_trip(value in proptest::collection::vec(any::<u8>(), 0..512)) {
        round_trip(&value);
    }

    /// Positional encoding: heterogeneous field sequences decode in
    /// written order
    #[test]
    fn field_sequences_round_trip(
        a in any::<u16>(),
        b in ".{0,64}",
        c in any::<i32>(),
        d in any::<bool>(),
    ) {
        let mut writer = ByteWriter::new();
        a.ser(&mut writer).unwrap();
        b.ser(&mut writer).unwrap();
        c.ser(&mut writer).unwrap();
        d.ser(&mut writer).unwrap();

        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        prop_assert_eq!(u16::de(&mut reader).unwrap(), a);
        prop_assert_eq!(String::de(&mut reader).unwrap(), b);
        prop_assert_eq!(i32::de(&mut reader).unwrap(), c);
        prop_assert_eq!(bool::de(&mut reader).unwrap(), d);
        prop_assert_eq!(reader.remaining(), 0);
    }
}
