//! Property tests for value marshaling: every variant must survive an
//! encode/decode round trip exactly.

use proptest::prelude::*;
use reg_store::{AccessRights, FromRegValue, RegValue, Registry, ValueType};

proptest! {
    #[test]
    fn prop_text_round_trip(text in "\\PC{0,48}") {
        let (tag, bytes) = RegValue::Text(text.clone()).into_tagged_bytes();
        prop_assert_eq!(tag, ValueType::String);
        prop_assert_eq!(String::from_reg_value(tag, &bytes).unwrap(), text);
    }

    #[test]
    fn prop_text_list_round_trip(items in prop::collection::vec("\\PC{1,16}", 0..6)) {
        let (tag, bytes) = RegValue::TextList(items.clone()).into_tagged_bytes();
        prop_assert_eq!(tag, ValueType::MultiString);
        prop_assert_eq!(Vec::<String>::from_reg_value(tag, &bytes).unwrap(), items);
    }

    #[test]
    fn prop_int32_round_trip(value in any::<i32>(), big_endian in any::<bool>()) {
        let (tag, bytes) = RegValue::Int32 { value, big_endian }.into_tagged_bytes();
        let expected = if big_endian { ValueType::DwordBigEndian } else { ValueType::Dword };
        prop_assert_eq!(tag, expected);
        prop_assert_eq!(i32::from_reg_value(tag, &bytes).unwrap(), value);
    }

    #[test]
    fn prop_int64_round_trip(value in any::<i64>()) {
        let (tag, bytes) = RegValue::Int64(value).into_tagged_bytes();
        prop_assert_eq!(tag, ValueType::Qword);
        prop_assert_eq!(i64::from_reg_value(tag, &bytes).unwrap(), value);
    }

    #[test]
    fn prop_double_round_trip(value in -1.0e12f64..1.0e12) {
        let (tag, bytes) = RegValue::Double(value).into_tagged_bytes();
        prop_assert_eq!(tag, ValueType::Binary);
        prop_assert_eq!(f64::from_reg_value(tag, &bytes).unwrap(), value);
    }

    #[test]
    fn prop_bool_round_trip(value in any::<bool>()) {
        let (tag, bytes) = RegValue::Bool(value).into_tagged_bytes();
        prop_assert_eq!(bool::from_reg_value(tag, &bytes).unwrap(), value);
    }

    #[test]
    fn prop_binary_round_trip(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let (tag, bytes) = RegValue::Binary(data.clone()).into_tagged_bytes();
        prop_assert_eq!(tag, ValueType::Binary);
        prop_assert_eq!(Vec::<u8>::from_reg_value(tag, &bytes).unwrap(), data);
    }

    #[test]
    fn prop_dynamic_decode_matches_typed_decode(text in "\\PC{0,24}") {
        let (tag, bytes) = RegValue::Text(text.clone()).into_tagged_bytes();
        let dynamic = RegValue::from_tagged_bytes(tag, &bytes).unwrap();
        prop_assert_eq!(dynamic, RegValue::Text(text));
    }

    #[test]
    fn prop_store_round_trip(value in any::<i32>(), name in "[a-z]{1,12}") {
        let key = Registry::current_user()
            .create_subkey_with("Software\\prop_store", AccessRights::ALL)
            .unwrap();
        key.set_dword(&name, value, false).unwrap();
        prop_assert_eq!(key.get_value(&name, 0i32).unwrap(), value);
    }
}
