//! Property tests for the field type codecs.
//!
//! Every scalar codec must round-trip all valid values, and narrower codecs
//! must widen losslessly into wider ones.

use proptest::prelude::*;
use quarry_engine::{
    BooleanType, DoubleType, FieldType, FloatType, IntType, KeywordType, LongType, Range,
    RangeType, TextType, Value,
};

proptest! {
    #[test]
    fn int_round_trip(v in any::<i32>()) {
        prop_assert_eq!(IntType.deserialize(IntType.serialize(&v)).unwrap(), v);
    }

    #[test]
    fn long_round_trip(v in any::<i64>()) {
        prop_assert_eq!(LongType.deserialize(LongType.serialize(&v)).unwrap(), v);
    }

    #[test]
    fn float_round_trip(v in any::<f32>().prop_filter("NaN never equals itself", |v| !v.is_nan())) {
        prop_assert_eq!(FloatType.deserialize(FloatType.serialize(&v)).unwrap(), v);
    }

    #[test]
    fn double_round_trip(v in any::<f64>().prop_filter("NaN never equals itself", |v| !v.is_nan())) {
        prop_assert_eq!(DoubleType.deserialize(DoubleType.serialize(&v)).unwrap(), v);
    }

    #[test]
    fn boolean_round_trip(v in any::<bool>()) {
        prop_assert_eq!(BooleanType.deserialize(BooleanType.serialize(&v)).unwrap(), v);
    }

    #[test]
    fn string_round_trip(v in ".*") {
        prop_assert_eq!(&KeywordType.deserialize(KeywordType.serialize(&v)).unwrap(), &v);
        prop_assert_eq!(&TextType.deserialize(TextType.serialize(&v)).unwrap(), &v);
    }

    #[test]
    fn int_widens_into_long(v in any::<i32>()) {
        prop_assert_eq!(
            LongType.deserialize(IntType.serialize(&v)).unwrap(),
            i64::from(v)
        );
    }

    #[test]
    fn float_widens_into_double(v in any::<f32>().prop_filter("NaN never equals itself", |v| !v.is_nan())) {
        prop_assert_eq!(
            DoubleType.deserialize(FloatType.serialize(&v)).unwrap(),
            f64::from(v)
        );
    }

    #[test]
    fn numeric_strings_parse(v in any::<i32>()) {
        prop_assert_eq!(
            IntType.deserialize(Value::Str(v.to_string())).unwrap(),
            v
        );
    }

    #[test]
    fn out_of_domain_longs_are_rejected(v in any::<i64>().prop_filter(
        "outside the 32-bit domain",
        |v| *v > i64::from(i32::MAX) || *v < i64::from(i32::MIN),
    )) {
        prop_assert!(IntType.deserialize(Value::Int(v)).is_err());
    }

    #[test]
    fn range_round_trip(
        gt in proptest::option::of(any::<i32>()),
        gte in proptest::option::of(any::<i32>()),
        lt in proptest::option::of(any::<i32>()),
        lte in proptest::option::of(any::<i32>()),
    ) {
        let range_type = RangeType(IntType);
        let range = Range { gt, gte, lt, lte };
        prop_assert_eq!(
            range_type.deserialize(range_type.serialize(&range)).unwrap(),
            range
        );
    }
}
