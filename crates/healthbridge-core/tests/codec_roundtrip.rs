//! Property tests for the sample codec.

use chrono::{DateTime, Duration, TimeZone, Utc};
use healthbridge_core::codec::{export_wire, import_wire};
use healthbridge_core::{CategoryTypeId, MetricType, Quantity, QuantityTypeId, Sample};
use proptest::prelude::*;

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2040-01-01, with sub-second precision
    (946_684_800i64..2_208_988_800i64, 0u32..1_000_000_000u32)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
}

fn any_year_instant() -> impl Strategy<Value = DateTime<Utc>> {
    // 0000-01-01 .. 9999-12-30
    (-62_167_219_200i64..253_402_128_000i64, 0u32..1_000_000_000u32)
        .prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
}

fn quantity_metric() -> impl Strategy<Value = QuantityTypeId> {
    proptest::sample::select(QuantityTypeId::ALL.to_vec())
}

fn quantity_sample() -> impl Strategy<Value = Sample> {
    (quantity_metric(), 0.0f64..1.0e6, timestamp(), 0i64..86_400).prop_map(
        |(id, value, start, secs)| {
            let unit = id.canonical_unit();
            Sample::quantity(
                MetricType::Quantity(id),
                Quantity::new(value, unit),
                start,
                start + Duration::seconds(secs),
            )
            .unwrap()
        },
    )
}

fn category_sample() -> impl Strategy<Value = Sample> {
    (0i64..6, timestamp(), 0i64..43_200).prop_map(|(value, start, secs)| {
        Sample::category(
            MetricType::Category(CategoryTypeId::SleepAnalysis),
            value,
            start,
            start + Duration::seconds(secs),
        )
        .unwrap()
    })
}

fn any_sample() -> impl Strategy<Value = Sample> {
    prop_oneof![quantity_sample(), category_sample()]
}

proptest! {
    #[test]
    fn decode_of_encode_preserves_sample(sample in any_sample()) {
        let wire = export_wire(std::slice::from_ref(&sample)).unwrap();
        let decoded = import_wire(&wire).unwrap();

        prop_assert_eq!(decoded.len(), 1);
        let back = &decoded[0];
        prop_assert_eq!(back.metric(), sample.metric());
        prop_assert_eq!(back.start(), sample.start());
        prop_assert_eq!(back.end(), sample.end());
        prop_assert_eq!(back.category_value(), sample.category_value());
        match (back.quantity_value(), sample.quantity_value()) {
            (Some(a), Some(b)) => {
                prop_assert_eq!(a.unit, b.unit);
                prop_assert!((a.value - b.value).abs() <= 1e-9 * b.value.abs().max(1.0));
            }
            (None, None) => {}
            _ => prop_assert!(false, "payload kind changed"),
        }
    }

    #[test]
    fn four_digit_years_survive_round_trip(start in any_year_instant(), secs in 0i64..86_400) {
        let sample = Sample::category(
            MetricType::Category(CategoryTypeId::SleepAnalysis),
            1,
            start,
            start + Duration::seconds(secs),
        )
        .unwrap();
        let decoded = import_wire(&export_wire(&[sample.clone()]).unwrap()).unwrap();
        prop_assert_eq!(decoded[0].start(), sample.start());
        prop_assert_eq!(decoded[0].end(), sample.end());
    }

    #[test]
    fn encoding_is_deterministic(batch in proptest::collection::vec(any_sample(), 0..8)) {
        prop_assert_eq!(export_wire(&batch).unwrap(), export_wire(&batch).unwrap());
    }

    #[test]
    fn arbitrary_text_never_panics(text in ".{0,64}") {
        let _ = import_wire(&text);
    }
}
