//! Wire form of a sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// JSON projection of a [`Sample`](crate::sample::Sample).
///
/// Exactly one of `quantity`+`unit` or `categoryValue` is populated,
/// matching the kind of `sampleType`. Absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRecord {
    pub uuid: Uuid,
    pub sample_type: String,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_value: Option<i64>,
}

/// RFC 3339 on the way out. On the way in, RFC 3339 or a number of seconds
/// since 2001-01-01T00:00:00Z, the reference date on-device encoders use.
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// 2001-01-01T00:00:00Z as Unix seconds.
    const REFERENCE_DATE_UNIX: i64 = 978_307_200;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(f64),
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| D::Error::custom(format!("invalid timestamp '{s}': {e}"))),
            Raw::Seconds(secs) => from_reference_seconds(secs)
                .ok_or_else(|| D::Error::custom(format!("timestamp {secs} out of range"))),
        }
    }

    fn from_reference_seconds(secs: f64) -> Option<DateTime<Utc>> {
        if !secs.is_finite() || secs.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        let whole = secs.floor();
        let mut nanos = ((secs - whole) * 1e9).round() as u32;
        let mut whole = (whole as i64).checked_add(REFERENCE_DATE_UNIX)?;
        if nanos >= 1_000_000_000 {
            whole += 1;
            nanos -= 1_000_000_000;
        }
        DateTime::from_timestamp(whole, nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> SampleRecord {
        SampleRecord {
            uuid: Uuid::nil(),
            sample_type: "stepCount".into(),
            start_date: Utc.with_ymd_and_hms(2024, 11, 21, 8, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 11, 21, 9, 0, 0).unwrap(),
            metadata: None,
            quantity: Some(5000.0),
            unit: Some("count".into()),
            category_value: None,
        }
    }

    #[test]
    fn serializes_camel_case_and_omits_absent_fields() {
        let json = serde_json::to_value(record()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["sampleType"], "stepCount");
        assert_eq!(obj["startDate"], "2024-11-21T08:00:00Z");
        assert_eq!(obj["quantity"], 5000.0);
        assert!(!obj.contains_key("categoryValue"));
        assert!(!obj.contains_key("metadata"));
    }

    #[test]
    fn fractional_seconds_survive_exactly() {
        let mut r = record();
        r.start_date = Utc.timestamp_opt(1_732_176_000, 123_456_789).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("2024-11-21T08:00:00.123456789Z"));
        let back: SampleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.start_date, r.start_date);
    }

    #[test]
    fn accepts_reference_date_seconds_and_offsets() {
        let json = serde_json::json!({
            "uuid": "E621E1F8-C36C-495A-93FC-0C247A3E6E5F",
            "sampleType": "HKCategoryTypeIdentifierSleepAnalysis",
            "startDate": 753868800.5,
            "endDate": "2024-11-21T10:00:00+02:00",
            "categoryValue": 1
        });
        let r: SampleRecord = serde_json::from_value(json).unwrap();
        assert_eq!(r.start_date, Utc.timestamp_opt(1_732_176_000, 500_000_000).unwrap());
        assert_eq!(r.end_date, Utc.with_ymd_and_hms(2024, 11, 21, 8, 0, 0).unwrap());
        assert_eq!(r.category_value, Some(1));
    }

    #[test]
    fn numeric_dates_count_from_2001() {
        let json = serde_json::json!({
            "uuid": Uuid::nil(),
            "sampleType": "HKQuantityTypeIdentifierStepCount",
            "startDate": 753840000.0,
            "endDate": 0,
            "quantity": 1,
            "unit": "count"
        });
        let r: SampleRecord = serde_json::from_value(json).unwrap();
        assert_eq!(r.start_date, Utc.with_ymd_and_hms(2024, 11, 21, 0, 0, 0).unwrap());
        assert_eq!(r.end_date, Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_non_finite_and_huge_numeric_dates() {
        for secs in [f64::MAX, -f64::MAX, 1.0e300] {
            let json = serde_json::json!({
                "uuid": Uuid::nil(),
                "sampleType": "stepCount",
                "startDate": secs,
                "endDate": "2024-11-21T10:00:00Z"
            });
            assert!(serde_json::from_value::<SampleRecord>(json).is_err(), "{secs}");
        }
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let json = serde_json::json!({
            "uuid": Uuid::nil(),
            "sampleType": "stepCount",
            "startDate": "yesterday",
            "endDate": "2024-11-21T10:00:00Z"
        });
        assert!(serde_json::from_value::<SampleRecord>(json).is_err());
    }
}
