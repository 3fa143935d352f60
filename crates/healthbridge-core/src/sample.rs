//! Native sample representation, as held by a health store.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::catalog::{MetricKind, MetricType};
use crate::error::BridgeError;
use crate::units::Quantity;

/// Native metadata value. Only its string form survives export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
    Quantity(Quantity),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => f.write_str(s),
            MetadataValue::Integer(n) => write!(f, "{n}"),
            MetadataValue::Number(n) => write!(f, "{n}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Date(d) => f.write_str(&d.to_rfc3339()),
            MetadataValue::Quantity(q) => write!(f, "{q}"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// The measured value of a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplePayload {
    Quantity(Quantity),
    Category(i64),
}

impl SamplePayload {
    pub fn kind(&self) -> MetricKind {
        match self {
            SamplePayload::Quantity(_) => MetricKind::Quantity,
            SamplePayload::Category(_) => MetricKind::Category,
        }
    }
}

/// Earliest and latest years a sample may fall in. Timestamps in this range
/// render as fixed-width RFC 3339.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

fn year_in_range(value: DateTime<Utc>) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&value.year())
}

fn earliest() -> DateTime<Utc> {
    // 0000-01-01T00:00:00Z
    DateTime::from_timestamp(-62_167_219_200, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn latest() -> DateTime<Utc> {
    // 9999-12-31T23:59:59.999999999Z
    DateTime::from_timestamp(253_402_300_799, 999_999_999).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Pull `value` into the years a sample may occupy.
pub(crate) fn clamp_to_sample_range(value: DateTime<Utc>) -> DateTime<Utc> {
    value.clamp(earliest(), latest())
}

/// One recorded measurement over a time interval.
///
/// Construction checks that the payload kind matches the metric's kind,
/// that the interval is not reversed, and that both ends fall within
/// years 0000 to 9999.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    uuid: Uuid,
    metric: MetricType,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    metadata: Option<Metadata>,
    payload: SamplePayload,
}

impl Sample {
    pub fn new(
        metric: MetricType,
        payload: SamplePayload,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, BridgeError> {
        if payload.kind() != metric.kind() {
            return Err(BridgeError::invalid(format!(
                "{metric} expects a {:?} value",
                metric.kind()
            )));
        }
        if end < start {
            return Err(BridgeError::invalid(format!(
                "{metric} sample ends ({end}) before it starts ({start})"
            )));
        }
        for (label, value) in [("start", start), ("end", end)] {
            if !year_in_range(value) {
                return Err(BridgeError::invalid(format!(
                    "{metric} sample {label} ({value}) is outside years {MIN_YEAR:04}-{MAX_YEAR}"
                )));
            }
        }
        Ok(Self {
            uuid: Uuid::new_v4(),
            metric,
            start,
            end,
            metadata: None,
            payload,
        })
    }

    pub fn quantity(
        metric: MetricType,
        quantity: Quantity,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, BridgeError> {
        Self::new(metric, SamplePayload::Quantity(quantity), start, end)
    }

    pub fn category(
        metric: MetricType,
        value: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, BridgeError> {
        Self::new(metric, SamplePayload::Category(value), start, end)
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn metric(&self) -> MetricType {
        self.metric
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn payload(&self) -> &SamplePayload {
        &self.payload
    }

    pub fn quantity_value(&self) -> Option<&Quantity> {
        match &self.payload {
            SamplePayload::Quantity(q) => Some(q),
            SamplePayload::Category(_) => None,
        }
    }

    pub fn category_value(&self) -> Option<i64> {
        match self.payload {
            SamplePayload::Category(v) => Some(v),
            SamplePayload::Quantity(_) => None,
        }
    }

    /// Move the interval so it ends at `now`, keeping its duration.
    ///
    /// The start is clamped to the first instant of year 0000.
    pub fn shifted_to_end_at(mut self, now: DateTime<Utc>) -> Self {
        let duration = self.duration();
        self.end = now;
        self.start = now
            .checked_sub_signed(duration)
            .filter(|s| year_in_range(*s))
            .unwrap_or_else(earliest);
        self
    }

    /// Whether `[start, end]` overlaps this sample's interval.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start <= end && self.end >= start
    }
}
