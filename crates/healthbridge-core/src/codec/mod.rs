//! Encoding/decoding between native samples and wire records.
//!
//! This is the only place that knows how a metric's value is written out:
//! quantities are expressed in the canonical unit of their type, category
//! codes are copied verbatim, metadata values are flattened to strings, and
//! types are named by their host-prefixed raw identifier.

pub mod record;
pub mod wire;


pub use record::SampleRecord;
pub use wire::{decode_wire, encode_wire};

use tracing::debug;

use crate::catalog::{self, MetricType};
use crate::error::BridgeError;
use crate::sample::{Metadata, MetadataValue, Sample, SamplePayload};
use crate::units::{Quantity, Unit};

// ============================================================================
// Encoding
// ============================================================================

/// Convert one sample to its wire record.
pub fn encode_sample(sample: &Sample) -> Result<SampleRecord, BridgeError> {
    let metric = sample.metric();
    let (quantity, unit, category_value) = match sample.payload() {
        SamplePayload::Quantity(q) => {
            let unit = metric.canonical_unit().unwrap_or(Unit::Count);
            let value = q
                .value_in(unit)
                .map_err(|e| BridgeError::invalid(format!("{metric} sample {}: {e}", sample.uuid())))?;
            if !value.is_finite() {
                return Err(BridgeError::invalid(format!(
                    "{metric} sample {} has a non-finite value",
                    sample.uuid()
                )));
            }
            (Some(value), Some(unit.symbol().to_string()), None)
        }
        SamplePayload::Category(v) => (None, None, Some(*v)),
    };

    let metadata = sample.metadata().map(|m| {
        m.iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    });

    Ok(SampleRecord {
        uuid: sample.uuid(),
        sample_type: metric.raw_identifier(),
        start_date: sample.start(),
        end_date: sample.end(),
        metadata,
        quantity,
        unit,
        category_value,
    })
}

/// Convert samples to wire records, preserving order.
pub fn encode(samples: &[Sample]) -> Result<Vec<SampleRecord>, BridgeError> {
    let records = samples.iter().map(encode_sample).collect::<Result<Vec<_>, _>>()?;
    debug!(count = records.len(), "encoded samples");
    Ok(records)
}

// ============================================================================
// Decoding
// ============================================================================

/// Convert one wire record back into a sample.
///
/// The decoded sample receives a fresh identifier: the store assigns
/// identity on save, so the exported uuid is informational only.
pub fn decode_record(record: &SampleRecord) -> Result<Sample, BridgeError> {
    let metric = catalog::resolve(&record.sample_type).ok_or_else(|| {
        BridgeError::invalid(format!("unknown sample type '{}'", record.sample_type))
    })?;

    let payload = match metric {
        MetricType::Quantity(id) => {
            if record.category_value.is_some() {
                return Err(BridgeError::invalid(format!(
                    "{metric} record must not carry 'categoryValue'"
                )));
            }
            let value = record
                .quantity
                .ok_or_else(|| BridgeError::invalid(format!("{metric} record is missing 'quantity'")))?;
            let unit_str = record
                .unit
                .as_deref()
                .ok_or_else(|| BridgeError::invalid(format!("{metric} record is missing 'unit'")))?;
            let unit = Unit::parse(unit_str).map_err(|e| BridgeError::invalid(e.to_string()))?;
            if !unit.is_compatible_with(id.canonical_unit()) {
                return Err(BridgeError::invalid(format!(
                    "unit '{unit}' is not valid for {metric}"
                )));
            }
            SamplePayload::Quantity(Quantity::new(value, unit))
        }
        MetricType::Category(_) => {
            if record.quantity.is_some() || record.unit.is_some() {
                return Err(BridgeError::invalid(format!(
                    "{metric} record must not carry 'quantity' or 'unit'"
                )));
            }
            let value = record.category_value.ok_or_else(|| {
                BridgeError::invalid(format!("{metric} record is missing 'categoryValue'"))
            })?;
            SamplePayload::Category(value)
        }
    };

    let metadata = record.metadata.as_ref().map(|m| {
        m.iter()
            .map(|(k, v)| (k.clone(), MetadataValue::String(v.clone())))
            .collect::<Metadata>()
    });

    Ok(Sample::new(metric, payload, record.start_date, record.end_date)?.with_metadata(metadata))
}

/// Convert records to samples. Any invalid record fails the whole batch.
pub fn decode(records: &[SampleRecord]) -> Result<Vec<Sample>, BridgeError> {
    let samples = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            decode_record(r).map_err(|e| match e {
                BridgeError::InvalidData(msg) => BridgeError::invalid(format!("record {i}: {msg}")),
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = samples.len(), "decoded records");
    Ok(samples)
}

// ============================================================================
// Composed
// ============================================================================

/// Encode samples straight to a wire string.
pub fn export_wire(samples: &[Sample]) -> Result<String, BridgeError> {
    encode_wire(&encode(samples)?)
}

/// Decode a wire string straight to samples.
pub fn import_wire(wire: &str) -> Result<Vec<Sample>, BridgeError> {
    decode(&decode_wire(wire)?)
}
