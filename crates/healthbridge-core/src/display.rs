//! Human-readable rendering of samples for list views.

use crate::catalog::{sleep, CategoryTypeId, MetricType, QuantityTypeId};
use crate::sample::{Sample, SamplePayload};
use crate::units::Unit;

/// Short value label, e.g. `5000 steps` or `In Bed`.
pub fn format_value(sample: &Sample) -> String {
    match (sample.metric(), sample.payload()) {
        (MetricType::Quantity(id), SamplePayload::Quantity(q)) => {
            let as_unit = |unit| q.value_in(unit).ok();
            let formatted = match id {
                QuantityTypeId::StepCount => as_unit(Unit::Count).map(|n| format!("{n} steps")),
                QuantityTypeId::DistanceWalkingRunning => {
                    as_unit(Unit::Kilometer).map(|km| format!("{km:.2} kilometers"))
                }
                QuantityTypeId::ActiveEnergyBurned => {
                    as_unit(Unit::Kilocalorie).map(|kcal| format!("{kcal:.1} kilocalories"))
                }
                QuantityTypeId::HeartRate => {
                    as_unit(Unit::CountPerMinute).map(|bpm| format!("{} BPM", bpm.trunc() as i64))
                }
                _ => None,
            };
            formatted.unwrap_or_else(|| q.to_string())
        }
        (MetricType::Category(CategoryTypeId::SleepAnalysis), SamplePayload::Category(v)) => {
            if *v == sleep::IN_BED {
                "In Bed".to_string()
            } else {
                "Asleep".to_string()
            }
        }
        (_, SamplePayload::Category(v)) => format!("Value: {v}"),
        _ => "Unknown Data".to_string(),
    }
}

/// `start - end` in UTC, minute precision.
pub fn format_interval(sample: &Sample) -> String {
    const FMT: &str = "%Y-%m-%d %H:%M";
    format!(
        "{} - {}",
        sample.start().format(FMT),
        sample.end().format(FMT)
    )
}
