//! Static registry of supported health metrics.
//!
//! Metrics are identified by short camelCase identifiers (`stepCount`). The
//! host store's prefixed raw form (`HKQuantityTypeIdentifierStepCount`) is
//! accepted by [`resolve`] as well, so wire strings produced on-device import
//! cleanly.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::units::Unit;

const QUANTITY_PREFIX: &str = "HKQuantityTypeIdentifier";
const CATEGORY_PREFIX: &str = "HKCategoryTypeIdentifier";

/// Payload kind a metric's samples carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Quantity,
    Category,
}

/// Quantity metrics: numeric magnitude plus unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuantityTypeId {
    StepCount,
    DistanceWalkingRunning,
    ActiveEnergyBurned,
    FlightsClimbed,
    DistanceCycling,
    SwimmingStrokeCount,
    PushCount,
    Height,
    BodyMass,
    BodyFatPercentage,
    HeartRate,
    HeartRateVariabilitySdnn,
    RestingHeartRate,
    WalkingHeartRateAverage,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    BodyTemperature,
    OxygenSaturation,
    RespiratoryRate,
}

impl QuantityTypeId {
    pub const ALL: [QuantityTypeId; 19] = [
        Self::StepCount,
        Self::DistanceWalkingRunning,
        Self::ActiveEnergyBurned,
        Self::FlightsClimbed,
        Self::DistanceCycling,
        Self::SwimmingStrokeCount,
        Self::PushCount,
        Self::Height,
        Self::BodyMass,
        Self::BodyFatPercentage,
        Self::HeartRate,
        Self::HeartRateVariabilitySdnn,
        Self::RestingHeartRate,
        Self::WalkingHeartRateAverage,
        Self::BloodPressureSystolic,
        Self::BloodPressureDiastolic,
        Self::BodyTemperature,
        Self::OxygenSaturation,
        Self::RespiratoryRate,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            Self::StepCount => "stepCount",
            Self::DistanceWalkingRunning => "distanceWalkingRunning",
            Self::ActiveEnergyBurned => "activeEnergyBurned",
            Self::FlightsClimbed => "flightsClimbed",
            Self::DistanceCycling => "distanceCycling",
            Self::SwimmingStrokeCount => "swimmingStrokeCount",
            Self::PushCount => "pushCount",
            Self::Height => "height",
            Self::BodyMass => "bodyMass",
            Self::BodyFatPercentage => "bodyFatPercentage",
            Self::HeartRate => "heartRate",
            Self::HeartRateVariabilitySdnn => "heartRateVariabilitySDNN",
            Self::RestingHeartRate => "restingHeartRate",
            Self::WalkingHeartRateAverage => "walkingHeartRateAverage",
            Self::BloodPressureSystolic => "bloodPressureSystolic",
            Self::BloodPressureDiastolic => "bloodPressureDiastolic",
            Self::BodyTemperature => "bodyTemperature",
            Self::OxygenSaturation => "oxygenSaturation",
            Self::RespiratoryRate => "respiratoryRate",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::StepCount => "Step Count",
            Self::DistanceWalkingRunning => "Walking and Running Distance",
            Self::ActiveEnergyBurned => "Active Energy",
            Self::FlightsClimbed => "Flights Climbed",
            Self::DistanceCycling => "Cycling Distance",
            Self::SwimmingStrokeCount => "Swimming Stroke Count",
            Self::PushCount => "Wheelchair Push Count",
            Self::Height => "Height",
            Self::BodyMass => "Body Mass",
            Self::BodyFatPercentage => "Body Fat Percentage",
            Self::HeartRate => "Heart Rate",
            Self::HeartRateVariabilitySdnn => "Heart Rate Variability",
            Self::RestingHeartRate => "Resting Heart Rate",
            Self::WalkingHeartRateAverage => "Walking Average Heart Rate",
            Self::BloodPressureSystolic => "Systolic Blood Pressure",
            Self::BloodPressureDiastolic => "Diastolic Blood Pressure",
            Self::BodyTemperature => "Body Temperature",
            Self::OxygenSaturation => "Oxygen Saturation",
            Self::RespiratoryRate => "Respiratory Rate",
        }
    }

    /// Unit quantities of this type are expressed in on export.
    pub fn canonical_unit(self) -> Unit {
        match self {
            Self::StepCount => Unit::Count,
            Self::DistanceWalkingRunning | Self::DistanceCycling | Self::Height => Unit::Meter,
            Self::ActiveEnergyBurned => Unit::Kilocalorie,
            Self::HeartRate
            | Self::RestingHeartRate
            | Self::WalkingHeartRateAverage
            | Self::RespiratoryRate => Unit::CountPerMinute,
            Self::BodyMass => Unit::Kilogram,
            Self::BodyFatPercentage | Self::OxygenSaturation => Unit::Percent,
            Self::HeartRateVariabilitySdnn => Unit::Millisecond,
            Self::BloodPressureSystolic | Self::BloodPressureDiastolic => {
                Unit::MillimeterOfMercury
            }
            Self::BodyTemperature => Unit::Celsius,
            Self::FlightsClimbed | Self::SwimmingStrokeCount | Self::PushCount => Unit::Count,
        }
    }
}

/// Category metrics: small enumerated integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryTypeId {
    SleepAnalysis,
}

impl CategoryTypeId {
    pub const ALL: [CategoryTypeId; 1] = [Self::SleepAnalysis];

    pub fn identifier(self) -> &'static str {
        match self {
            Self::SleepAnalysis => "sleepAnalysis",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SleepAnalysis => "Sleep Analysis",
        }
    }
}

/// Sleep analysis category codes as the host defines them.
pub mod sleep {
    pub const IN_BED: i64 = 0;
    pub const ASLEEP_UNSPECIFIED: i64 = 1;
    pub const AWAKE: i64 = 2;
    pub const ASLEEP_CORE: i64 = 3;
    pub const ASLEEP_DEEP: i64 = 4;
    pub const ASLEEP_REM: i64 = 5;
}

/// A specific kind of measurable health metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricType {
    Quantity(QuantityTypeId),
    Category(CategoryTypeId),
}

impl MetricType {
    pub fn identifier(&self) -> &'static str {
        match self {
            MetricType::Quantity(id) => id.identifier(),
            MetricType::Category(id) => id.identifier(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MetricType::Quantity(id) => id.name(),
            MetricType::Category(id) => id.name(),
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            MetricType::Quantity(_) => MetricKind::Quantity,
            MetricType::Category(_) => MetricKind::Category,
        }
    }

    /// The host store's prefixed identifier.
    pub fn raw_identifier(&self) -> String {
        let id = self.identifier();
        let prefix = match self {
            MetricType::Quantity(_) => QUANTITY_PREFIX,
            MetricType::Category(_) => CATEGORY_PREFIX,
        };
        let mut chars = id.chars();
        match chars.next() {
            Some(first) => format!("{prefix}{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => prefix.to_string(),
        }
    }

    /// Canonical export unit; `None` for category metrics.
    pub fn canonical_unit(&self) -> Option<Unit> {
        match self {
            MetricType::Quantity(id) => Some(id.canonical_unit()),
            MetricType::Category(_) => None,
        }
    }

    /// Every metric the catalog can resolve.
    pub fn all() -> impl Iterator<Item = MetricType> {
        QuantityTypeId::ALL
            .into_iter()
            .map(MetricType::Quantity)
            .chain(CategoryTypeId::ALL.into_iter().map(MetricType::Category))
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl Serialize for MetricType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.identifier())
    }
}

/// A named group of metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub types: &'static [MetricType],
}

use MetricType::{Category as C, Quantity as Q};

static CATEGORIES: [MetricCategory; 4] = [
    MetricCategory {
        id: "activity",
        name: "Activity",
        types: &[
            Q(QuantityTypeId::StepCount),
            Q(QuantityTypeId::DistanceWalkingRunning),
            Q(QuantityTypeId::ActiveEnergyBurned),
            Q(QuantityTypeId::FlightsClimbed),
            Q(QuantityTypeId::DistanceCycling),
            Q(QuantityTypeId::SwimmingStrokeCount),
        ],
    },
    MetricCategory {
        id: "body",
        name: "Body Measurements",
        types: &[
            Q(QuantityTypeId::Height),
            Q(QuantityTypeId::BodyMass),
            Q(QuantityTypeId::BodyFatPercentage),
        ],
    },
    MetricCategory {
        id: "vitals",
        name: "Vital Signs",
        types: &[
            Q(QuantityTypeId::HeartRate),
            Q(QuantityTypeId::HeartRateVariabilitySdnn),
            Q(QuantityTypeId::BloodPressureSystolic),
            Q(QuantityTypeId::BloodPressureDiastolic),
            Q(QuantityTypeId::BodyTemperature),
            Q(QuantityTypeId::OxygenSaturation),
            Q(QuantityTypeId::RespiratoryRate),
        ],
    },
    MetricCategory {
        id: "sleep",
        name: "Sleep",
        types: &[C(CategoryTypeId::SleepAnalysis)],
    },
];

/// All categories in display order.
pub fn list_categories() -> &'static [MetricCategory] {
    &CATEGORIES
}

/// Look up a category by its id (`activity`, `body`, ...).
pub fn category(id: &str) -> Option<&'static MetricCategory> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// The first category listing `metric`, if any.
pub fn category_of(metric: MetricType) -> Option<&'static MetricCategory> {
    CATEGORIES.iter().find(|c| c.types.contains(&metric))
}

/// Resolve a short or host-prefixed identifier.
pub fn resolve(identifier: &str) -> Option<MetricType> {
    if identifier.starts_with(QUANTITY_PREFIX) || identifier.starts_with(CATEGORY_PREFIX) {
        return MetricType::all().find(|m| m.raw_identifier() == identifier);
    }
    MetricType::all().find(|m| m.identifier() == identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_categories_in_fixed_order() {
        let names: Vec<_> = list_categories().iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["Activity", "Body Measurements", "Vital Signs", "Sleep"]
        );
    }

    #[test]
    fn resolves_step_count_in_activity() {
        let metric = resolve("stepCount").unwrap();
        assert_eq!(metric, MetricType::Quantity(QuantityTypeId::StepCount));
        assert_eq!(metric.name(), "Step Count");
        assert_eq!(metric.kind(), MetricKind::Quantity);
        assert_eq!(category_of(metric).unwrap().name, "Activity");
    }

    #[test]
    fn resolves_host_prefixed_identifiers() {
        assert_eq!(
            resolve("HKQuantityTypeIdentifierHeartRate"),
            Some(MetricType::Quantity(QuantityTypeId::HeartRate))
        );
        assert_eq!(
            resolve("HKQuantityTypeIdentifierHeartRateVariabilitySDNN"),
            Some(MetricType::Quantity(QuantityTypeId::HeartRateVariabilitySdnn))
        );
        assert_eq!(
            resolve("HKCategoryTypeIdentifierSleepAnalysis"),
            Some(MetricType::Category(CategoryTypeId::SleepAnalysis))
        );
        assert_eq!(resolve("HKQuantityTypeIdentifierSleepAnalysis"), None);
        assert_eq!(resolve("HKQuantityTypeIdentifier"), None);
    }

    #[test]
    fn unknown_identifier_is_unsupported_not_error() {
        assert_eq!(resolve("bloodGlucose"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("StepCount"), None);
    }

    #[test]
    fn ungrouped_types_still_resolve() {
        let push = resolve("pushCount").unwrap();
        assert_eq!(push.name(), "Wheelchair Push Count");
        assert!(category_of(push).is_none());
    }

    #[test]
    fn canonical_units_for_reference_types() {
        let unit = |id: &str| resolve(id).unwrap().canonical_unit();
        assert_eq!(unit("stepCount"), Some(Unit::Count));
        assert_eq!(unit("distanceWalkingRunning"), Some(Unit::Meter));
        assert_eq!(unit("activeEnergyBurned"), Some(Unit::Kilocalorie));
        assert_eq!(unit("heartRate"), Some(Unit::CountPerMinute));
        assert_eq!(unit("flightsClimbed"), Some(Unit::Count));
        assert_eq!(unit("sleepAnalysis"), None);
    }

    #[test]
    fn identifiers_are_unique() {
        let mut ids: Vec<_> = MetricType::all().map(|m| m.identifier()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn category_lookup_by_id() {
        let sleep = category("sleep").unwrap();
        assert_eq!(sleep.types, &[MetricType::Category(CategoryTypeId::SleepAnalysis)]);
        assert!(category("nutrition").is_none());
    }
}
