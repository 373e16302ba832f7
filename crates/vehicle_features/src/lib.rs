//! Vehicle attributes used as price model input.
//!
//! A [`FeatureVector`] can only hold in-range values: every constructor and
//! setter clamps to the bounds in [`bounds`], so the predictor never sees an
//! out-of-range attribute.

use serde::{Deserialize, Serialize};

/// The number of features the price model consumes.
pub const FEATURE_COUNT: usize = 4;

/// Column names of the model input, in input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["vehicle_age", "max_power", "engine", "fuel_type_Diesel"];

/// Legal ranges and edit steps of the vehicle attributes.
pub mod bounds {
    /// Youngest vehicle, in years.
    pub const VEHICLE_AGE_MIN: i64 = 0;
    /// Oldest vehicle, in years.
    pub const VEHICLE_AGE_MAX: i64 = 14;

    /// Lowest maximum power, in bhp.
    pub const MAX_POWER_MIN: f64 = 30.0;
    /// Highest maximum power, in bhp.
    pub const MAX_POWER_MAX: f64 = 200.0;
    /// Increment used when stepping the power input.
    pub const MAX_POWER_STEP: f64 = 1.0;

    /// Smallest engine, in cc.
    pub const ENGINE_SIZE_MIN: i64 = 500;
    /// Largest engine, in cc.
    pub const ENGINE_SIZE_MAX: i64 = 2500;
    /// Increment used when stepping the engine input.
    pub const ENGINE_SIZE_STEP: i64 = 50;
}

/// The four bounded attributes describing a vehicle.
///
/// Fields are private; all writes go through clamping setters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFeatureVector")]
pub struct FeatureVector {
    vehicle_age: i64,
    max_power: f64,
    engine_size: i64,
    fuel_is_diesel: bool,
}

/// Unchecked wire form, clamped on the way in.
#[derive(Deserialize)]
struct RawFeatureVector {
    vehicle_age: i64,
    max_power: f64,
    engine_size: i64,
    fuel_is_diesel: bool,
}

impl From<RawFeatureVector> for FeatureVector {
    fn from(raw: RawFeatureVector) -> Self {
        Self::new(
            raw.vehicle_age,
            raw.max_power,
            raw.engine_size,
            raw.fuel_is_diesel,
        )
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            vehicle_age: 5,
            max_power: 80.0,
            engine_size: 1500,
            fuel_is_diesel: false,
        }
    }
}

impl FeatureVector {
    /// Creates a feature vector, clamping every field into its range.
    #[must_use]
    pub fn new(vehicle_age: i64, max_power: f64, engine_size: i64, fuel_is_diesel: bool) -> Self {
        Self {
            vehicle_age: clamp_vehicle_age(vehicle_age),
            max_power: clamp_max_power(max_power),
            engine_size: clamp_engine_size(engine_size),
            fuel_is_diesel,
        }
    }

    /// Vehicle age in years.
    #[must_use]
    pub const fn vehicle_age(&self) -> i64 {
        self.vehicle_age
    }

    /// Maximum power in bhp.
    #[must_use]
    pub const fn max_power(&self) -> f64 {
        self.max_power
    }

    /// Engine displacement in cc.
    #[must_use]
    pub const fn engine_size(&self) -> i64 {
        self.engine_size
    }

    /// Whether the vehicle runs on diesel.
    #[must_use]
    pub const fn fuel_is_diesel(&self) -> bool {
        self.fuel_is_diesel
    }

    /// Sets the vehicle age and returns the value actually stored.
    pub fn set_vehicle_age(&mut self, years: i64) -> i64 {
        self.vehicle_age = clamp_vehicle_age(years);
        self.vehicle_age
    }

    /// Sets the maximum power and returns the value actually stored.
    pub fn set_max_power(&mut self, bhp: f64) -> f64 {
        self.max_power = clamp_max_power(bhp);
        self.max_power
    }

    /// Sets the engine size and returns the value actually stored.
    pub fn set_engine_size(&mut self, cc: i64) -> i64 {
        self.engine_size = clamp_engine_size(cc);
        self.engine_size
    }

    /// Sets the fuel flag.
    pub const fn set_fuel_is_diesel(&mut self, diesel: bool) {
        self.fuel_is_diesel = diesel;
    }

    /// Human readable fuel type, as printed in reports.
    #[must_use]
    pub const fn fuel_label(&self) -> &'static str {
        if self.fuel_is_diesel { "Diesel" } else { "Other" }
    }

    /// Converts to the model input row.
    ///
    /// The order is fixed: `[vehicle_age, max_power, engine_size, fuel_is_diesel]`,
    /// with the fuel flag encoded as `0.0` or `1.0`.
    #[must_use]
    pub fn to_model_input(&self) -> [f64; FEATURE_COUNT] {
        [
            self.vehicle_age as f64,
            self.max_power,
            self.engine_size as f64,
            if self.fuel_is_diesel { 1.0 } else { 0.0 },
        ]
    }
}

/// Clamps a vehicle age into `[VEHICLE_AGE_MIN, VEHICLE_AGE_MAX]`.
#[must_use]
pub fn clamp_vehicle_age(years: i64) -> i64 {
    years.clamp(bounds::VEHICLE_AGE_MIN, bounds::VEHICLE_AGE_MAX)
}

/// Clamps a power value into `[MAX_POWER_MIN, MAX_POWER_MAX]`.
///
/// NaN has no position in the range and maps to the lower bound.
#[must_use]
pub fn clamp_max_power(bhp: f64) -> f64 {
    if bhp.is_nan() {
        return bounds::MAX_POWER_MIN;
    }
    bhp.clamp(bounds::MAX_POWER_MIN, bounds::MAX_POWER_MAX)
}

/// Clamps an engine size into `[ENGINE_SIZE_MIN, ENGINE_SIZE_MAX]`.
#[must_use]
pub fn clamp_engine_size(cc: i64) -> i64 {
    cc.clamp(bounds::ENGINE_SIZE_MIN, bounds::ENGINE_SIZE_MAX)
}

/// Prints a power value the way it was entered: `80.0`, `80.5`.
#[must_use]
pub fn format_power(bhp: f64) -> String {
    if bhp.fract() == 0.0 {
        format!("{bhp:.1}")
    } else {
        format!("{bhp}")
    }
}
