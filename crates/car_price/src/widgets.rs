//! Bounded input fields of the prediction form.
//!
//! Each field knows its label, how to show its current value, how to step it
//! and how to apply typed text. Every write goes through the clamping
//! setters of [`FeatureVector`], so an edit can never leave the range.

use core::fmt;
use core::num::{IntErrorKind, ParseIntError};

use vehicle_features::{FeatureVector, bounds, format_power};

/// One input of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    VehicleAge,
    MaxPower,
    EngineSize,
    FuelIsDiesel,
}

/// Typed text that does not parse as a value for the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput {
    pub field: Field,
    pub text: String,
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = match self.field {
            Field::VehicleAge | Field::EngineSize => "a whole number",
            Field::MaxPower => "a number",
            Field::FuelIsDiesel => "Yes or No",
        };
        write!(f, "{:?} is not {expected}", self.text)
    }
}

impl core::error::Error for InvalidInput {}

impl Field {
    /// All fields in display order.
    pub const ALL: [Self; 4] = [
        Self::VehicleAge,
        Self::MaxPower,
        Self::EngineSize,
        Self::FuelIsDiesel,
    ];

    /// Label shown next to the input, including its range.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VehicleAge => "Vehicle Age (years) [Min: 0, Max: 14]",
            Self::MaxPower => "Max Power (bhp) [Min: 30, Max: 200]",
            Self::EngineSize => "Engine Size (cc) [Min: 500, Max: 2500]",
            Self::FuelIsDiesel => "Is the fuel type Diesel?",
        }
    }

    /// Whether the field takes typed text (as opposed to a choice).
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::FuelIsDiesel)
    }

    /// Current value as shown in the form.
    #[must_use]
    pub fn display_value(self, features: &FeatureVector) -> String {
        match self {
            Self::VehicleAge => features.vehicle_age().to_string(),
            Self::MaxPower => format_power(features.max_power()),
            Self::EngineSize => features.engine_size().to_string(),
            Self::FuelIsDiesel => {
                if features.fuel_is_diesel() {
                    "( ) No  (*) Yes".to_string()
                } else {
                    "(*) No  ( ) Yes".to_string()
                }
            }
        }
    }

    /// Moves the value one step up (`up == true`) or down. The fuel choice
    /// toggles either way.
    pub fn step(self, features: &mut FeatureVector, up: bool) {
        let sign: i64 = if up { 1 } else { -1 };
        match self {
            Self::VehicleAge => {
                features.set_vehicle_age(features.vehicle_age() + sign);
            }
            Self::MaxPower => {
                let delta = if up { bounds::MAX_POWER_STEP } else { -bounds::MAX_POWER_STEP };
                features.set_max_power(features.max_power() + delta);
            }
            Self::EngineSize => {
                features.set_engine_size(features.engine_size() + sign * bounds::ENGINE_SIZE_STEP);
            }
            Self::FuelIsDiesel => features.set_fuel_is_diesel(!features.fuel_is_diesel()),
        }
    }

    /// Applies typed text to the field, clamping into range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`] if the text does not parse; the value is left
    /// unchanged.
    pub fn apply_text(self, features: &mut FeatureVector, text: &str) -> Result<(), InvalidInput> {
        let trimmed = text.trim();
        let invalid = || InvalidInput {
            field: self,
            text: text.to_string(),
        };

        match self {
            Self::VehicleAge => {
                let years = parse_whole(trimmed).ok_or_else(invalid)?;
                features.set_vehicle_age(years);
            }
            Self::MaxPower => {
                let bhp = trimmed.parse::<f64>().map_err(|_| invalid())?;
                if bhp.is_nan() {
                    return Err(invalid());
                }
                features.set_max_power(bhp);
            }
            Self::EngineSize => {
                let cc = parse_whole(trimmed).ok_or_else(invalid)?;
                features.set_engine_size(cc);
            }
            Self::FuelIsDiesel => {
                let diesel = match trimmed.to_ascii_lowercase().as_str() {
                    "yes" | "y" => true,
                    "no" | "n" => false,
                    _ => return Err(invalid()),
                };
                features.set_fuel_is_diesel(diesel);
            }
        }
        Ok(())
    }
}

/// Parses a whole number, saturating digit strings too long for `i64` so the
/// clamping setters can pull them into range.
fn parse_whole(text: &str) -> Option<i64> {
    text.parse::<i64>().map_or_else(|err| saturate(&err), Some)
}

fn saturate(err: &ParseIntError) -> Option<i64> {
    match err.kind() {
        IntErrorKind::PosOverflow => Some(i64::MAX),
        IntErrorKind::NegOverflow => Some(i64::MIN),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clamps_at_bounds() {
        let mut features = FeatureVector::new(14, 200.0, 2500, false);
        Field::VehicleAge.step(&mut features, true);
        Field::MaxPower.step(&mut features, true);
        Field::EngineSize.step(&mut features, true);
        assert_eq!(features, FeatureVector::new(14, 200.0, 2500, false));

        let mut features = FeatureVector::new(0, 30.0, 500, false);
        Field::VehicleAge.step(&mut features, false);
        Field::MaxPower.step(&mut features, false);
        Field::EngineSize.step(&mut features, false);
        assert_eq!(features, FeatureVector::new(0, 30.0, 500, false));
    }

    #[test]
    fn test_step_increments() {
        let mut features = FeatureVector::default();
        Field::VehicleAge.step(&mut features, true);
        Field::MaxPower.step(&mut features, false);
        Field::EngineSize.step(&mut features, true);
        Field::FuelIsDiesel.step(&mut features, true);
        assert_eq!(features, FeatureVector::new(6, 79.0, 1550, true));
    }

    #[test]
    fn test_typed_values_clamp() {
        let mut features = FeatureVector::default();
        Field::VehicleAge.apply_text(&mut features, "20").unwrap();
        Field::MaxPower.apply_text(&mut features, "12.5").unwrap();
        Field::EngineSize.apply_text(&mut features, " 2475 ").unwrap();
        assert_eq!(features, FeatureVector::new(14, 30.0, 2475, false));

        Field::VehicleAge.apply_text(&mut features, "-1").unwrap();
        assert_eq!(features.vehicle_age(), 0);
    }

    #[test]
    fn test_overflowing_text_clamps() {
        let mut features = FeatureVector::default();
        Field::VehicleAge.apply_text(&mut features, "99999999999999999999").unwrap();
        Field::EngineSize.apply_text(&mut features, "-99999999999999999999").unwrap();
        assert_eq!(features.vehicle_age(), 14);
        assert_eq!(features.engine_size(), 500);

        Field::EngineSize.apply_text(&mut features, "99999999999999999999").unwrap();
        assert_eq!(features.engine_size(), 2500);
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let err: Box<dyn core::error::Error> = Box::new(InvalidInput {
            field: Field::FuelIsDiesel,
            text: "maybe".to_string(),
        });
        assert_eq!(err.to_string(), "\"maybe\" is not Yes or No");
    }

    #[test]
    fn test_unparsable_text_keeps_value() {
        let mut features = FeatureVector::default();
        let err = Field::EngineSize.apply_text(&mut features, "1.5l").unwrap_err();
        assert_eq!(err.field, Field::EngineSize);
        assert_eq!(err.to_string(), "\"1.5l\" is not a whole number");
        assert!(Field::MaxPower.apply_text(&mut features, "NaN").is_err());
        assert_eq!(features, FeatureVector::default());
    }

    #[test]
    fn test_display_values() {
        let features = FeatureVector::default();
        assert_eq!(Field::VehicleAge.display_value(&features), "5");
        assert_eq!(Field::MaxPower.display_value(&features), "80.0");
        assert_eq!(Field::EngineSize.display_value(&features), "1500");
        assert_eq!(Field::FuelIsDiesel.display_value(&features), "(*) No  ( ) Yes");
    }
}
