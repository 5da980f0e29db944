use std::fmt;

use serde::{Deserialize, Serialize};

use crate::display::format_float;

/// Number of input features the model consumes
pub const FEATURE_COUNT: usize = 7;

/// One of the seven required agronomic readings
///
/// The declaration order is the column order the scaler and classifier were
/// fitted on. Validation walks the fields in the same order, so it also
/// decides which error a request with several problems reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Soil nitrogen content
    #[serde(rename = "N")]
    Nitrogen,
    /// Soil phosphorus content
    #[serde(rename = "P")]
    Phosphorus,
    /// Soil potassium content
    #[serde(rename = "K")]
    Potassium,
    /// Air temperature
    #[serde(rename = "temperature")]
    Temperature,
    /// Relative humidity
    #[serde(rename = "humidity")]
    Humidity,
    /// Soil pH
    #[serde(rename = "ph")]
    Ph,
    /// Rainfall
    #[serde(rename = "rainfall")]
    Rainfall,
}

impl Field {
    /// All fields in model column order
    pub const ALL: [Field; FEATURE_COUNT] = [
        Field::Nitrogen,
        Field::Phosphorus,
        Field::Potassium,
        Field::Temperature,
        Field::Humidity,
        Field::Ph,
        Field::Rainfall,
    ];

    /// JSON key carrying this field in a prediction request
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Field::Nitrogen => "N",
            Field::Phosphorus => "P",
            Field::Potassium => "K",
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::Ph => "ph",
            Field::Rainfall => "rainfall",
        }
    }

    /// Column index in the model input
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Validation rule for this field
    #[must_use]
    pub fn rule(self) -> &'static ValidationRule {
        &RULES[self.index()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A range endpoint
///
/// The nutrient bounds are whole numbers and are quoted as such in error
/// messages (`0 mg/kg`); climate and pH bounds are quoted with a fractional
/// part (`8.0 °C`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Whole-number endpoint
    Integer(i32),
    /// Real-valued endpoint
    Real(f64),
}

impl Bound {
    /// Endpoint as a float for comparisons
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Bound::Integer(v) => f64::from(v),
            Bound::Real(v) => v,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Bound::Integer(v) => write!(f, "{v}"),
            Bound::Real(v) => f.write_str(&format_float(v)),
        }
    }
}

/// Accepted range and presentation details for one field
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    /// Field this rule applies to
    pub field: Field,
    /// Inclusive lower bound
    pub min: Bound,
    /// Inclusive upper bound
    pub max: Bound,
    /// Human-readable name used in error messages
    pub display_name: &'static str,
    /// Measurement unit, empty when the quantity is dimensionless
    pub unit: &'static str,
}

impl ValidationRule {
    /// Inclusive range check; NaN is never contained
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min.value()..=self.max.value()).contains(&value)
    }

    /// Unit as appended to a number in messages: `" mg/kg"`, or `""` for pH
    #[must_use]
    pub fn unit_suffix(&self) -> String {
        if self.unit.is_empty() {
            String::new()
        } else {
            format!(" {}", self.unit)
        }
    }
}

static RULES: [ValidationRule; FEATURE_COUNT] = [
    ValidationRule {
        field: Field::Nitrogen,
        min: Bound::Integer(0),
        max: Bound::Integer(140),
        display_name: "Nitrogen (N)",
        unit: "mg/kg",
    },
    ValidationRule {
        field: Field::Phosphorus,
        min: Bound::Integer(5),
        max: Bound::Integer(145),
        display_name: "Phosphorus (P)",
        unit: "mg/kg",
    },
    ValidationRule {
        field: Field::Potassium,
        min: Bound::Integer(5),
        max: Bound::Integer(205),
        display_name: "Potassium (K)",
        unit: "mg/kg",
    },
    ValidationRule {
        field: Field::Temperature,
        min: Bound::Real(8.0),
        max: Bound::Real(44.0),
        display_name: "Temperature",
        unit: "°C",
    },
    ValidationRule {
        field: Field::Humidity,
        min: Bound::Real(14.0),
        max: Bound::Real(100.0),
        display_name: "Humidity",
        unit: "%",
    },
    ValidationRule {
        field: Field::Ph,
        min: Bound::Real(3.5),
        max: Bound::Real(9.9),
        display_name: "pH",
        unit: "",
    },
    ValidationRule {
        field: Field::Rainfall,
        min: Bound::Real(20.0),
        max: Bound::Real(300.0),
        display_name: "Rainfall",
        unit: "mm",
    },
];
