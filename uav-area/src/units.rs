//! Presentation of measured values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SQUARE_METERS_IN_HECTARE: f64 = 10_000.0;

/// Unit areas are reported in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    /// Hectares, printed with 6 decimals.
    #[default]
    Hectares,
    /// Square meters, printed with 2 decimals.
    SquareMeters,
}

impl AreaUnit {
    /// Converts square meters into this unit.
    pub fn convert(&self, area_m2: f64) -> f64 {
        match self {
            AreaUnit::Hectares => area_m2 / SQUARE_METERS_IN_HECTARE,
            AreaUnit::SquareMeters => area_m2,
        }
    }

    /// Unit symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            AreaUnit::Hectares => "ha",
            AreaUnit::SquareMeters => "m²",
        }
    }

    /// Formats an area given in square meters, e.g. `1.500000 ha` or `15000.00 m²`.
    pub fn format(&self, area_m2: f64) -> String {
        match self {
            AreaUnit::Hectares => format!("{:.6} {}", self.convert(area_m2), self.symbol()),
            AreaUnit::SquareMeters => format!("{:.2} {}", self.convert(area_m2), self.symbol()),
        }
    }
}

/// Formats a length in meters with 2 decimals, e.g. `30.00 m`.
pub fn format_length(length_m: f64) -> String {
    format!("{length_m:.2} m")
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for AreaUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ha" | "hectare" | "hectares" => Ok(AreaUnit::Hectares),
            "m2" | "m²" | "sqm" | "square_meters" => Ok(AreaUnit::SquareMeters),
            other => Err(format!("unknown area unit '{other}', expected 'ha' or 'm2'")),
        }
    }
}
