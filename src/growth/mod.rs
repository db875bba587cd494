//! Growth-curve reference data and the LMS distribution transform.
//!
//! The table holds per-sex, age-indexed LMS parameters (L: skew, M: median,
//! S: coefficient of variation). Lookups linearly interpolate between the
//! two nearest rows and clamp to the recorded age range, so queries outside
//! the table never extrapolate.

pub mod lms;
pub mod table;

pub use self::lms::{normal_cdf, percentile, score, value, Lms};
pub use self::table::{GrowthCurveRow, GrowthCurveTable};

use serde::{Deserialize, Serialize};

/// Patient sex, also the conditioning input of the maturity estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Normalize the tokens found in reference tables and request payloads.
    /// Numeric codes follow the table convention (1 = male, 2 = female).
    pub fn parse_token(token: &str) -> Option<Sex> {
        match token.trim().to_lowercase().as_str() {
            "1" | "m" | "male" | "남" | "boy" => Some(Sex::Male),
            "2" | "f" | "female" | "여" | "girl" => Some(Sex::Female),
            _ => None,
        }
    }

    /// Estimator conditioning code (1 = male, 0 = female).
    pub fn code(self) -> u8 {
        match self {
            Sex::Male => 1,
            Sex::Female => 0,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}
