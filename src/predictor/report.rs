//! Wire-format result record and its rounding/formatting rules.

use crate::cascade::CalibrationResult;
use serde::Serialize;

/// The 16-field prediction record, serialized with the exact field names
/// downstream consumers depend on. Heights carry 2 decimals, percentiles
/// and scores 1; the genetic fields are null when no mid-parental target
/// was available.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionResult {
    #[serde(rename = "PAH_Final")]
    pub pah_final: f64,
    #[serde(rename = "Current_Age")]
    pub current_age: String,
    #[serde(rename = "BoneAge")]
    pub bone_age: String,
    #[serde(rename = "MPH")]
    pub mph: Option<f64>,
    #[serde(rename = "Height_Score")]
    pub height_score: f64,
    #[serde(rename = "Potential_Score")]
    pub potential_score: f64,
    #[serde(rename = "Current_Height")]
    pub current_height: f64,
    #[serde(rename = "Current_Height_Percentile")]
    pub current_height_percentile: f64,
    #[serde(rename = "Genetic_Predicted_Height")]
    pub genetic_predicted_height: Option<f64>,
    #[serde(rename = "MPH_Percentile")]
    pub mph_percentile: Option<f64>,
    #[serde(rename = "Growth_Curve_Predicted_Height")]
    pub growth_curve_predicted_height: f64,
    #[serde(rename = "LMS_Percentile")]
    pub lms_percentile: f64,
    #[serde(rename = "Delta_Genetic")]
    pub delta_genetic: f64,
    #[serde(rename = "Delta_Maturity")]
    pub delta_maturity: f64,
    #[serde(rename = "Final_Predicted_Height")]
    pub final_predicted_height: f64,
    #[serde(rename = "PAH_Final_Percentile")]
    pub pah_final_percentile: f64,
}

/// `"{Y}Y {M}M"` from a rounded month count.
pub fn months_to_year_month(months: f64) -> String {
    let total = months.round() as i64;
    format!("{}Y {}M", total / 12, total % 12)
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

impl PredictionResult {
    /// Assemble the record from the cascade output. The current height is
    /// passed through unrounded; the genetic prediction surfaces the
    /// mid-parental height itself.
    pub fn assemble(
        calib: &CalibrationResult,
        height_cm: f64,
        chronological_months: f64,
        maturity_months: f64,
    ) -> Self {
        Self {
            pah_final: round2(calib.pah_final),
            current_age: months_to_year_month(chronological_months),
            bone_age: months_to_year_month(maturity_months),
            mph: calib.mph.map(round2),
            height_score: round1(calib.percentile_current),
            potential_score: round1(calib.potential.score),
            current_height: height_cm,
            current_height_percentile: round1(calib.percentile_current),
            genetic_predicted_height: calib.mph.map(round2),
            mph_percentile: calib.percentile_mph.map(round1),
            growth_curve_predicted_height: round2(calib.pah_lms),
            lms_percentile: round1(calib.percentile_pah_lms),
            delta_genetic: round2(calib.delta_genetic),
            delta_maturity: round2(calib.delta_maturity),
            final_predicted_height: round2(calib.pah_final),
            pah_final_percentile: round1(calib.percentile_pah_final),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_formatting_rounds_first() {
        assert_eq!(months_to_year_month(143.0), "11Y 11M");
        assert_eq!(months_to_year_month(143.6), "12Y 0M");
        assert_eq!(months_to_year_month(6.0), "0Y 6M");
        assert_eq!(months_to_year_month(216.0), "18Y 0M");
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round2(158.2549), 158.25);
        assert_eq!(round2(158.255), 158.26);
        assert_eq!(round1(49.95), 50.0);
        assert_eq!(round1(49.94), 49.9);
    }

    #[test]
    fn wire_field_names_are_exact() {
        let record = PredictionResult {
            pah_final: 158.25,
            current_age: "11Y 11M".into(),
            bone_age: "12Y 6M".into(),
            mph: None,
            height_score: 50.0,
            potential_score: 37.5,
            current_height: 155.0,
            current_height_percentile: 50.0,
            genetic_predicted_height: None,
            mph_percentile: None,
            growth_curve_predicted_height: 158.9,
            lms_percentile: 42.1,
            delta_genetic: 0.0,
            delta_maturity: -0.16,
            final_predicted_height: 158.25,
            pah_final_percentile: 40.7,
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "PAH_Final",
            "Current_Age",
            "BoneAge",
            "MPH",
            "Height_Score",
            "Potential_Score",
            "Current_Height",
            "Current_Height_Percentile",
            "Genetic_Predicted_Height",
            "MPH_Percentile",
            "Growth_Curve_Predicted_Height",
            "LMS_Percentile",
            "Delta_Genetic",
            "Delta_Maturity",
            "Final_Predicted_Height",
            "PAH_Final_Percentile",
        ] {
            assert!(obj.contains_key(key), "missing field {key}");
        }
        assert_eq!(obj.len(), 16);
        assert!(obj["MPH"].is_null());
    }
}
