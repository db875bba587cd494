//! Calibration cascade: maturity estimate → predicted adult height.
//!
//! Projects the current height's standardized score onto the adult
//! distribution (using the maturity age, not the chronological age, as the
//! source index), optionally blends in a mid-parental target, applies the
//! maturity-gap adjustment, and derives all percentiles. The genetic blend
//! is computed BEFORE the zero floor and only the final residual is
//! floored; this ordering is part of the clinical calibration and must not
//! be rearranged.

use crate::error::OsteoError;
use crate::growth::{lms, GrowthCurveTable, Sex};
use serde::Serialize;

/// Reference adult age used for all adult-distribution lookups, months.
pub const ADULT_MONTHS: f64 = 216.0;
/// Weight of the mid-parental target in the blended residual.
pub const GENETIC_BLEND_WEIGHT: f64 = 0.4;
/// Strength of the maturity-gap adjustment per year of gap.
pub const MATURITY_GAP_ALPHA: f64 = 0.1;

/// Qualitative growth-potential tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialTier {
    High,
    SlightlyHigh,
    Average,
    SlightlyLow,
    Low,
}

impl PotentialTier {
    fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            PotentialTier::High
        } else if score >= 55.0 {
            PotentialTier::SlightlyHigh
        } else if score >= 45.0 {
            PotentialTier::Average
        } else if score >= 30.0 {
            PotentialTier::SlightlyLow
        } else {
            PotentialTier::Low
        }
    }
}

/// Growth-potential score derived from the bone-age gap.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PotentialScore {
    /// `chronological - maturity`, months (unclamped).
    pub delta_months: f64,
    /// Same delta clamped to ±24 months.
    pub delta_clamped: f64,
    /// `(delta_clamped + 24) / 48 * 100`.
    pub score: f64,
    pub tier: PotentialTier,
}

/// Everything the cascade derives for one request. Immutable once built.
#[derive(Clone, Debug, Serialize)]
pub struct CalibrationResult {
    /// Growth-curve projection of the current height onto adulthood.
    pub pah_lms: f64,
    /// `pah_lms - height`: residual height still to gain per the curves.
    pub r_lms: f64,
    /// `(maturity - chronological) / 12`; positive = skeletally advanced.
    pub gap_year: f64,
    pub genetic_available: bool,
    pub mph: Option<f64>,
    pub d_target: Option<f64>,
    pub r_gen: Option<f64>,
    pub pah_genetic: Option<f64>,
    pub delta_genetic: f64,
    pub r_final: f64,
    pub delta_maturity: f64,
    pub pah_final: f64,
    pub z_current: f64,
    pub percentile_current: f64,
    pub percentile_mph: Option<f64>,
    pub percentile_pah_lms: f64,
    pub percentile_pah_final: f64,
    pub potential: PotentialScore,
}

/// Mid-parental height: parental mean plus 6.5 cm for boys, minus for girls.
pub fn mid_parental_height(father_cm: f64, mother_cm: f64, sex: Sex) -> f64 {
    let mean = (father_cm + mother_cm) / 2.0;
    match sex {
        Sex::Male => mean + 6.5,
        Sex::Female => mean - 6.5,
    }
}

/// Parse a parent-height field from request glue; recognizes the usual
/// "not available" tokens as missing.
pub fn parse_parent_height(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_uppercase().as_str() {
        "NA" | "NAN" | "NONE" => None,
        _ => trimmed.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn valid_height(h: Option<f64>) -> Option<f64> {
    h.filter(|v| v.is_finite())
}

/// Growth-potential score from the chronological/maturity gap.
pub fn potential_score(chronological_months: f64, maturity_months: f64) -> PotentialScore {
    let delta = chronological_months - maturity_months;
    let delta_clamped = delta.clamp(-24.0, 24.0);
    let score = (delta_clamped + 24.0) / 48.0 * 100.0;
    PotentialScore {
        delta_months: delta,
        delta_clamped,
        score,
        tier: PotentialTier::from_score(score),
    }
}

/// Run the full cascade.
pub fn calibrate(
    table: &GrowthCurveTable,
    sex: Sex,
    height_cm: f64,
    chronological_months: f64,
    maturity_months: f64,
    father_height_cm: Option<f64>,
    mother_height_cm: Option<f64>,
    adult_months: f64,
) -> Result<CalibrationResult, OsteoError> {
    if !(height_cm.is_finite() && height_cm > 0.0) {
        return Err(OsteoError::input(format!(
            "current height must be positive, got {height_cm}"
        )));
    }

    let lms_maturity = table.lookup(sex, maturity_months)?;
    let lms_adult = table.lookup(sex, adult_months)?;
    let lms_chrono = table.lookup(sex, chronological_months)?;

    // 1–2. project through the maturity-age distribution onto adulthood
    let z_maturity = lms::score(height_cm, lms_maturity);
    let pah_lms = lms::value(z_maturity, lms_adult);
    let r_lms = pah_lms - height_cm;

    // 3. skeletal advance in years
    let gap_year = (maturity_months - chronological_months) / 12.0;
    let gap_factor = 1.0 - MATURITY_GAP_ALPHA * gap_year;

    // 4–5. genetic blend (when both parents are known), then the maturity
    // adjustment on whichever residual is live; only the final residual is
    // floored at zero
    let father = valid_height(father_height_cm);
    let mother = valid_height(mother_height_cm);

    let (mph, d_target, r_gen, pah_genetic, delta_genetic, residual) =
        if let (Some(f), Some(m)) = (father, mother) {
            let mph = mid_parental_height(f, m, sex);
            let d_target = (mph - height_cm).max(0.0);
            let r_gen = (1.0 - GENETIC_BLEND_WEIGHT) * r_lms + GENETIC_BLEND_WEIGHT * d_target;
            (
                Some(mph),
                Some(d_target),
                Some(r_gen),
                Some(height_cm + r_gen),
                r_gen - r_lms,
                r_gen,
            )
        } else {
            (None, None, None, None, 0.0, r_lms)
        };
    let genetic_available = mph.is_some();

    let r_final = (residual * gap_factor).max(0.0);
    let delta_maturity = r_final - residual;
    let pah_final = height_cm + r_final;

    // 6. percentiles
    let z_current = lms::score(height_cm, lms_chrono);
    let percentile_current = lms::percentile(z_current);
    let percentile_mph = mph.map(|m| lms::percentile(lms::score(m, lms_adult)));
    let percentile_pah_lms = lms::percentile(lms::score(pah_lms, lms_adult));
    let percentile_pah_final = lms::percentile(lms::score(pah_final, lms_adult));

    // 7. growth potential
    let potential = potential_score(chronological_months, maturity_months);

    Ok(CalibrationResult {
        pah_lms,
        r_lms,
        gap_year,
        genetic_available,
        mph,
        d_target,
        r_gen,
        pah_genetic,
        delta_genetic,
        r_final,
        delta_maturity,
        pah_final,
        z_current,
        percentile_current,
        percentile_mph,
        percentile_pah_lms,
        percentile_pah_final,
        potential,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::{GrowthCurveRow, Lms};

    fn test_table() -> GrowthCurveTable {
        let rows = [
            (Sex::Female, 120.0, 1.0, 140.0, 0.040),
            (Sex::Female, 143.0, 1.0, 152.0, 0.041),
            (Sex::Female, 168.0, 1.0, 158.0, 0.040),
            (Sex::Female, 216.0, 1.0, 161.0, 0.038),
            (Sex::Male, 120.0, 1.0, 140.0, 0.041),
            (Sex::Male, 216.0, 1.0, 174.0, 0.039),
        ];
        GrowthCurveTable::from_rows(rows.into_iter().map(|(sex, month, l, m, s)| {
            GrowthCurveRow {
                sex,
                month,
                lms: Lms { l, m, s },
            }
        }))
    }

    #[test]
    fn mph_reference_case() {
        let mph = mid_parental_height(165.0, 156.0, Sex::Female);
        assert!((mph - 153.5).abs() < 1e-12);
        let mph_m = mid_parental_height(165.0, 156.0, Sex::Male);
        assert!((mph_m - 167.0).abs() < 1e-12);
    }

    #[test]
    fn parent_height_tokens_are_missing() {
        assert_eq!(parse_parent_height("na"), None);
        assert_eq!(parse_parent_height("NaN"), None);
        assert_eq!(parse_parent_height(""), None);
        assert_eq!(parse_parent_height(" none "), None);
        assert_eq!(parse_parent_height("172.5"), Some(172.5));
    }

    #[test]
    fn genetic_branch_active_with_both_parents() {
        let table = test_table();
        let result = calibrate(
            &table,
            Sex::Female,
            155.0,
            143.0,
            143.0,
            Some(165.0),
            Some(156.0),
            ADULT_MONTHS,
        )
        .unwrap();
        assert!(result.genetic_available);
        assert_eq!(result.mph, Some(153.5));
        // height above MPH: the genetic target gap floors at zero
        assert_eq!(result.d_target, Some(0.0));
        let r_gen = result.r_gen.unwrap();
        assert!((r_gen - 0.6 * result.r_lms).abs() < 1e-9);
        assert!((result.delta_genetic - (r_gen - result.r_lms)).abs() < 1e-12);
        assert!(result.percentile_mph.is_some());
    }

    #[test]
    fn genetic_branch_disabled_when_one_parent_missing() {
        let table = test_table();
        let result =
            calibrate(&table, Sex::Female, 155.0, 143.0, 143.0, Some(165.0), None, ADULT_MONTHS).unwrap();
        assert!(!result.genetic_available);
        assert_eq!(result.mph, None);
        assert_eq!(result.delta_genetic, 0.0);
        assert_eq!(result.percentile_mph, None);
        // maturity adjustment falls back to the pure growth-curve residual
        assert!((result.r_final - result.r_lms.max(0.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_gap_leaves_residual_unscaled() {
        let table = test_table();
        let result = calibrate(&table, Sex::Female, 150.0, 143.0, 143.0, None, None, ADULT_MONTHS).unwrap();
        assert_eq!(result.gap_year, 0.0);
        assert!((result.r_final - result.r_lms.max(0.0)).abs() < 1e-12);
        assert!((result.pah_final - (150.0 + result.r_final)).abs() < 1e-12);
    }

    #[test]
    fn advanced_bone_age_shrinks_the_residual() {
        let table = test_table();
        let advanced = calibrate(&table, Sex::Female, 150.0, 143.0, 155.0, None, None, ADULT_MONTHS).unwrap();
        let neutral = calibrate(&table, Sex::Female, 150.0, 143.0, 143.0, None, None, ADULT_MONTHS).unwrap();
        assert!(advanced.gap_year > 0.0);
        assert!(advanced.delta_maturity < 0.0);
        assert!(advanced.pah_final < neutral.pah_final);
    }

    #[test]
    fn final_height_never_regresses_below_current() {
        // wide maturity-age distribution: a tall outlier projects to an
        // adult height below the current one, exercising the zero floor
        let rows = [
            (Sex::Female, 143.0, 1.0, 160.0, 0.080),
            (Sex::Female, 216.0, 1.0, 161.0, 0.038),
        ];
        let table = GrowthCurveTable::from_rows(rows.into_iter().map(|(sex, month, l, m, s)| {
            GrowthCurveRow {
                sex,
                month,
                lms: Lms { l, m, s },
            }
        }));
        let result = calibrate(&table, Sex::Female, 180.0, 143.0, 143.0, None, None, ADULT_MONTHS).unwrap();
        assert!(result.r_lms < 0.0);
        assert_eq!(result.r_final, 0.0);
        assert_eq!(result.pah_final, 180.0);
    }

    #[test]
    fn potential_score_reference_cases() {
        let neutral = potential_score(143.0, 143.0);
        assert_eq!(neutral.score, 50.0);
        assert_eq!(neutral.tier, PotentialTier::Average);

        let delayed = potential_score(167.0, 143.0);
        assert_eq!(delayed.delta_clamped, 24.0);
        assert_eq!(delayed.score, 100.0);
        assert_eq!(delayed.tier, PotentialTier::High);

        let advanced = potential_score(100.0, 160.0);
        assert_eq!(advanced.delta_clamped, -24.0);
        assert_eq!(advanced.score, 0.0);
        assert_eq!(advanced.tier, PotentialTier::Low);
    }

    #[test]
    fn bad_height_is_an_input_error() {
        let table = test_table();
        let err = calibrate(&table, Sex::Female, f64::NAN, 143.0, 143.0, None, None, ADULT_MONTHS).unwrap_err();
        assert!(matches!(err, OsteoError::Input(_)));
    }
}
