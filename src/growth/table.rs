//! Per-sex growth-curve table with clamped linear interpolation.

use super::{Lms, Sex};
use crate::error::OsteoError;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One table row: LMS parameters for one sex at one age point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthCurveRow {
    pub sex: Sex,
    pub month: f64,
    pub lms: Lms,
}

/// Age-indexed LMS parameters, one sorted series per sex.
///
/// Construction sorts each series by month and deduplicates (last record
/// wins), so `lookup` can bisect. Shared read-only after load.
#[derive(Clone, Debug, Default)]
pub struct GrowthCurveTable {
    male: Vec<(f64, Lms)>,
    female: Vec<(f64, Lms)>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Month")]
    month: f64,
    #[serde(rename = "L")]
    l: f64,
    #[serde(rename = "M")]
    m: f64,
    #[serde(rename = "S")]
    s: f64,
}

impl GrowthCurveTable {
    pub fn from_rows(rows: impl IntoIterator<Item = GrowthCurveRow>) -> Self {
        let mut table = Self::default();
        for row in rows {
            let series = match row.sex {
                Sex::Male => &mut table.male,
                Sex::Female => &mut table.female,
            };
            series.push((row.month, row.lms));
        }
        table.finalize();
        table
    }

    /// Read `Sex,Month,L,M,S` records. Rows with an unrecognized sex token
    /// or non-finite numbers are dropped, matching the reference loader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, OsteoError> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut table = Self::default();
        for record in csv.deserialize::<CsvRow>() {
            let row = record?;
            let Some(sex) = Sex::parse_token(&row.sex) else {
                continue;
            };
            if !(row.month.is_finite() && row.l.is_finite() && row.m.is_finite() && row.s.is_finite())
            {
                continue;
            }
            let series = match sex {
                Sex::Male => &mut table.male,
                Sex::Female => &mut table.female,
            };
            series.push((
                row.month,
                Lms {
                    l: row.l,
                    m: row.m,
                    s: row.s,
                },
            ));
        }
        table.finalize();
        Ok(table)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, OsteoError> {
        let file = std::fs::File::open(path).map_err(|source| OsteoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    fn finalize(&mut self) {
        for series in [&mut self.male, &mut self.female] {
            series.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            // dedup_by sees the later element first; last record wins
            series.dedup_by(|later, kept| {
                if kept.0 == later.0 {
                    kept.1 = later.1;
                    true
                } else {
                    false
                }
            });
        }
    }

    fn series(&self, sex: Sex) -> &[(f64, Lms)] {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }

    /// Interpolated LMS parameters at `age_months`. Ages outside the table
    /// clamp to the nearest boundary row (flat extrapolation).
    pub fn lookup(&self, sex: Sex, age_months: f64) -> Result<Lms, OsteoError> {
        let series = self.series(sex);
        if series.is_empty() {
            return Err(OsteoError::configuration(format!(
                "no growth-curve rows for sex {sex}"
            )));
        }
        let t = age_months.clamp(series[0].0, series[series.len() - 1].0);
        let hi = series.partition_point(|&(month, _)| month < t);
        if hi == 0 {
            return Ok(series[0].1);
        }
        if hi >= series.len() {
            return Ok(series[series.len() - 1].1);
        }
        let (t0, a) = series[hi - 1];
        let (t1, b) = series[hi];
        if t1 == t0 || t == t1 {
            return Ok(b);
        }
        let frac = (t - t0) / (t1 - t0);
        Ok(Lms {
            l: a.l + (b.l - a.l) * frac,
            m: a.m + (b.m - a.m) * frac,
            s: a.s + (b.s - a.s) * frac,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> GrowthCurveTable {
        let rows = [
            (Sex::Female, 120.0, 1.0, 138.0, 0.040),
            (Sex::Female, 144.0, 0.8, 151.0, 0.042),
            (Sex::Female, 216.0, 0.9, 160.0, 0.038),
            (Sex::Male, 120.0, 1.1, 139.0, 0.041),
            (Sex::Male, 216.0, 1.0, 173.0, 0.039),
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
    fn lookup_interpolates_between_rows() {
        let table = sample_table();
        let lms = table.lookup(Sex::Female, 132.0).unwrap();
        assert!((lms.m - 144.5).abs() < 1e-9);
        assert!((lms.l - 0.9).abs() < 1e-9);
        assert!((lms.s - 0.041).abs() < 1e-9);
    }

    #[test]
    fn lookup_below_min_returns_min_row_exactly() {
        let table = sample_table();
        let lms = table.lookup(Sex::Female, 1.0).unwrap();
        assert_eq!(lms, Lms { l: 1.0, m: 138.0, s: 0.040 });
    }

    #[test]
    fn lookup_above_max_clamps_flat() {
        let table = sample_table();
        let lms = table.lookup(Sex::Male, 400.0).unwrap();
        assert_eq!(lms, Lms { l: 1.0, m: 173.0, s: 0.039 });
    }

    #[test]
    fn lookup_missing_sex_is_configuration_error() {
        let table = GrowthCurveTable::from_rows([GrowthCurveRow {
            sex: Sex::Male,
            month: 120.0,
            lms: Lms { l: 1.0, m: 139.0, s: 0.04 },
        }]);
        let err = table.lookup(Sex::Female, 120.0).unwrap_err();
        assert!(matches!(err, OsteoError::Configuration(_)));
    }

    #[test]
    fn csv_loader_skips_bad_rows_and_sorts() {
        let csv = "\
Sex,Month,L,M,S
female,144,0.8,151.0,0.042
female,120,1.0,138.0,0.040
alien,120,1.0,1.0,1.0
";
        let table = GrowthCurveTable::from_reader(csv.as_bytes()).unwrap();
        let lms = table.lookup(Sex::Female, 0.0).unwrap();
        assert!((lms.m - 138.0).abs() < 1e-12);
        assert!(table.lookup(Sex::Male, 120.0).is_err());
    }
}
