//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while filtering and charting
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One of the climate indicators served by the upstream API.
///
/// Each variant fully describes its instantiation of the generic
/// fetch-and-filter pipeline: endpoint path, measurement fields, year bounds,
/// and axis configuration. The response shape and date-parse rule live next to
/// the decoding code (`data::schema`, `series`), keyed on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// Global temperature anomaly (land + station), monthly since 1880.
    Temperature,
    /// Atmospheric CO2 (cycle + trend), daily.
    Co2,
    /// Atmospheric methane (average + trend), monthly.
    Methane,
    /// Atmospheric nitrous oxide (average + trend), monthly.
    Nitrous,
    /// Arctic sea-ice extent, monthly.
    Arctic,
}

/// One measurement field within a dataset (one chart line each).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Wire/export name, e.g. `"cycle"`.
    pub name: &'static str,
    /// Human-readable label for chart legends and tables.
    pub label: &'static str,
}

/// Y-axis configuration for a dataset.
///
/// Temperature anomaly uses fixed bounds (so the zero line stays put while
/// scrubbing through years); everything else auto-scales to the filtered data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YAxisSpec {
    pub unit: &'static str,
    pub fixed_bounds: Option<[f64; 2]>,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Temperature,
        Dataset::Co2,
        Dataset::Methane,
        Dataset::Nitrous,
        Dataset::Arctic,
    ];

    /// Path under the API base URL.
    pub fn endpoint_path(self) -> &'static str {
        match self {
            Dataset::Temperature => "/temperature-api",
            Dataset::Co2 => "/co2-api",
            Dataset::Methane => "/methane-api",
            Dataset::Nitrous => "/nitrous-oxide-api",
            Dataset::Arctic => "/arctic-api",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Dataset::Temperature => "Temperature anomaly",
            Dataset::Co2 => "CO2",
            Dataset::Methane => "Methane",
            Dataset::Nitrous => "Nitrous oxide",
            Dataset::Arctic => "Arctic sea ice",
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            Dataset::Temperature => &[
                Field { name: "land", label: "Land" },
                Field { name: "station", label: "Station" },
            ],
            Dataset::Co2 => &[
                Field { name: "cycle", label: "Cycle" },
                Field { name: "trend", label: "Trend" },
            ],
            Dataset::Methane | Dataset::Nitrous => &[
                Field { name: "average", label: "Average" },
                Field { name: "trend", label: "Trend" },
            ],
            Dataset::Arctic => &[
                Field { name: "extent", label: "Extent" },
                Field { name: "anom", label: "Anomaly" },
                Field { name: "monthlyMean", label: "Monthly mean" },
            ],
        }
    }

    /// Inclusive year range the year control offers.
    ///
    /// These mirror the upstream series' actual coverage; filtering by a year
    /// outside the range is still well-defined (empty series).
    pub fn year_bounds(self) -> (i32, i32) {
        match self {
            Dataset::Temperature => (1900, 2025),
            Dataset::Co2 => (2015, 2025),
            Dataset::Methane => (1984, 2024),
            Dataset::Nitrous => (2003, 2024),
            Dataset::Arctic => (1979, 2025),
        }
    }

    /// Year selected when a view first opens this dataset.
    pub fn default_year(self) -> i32 {
        match self {
            Dataset::Temperature => 1900,
            Dataset::Co2 => 2015,
            Dataset::Methane => 1989,
            Dataset::Nitrous => 2004,
            Dataset::Arctic => 2004,
        }
    }

    pub fn y_axis(self) -> YAxisSpec {
        match self {
            Dataset::Temperature => YAxisSpec {
                unit: "°C",
                fixed_bounds: Some([-2.0, 2.0]),
            },
            Dataset::Co2 => YAxisSpec {
                unit: "ppm",
                fixed_bounds: None,
            },
            Dataset::Methane | Dataset::Nitrous => YAxisSpec {
                unit: "ppb",
                fixed_bounds: None,
            },
            Dataset::Arctic => YAxisSpec {
                unit: "M km²",
                fixed_bounds: None,
            },
        }
    }

    /// Clamp a year into this dataset's control range.
    pub fn clamp_year(self, year: i32) -> i32 {
        let (lo, hi) = self.year_bounds();
        year.clamp(lo, hi)
    }

    pub fn next(self) -> Dataset {
        match self {
            Dataset::Temperature => Dataset::Co2,
            Dataset::Co2 => Dataset::Methane,
            Dataset::Methane => Dataset::Nitrous,
            Dataset::Nitrous => Dataset::Arctic,
            Dataset::Arctic => Dataset::Temperature,
        }
    }

    pub fn prev(self) -> Dataset {
        match self {
            Dataset::Temperature => Dataset::Arctic,
            Dataset::Co2 => Dataset::Temperature,
            Dataset::Methane => Dataset::Co2,
            Dataset::Nitrous => Dataset::Methane,
            Dataset::Arctic => Dataset::Nitrous,
        }
    }
}

/// The CLI token for the dataset (what `--dataset` accepts).
impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Dataset::Temperature => "temperature",
            Dataset::Co2 => "co2",
            Dataset::Methane => "methane",
            Dataset::Nitrous => "nitrous",
            Dataset::Arctic => "arctic",
        };
        write!(f, "{token}")
    }
}

/// A record's date, still in the dataset's native encoding.
///
/// Each dataset defines exactly one of these encodings; the parse rules live
/// in `series::parse_record_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDate {
    /// Fractional-year decimal, e.g. `"1900.042"` (temperature).
    Fractional(String),
    /// Separate year/month/day text fields (CO2).
    Calendar {
        year: String,
        month: String,
        day: String,
    },
    /// `"YYYY.M"` dotted year-month, e.g. `"1984.7"` (methane, nitrous).
    Dotted(String),
    /// `"YYYYMM"` period key, e.g. `"200401"` (arctic map keys).
    Period(String),
}

/// A measurement value as it appeared on the wire.
///
/// Most endpoints serialize numbers as JSON strings; arctic uses real JSON
/// numbers and occasionally omits a field entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Missing,
}

/// One normalized raw observation, prior to filtering.
///
/// `values` is parallel to `Dataset::fields()`. Immutable once decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: RecordDate,
    pub values: Vec<RawValue>,
}

/// One point of the derived series: a calendar date, a display label
/// (`"Jan 2004"`), and one parsed value per measurement field.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub label: String,
    pub values: Vec<f64>,
}

impl SeriesPoint {
    /// Chart x-position in month units: `1.0..13.0` over a calendar year.
    ///
    /// Daily data (CO2) spreads within the month; monthly data lands on the
    /// month start.
    pub fn x(&self) -> f64 {
        f64::from(self.date.month()) + f64::from(self.date.day() - 1) / 31.0
    }
}

/// The filtered, date-parsed, chronologically ordered output of the pipeline.
///
/// Recomputed whole on every (records, year) change; an empty `points` list is
/// a valid result ("no data for year Y"), distinct from not-yet-fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub dataset: Dataset,
    pub year: i32,
    pub points: Vec<SeriesPoint>,
    /// Records whose year matched but whose date or values failed to parse.
    pub skipped: usize,
}

impl DerivedSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Extract one `(x, value)` line per chart series.
    pub fn field_series(&self, field_idx: usize) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.values.get(field_idx).map(|&v| (p.x(), v)))
            .collect()
    }

    /// Min/max across all fields and points, for auto-scaled y axes.
    pub fn value_bounds(&self) -> Option<[f64; 2]> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for p in &self.points {
            for &v in &p.values {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if lo.is_finite() && hi.is_finite() {
            Some([lo, hi])
        } else {
            None
        }
    }
}

/// Resolved settings for one `show`/`export` run.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub dataset: Dataset,
    pub year: i32,
    pub table: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_year_is_within_bounds_for_every_dataset() {
        for ds in Dataset::ALL {
            let (lo, hi) = ds.year_bounds();
            let d = ds.default_year();
            assert!(d >= lo && d <= hi, "{ds:?}: {d} not in {lo}..={hi}");
        }
    }

    #[test]
    fn clamp_year_respects_bounds() {
        assert_eq!(Dataset::Arctic.clamp_year(1900), 1979);
        assert_eq!(Dataset::Arctic.clamp_year(2004), 2004);
        assert_eq!(Dataset::Arctic.clamp_year(3000), 2025);
    }

    #[test]
    fn next_prev_cycle_through_all_datasets() {
        let mut ds = Dataset::Temperature;
        for _ in 0..Dataset::ALL.len() {
            assert_eq!(ds.next().prev(), ds);
            ds = ds.next();
        }
        assert_eq!(ds, Dataset::Temperature);
    }

    #[test]
    fn x_position_orders_days_within_a_month() {
        let a = SeriesPoint {
            date: NaiveDate::from_ymd_opt(2015, 3, 1).unwrap(),
            label: "Mar 2015".to_string(),
            values: vec![400.0],
        };
        let b = SeriesPoint {
            date: NaiveDate::from_ymd_opt(2015, 3, 20).unwrap(),
            label: "Mar 2015".to_string(),
            values: vec![401.0],
        };
        assert!(a.x() < b.x());
        assert!(b.x() < 4.0);
    }
}
