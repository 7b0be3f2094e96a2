//! The filter-and-project pipeline.
//!
//! This is the one piece of logic every dataset shares: given the raw records
//! of a successful fetch and the currently selected year, derive the filtered,
//! date-parsed, chronologically ordered series the chart consumes.
//!
//! Design goals:
//! - **Pure**: no I/O, no hidden state; same inputs → identical output
//! - **Row-level tolerance**: a record that fails to parse is skipped and
//!   counted, never a crash and never a fabricated zero
//! - **Deterministic order**: output is always sorted by date ascending,
//!   regardless of source order (the arctic payload is a map)

use chrono::NaiveDate;

use crate::domain::{Dataset, DerivedSeries, RawRecord, RawValue, RecordDate, SeriesPoint};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A record date resolved to a calendar year and a comparable timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub year: i32,
    pub date: NaiveDate,
}

/// Run the pipeline: parse dates, filter by year, parse values, sort.
pub fn project(records: &[RawRecord], dataset: Dataset, year: i32) -> DerivedSeries {
    let field_count = dataset.fields().len();
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(parsed) = parse_record_date(&record.date) else {
            skipped += 1;
            continue;
        };
        if parsed.year != year {
            // Not an error, just outside the filter.
            continue;
        }

        let mut values = Vec::with_capacity(field_count);
        for raw in record.values.iter().take(field_count) {
            match parse_value(raw) {
                Some(v) => values.push(v),
                None => break,
            }
        }
        if values.len() != field_count {
            skipped += 1;
            continue;
        }

        points.push(SeriesPoint {
            date: parsed.date,
            label: month_label(parsed.date),
            values,
        });
    }

    points.sort_by_key(|p| p.date);

    if skipped > 0 {
        tracing::debug!(
            dataset = dataset.display_name(),
            year,
            skipped,
            "skipped unparseable records"
        );
    }

    DerivedSeries {
        dataset,
        year,
        points,
        skipped,
    }
}

/// Parse any of the four date encodings the upstream API uses.
pub fn parse_record_date(date: &RecordDate) -> Option<ParsedDate> {
    match date {
        RecordDate::Fractional(s) => parse_fractional(s),
        RecordDate::Calendar { year, month, day } => parse_calendar(year, month, day),
        RecordDate::Dotted(s) => parse_dotted(s),
        RecordDate::Period(s) => parse_period(s),
    }
}

/// Fractional-year decimal, e.g. `"1900.042"` = Jan 1900.
///
/// The upstream convention centers month m at `(m - 0.5) / 12`, so
/// `floor(frac * 12) + 1` recovers the month for every in-range fraction.
fn parse_fractional(s: &str) -> Option<ParsedDate> {
    let v: f64 = s.trim().parse().ok()?;
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    let year = v.trunc() as i32;
    let frac = v - v.trunc();
    let month = ((frac * 12.0).floor() as u32 + 1).min(12);
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(ParsedDate { year, date })
}

/// Separate year/month/day text fields (CO2 rows).
fn parse_calendar(year: &str, month: &str, day: &str) -> Option<ParsedDate> {
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(ParsedDate { year, date })
}

/// Dotted year-month, e.g. `"1984.7"` = Jul 1984, `"2003.11"` = Nov 2003.
///
/// The digits after the dot are a literal month number, not a fraction.
fn parse_dotted(s: &str) -> Option<ParsedDate> {
    let (year, month) = s.trim().split_once('.')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(ParsedDate { year, date })
}

/// `"YYYYMM"` period key (arctic map keys).
fn parse_period(s: &str) -> Option<ParsedDate> {
    let s = s.trim();
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[..4].parse().ok()?;
    let month: u32 = s[4..].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(ParsedDate { year, date })
}

/// Parse one measurement value; `None` means the record is dropped.
///
/// The upstream serializes most numbers as text. Blank text, unparseable
/// text, and non-finite numbers all count as parse failures — we skip the
/// record rather than coerce to zero, so a gap stays a gap.
pub fn parse_value(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            let v: f64 = trimmed.parse().ok()?;
            v.is_finite().then_some(v)
        }
        RawValue::Number(v) => v.is_finite().then_some(*v),
        RawValue::Missing => None,
    }
}

/// Axis/tick label for a point, e.g. `"Jan 2004"`.
pub fn month_label(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{} {}", MONTHS[date.month0() as usize], date.year())
}

/// Month name for a chart x position in month units (1-based).
pub fn month_name(month: u32) -> &'static str {
    MONTHS[((month.clamp(1, 12)) - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    fn gas_record(date: &str, average: &str, trend: &str) -> RawRecord {
        RawRecord {
            date: RecordDate::Dotted(date.to_string()),
            values: vec![text(average), text(trend)],
        }
    }

    fn co2_record(year: &str, month: &str, day: &str, cycle: &str, trend: &str) -> RawRecord {
        RawRecord {
            date: RecordDate::Calendar {
                year: year.to_string(),
                month: month.to_string(),
                day: day.to_string(),
            },
            values: vec![text(cycle), text(trend)],
        }
    }

    #[test]
    fn fractional_year_parses_january_and_december() {
        let jan = parse_fractional("1900.042").unwrap();
        assert_eq!(jan.year, 1900);
        assert_eq!(jan.date, NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());

        let dec = parse_fractional("1900.958").unwrap();
        assert_eq!(dec.date, NaiveDate::from_ymd_opt(1900, 12, 1).unwrap());
    }

    #[test]
    fn dotted_date_is_a_literal_month_not_a_fraction() {
        let jul = parse_dotted("1984.7").unwrap();
        assert_eq!(jul.date, NaiveDate::from_ymd_opt(1984, 7, 1).unwrap());

        let nov = parse_dotted("2003.11").unwrap();
        assert_eq!(nov.date, NaiveDate::from_ymd_opt(2003, 11, 1).unwrap());

        assert_eq!(parse_dotted("2003.13"), None);
        assert_eq!(parse_dotted("2003"), None);
    }

    #[test]
    fn period_key_requires_six_digits_and_a_real_month() {
        let d = parse_period("200401").unwrap();
        assert_eq!((d.year, d.date.format("%b").to_string()), (2004, "Jan".to_string()));
        assert_eq!(parse_period("200413"), None);
        assert_eq!(parse_period("20041"), None);
        assert_eq!(parse_period("2004-1"), None);
    }

    #[test]
    fn filter_retains_only_the_selected_year() {
        let records = vec![
            gas_record("1989.1", "1693.3", "1694.1"),
            gas_record("1990.1", "1708.2", "1709.0"),
            gas_record("1989.2", "1694.0", "1694.8"),
        ];
        let series = project(&records, Dataset::Methane, 1989);
        assert_eq!(series.len(), 2);
        assert!(series.points.iter().all(|p| p.label.ends_with("1989")));
    }

    #[test]
    fn co2_scenario_filters_sorts_and_parses_floats() {
        // Fixture with 2014 and 2015 records, deliberately out of order.
        let records = vec![
            co2_record("2015", "3", "15", "401.50", "400.95"),
            co2_record("2014", "6", "1", "398.10", "397.80"),
            co2_record("2015", "1", "2", "399.82", "399.43"),
        ];
        let series = project(&records, Dataset::Co2, 2015);
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.points[0].date,
            NaiveDate::from_ymd_opt(2015, 1, 2).unwrap()
        );
        assert_eq!(series.points[0].values, vec![399.82, 399.43]);
        assert_eq!(series.points[1].values, vec![401.50, 400.95]);
    }

    #[test]
    fn arctic_scenario_orders_map_entries_jan_through_dec() {
        // Map iteration order is arbitrary; feed the months scrambled.
        let mut records = Vec::new();
        for month in [7u32, 1, 12, 3, 11, 5, 9, 2, 8, 4, 10, 6] {
            records.push(RawRecord {
                date: RecordDate::Period(format!("2004{month:02}")),
                values: vec![
                    RawValue::Number(13.0 + f64::from(month)),
                    RawValue::Number(-0.5),
                    RawValue::Number(14.0),
                ],
            });
        }
        // A different year that must not leak in.
        records.push(RawRecord {
            date: RecordDate::Period("200501".to_string()),
            values: vec![
                RawValue::Number(13.6),
                RawValue::Number(-0.4),
                RawValue::Number(14.6),
            ],
        });

        let series = project(&records, Dataset::Arctic, 2004);
        assert_eq!(series.len(), 12);
        let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels[0], "Jan 2004");
        assert_eq!(labels[11], "Dec 2004");
        for w in series.points.windows(2) {
            assert!(w[0].date < w[1].date);
        }
    }

    #[test]
    fn projection_is_idempotent() {
        let records = vec![
            gas_record("2004.5", "318.4", "318.5"),
            gas_record("2004.2", "318.1", "318.2"),
        ];
        let a = project(&records, Dataset::Nitrous, 2004);
        let b = project(&records, Dataset::Nitrous, 2004);
        assert_eq!(a, b);
    }

    #[test]
    fn year_outside_available_range_yields_empty_series() {
        let records = vec![gas_record("2004.1", "318.0", "318.1")];
        let series = project(&records, Dataset::Nitrous, 1850);
        assert!(series.is_empty());
        assert_eq!(series.skipped, 0);
    }

    #[test]
    fn unparseable_values_skip_the_record_and_are_counted() {
        let records = vec![
            gas_record("2004.1", "318.0", "318.1"),
            gas_record("2004.2", "", "318.2"),
            gas_record("2004.3", "not-a-number", "318.3"),
            RawRecord {
                date: RecordDate::Dotted("2004.4".to_string()),
                values: vec![RawValue::Number(f64::NAN), RawValue::Number(318.4)],
            },
        ];
        let series = project(&records, Dataset::Nitrous, 2004);
        assert_eq!(series.len(), 1);
        assert_eq!(series.skipped, 3);
    }

    #[test]
    fn unparseable_dates_are_counted_as_skipped() {
        let records = vec![
            RawRecord {
                date: RecordDate::Period("garbage".to_string()),
                values: vec![RawValue::Number(1.0), RawValue::Number(1.0), RawValue::Number(1.0)],
            },
            RawRecord {
                date: RecordDate::Period("200401".to_string()),
                values: vec![RawValue::Number(1.0), RawValue::Number(1.0), RawValue::Number(1.0)],
            },
        ];
        let series = project(&records, Dataset::Arctic, 2004);
        assert_eq!(series.len(), 1);
        assert_eq!(series.skipped, 1);
    }
}
