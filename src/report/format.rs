//! Terminal output formatting for `gwt show`.

use crate::domain::{Dataset, DerivedSeries};

/// Format the run summary (dataset info + record counts + value ranges).
pub fn format_run_summary(series: &DerivedSeries, records_fetched: usize) -> String {
    let mut out = String::new();

    let (lo, hi) = series.dataset.year_bounds();
    out.push_str(&format!(
        "=== gwt - {} ===\n",
        series.dataset.display_name()
    ));
    out.push_str(&format!(
        "Year: {} (range {lo}-{hi})\n",
        series.year
    ));
    out.push_str(&format!(
        "Records: fetched={records_fetched} | matched={} | skipped={}\n",
        series.len(),
        series.skipped
    ));

    let unit = series.dataset.y_axis().unit;
    for (idx, field) in series.dataset.fields().iter().enumerate() {
        let line = series.field_series(idx);
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, v) in &line {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if lo.is_finite() && hi.is_finite() {
            out.push_str(&format!(
                "- {:<14} [{lo:.2}, {hi:.2}] {unit}\n",
                field.label
            ));
        } else {
            out.push_str(&format!("- {:<14} (no values)\n", field.label));
        }
    }

    out
}

/// Format the per-point value table.
pub fn format_table(series: &DerivedSeries) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<12}", "date"));
    for field in series.dataset.fields() {
        out.push_str(&format!("{:>14}", field.label));
    }
    out.push('\n');

    for point in &series.points {
        // Daily datasets repeat the month label; disambiguate with the day.
        out.push_str(&format!(
            "{:<12}",
            format!("{} {}", point.label, point.date.format("%d"))
        ));
        for v in &point.values {
            out.push_str(&format!("{v:>14.2}"));
        }
        out.push('\n');
    }

    out
}

/// The "no data" rendering branch: a message, not an error.
pub fn format_no_data(dataset: Dataset, year: i32) -> String {
    let (lo, hi) = dataset.year_bounds();
    format!(
        "No data for year {year} in {} (series covers {lo}-{hi}).",
        dataset.display_name()
    )
}
