//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each measurement field gets its own marker character, cycled from
//! `FIELD_MARKERS`, so a two-line dataset reads as `o` and `+` overlays.

use crate::domain::DerivedSeries;

const FIELD_MARKERS: [char; 4] = ['o', '+', 'x', '*'];

/// Render the derived series as a fixed-size character grid.
///
/// The x axis spans the calendar year (Jan..Dec); the y axis spans the
/// dataset's fixed bounds when configured (temperature), otherwise the
/// observed value range with a small pad.
pub fn render_ascii_plot(series: &DerivedSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let x_min = 1.0;
    let x_max = 13.0;
    let (y_min, y_max) = match series.dataset.y_axis().fixed_bounds {
        Some([lo, hi]) => (lo, hi),
        None => {
            let [lo, hi] = series.value_bounds().unwrap_or([0.0, 1.0]);
            pad_range(lo, hi, 0.05)
        }
    };

    let mut grid = vec![vec![' '; width]; height];

    for (field_idx, _) in series.dataset.fields().iter().enumerate() {
        let marker = FIELD_MARKERS[field_idx % FIELD_MARKERS.len()];
        for (x, y) in series.field_series(field_idx) {
            if !y.is_finite() || y < y_min || y > y_max {
                continue;
            }
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = marker;
        }
    }

    let unit = series.dataset.y_axis().unit;
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} {} | x=Jan-Dec | y=[{y_min:.2}, {y_max:.2}] {unit}\n",
        series.dataset.display_name(),
        series.year,
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = series
        .dataset
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{} {}", FIELD_MARKERS[i % FIELD_MARKERS.len()], f.label))
        .collect();
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

fn pad_range(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    if !(lo.is_finite() && hi.is_finite()) || hi < lo {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo).abs() * frac).max(1e-12);
    (lo - pad, hi + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    ((u * (width - 1) as f64).round() as usize).min(width - 1)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the grid.
    let row = ((1.0 - u) * (height - 1) as f64).round() as usize;
    row.min(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, RawRecord, RawValue, RecordDate};

    fn arctic_series() -> DerivedSeries {
        let records: Vec<RawRecord> = (1..=12)
            .map(|month| RawRecord {
                date: RecordDate::Period(format!("2004{month:02}")),
                values: vec![
                    RawValue::Number(10.0 + f64::from(month) / 2.0),
                    RawValue::Number(-0.5),
                    RawValue::Number(12.0),
                ],
            })
            .collect();
        crate::series::project(&records, Dataset::Arctic, 2004)
    }

    #[test]
    fn plot_has_requested_dimensions_and_markers() {
        let plot = render_ascii_plot(&arctic_series(), 60, 15);
        let lines: Vec<&str> = plot.lines().collect();
        // Header + grid rows + legend.
        assert_eq!(lines.len(), 1 + 15 + 1);
        assert!(lines[1..16].iter().all(|l| l.len() == 60));
        assert!(plot.contains('o'));
        assert!(plot.contains("o Extent"));
    }

    #[test]
    fn degenerate_sizes_are_clamped() {
        let plot = render_ascii_plot(&arctic_series(), 0, 0);
        assert!(plot.lines().count() >= 5);
    }
}
