//! Export the derived series to CSV/JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; both carry exactly the points the chart would have drawn.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::DerivedSeries;
use crate::error::AppError;

/// Write one row per point, one column per measurement field.
pub fn write_series_csv(path: &Path, series: &DerivedSeries) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    let mut header = String::from("dataset,year,date,label");
    for field in series.dataset.fields() {
        header.push(',');
        header.push_str(field.name);
    }
    writeln!(file, "{header}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for point in &series.points {
        let mut row = format!(
            "{:?},{},{},{}",
            series.dataset, series.year, point.date, point.label
        );
        for v in &point.values {
            row.push_str(&format!(",{v}"));
        }
        writeln!(file, "{row}")
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ExportDoc<'a> {
    dataset: &'a str,
    year: i32,
    unit: &'a str,
    fields: Vec<&'a str>,
    points: Vec<ExportPoint<'a>>,
}

#[derive(Debug, Serialize)]
struct ExportPoint<'a> {
    date: String,
    label: &'a str,
    values: &'a [f64],
}

/// Write the series as a self-describing JSON document.
pub fn write_series_json(path: &Path, series: &DerivedSeries) -> Result<(), AppError> {
    let doc = ExportDoc {
        dataset: series.dataset.display_name(),
        year: series.year,
        unit: series.dataset.y_axis().unit,
        fields: series.dataset.fields().iter().map(|f| f.name).collect(),
        points: series
            .points
            .iter()
            .map(|p| ExportPoint {
                date: p.date.to_string(),
                label: &p.label,
                values: &p.values,
            })
            .collect(),
    };

    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, RawRecord, RawValue, RecordDate};

    fn sample_series() -> DerivedSeries {
        let records = vec![
            RawRecord {
                date: RecordDate::Dotted("2004.2".to_string()),
                values: vec![
                    RawValue::Text("318.5".to_string()),
                    RawValue::Text("318.6".to_string()),
                ],
            },
            RawRecord {
                date: RecordDate::Dotted("2004.1".to_string()),
                values: vec![
                    RawValue::Text("318.1".to_string()),
                    RawValue::Text("318.3".to_string()),
                ],
            },
        ];
        crate::series::project(&records, Dataset::Nitrous, 2004)
    }

    #[test]
    fn csv_export_writes_header_and_sorted_rows() {
        let path = std::env::temp_dir().join("gwt-export-test.csv");
        write_series_csv(&path, &sample_series()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "dataset,year,date,label,average,trend");
        assert!(lines[1].contains("2004-01-01"));
        assert!(lines[2].contains("2004-02-01"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn json_export_is_self_describing() {
        let path = std::env::temp_dir().join("gwt-export-test.json");
        write_series_json(&path, &sample_series()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["dataset"], "Nitrous oxide");
        assert_eq!(doc["unit"], "ppb");
        assert_eq!(doc["points"].as_array().unwrap().len(), 2);

        let _ = std::fs::remove_file(&path);
    }
}
