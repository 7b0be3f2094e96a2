//! Payload schemas for the global-warming.org endpoints.
//!
//! The upstream API wraps every dataset differently: a top-level array under a
//! dataset-specific key (temperature, CO2, methane, nitrous), or a nested
//! wrapper holding a map keyed by `"YYYYMM"` period strings (arctic). This
//! module owns those shapes and flattens all of them into `Vec<RawRecord>` so
//! the rest of the pipeline never sees endpoint-specific JSON.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{Dataset, RawRecord, RawValue, RecordDate};
use crate::error::AppError;

/// Decode a raw response body into normalized records.
///
/// A body that parses as JSON but is missing the dataset's expected key is a
/// malformed response, surfaced verbatim to the caller.
pub fn decode_records(dataset: Dataset, body: &str) -> Result<Vec<RawRecord>, AppError> {
    let records = match dataset {
        Dataset::Temperature => decode_temperature(body)?,
        Dataset::Co2 => decode_co2(body)?,
        Dataset::Methane => decode_methane(body)?,
        Dataset::Nitrous => decode_nitrous(body)?,
        Dataset::Arctic => decode_arctic(body)?,
    };
    tracing::debug!(dataset = dataset.display_name(), count = records.len(), "decoded records");
    Ok(records)
}

fn decode_error(dataset: Dataset, e: serde_json::Error) -> AppError {
    AppError::malformed(format!(
        "Malformed {} response: {e}",
        dataset.display_name()
    ))
}

#[derive(Debug, Deserialize)]
struct TemperatureResponse {
    result: Vec<TemperatureRow>,
}

#[derive(Debug, Deserialize)]
struct TemperatureRow {
    time: String,
    station: String,
    land: String,
}

fn decode_temperature(body: &str) -> Result<Vec<RawRecord>, AppError> {
    let resp: TemperatureResponse =
        serde_json::from_str(body).map_err(|e| decode_error(Dataset::Temperature, e))?;

    // Field order mirrors `Dataset::Temperature.fields()`: land, station.
    Ok(resp
        .result
        .into_iter()
        .map(|row| RawRecord {
            date: RecordDate::Fractional(row.time),
            values: vec![RawValue::Text(row.land), RawValue::Text(row.station)],
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct Co2Response {
    co2: Vec<Co2Row>,
}

#[derive(Debug, Deserialize)]
struct Co2Row {
    year: String,
    month: String,
    day: String,
    cycle: String,
    trend: String,
}

fn decode_co2(body: &str) -> Result<Vec<RawRecord>, AppError> {
    let resp: Co2Response = serde_json::from_str(body).map_err(|e| decode_error(Dataset::Co2, e))?;

    Ok(resp
        .co2
        .into_iter()
        .map(|row| RawRecord {
            date: RecordDate::Calendar {
                year: row.year,
                month: row.month,
                day: row.day,
            },
            values: vec![RawValue::Text(row.cycle), RawValue::Text(row.trend)],
        })
        .collect())
}

/// Shared row shape for the trace-gas endpoints (methane, nitrous oxide).
#[derive(Debug, Deserialize)]
struct GasRow {
    date: String,
    average: String,
    trend: String,
}

impl GasRow {
    fn into_record(self) -> RawRecord {
        RawRecord {
            date: RecordDate::Dotted(self.date),
            values: vec![RawValue::Text(self.average), RawValue::Text(self.trend)],
        }
    }
}

#[derive(Debug, Deserialize)]
struct MethaneResponse {
    methane: Vec<GasRow>,
}

fn decode_methane(body: &str) -> Result<Vec<RawRecord>, AppError> {
    let resp: MethaneResponse =
        serde_json::from_str(body).map_err(|e| decode_error(Dataset::Methane, e))?;
    Ok(resp.methane.into_iter().map(GasRow::into_record).collect())
}

#[derive(Debug, Deserialize)]
struct NitrousResponse {
    nitrous: Vec<GasRow>,
}

fn decode_nitrous(body: &str) -> Result<Vec<RawRecord>, AppError> {
    let resp: NitrousResponse =
        serde_json::from_str(body).map_err(|e| decode_error(Dataset::Nitrous, e))?;
    Ok(resp.nitrous.into_iter().map(GasRow::into_record).collect())
}

#[derive(Debug, Deserialize)]
struct ArcticResponse {
    #[serde(rename = "arcticData")]
    arctic_data: ArcticData,
}

#[derive(Debug, Deserialize)]
struct ArcticData {
    // The description block (title, base period, units) is informational;
    // tolerate its absence.
    #[serde(default)]
    #[allow(dead_code)]
    description: Option<serde_json::Value>,
    data: HashMap<String, ArcticRow>,
}

#[derive(Debug, Deserialize)]
struct ArcticRow {
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    anom: Option<f64>,
    #[serde(rename = "monthlyMean", default)]
    monthly_mean: Option<f64>,
}

fn decode_arctic(body: &str) -> Result<Vec<RawRecord>, AppError> {
    let resp: ArcticResponse =
        serde_json::from_str(body).map_err(|e| decode_error(Dataset::Arctic, e))?;

    // Map iteration order is arbitrary; the projection stage sorts by date.
    Ok(resp
        .arctic_data
        .data
        .into_iter()
        .map(|(period, row)| RawRecord {
            date: RecordDate::Period(period),
            values: vec![
                num_value(row.value),
                num_value(row.anom),
                num_value(row.monthly_mean),
            ],
        })
        .collect())
}

fn num_value(v: Option<f64>) -> RawValue {
    match v {
        Some(v) => RawValue::Number(v),
        None => RawValue::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_decodes_array_shape() {
        let body = r#"{"error":null,"result":[
            {"time":"1900.042","station":"-0.27","land":"-0.38"},
            {"time":"1900.125","station":"-0.41","land":"-0.45"}
        ]}"#;
        let records = decode_records(Dataset::Temperature, body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].date,
            RecordDate::Fractional("1900.042".to_string())
        );
        assert_eq!(records[0].values[0], RawValue::Text("-0.38".to_string()));
        assert_eq!(records[0].values[1], RawValue::Text("-0.27".to_string()));
    }

    #[test]
    fn co2_decodes_calendar_parts() {
        let body = r#"{"co2":[
            {"year":"2015","month":"1","day":"2","cycle":"399.82","trend":"399.43"}
        ]}"#;
        let records = decode_records(Dataset::Co2, body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].date,
            RecordDate::Calendar {
                year: "2015".to_string(),
                month: "1".to_string(),
                day: "2".to_string(),
            }
        );
    }

    #[test]
    fn arctic_decodes_nested_map_shape() {
        let body = r#"{"arcticData":{
            "description":{"title":"Sea Ice Extent","units":"Mkm^2"},
            "data":{
                "200401":{"value":13.78,"anom":-0.94,"monthlyMean":14.72},
                "200402":{"value":14.5,"anom":-0.85}
            }
        }}"#;
        let mut records = decode_records(Dataset::Arctic, body).unwrap();
        records.sort_by(|a, b| format!("{:?}", a.date).cmp(&format!("{:?}", b.date)));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].values[0], RawValue::Number(13.78));
        // Missing monthlyMean is tolerated at decode time.
        assert_eq!(records[1].values[2], RawValue::Missing);
    }

    #[test]
    fn missing_expected_key_is_malformed() {
        let err = decode_records(Dataset::Methane, r#"{"co2":[]}"#).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("Malformed Methane response"));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = decode_records(Dataset::Co2, "<html>502</html>").unwrap_err();
        assert!(err.to_string().contains("Malformed CO2 response"));
    }
}
