//! Weather-code extraction from per-office forecast documents.
//!
//! A forecast document is a JSON array of reports. Each report carries a
//! `timeSeries` array; each series lists `timeDefines` (ISO timestamps) and
//! `areas`, where every area block is `{ "area": { "code": .. },
//! "weatherCodes": [..] }`. Series covering temperatures or precipitation
//! have no `weatherCodes`, so that field is an expected absence.
//!
//! Only invalid JSON or a non-array top level is fatal. Any other shape
//! mismatch skips the offending branch and is logged as an anomaly so
//! upstream format changes stay visible.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

/// Result of scanning one forecast document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastExtraction {
    /// Weather codes for the requested sub-area and date, in document order.
    pub weather_codes: Vec<String>,
    /// Number of unexpected shapes skipped during the scan.
    pub anomalies: usize,
}

/// Fatal decode failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForecastParseError {
    #[error("forecast body is not valid JSON: {message}")]
    InvalidJson { message: String },
    #[error("forecast body must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },
}

enum Field<'a, T> {
    Absent,
    Unexpected(&'static str),
    Present(&'a T),
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn array_field<'a>(object: &'a Map<String, Value>, key: &str) -> Field<'a, Vec<Value>> {
    match object.get(key) {
        None | Some(Value::Null) => Field::Absent,
        Some(Value::Array(items)) => Field::Present(items),
        Some(other) => Field::Unexpected(kind(other)),
    }
}

fn object_field<'a>(object: &'a Map<String, Value>, key: &str) -> Field<'a, Map<String, Value>> {
    match object.get(key) {
        None | Some(Value::Null) => Field::Absent,
        Some(Value::Object(inner)) => Field::Present(inner),
        Some(other) => Field::Unexpected(kind(other)),
    }
}

struct Scan<'a> {
    sub_area_code: &'a str,
    date_prefix: String,
    extraction: ForecastExtraction,
}

impl Scan<'_> {
    fn anomaly(&mut self, path: &str, expected: &str, found: &str) {
        self.extraction.anomalies += 1;
        warn!(path, expected, found, "unexpected forecast shape; skipping branch");
    }

    fn array<'v>(&mut self, object: &'v Map<String, Value>, key: &str, path: &str) -> Option<&'v Vec<Value>> {
        match array_field(object, key) {
            Field::Present(items) => Some(items),
            Field::Absent => None,
            Field::Unexpected(found) => {
                self.anomaly(&format!("{path}.{key}"), "array", found);
                None
            }
        }
    }

    fn report(&mut self, report: &Value, path: &str) {
        let Value::Object(report) = report else {
            self.anomaly(path, "object", kind(report));
            return;
        };
        let Some(series_list) = self.array(report, "timeSeries", path) else {
            return;
        };
        for (index, series) in series_list.iter().enumerate() {
            self.series(series, &format!("{path}.timeSeries[{index}]"));
        }
    }

    fn series(&mut self, series: &Value, path: &str) {
        let Value::Object(series) = series else {
            self.anomaly(path, "object", kind(series));
            return;
        };
        let Some(time_defines) = self.array(series, "timeDefines", path) else {
            return;
        };
        if !self.covers_target_date(time_defines, path) {
            return;
        }
        let Some(areas) = self.array(series, "areas", path) else {
            return;
        };
        for (index, area) in areas.iter().enumerate() {
            self.area_block(area, &format!("{path}.areas[{index}]"));
        }
    }

    fn covers_target_date(&mut self, time_defines: &[Value], path: &str) -> bool {
        let mut covered = false;
        for (index, time) in time_defines.iter().enumerate() {
            match time {
                Value::String(text) => covered |= text.starts_with(&self.date_prefix),
                other => self.anomaly(&format!("{path}.timeDefines[{index}]"), "string", kind(other)),
            }
        }
        covered
    }

    fn area_block(&mut self, block: &Value, path: &str) {
        let Value::Object(block) = block else {
            self.anomaly(path, "object", kind(block));
            return;
        };
        let area = match object_field(block, "area") {
            Field::Present(area) => area,
            Field::Absent => return,
            Field::Unexpected(found) => {
                self.anomaly(&format!("{path}.area"), "object", found);
                return;
            }
        };
        match area.get("code") {
            Some(Value::String(code)) if code == self.sub_area_code => {}
            Some(Value::String(_)) | None => return,
            Some(other) => {
                self.anomaly(&format!("{path}.area.code"), "string", kind(other));
                return;
            }
        }
        let Some(codes) = self.array(block, "weatherCodes", path) else {
            return;
        };
        for (index, code) in codes.iter().enumerate() {
            match code {
                Value::String(code) => self.extraction.weather_codes.push(code.clone()),
                other => self.anomaly(&format!("{path}.weatherCodes[{index}]"), "string", kind(other)),
            }
        }
    }
}

/// Extract the weather codes for `sub_area_code` from every time series that
/// references `target_date`.
///
/// Matches across series are concatenated, duplicates kept. An empty result
/// means the document has no data for that area and date yet.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use weather_bot::domain::extract_weather_codes;
///
/// let body = br#"[{"timeSeries":[{"timeDefines":["2026-06-01T05:00:00+09:00"],
///     "areas":[{"area":{"code":"130010"},"weatherCodes":["300"]}]}]}]"#;
/// let date = NaiveDate::from_ymd_opt(2026, 6, 1).expect("date");
/// let found = extract_weather_codes(body, "130010", date).expect("valid forecast");
/// assert_eq!(found.weather_codes, vec!["300".to_owned()]);
/// ```
pub fn extract_weather_codes(
    body: &[u8],
    sub_area_code: &str,
    target_date: NaiveDate,
) -> Result<ForecastExtraction, ForecastParseError> {
    let document: Value =
        serde_json::from_slice(body).map_err(|err| ForecastParseError::InvalidJson {
            message: err.to_string(),
        })?;
    let Value::Array(reports) = &document else {
        return Err(ForecastParseError::NotAnArray {
            found: kind(&document),
        });
    };

    let mut scan = Scan {
        sub_area_code,
        date_prefix: target_date.format("%Y-%m-%d").to_string(),
        extraction: ForecastExtraction::default(),
    };
    for (index, report) in reports.iter().enumerate() {
        scan.report(report, &format!("$[{index}]"));
    }
    Ok(scan.extraction)
}

#[cfg(test)]
mod tests;
