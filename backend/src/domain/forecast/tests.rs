//! Tests for forecast weather-code extraction.

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn target_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date")
}

const OFFICE_FORECAST: &str = r#"[
  {
    "publishingOffice": "気象庁",
    "timeSeries": [
      {
        "timeDefines": ["2026-06-01T11:00:00+09:00", "2026-06-02T00:00:00+09:00"],
        "areas": [
          {"area": {"name": "東京地方", "code": "130010"}, "weatherCodes": ["300", "201"]},
          {"area": {"name": "伊豆諸島北部", "code": "130020"}, "weatherCodes": ["100", "101"]}
        ]
      },
      {
        "timeDefines": ["2026-06-01T12:00:00+09:00"],
        "areas": [{"area": {"code": "130010"}, "pops": ["40"]}]
      }
    ]
  },
  {
    "timeSeries": [
      {
        "timeDefines": ["2026-06-02T00:00:00+09:00"],
        "areas": [{"area": {"code": "130010"}, "weatherCodes": ["999"]}]
      },
      {
        "timeDefines": ["2026-06-01T00:00:00+09:00"],
        "areas": [{"area": {"code": "130010"}, "weatherCodes": ["300"]}]
      }
    ]
  }
]"#;

#[rstest]
fn collects_codes_from_every_matching_series(target_date: NaiveDate) {
    let found = extract_weather_codes(OFFICE_FORECAST.as_bytes(), "130010", target_date)
        .expect("valid forecast");
    assert_eq!(found.weather_codes, vec!["300", "201", "300"]);
    assert_eq!(found.anomalies, 0, "absent weatherCodes is not an anomaly");
}

#[rstest]
fn other_dates_yield_nothing() {
    let date = NaiveDate::from_ymd_opt(2026, 6, 5).expect("valid date");
    let found = extract_weather_codes(OFFICE_FORECAST.as_bytes(), "130010", date)
        .expect("valid forecast");
    assert!(found.weather_codes.is_empty());
}

#[rstest]
fn unknown_area_yields_nothing(target_date: NaiveDate) {
    let found = extract_weather_codes(OFFICE_FORECAST.as_bytes(), "270000", target_date)
        .expect("valid forecast");
    assert_eq!(found, ForecastExtraction::default());
}

#[rstest]
#[case::truncated(b"[{\"timeSeries\": [".as_slice())]
#[case::empty(b"".as_slice())]
fn invalid_json_is_fatal(#[case] body: &[u8], target_date: NaiveDate) {
    let err = extract_weather_codes(body, "130010", target_date).expect_err("parse failure");
    assert!(matches!(err, ForecastParseError::InvalidJson { .. }));
}

#[rstest]
#[case::object(r#"{"timeSeries": []}"#, "object")]
#[case::string(r#""forecast""#, "string")]
fn non_array_top_level_is_fatal(
    #[case] body: &str,
    #[case] found: &'static str,
    target_date: NaiveDate,
) {
    let err = extract_weather_codes(body.as_bytes(), "130010", target_date)
        .expect_err("shape failure");
    assert_eq!(err, ForecastParseError::NotAnArray { found });
}

#[rstest]
fn empty_array_is_valid_and_empty(target_date: NaiveDate) {
    let found = extract_weather_codes(b"[]", "130010", target_date).expect("valid forecast");
    assert_eq!(found, ForecastExtraction::default());
}

#[rstest]
fn unexpected_shapes_are_skipped_and_counted(target_date: NaiveDate) {
    let body = r#"[
      "not a report",
      {"timeSeries": {"oops": true}},
      {
        "timeSeries": [
          {"timeDefines": [20260601, "2026-06-01T05:00:00+09:00"],
           "areas": [
             {"area": "130010", "weatherCodes": ["100"]},
             {"area": {"code": 130010}, "weatherCodes": ["101"]},
             {"area": {"code": "130010"}, "weatherCodes": ["200", 300, "201"]}
           ]}
        ]
      }
    ]"#;
    let found =
        extract_weather_codes(body.as_bytes(), "130010", target_date).expect("tolerant scan");
    assert_eq!(found.weather_codes, vec!["200", "201"]);
    assert_eq!(found.anomalies, 6);
}

#[rstest]
fn missing_fields_are_silently_skipped(target_date: NaiveDate) {
    let body = r#"[
      {"publishingOffice": "気象庁"},
      {"timeSeries": [{"areas": []}, {"timeDefines": ["2026-06-01T05:00:00+09:00"]}]},
      {"timeSeries": [{"timeDefines": ["2026-06-01T05:00:00+09:00"],
                       "areas": [{"weatherCodes": ["100"]}, {"area": {}}]}]}
    ]"#;
    let found =
        extract_weather_codes(body.as_bytes(), "130010", target_date).expect("tolerant scan");
    assert_eq!(found, ForecastExtraction::default());
}
