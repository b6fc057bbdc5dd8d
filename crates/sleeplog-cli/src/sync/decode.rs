//! Raw provider sleep log → `SleepRecord`

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Result, SleepLogError};
use crate::models::{SleepRecord, StageValues};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSleepLog {
    date_of_sleep: String,
    start_time: String,
    minutes_after_wakeup: u32,
    minutes_to_fall_asleep: u32,
    levels: RawLevels,
}

#[derive(Debug, Deserialize)]
struct RawLevels {
    summary: RawSummary,
}

/// Stage summaries. Classic logs carry asleep/restless/awake instead and fail here.
#[derive(Debug, Deserialize)]
struct RawSummary {
    deep: RawStage,
    light: RawStage,
    rem: RawStage,
    wake: RawStage,
}

#[derive(Debug, Deserialize)]
struct RawStage {
    minutes: u32,
}

/// Decode one raw sleep log.
///
/// Every field is required; a missing or mistyped one is a `Decode` error
/// that names the log's date when it is readable.
pub fn decode_record(raw: &serde_json::Value) -> Result<SleepRecord> {
    let label = raw
        .get("dateOfSleep")
        .and_then(|v| v.as_str())
        .unwrap_or("<unknown date>");

    let log = RawSleepLog::deserialize(raw)
        .map_err(|e| SleepLogError::decode(format!("sleep log {}: {}", label, e)))?;

    let date = NaiveDate::parse_from_str(&log.date_of_sleep, "%Y-%m-%d").map_err(|_| {
        SleepLogError::decode(format!("sleep log has invalid dateOfSleep {:?}", log.date_of_sleep))
    })?;
    let start_time = parse_start_time(&log.start_time).ok_or_else(|| {
        SleepLogError::decode(format!(
            "sleep log {}: invalid startTime {:?}",
            date, log.start_time
        ))
    })?;

    let summary = log.levels.summary;
    let stages = StageValues {
        deep: summary.deep.minutes,
        light: summary.light.minutes,
        rem: summary.rem.minutes,
        wake: summary.wake.minutes,
    };

    Ok(SleepRecord::new(
        date,
        start_time,
        log.minutes_after_wakeup,
        log.minutes_to_fall_asleep,
        stages,
    ))
}

/// Decode a batch; the first failure aborts the batch.
pub fn decode_records(raw: &[serde_json::Value]) -> Result<Vec<SleepRecord>> {
    raw.iter().map(decode_record).collect()
}

fn parse_start_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_log(date: &str) -> serde_json::Value {
        json!({
            "dateOfSleep": date,
            "duration": 13200000,
            "efficiency": 96,
            "isMainSleep": true,
            "logId": 1,
            "minutesAfterWakeup": 2,
            "minutesToFallAsleep": 0,
            "startTime": format!("{}T23:12:30.000", date),
            "type": "stages",
            "levels": {
                "summary": {
                    "deep": { "count": 3, "minutes": 60, "thirtyDayAvgMinutes": 55 },
                    "light": { "count": 20, "minutes": 120, "thirtyDayAvgMinutes": 200 },
                    "rem": { "count": 4, "minutes": 30, "thirtyDayAvgMinutes": 80 },
                    "wake": { "count": 15, "minutes": 10, "thirtyDayAvgMinutes": 40 }
                },
                "data": []
            }
        })
    }

    #[test]
    fn test_decode_stages_log() {
        let record = decode_record(&raw_log("2024-01-01")).unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(record.minutes_after_wakeup, 2);
        assert_eq!(record.minutes_to_fall_asleep, 0);
        assert_eq!(
            record.start_time,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(23, 12, 30)
                .unwrap()
        );
        assert_eq!((record.deep, record.light, record.rem, record.wake), (60, 120, 30, 10));
        assert_eq!(record.duration, 220);
        assert_eq!(record.efficiency, Some(0.95));
    }

    #[test]
    fn test_efficiency_matches_formula() {
        let mut raw = raw_log("2024-03-10");
        raw["levels"]["summary"]["deep"]["minutes"] = json!(47);
        raw["levels"]["summary"]["light"]["minutes"] = json!(233);
        raw["levels"]["summary"]["rem"]["minutes"] = json!(91);
        raw["levels"]["summary"]["wake"]["minutes"] = json!(58);

        let record = decode_record(&raw).unwrap();
        let expected = ((371.0f64 / 429.0) * 100.0).round() / 100.0;
        assert_eq!(record.duration, 429);
        assert_eq!(record.efficiency, Some(expected));
    }

    #[test]
    fn test_zero_duration_is_not_an_error() {
        let mut raw = raw_log("2024-01-01");
        for stage in ["deep", "light", "rem", "wake"] {
            raw["levels"]["summary"][stage]["minutes"] = json!(0);
        }

        let record = decode_record(&raw).unwrap();
        assert_eq!(record.duration, 0);
        assert_eq!(record.efficiency, None);
    }

    #[test]
    fn test_classic_log_is_rejected() {
        let raw = json!({
            "dateOfSleep": "2024-01-02",
            "minutesAfterWakeup": 0,
            "minutesToFallAsleep": 0,
            "startTime": "2024-01-02T01:00:00.000",
            "type": "classic",
            "levels": {
                "summary": {
                    "asleep": { "count": 0, "minutes": 300 },
                    "awake": { "count": 2, "minutes": 5 },
                    "restless": { "count": 8, "minutes": 20 }
                }
            }
        });

        let err = decode_record(&raw).unwrap_err();
        match err {
            SleepLogError::Decode(msg) => {
                assert!(msg.contains("2024-01-02"));
                assert!(msg.contains("deep"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_top_level_field() {
        let mut raw = raw_log("2024-01-01");
        raw.as_object_mut().unwrap().remove("minutesToFallAsleep");

        let err = decode_record(&raw).unwrap_err();
        assert!(err.to_string().contains("minutesToFallAsleep"));
    }

    #[test]
    fn test_negative_minutes_rejected() {
        let mut raw = raw_log("2024-01-01");
        raw["levels"]["summary"]["wake"]["minutes"] = json!(-4);
        assert!(matches!(
            decode_record(&raw),
            Err(SleepLogError::Decode(_))
        ));
    }

    #[test]
    fn test_invalid_date() {
        let raw = raw_log("01/02/2024");
        let err = decode_record(&raw).unwrap_err();
        assert!(err.to_string().contains("dateOfSleep"));
    }

    #[test]
    fn test_batch_stops_at_first_bad_log() {
        let mut bad = raw_log("2024-01-02");
        bad["levels"] = json!({});
        let raw = vec![raw_log("2024-01-01"), bad, raw_log("2024-01-03")];

        assert!(decode_records(&raw).is_err());
        assert_eq!(decode_records(&raw[..1]).unwrap().len(), 1);
    }
}
