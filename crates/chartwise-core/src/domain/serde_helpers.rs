//! 백엔드 레코드 역직렬화를 위한 관대한 헬퍼 함수.
//!
//! `#[serde(default)]`는 키가 빠진 경우만 처리합니다. 값이 `null`이거나
//! 타입이 어긋난 경우(`"0.8"`, `-1` 등)에도 기본값을 쓰도록
//! 먼저 `serde_json::Value`로 받은 뒤 변환합니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 숫자 또는 숫자 문자열을 `f64`로 읽습니다.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 읽을 수 없는 값은 0.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.unwrap_or(0.0))
}

/// 읽을 수 없는 값은 `None`.
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_number(&value))
}

/// 정수 ID. 소수는 버림, 읽을 수 없는 값은 0.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(parsed.unwrap_or(0))
}

/// 봉 인덱스와 개수. 음수와 읽을 수 없는 값은 0.
pub fn lenient_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(parsed.and_then(|v| usize::try_from(v).ok()).unwrap_or(0))
}

/// 문자열. 숫자/불리언은 문자열로 바꾸고, 그 외는 빈 문자열.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

/// 문자열. `null`, 배열, 객체는 `None`.
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD` 형식의 시각 (UTC 기준).
/// 읽을 수 없는 값은 `None`.
pub fn lenient_opt_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::String(raw) = value else {
        return Ok(None);
    };
    let raw = raw.trim();

    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Ok(Some(dt));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc()))
}

/// 레코드 배열을 원소별로 역직렬화합니다.
///
/// 읽을 수 없는 원소는 경고 로그를 남기고 건너뜁니다. `null`은 빈 목록,
/// 배열이 아닌 값은 에러입니다.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(D::Error::custom(format!(
                "expected an array of records, got {}",
                value_kind(&other)
            )))
        }
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "읽을 수 없는 레코드 건너뜀");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(total, kept = records.len(), "일부 레코드 제외됨");
    }
    Ok(records)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "lenient_f64")]
        score: f64,
        #[serde(default, deserialize_with = "lenient_usize")]
        index: usize,
        #[serde(default, deserialize_with = "lenient_i64")]
        id: i64,
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
        #[serde(default, deserialize_with = "lenient_opt_date")]
        at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "lenient_list")]
        items: Vec<Loose>,
    }

    #[test]
    fn test_null_and_wrong_types_default() {
        let json = r#"{"score": null, "index": -3, "id": "17", "name": null, "at": 5}"#;
        let loose: Loose = serde_json::from_str(json).unwrap();
        assert_eq!(loose.score, 0.0);
        assert_eq!(loose.index, 0);
        assert_eq!(loose.id, 17);
        assert_eq!(loose.name, "");
        assert!(loose.at.is_none());
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let json = r#"{"score": "0.8", "index": "12", "name": 42, "at": "2024-03-01"}"#;
        let loose: Loose = serde_json::from_str(json).unwrap();
        assert_eq!(loose.score, 0.8);
        assert_eq!(loose.index, 12);
        assert_eq!(loose.name, "42");
        assert_eq!(loose.at.unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_list_skips_unreadable_items() {
        let json = r#"{"items": [{"score": 0.5}, 7, null, {"score": "bad"}]}"#;
        let wrapper: Wrapper = serde_json::from_str(json).unwrap();
        assert_eq!(wrapper.items.len(), 2);
        assert_eq!(wrapper.items[0].score, 0.5);
        assert_eq!(wrapper.items[1].score, 0.0);

        let wrapper: Wrapper = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(wrapper.items.is_empty());

        assert!(serde_json::from_str::<Wrapper>(r#"{"items": {"a": 1}}"#).is_err());
    }
}
