//! 이벤트 모델: Falco가 보내는 정규화된 보안 이벤트
//!
//! [`FalcoEvent`]는 수신된 이벤트 하나를 나타내며, 모든 출력(destination)이
//! 읽기 전용으로 공유합니다. `output_fields`는 순서가 없는 맵이므로
//! 필드 순서에 의존하는 코드는 작성하지 않습니다.
//!
//! 필드 값은 [`FieldValue`] 합 타입으로 표현되고,
//! [`FieldValue::to_field_string`]이 모든 출력 형식이 공유하는 문자열화 규칙입니다.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::EventError;
use crate::priority::Priority;

/// Falco 이벤트의 필드 값
///
/// Falco `output_fields`의 값은 런타임 타입이 섞여 있으므로
/// 문자열, 숫자, 불리언, 그 외 값으로 나눠 보관합니다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum FieldValue {
    /// 문자열
    String(String),
    /// 숫자 (JSON 숫자는 모두 f64로 취급)
    Number(f64),
    /// 불리언
    Bool(bool),
    /// null, 배열, 객체 등 나머지 값
    Other(serde_json::Value),
}

impl FieldValue {
    /// 필드 값을 출력용 문자열로 변환합니다.
    ///
    /// - 문자열: 그대로
    /// - 불리언: `"true"` / `"false"`
    /// - 숫자: 왕복 가능한 최단 십진 표기 (지수 표기 없음)
    /// - 비유한 숫자: `"NaN"`, `"+Inf"`, `"-Inf"`
    /// - 그 외: JSON 텍스트
    pub fn to_field_string(&self) -> Cow<'_, str> {
        match self {
            Self::String(s) => Cow::Borrowed(s),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Other(v) => Cow::Owned(v.to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n == f64::INFINITY {
        "+Inf".to_owned()
    } else if n == f64::NEG_INFINITY {
        "-Inf".to_owned()
    } else {
        // f64의 Display는 왕복 가능한 최단 표기를 지수 없이 출력한다
        n.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field_string())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::Other(serde_json::Value::Number(n)),
            },
            other => Self::Other(other),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Other(v) => v.serialize(serializer),
        }
    }
}

/// Falco가 전송한 보안 이벤트 한 건
///
/// 생성 후에는 변경하지 않으며, 변환기는 `&FalcoEvent`만 받습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FalcoEvent {
    /// 사람이 읽는 이벤트 메시지
    pub output: String,
    /// 규칙 우선순위
    pub priority: Priority,
    /// 매칭된 규칙 이름
    pub rule: String,
    /// 이벤트 발생 시각
    pub time: DateTime<Utc>,
    /// 추가 필드 (순서 없음)
    #[serde(default)]
    pub output_fields: HashMap<String, FieldValue>,
}

impl FalcoEvent {
    /// 필드 없이 새 이벤트를 생성합니다.
    pub fn new(
        output: impl Into<String>,
        priority: Priority,
        rule: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            output: output.into(),
            priority,
            rule: rule.into(),
            time,
            output_fields: HashMap::new(),
        }
    }

    /// 필드를 추가한 이벤트를 반환합니다. 같은 키는 덮어씁니다.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.output_fields.insert(key.into(), value.into());
        self
    }

    /// Falco JSON 페이로드를 파싱합니다.
    pub fn from_json(raw: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(raw).map_err(|e| EventError::Malformed(e.to_string()))
    }

    /// 모든 필드를 문자열화하여 `visit(key, value)`를 필드마다 한 번씩 호출합니다.
    ///
    /// 호출 순서는 보장되지 않습니다.
    pub fn output_field_strings(&self, mut visit: impl FnMut(&str, &str)) {
        for (key, value) in &self.output_fields {
            visit(key, &value.to_field_string());
        }
    }

    /// RFC 3339 형식의 이벤트 시각 (초 단위, UTC는 `Z`)
    pub fn time_rfc3339(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for FalcoEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FalcoEvent rule={} priority={} fields={}",
            self.rule,
            self.priority,
            self.output_fields.len(),
        )
    }
}
