//! Loki push 형식 (`/api/prom/push`)

use serde::{Deserialize, Serialize};
use sidekick_core::FalcoEvent;

use crate::kind::OutputKind;
use crate::output::OutputSettings;
use crate::payload::Payload;
use crate::transform::Transformer;

/// push 요청 본문
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LokiPayload {
    pub streams: Vec<LokiStream>,
}

/// 스트림 하나 (레이블 텍스트와 엔트리 목록)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LokiStream {
    /// `{key="value",...}` 형식의 레이블 텍스트
    pub labels: String,
    pub entries: Vec<LokiEntry>,
}

/// 로그 엔트리
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LokiEntry {
    /// RFC 3339 시각
    pub ts: String,
    pub line: String,
}

/// Loki 변환기
#[derive(Debug, Clone, Copy, Default)]
pub struct LokiTransformer;

impl Transformer for LokiTransformer {
    fn kind(&self) -> OutputKind {
        OutputKind::Loki
    }

    fn transform(&self, event: &FalcoEvent, _settings: &OutputSettings) -> Payload {
        Payload::Loki(new_push(event))
    }
}

/// 이벤트 하나로 스트림 하나, 엔트리 하나짜리 push 요청을 만듭니다.
pub fn new_push(event: &FalcoEvent) -> LokiPayload {
    LokiPayload {
        streams: vec![LokiStream {
            labels: label_text(event),
            entries: vec![LokiEntry {
                ts: event.time_rfc3339(),
                line: event.output.clone(),
            }],
        }],
    }
}

/// 필드 레이블 뒤에 `rule`, `priority`가 붙은 레이블 텍스트
///
/// 키에서는 `.`, `[`, `]`가 제거됩니다.
pub fn label_text(event: &FalcoEvent) -> String {
    let mut pairs = Vec::with_capacity(event.output_fields.len() + 2);
    event.output_field_strings(|key, value| {
        let key: String = key.chars().filter(|c| !matches!(c, '.' | '[' | ']')).collect();
        pairs.push(format!("{key}=\"{value}\""));
    });
    pairs.push(format!("rule=\"{}\"", event.rule));
    pairs.push(format!("priority=\"{}\"", event.priority));
    format!("{{{}}}", pairs.join(","))
}
