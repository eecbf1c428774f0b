//! Datadog events API 형식 (`/api/v1/events`)

use serde::{Deserialize, Serialize};
use sidekick_core::{FalcoEvent, Priority};

use crate::kind::OutputKind;
use crate::output::OutputSettings;
use crate::payload::Payload;
use crate::transform::Transformer;

/// Datadog 이벤트 소스 이름
pub const SOURCE_TYPE_NAME: &str = "falco";

/// Datadog 이벤트
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatadogEvent {
    /// 룰 이름
    pub title: String,
    /// 출력 메시지
    pub text: String,
    /// `error`, `warning`, `info`
    pub alert_type: String,
    pub source_type_name: String,
    /// `key:value` 태그
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Datadog 변환기
#[derive(Debug, Clone, Copy, Default)]
pub struct DatadogTransformer;

impl Transformer for DatadogTransformer {
    fn kind(&self) -> OutputKind {
        OutputKind::Datadog
    }

    fn transform(&self, event: &FalcoEvent, _settings: &OutputSettings) -> Payload {
        Payload::Datadog(new_event(event))
    }
}

/// 이벤트에서 Datadog 이벤트를 만듭니다.
pub fn new_event(event: &FalcoEvent) -> DatadogEvent {
    let mut tags = Vec::with_capacity(event.output_fields.len());
    event.output_field_strings(|key, value| tags.push(format!("{key}:{value}")));

    DatadogEvent {
        title: event.rule.clone(),
        text: event.output.clone(),
        alert_type: alert_type(event.priority).to_owned(),
        source_type_name: SOURCE_TYPE_NAME.to_owned(),
        tags,
    }
}

/// 우선순위 → Datadog `alert_type`
pub fn alert_type(priority: Priority) -> &'static str {
    match priority {
        Priority::Emergency | Priority::Alert | Priority::Critical | Priority::Error => "error",
        Priority::Warning => "warning",
        Priority::Notice | Priority::Informational | Priority::Debug => "info",
    }
}
