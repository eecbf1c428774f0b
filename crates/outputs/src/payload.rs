//! 출력별 페이로드와 전송용 직렬화

use bytes::Bytes;

use crate::error::DeliveryError;
use crate::transform::alertmanager::AlertmanagerAlert;
use crate::transform::datadog::DatadogEvent;
use crate::transform::loki::LokiPayload;

/// JSON 페이로드의 Content-Type
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 텍스트 페이로드(line protocol)의 Content-Type
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// 이벤트 하나에서 파생된 출력별 페이로드
///
/// 전송 시도마다 새로 만들고 직렬화 후 버립니다.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Alertmanager 알림 배열 (항상 원소 하나)
    Alertmanager(Vec<AlertmanagerAlert>),
    /// InfluxDB line protocol 한 줄
    Influxdb(String),
    /// Loki push 요청
    Loki(LokiPayload),
    /// Datadog 이벤트
    Datadog(DatadogEvent),
}

impl Payload {
    /// 요청에 붙일 Content-Type
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Influxdb(_) => CONTENT_TYPE_TEXT,
            Self::Alertmanager(_) | Self::Loki(_) | Self::Datadog(_) => CONTENT_TYPE_JSON,
        }
    }

    /// 요청 본문 바이트로 직렬화합니다. 텍스트 페이로드는 그대로 사용합니다.
    pub fn encode(&self) -> Result<Bytes, DeliveryError> {
        let encoded = match self {
            Self::Influxdb(line) => return Ok(Bytes::from(line.clone())),
            Self::Alertmanager(alerts) => serde_json::to_vec(alerts),
            Self::Loki(push) => serde_json::to_vec(push),
            Self::Datadog(event) => serde_json::to_vec(event),
        };
        encoded
            .map(Bytes::from)
            .map_err(|e| DeliveryError::Encode(e.to_string()))
    }
}
