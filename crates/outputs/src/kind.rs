//! 출력 종류 식별자

use std::fmt;

use serde::{Deserialize, Serialize};

/// 출력(destination) 종류
///
/// 변환기 레지스트리와 통계의 키로 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Prometheus Alertmanager
    Alertmanager,
    /// InfluxDB line protocol
    Influxdb,
    /// Grafana Loki
    Loki,
    /// Datadog events API
    Datadog,
}

impl OutputKind {
    /// 기본 제공 출력 목록
    pub const ALL: [OutputKind; 4] = [Self::Alertmanager, Self::Influxdb, Self::Loki, Self::Datadog];

    /// 로그 및 메트릭 레이블에 쓰는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alertmanager => "alertmanager",
            Self::Influxdb => "influxdb",
            Self::Loki => "loki",
            Self::Datadog => "datadog",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
