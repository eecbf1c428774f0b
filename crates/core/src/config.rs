//! 설정 관리: sidekick.toml 파싱 및 출력별 설정
//!
//! [`SidekickConfig`]는 일반 설정과 모든 출력(destination)의 설정을 담는 최상위 구조체입니다.
//! 출력은 주소(`host_port`, Datadog은 `api_key`)가 비어 있지 않을 때만 활성화됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`SIDEKICK_LOKI_HOST_PORT=http://loki:3100` 형식)
//! 2. 설정 파일 (`sidekick.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sidekick_core::error::SidekickError> {
//! use sidekick_core::config::SidekickConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SidekickConfig::load("sidekick.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SidekickConfig::parse("[loki]\nhost_port = \"http://loki:3100\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SidekickError};
use crate::priority::Priority;

/// Datadog 기본 호스트
pub const DEFAULT_DATADOG_HOST: &str = "https://api.datadoghq.com";

/// sidekick 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SidekickConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// Alertmanager 출력
    #[serde(default)]
    pub alertmanager: AlertmanagerConfig,
    /// InfluxDB 출력
    #[serde(default)]
    pub influxdb: InfluxdbConfig,
    /// Loki 출력
    #[serde(default)]
    pub loki: LokiConfig,
    /// Datadog 출력
    #[serde(default)]
    pub datadog: DatadogConfig,
    /// Prometheus 메트릭 엔드포인트
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl SidekickConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SidekickError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SidekickError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SidekickError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SidekickError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SidekickError> {
        toml::from_str(toml_str).map_err(|e| {
            SidekickError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SIDEKICK_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SIDEKICK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SIDEKICK_GENERAL_LOG_FORMAT");
        override_u64(
            &mut self.general.http_timeout_secs,
            "SIDEKICK_GENERAL_HTTP_TIMEOUT_SECS",
        );

        // Alertmanager
        override_string(
            &mut self.alertmanager.host_port,
            "SIDEKICK_ALERTMANAGER_HOST_PORT",
        );
        override_string(
            &mut self.alertmanager.minimum_priority,
            "SIDEKICK_ALERTMANAGER_MINIMUM_PRIORITY",
        );

        // InfluxDB
        override_string(&mut self.influxdb.host_port, "SIDEKICK_INFLUXDB_HOST_PORT");
        override_string(&mut self.influxdb.database, "SIDEKICK_INFLUXDB_DATABASE");
        override_string(&mut self.influxdb.user, "SIDEKICK_INFLUXDB_USER");
        override_string(&mut self.influxdb.password, "SIDEKICK_INFLUXDB_PASSWORD");
        override_string(
            &mut self.influxdb.minimum_priority,
            "SIDEKICK_INFLUXDB_MINIMUM_PRIORITY",
        );

        // Loki
        override_string(&mut self.loki.host_port, "SIDEKICK_LOKI_HOST_PORT");
        override_string(
            &mut self.loki.minimum_priority,
            "SIDEKICK_LOKI_MINIMUM_PRIORITY",
        );

        // Datadog
        override_string(&mut self.datadog.api_key, "SIDEKICK_DATADOG_API_KEY");
        override_string(&mut self.datadog.host, "SIDEKICK_DATADOG_HOST");
        override_string(
            &mut self.datadog.minimum_priority,
            "SIDEKICK_DATADOG_MINIMUM_PRIORITY",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "SIDEKICK_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "SIDEKICK_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "SIDEKICK_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SidekickError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.general.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.http_timeout_secs".to_owned(),
                reason: "timeout must be greater than zero".to_owned(),
            }
            .into());
        }

        validate_priority("alertmanager.minimum_priority", &self.alertmanager.minimum_priority)?;
        validate_priority("influxdb.minimum_priority", &self.influxdb.minimum_priority)?;
        validate_priority("loki.minimum_priority", &self.loki.minimum_priority)?;
        validate_priority("datadog.minimum_priority", &self.datadog.minimum_priority)?;

        // database가 없으면 write 엔드포인트를 만들 수 없다
        if self.influxdb.is_enabled() && self.influxdb.database.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "influxdb.database".to_owned(),
                reason: "database must not be empty when influxdb is enabled".to_owned(),
            }
            .into());
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "metrics.port".to_owned(),
                reason: "port must be greater than zero when metrics are enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 빈 문자열은 "필터 없음"(Debug)으로 취급합니다.
fn parse_minimum_priority(raw: &str) -> Priority {
    Priority::from_str_loose(raw).unwrap_or_default()
}

fn validate_priority(field: &str, raw: &str) -> Result<(), SidekickError> {
    if raw.is_empty() || Priority::from_str_loose(raw).is_some() {
        return Ok(());
    }
    let names: Vec<&str> = Priority::ALL.iter().map(Priority::as_str).collect();
    Err(ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: format!("must be one of: {}", names.join(", ")),
    }
    .into())
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 출력 HTTP 요청 타임아웃 (초)
    pub http_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            http_timeout_secs: 10,
        }
    }
}

/// Alertmanager 출력 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertmanagerConfig {
    /// Alertmanager 주소 (예: `http://alertmanager:9093`)
    pub host_port: String,
    /// 최소 우선순위
    pub minimum_priority: String,
}

impl AlertmanagerConfig {
    /// 활성화 여부
    pub fn is_enabled(&self) -> bool {
        !self.host_port.is_empty()
    }

    /// 이벤트를 보낼 엔드포인트
    pub fn endpoint(&self) -> String {
        format!("{}/api/v1/alerts", self.host_port.trim_end_matches('/'))
    }

    /// 파싱된 최소 우선순위
    pub fn minimum_priority(&self) -> Priority {
        parse_minimum_priority(&self.minimum_priority)
    }
}

/// InfluxDB 출력 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxdbConfig {
    /// InfluxDB 주소 (예: `http://influxdb:8086`)
    pub host_port: String,
    /// 데이터베이스 이름
    pub database: String,
    /// 사용자 (선택)
    pub user: String,
    /// 비밀번호 (선택)
    pub password: String,
    /// 최소 우선순위
    pub minimum_priority: String,
}

impl InfluxdbConfig {
    /// 활성화 여부
    pub fn is_enabled(&self) -> bool {
        !self.host_port.is_empty()
    }

    /// `/write?db=..` 엔드포인트. 사용자와 비밀번호가 모두 있으면 `u`, `p`를 붙입니다.
    pub fn endpoint(&self) -> String {
        let mut endpoint = format!(
            "{}/write?db={}",
            self.host_port.trim_end_matches('/'),
            self.database
        );
        if !self.user.is_empty() && !self.password.is_empty() {
            endpoint.push_str(&format!("&u={}&p={}", self.user, self.password));
        }
        endpoint
    }

    /// 파싱된 최소 우선순위
    pub fn minimum_priority(&self) -> Priority {
        parse_minimum_priority(&self.minimum_priority)
    }
}

/// Loki 출력 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LokiConfig {
    /// Loki 주소 (예: `http://loki:3100`)
    pub host_port: String,
    /// 최소 우선순위
    pub minimum_priority: String,
}

impl LokiConfig {
    /// 활성화 여부
    pub fn is_enabled(&self) -> bool {
        !self.host_port.is_empty()
    }

    /// 이벤트를 보낼 엔드포인트
    pub fn endpoint(&self) -> String {
        format!("{}/api/prom/push", self.host_port.trim_end_matches('/'))
    }

    /// 파싱된 최소 우선순위
    pub fn minimum_priority(&self) -> Priority {
        parse_minimum_priority(&self.minimum_priority)
    }
}

/// Datadog 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatadogConfig {
    /// API 키 (비어 있으면 비활성화)
    pub api_key: String,
    /// Datadog API 호스트
    pub host: String,
    /// 최소 우선순위
    pub minimum_priority: String,
}

impl Default for DatadogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            host: DEFAULT_DATADOG_HOST.to_owned(),
            minimum_priority: String::new(),
        }
    }
}

impl DatadogConfig {
    /// 활성화 여부
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// 이벤트를 보낼 엔드포인트
    pub fn endpoint(&self) -> String {
        format!(
            "{}/api/v1/events?api_key={}",
            self.host.trim_end_matches('/'),
            self.api_key
        )
    }

    /// 파싱된 최소 우선순위
    pub fn minimum_priority(&self) -> Priority {
        parse_minimum_priority(&self.minimum_priority)
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 리슨 주소
    pub listen_addr: String,
    /// 리슨 포트
    pub port: u16,
    /// 스크레이프 경로 (`/metrics`만 지원)
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 2801,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
