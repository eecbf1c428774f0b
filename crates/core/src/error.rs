//! 에러 타입: 도메인별 에러 정의

/// sidekick 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SidekickError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 이벤트 파싱 에러
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// 출력(destination) 구성 에러
    #[error("output error: {0}")]
    Output(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 이벤트 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// 알 수 없는 우선순위 문자열
    #[error("unknown priority: {0}")]
    UnknownPriority(String),

    /// Falco JSON 페이로드 파싱 실패
    #[error("malformed event payload: {0}")]
    Malformed(String),
}
