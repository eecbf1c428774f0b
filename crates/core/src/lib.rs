//! sidekick 공통 크레이트
//!
//! 모든 출력(destination)이 공유하는 이벤트 모델과 설정을 정의합니다.
//!
//! - [`event`]: Falco 이벤트 모델과 필드 문자열화 규칙
//! - [`priority`]: 순서가 있는 우선순위 레벨
//! - [`config`]: sidekick.toml 파싱, 환경변수 오버라이드, 검증
//! - [`error`]: 도메인 에러 타입
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod priority;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, EventError, SidekickError};

// 설정
pub use config::SidekickConfig;

// 이벤트
pub use event::{FalcoEvent, FieldValue};
pub use priority::Priority;
