//! # sidekick-outputs
//!
//! Falco 이벤트를 여러 출력(destination)으로 보내는 팬아웃 엔진입니다.
//!
//! ## 구성
//!
//! - [`transform`]: 출력 형식별 순수 변환기와 [`TransformerRegistry`]
//! - [`client`]: 단일 POST와 응답 분류를 담당하는 [`OutputClient`]
//! - [`output`]: 변환, 전송, 카운터 갱신을 묶은 [`Output`] 어댑터
//! - [`stats`]: 출력별 `total`/`sent`/`error` 카운터
//! - [`dispatcher`]: 활성 출력으로의 동시 팬아웃
//!
//! 전송은 한 번만 시도하며 재시도하지 않습니다.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod kind;
pub mod output;
pub mod payload;
pub mod stats;
pub mod transform;

pub use client::{ClientConfig, OutputClient};
pub use dispatcher::{DispatchReport, Dispatcher, DispatcherBuilder};
pub use error::{ClientError, DeliveryError};
pub use kind::OutputKind;
pub use output::{DeliveryOutcome, Output, OutputSettings};
pub use payload::Payload;
pub use stats::{OutputStats, Statistics, StatsSnapshot};
pub use transform::{Transformer, TransformerRegistry};
