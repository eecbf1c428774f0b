//! 형식별 변환기와 레지스트리
//!
//! 각 출력 형식은 [`Transformer`]를 구현하는 순수 함수 하나로 표현됩니다.
//! 같은 이벤트와 설정에는 항상 동등한 페이로드를 만들며, 이벤트를 변경하지 않습니다.
//! 필드에서 파생된 부분의 순서는 의미가 없습니다.
//!
//! [`TransformerRegistry`]는 출력 종류에서 변환기로의 표이며,
//! 출력 어댑터는 종류별 분기 없이 이 표를 조회합니다.

pub mod alertmanager;
pub mod datadog;
pub mod influxdb;
pub mod loki;

use std::collections::HashMap;
use std::sync::Arc;

use sidekick_core::FalcoEvent;

use crate::kind::OutputKind;
use crate::output::OutputSettings;
use crate::payload::Payload;

pub use alertmanager::AlertmanagerTransformer;
pub use datadog::DatadogTransformer;
pub use influxdb::InfluxdbTransformer;
pub use loki::LokiTransformer;

/// 이벤트를 출력별 페이로드로 바꾸는 변환기
///
/// 구현은 부수 효과가 없어야 하며 실패하지 않습니다.
pub trait Transformer: Send + Sync {
    /// 이 변환기가 담당하는 출력 종류
    fn kind(&self) -> OutputKind;

    /// 이벤트와 출력 설정으로 페이로드를 만듭니다.
    fn transform(&self, event: &FalcoEvent, settings: &OutputSettings) -> Payload;
}

/// 출력 종류 → 변환기 표
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    transformers: HashMap<OutputKind, Arc<dyn Transformer>>,
}

impl TransformerRegistry {
    /// 빈 레지스트리를 만듭니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기본 제공 변환기 네 개를 등록한 레지스트리를 만듭니다.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AlertmanagerTransformer));
        registry.register(Arc::new(InfluxdbTransformer));
        registry.register(Arc::new(LokiTransformer));
        registry.register(Arc::new(DatadogTransformer));
        registry
    }

    /// 변환기를 등록합니다. 같은 종류가 있으면 교체하고 이전 변환기를 돌려줍니다.
    pub fn register(&mut self, transformer: Arc<dyn Transformer>) -> Option<Arc<dyn Transformer>> {
        self.transformers.insert(transformer.kind(), transformer)
    }

    /// 종류에 맞는 변환기를 찾습니다.
    pub fn get(&self, kind: OutputKind) -> Option<Arc<dyn Transformer>> {
        self.transformers.get(&kind).cloned()
    }

    /// 등록된 변환기 수
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.transformers.keys().collect();
        kinds.sort();
        f.debug_struct("TransformerRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
