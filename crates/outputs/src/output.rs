//! 출력 어댑터
//!
//! [`Output`]은 변환기, 전송 클라이언트, 카운터를 묶어 이벤트 한 건을 한 번 전송합니다.
//! 전송 실패는 카운터와 [`DeliveryOutcome`]으로만 드러나며 호출자에게 에러로 전파되지 않습니다.

use std::sync::Arc;

use sidekick_core::{FalcoEvent, Priority};
use tracing::debug;

use crate::client::OutputClient;
use crate::error::{ClientError, DeliveryError};
use crate::kind::OutputKind;
use crate::stats::OutputStats;
use crate::transform::{Transformer, TransformerRegistry};

/// 출력별 변환 설정
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    /// 이 값보다 낮은 우선순위의 이벤트는 보내지 않음
    pub minimum_priority: Priority,
}

/// 전송 한 건의 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub error: Option<DeliveryError>,
}

impl DeliveryOutcome {
    pub fn sent() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: DeliveryError) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }
}

impl From<Result<(), DeliveryError>> for DeliveryOutcome {
    fn from(result: Result<(), DeliveryError>) -> Self {
        match result {
            Ok(()) => Self::sent(),
            Err(err) => Self::failed(err),
        }
    }
}

/// 출력 하나
pub struct Output {
    client: OutputClient,
    transformer: Arc<dyn Transformer>,
    settings: OutputSettings,
    stats: Arc<OutputStats>,
}

impl Output {
    /// 변환기를 직접 지정하여 출력을 만듭니다.
    pub fn new(
        client: OutputClient,
        transformer: Arc<dyn Transformer>,
        settings: OutputSettings,
        stats: Arc<OutputStats>,
    ) -> Self {
        Self {
            client,
            transformer,
            settings,
            stats,
        }
    }

    /// 클라이언트 종류에 맞는 변환기를 레지스트리에서 찾아 출력을 만듭니다.
    ///
    /// # Errors
    ///
    /// 해당 종류의 변환기가 없으면 `ClientError::MissingTransformer`
    pub fn from_registry(
        client: OutputClient,
        registry: &TransformerRegistry,
        settings: OutputSettings,
        stats: Arc<OutputStats>,
    ) -> Result<Self, ClientError> {
        let transformer = registry
            .get(client.kind())
            .ok_or_else(|| ClientError::MissingTransformer(client.kind().to_string()))?;
        Ok(Self::new(client, transformer, settings, stats))
    }

    pub fn kind(&self) -> OutputKind {
        self.client.kind()
    }

    pub fn settings(&self) -> &OutputSettings {
        &self.settings
    }

    pub fn stats(&self) -> &Arc<OutputStats> {
        &self.stats
    }

    /// 이벤트 우선순위가 최소 우선순위 이상인지
    pub fn accepts(&self, priority: Priority) -> bool {
        priority >= self.settings.minimum_priority
    }

    /// 이벤트를 변환하여 한 번 전송하고 카운터를 갱신합니다.
    pub async fn dispatch(&self, event: &FalcoEvent) -> DeliveryOutcome {
        let payload = self.transformer.transform(event, &self.settings);
        let result = self.client.post(&payload).await;
        self.stats.record(self.kind(), result.is_ok());

        debug!(
            output = %self.kind(),
            rule = %event.rule,
            success = result.is_ok(),
            "dispatch finished"
        );
        result.into()
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("kind", &self.kind())
            .field("endpoint", &self.client.redacted_endpoint())
            .field("settings", &self.settings)
            .finish()
    }
}
