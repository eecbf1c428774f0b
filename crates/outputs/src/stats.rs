//! 출력별 전송 통계
//!
//! 출력마다 `total`, `sent`, `error` 세 개의 단조 증가 카운터를 둡니다.
//! 카운터는 [`Output`](crate::output::Output)에 `Arc`로 주입되며 전역 상태가 아닙니다.
//! 증가는 `metrics` 파사드의 `sidekick_outputs_deliveries_total{output, result}`에도 반영됩니다.
//!
//! `sent`/`error`를 먼저 올리고 `total`을 나중에 올리므로, 동시 전송 중에 읽어도
//! `total <= sent + error`이고 진행 중인 전송이 없으면 `total == sent + error`입니다.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use sidekick_core::metrics as m;

use crate::kind::OutputKind;

/// 출력 하나의 전송 카운터
#[derive(Debug, Default)]
pub struct OutputStats {
    total: AtomicU64,
    sent: AtomicU64,
    error: AtomicU64,
}

impl OutputStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 전송 시도 한 건을 기록합니다.
    pub fn record(&self, kind: OutputKind, success: bool) {
        let result = if success {
            self.sent.fetch_add(1, Ordering::Relaxed);
            m::RESULT_SENT
        } else {
            self.error.fetch_add(1, Ordering::Relaxed);
            m::RESULT_ERROR
        };
        self.total.fetch_add(1, Ordering::Release);

        metrics::counter!(
            m::OUTPUTS_DELIVERIES_TOTAL,
            m::LABEL_OUTPUT => kind.as_str(),
            m::LABEL_RESULT => result,
        )
        .increment(1);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn error(&self) -> u64 {
        self.error.load(Ordering::Relaxed)
    }

    /// 현재 값의 스냅샷
    pub fn snapshot(&self) -> StatsSnapshot {
        let total = self.total();
        StatsSnapshot {
            total,
            sent: self.sent(),
            error: self.error(),
        }
    }
}

/// 카운터 스냅샷
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub sent: u64,
    pub error: u64,
}

/// 출력 종류별 카운터 모음
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    outputs: BTreeMap<OutputKind, Arc<OutputStats>>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 출력 종류의 카운터 핸들을 반환합니다. 없으면 새로 만듭니다.
    pub fn handle(&mut self, kind: OutputKind) -> Arc<OutputStats> {
        Arc::clone(self.outputs.entry(kind).or_default())
    }

    /// 등록된 카운터를 조회합니다.
    pub fn get(&self, kind: OutputKind) -> Option<&Arc<OutputStats>> {
        self.outputs.get(&kind)
    }

    /// 모든 출력의 스냅샷
    pub fn snapshot(&self) -> BTreeMap<OutputKind, StatsSnapshot> {
        self.outputs
            .iter()
            .map(|(kind, stats)| (*kind, stats.snapshot()))
            .collect()
    }
}
