//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 출력 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sidekick_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use sidekick_core::metrics;
//! use metrics::counter;
//!
//! counter!(
//!     metrics::OUTPUTS_DELIVERIES_TOTAL,
//!     metrics::LABEL_OUTPUT => "loki",
//!     metrics::LABEL_RESULT => metrics::RESULT_SENT,
//! )
//! .increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 출력 이름 레이블 키 (alertmanager, influxdb, loki, datadog)
pub const LABEL_OUTPUT: &str = "output";

/// 결과 레이블 키 (sent, error)
pub const LABEL_RESULT: &str = "result";

/// 전송 성공 결과 값
pub const RESULT_SENT: &str = "sent";

/// 전송 실패 결과 값
pub const RESULT_ERROR: &str = "error";

// ─── 메트릭 이름 ────────────────────────────────────────────────────

/// 수신된 이벤트 수 (counter)
pub const EVENTS_RECEIVED_TOTAL: &str = "sidekick_events_received_total";

/// 출력별 전송 시도 수 (counter, labels: output, result)
pub const OUTPUTS_DELIVERIES_TOTAL: &str = "sidekick_outputs_deliveries_total";

/// 최소 우선순위 미달로 건너뛴 전송 수 (counter, label: output)
pub const OUTPUTS_SKIPPED_TOTAL: &str = "sidekick_outputs_skipped_total";

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출합니다. 레코더가 없으면 아무 일도 하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        EVENTS_RECEIVED_TOTAL,
        "Total number of events accepted for dispatch"
    );
    describe_counter!(
        OUTPUTS_DELIVERIES_TOTAL,
        "Delivery attempts per output, labelled by result (sent, error)"
    );
    describe_counter!(
        OUTPUTS_SKIPPED_TOTAL,
        "Events not sent to an output because of its minimum priority"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        EVENTS_RECEIVED_TOTAL,
        OUTPUTS_DELIVERIES_TOTAL,
        OUTPUTS_SKIPPED_TOTAL,
    ];

    #[test]
    fn all_metrics_start_with_sidekick_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("sidekick_"),
                "Metric '{}' does not start with 'sidekick_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in ALL_METRIC_NAMES {
            assert!(name.ends_with("_total"), "Counter '{}' lacks _total", name);
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_OUTPUT, LABEL_RESULT, RESULT_SENT, RESULT_ERROR] {
            assert_eq!(label.to_lowercase(), label);
        }
    }
}
