//! 출력 어댑터와 디스패처 통합 테스트
//!
//! - 404/200 응답에 따른 카운터 갱신
//! - 출력 간 격리
//! - 최소 우선순위 건너뛰기
//! - total == sent + error

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sidekick_core::{FalcoEvent, Priority, SidekickConfig};
use sidekick_outputs::{
    ClientConfig, DeliveryError, Dispatcher, Output, OutputClient, OutputKind, OutputSettings,
    OutputStats, Statistics, StatsSnapshot, TransformerRegistry,
};
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

fn sample_event(priority: Priority) -> FalcoEvent {
    FalcoEvent::new(
        "This is a test from falcosidekick",
        priority,
        "Test rule",
        Utc.with_ymd_and_hms(2001, 1, 1, 1, 10, 0).unwrap(),
    )
    .with_field("proc.name", "falcosidekick")
    .with_field("proc.tty", 1234_i64)
}

async fn server_returning(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn output_for(kind: OutputKind, server: &MockServer, stats: Arc<OutputStats>) -> Output {
    let client = OutputClient::new(kind, &server.uri(), &ClientConfig::default()).unwrap();
    Output::from_registry(
        client,
        &TransformerRegistry::with_defaults(),
        OutputSettings::default(),
        stats,
    )
    .unwrap()
}

#[tokio::test]
async fn not_found_counts_as_error() {
    let server = server_returning(404).await;
    let stats = Arc::new(OutputStats::new());
    let output = output_for(OutputKind::Alertmanager, &server, Arc::clone(&stats));

    let outcome = output.dispatch(&sample_event(Priority::Debug)).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(DeliveryError::NotFound));
    assert_eq!(
        stats.snapshot(),
        StatsSnapshot {
            total: 1,
            sent: 0,
            error: 1
        }
    );
}

#[tokio::test]
async fn ok_counts_as_sent() {
    let server = server_returning(200).await;
    let stats = Arc::new(OutputStats::new());
    let output = output_for(OutputKind::Alertmanager, &server, Arc::clone(&stats));

    let outcome = output.dispatch(&sample_event(Priority::Debug)).await;

    assert!(outcome.success);
    assert_eq!(outcome.error, None);
    assert_eq!(
        stats.snapshot(),
        StatsSnapshot {
            total: 1,
            sent: 1,
            error: 0
        }
    );
}

#[tokio::test]
async fn every_builtin_format_is_accepted_by_a_json_or_text_endpoint() {
    let server = server_returning(200).await;
    for kind in OutputKind::ALL {
        let stats = Arc::new(OutputStats::new());
        let output = output_for(kind, &server, Arc::clone(&stats));
        let outcome = output.dispatch(&sample_event(Priority::Notice)).await;
        assert!(outcome.success, "{kind}");
        assert_eq!(stats.sent(), 1, "{kind}");
    }
}

#[tokio::test]
async fn failing_output_does_not_affect_others() {
    let ok = server_returning(200).await;
    let broken = server_returning(500).await;
    let refused_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let dispatcher = Dispatcher::builder()
        .output(OutputKind::Loki, ok.uri(), Priority::Debug)
        .output(OutputKind::Alertmanager, broken.uri(), Priority::Debug)
        .output(
            OutputKind::Datadog,
            format!("http://127.0.0.1:{refused_port}/"),
            Priority::Debug,
        )
        .build()
        .unwrap();

    let reports = dispatcher
        .dispatch(Arc::new(sample_event(Priority::Critical)))
        .await;
    assert_eq!(reports.len(), 3);

    let succeeded: HashSet<_> = reports
        .iter()
        .filter(|r| r.outcome.success)
        .map(|r| r.output)
        .collect();
    assert_eq!(succeeded, HashSet::from([OutputKind::Loki]));

    let stats = dispatcher.statistics();
    assert_eq!(stats.get(OutputKind::Loki).unwrap().sent(), 1);
    assert_eq!(stats.get(OutputKind::Alertmanager).unwrap().error(), 1);
    assert_eq!(stats.get(OutputKind::Datadog).unwrap().error(), 1);
}

#[tokio::test]
async fn events_below_minimum_priority_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::builder()
        .output(OutputKind::Loki, server.uri(), Priority::Warning)
        .build()
        .unwrap();

    let skipped = dispatcher.dispatch(Arc::new(sample_event(Priority::Notice))).await;
    assert!(skipped.is_empty());

    let sent = dispatcher.dispatch(Arc::new(sample_event(Priority::Error))).await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].outcome.success);

    let loki = dispatcher.statistics().get(OutputKind::Loki).unwrap().snapshot();
    assert_eq!(
        loki,
        StatsSnapshot {
            total: 1,
            sent: 1,
            error: 0
        }
    );
}

#[tokio::test]
async fn injected_statistics_are_shared_with_caller() {
    let server = server_returning(429).await;
    let mut statistics = Statistics::new();
    let handle = statistics.handle(OutputKind::Influxdb);

    let dispatcher = Dispatcher::builder()
        .statistics(statistics)
        .output(
            OutputKind::Influxdb,
            format!("{}/write?db=falco", server.uri()),
            Priority::Debug,
        )
        .build()
        .unwrap();

    let reports = dispatcher.dispatch(Arc::new(sample_event(Priority::Debug))).await;
    assert_eq!(
        reports[0].outcome.error,
        Some(DeliveryError::TooManyRequests)
    );
    assert_eq!(handle.error(), 1);
}

#[tokio::test]
async fn totals_stay_consistent_under_concurrent_dispatch() {
    let ok = server_returning(200).await;
    let bad = server_returning(422).await;

    let dispatcher = Arc::new(
        Dispatcher::builder()
            .output(OutputKind::Loki, ok.uri(), Priority::Debug)
            .output(OutputKind::Datadog, bad.uri(), Priority::Debug)
            .build()
            .unwrap(),
    );

    let event = Arc::new(sample_event(Priority::Alert));
    let mut handles = Vec::new();
    for _ in 0..20 {
        let dispatcher = Arc::clone(&dispatcher);
        let event = Arc::clone(&event);
        handles.push(tokio::spawn(async move { dispatcher.dispatch(event).await }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().len(), 2);
    }

    for (kind, snap) in dispatcher.statistics().snapshot() {
        assert_eq!(snap.total, 20, "{kind}");
        assert_eq!(snap.total, snap.sent + snap.error, "{kind}");
    }
    assert_eq!(dispatcher.statistics().get(OutputKind::Datadog).unwrap().error(), 20);
}

#[tokio::test]
async fn config_endpoints_hit_expected_paths() {
    let server = MockServer::start().await;
    for p in ["/api/v1/alerts", "/api/prom/push", "/write", "/api/v1/events"] {
        Mock::given(matchers::method("POST"))
            .and(matchers::path(p))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut config = SidekickConfig::default();
    config.alertmanager.host_port = server.uri();
    config.loki.host_port = server.uri();
    config.influxdb.host_port = server.uri();
    config.influxdb.database = "falco".to_owned();
    config.datadog.api_key = "secret".to_owned();
    config.datadog.host = server.uri();

    let dispatcher = Dispatcher::from_config(&config).unwrap();
    let reports = dispatcher.dispatch(Arc::new(sample_event(Priority::Debug))).await;

    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r.outcome.success), "{reports:?}");
}
