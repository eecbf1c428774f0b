//! 이벤트 팬아웃
//!
//! [`Dispatcher`]는 활성화된 출력마다 독립 태스크를 띄워 이벤트 한 건을 동시에 보냅니다.
//! 한 출력의 실패나 패닉은 다른 출력의 전송에 영향을 주지 않습니다.
//!
//! 주소가 잘못된 출력은 구성 시점에 그 출력만 비활성화되고 나머지 출력은 정상 동작합니다.
//!
//! 이벤트 우선순위가 출력의 최소 우선순위보다 낮으면 그 출력은 건너뛰며,
//! 건너뛴 출력은 카운터를 바꾸지 않고 보고서에도 포함되지 않습니다.
//!
//! # 사용 예시
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use sidekick_core::{FalcoEvent, SidekickConfig};
//! use sidekick_outputs::Dispatcher;
//!
//! let config = SidekickConfig::load("sidekick.toml").await?;
//! let dispatcher = Dispatcher::from_config(&config)?;
//!
//! let event = FalcoEvent::from_json(br#"{"output":"o","priority":"Debug","rule":"r","time":"2001-01-01T01:10:00Z"}"#)?;
//! for report in dispatcher.dispatch(Arc::new(event)).await {
//!     println!("{}: {}", report.output, report.outcome.success);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use sidekick_core::metrics as m;
use sidekick_core::{FalcoEvent, SidekickConfig};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::client::{ClientConfig, OutputClient};
use crate::error::ClientError;
use crate::kind::OutputKind;
use crate::output::{DeliveryOutcome, Output, OutputSettings};
use crate::stats::Statistics;
use crate::transform::TransformerRegistry;

/// 출력 하나의 전송 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub output: OutputKind,
    pub outcome: DeliveryOutcome,
}

/// 활성화된 출력 목록과 카운터
#[derive(Debug)]
pub struct Dispatcher {
    outputs: Vec<Arc<Output>>,
    statistics: Statistics,
    rejected: Vec<(OutputKind, ClientError)>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// 설정에서 활성화된 출력으로 디스패처를 만듭니다.
    ///
    /// 모든 출력은 `general.http_timeout_secs` 타임아웃의 HTTP 클라이언트 하나를 공유합니다.
    /// 구성에 실패한 출력은 [`Dispatcher::rejected`]에 남고 건너뜁니다.
    ///
    /// # Errors
    ///
    /// 공유 HTTP 클라이언트를 만들 수 없으면 `ClientError::HttpClient`
    pub fn from_config(config: &SidekickConfig) -> Result<Self, ClientError> {
        let mut builder = Self::builder().client_config(ClientConfig {
            timeout: Duration::from_secs(config.general.http_timeout_secs),
            ..ClientConfig::default()
        });

        if config.alertmanager.is_enabled() {
            builder = builder.output(
                OutputKind::Alertmanager,
                config.alertmanager.endpoint(),
                config.alertmanager.minimum_priority(),
            );
        }
        if config.influxdb.is_enabled() {
            builder = builder.output(
                OutputKind::Influxdb,
                config.influxdb.endpoint(),
                config.influxdb.minimum_priority(),
            );
        }
        if config.loki.is_enabled() {
            builder = builder.output(
                OutputKind::Loki,
                config.loki.endpoint(),
                config.loki.minimum_priority(),
            );
        }
        if config.datadog.is_enabled() {
            builder = builder.output(
                OutputKind::Datadog,
                config.datadog.endpoint(),
                config.datadog.minimum_priority(),
            );
        }

        builder.build()
    }

    /// 활성화된 출력 종류
    pub fn outputs(&self) -> impl Iterator<Item = OutputKind> + '_ {
        self.outputs.iter().map(|o| o.kind())
    }

    /// 출력별 카운터
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// 구성에 실패하여 비활성화된 출력과 그 사유
    pub fn rejected(&self) -> &[(OutputKind, ClientError)] {
        &self.rejected
    }

    /// 이벤트를 모든 활성 출력으로 동시에 보내고 결과를 모읍니다.
    ///
    /// 결과 순서는 보장되지 않습니다.
    pub async fn dispatch(&self, event: Arc<FalcoEvent>) -> Vec<DispatchReport> {
        let mut tasks = JoinSet::new();

        for output in &self.outputs {
            if !output.accepts(event.priority) {
                debug!(
                    output = %output.kind(),
                    priority = %event.priority,
                    minimum = %output.settings().minimum_priority,
                    "event below minimum priority, skipping"
                );
                metrics::counter!(m::OUTPUTS_SKIPPED_TOTAL, m::LABEL_OUTPUT => output.kind().as_str())
                    .increment(1);
                continue;
            }

            let output = Arc::clone(output);
            let event = Arc::clone(&event);
            tasks.spawn(async move {
                let outcome = output.dispatch(&event).await;
                DispatchReport {
                    output: output.kind(),
                    outcome,
                }
            });
        }

        let mut reports = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) if e.is_panic() => error!(error = %e, "output task panicked"),
                Err(e) => error!(error = %e, "output task cancelled"),
            }
        }
        reports
    }
}

/// [`Dispatcher`] 빌더
///
/// 카운터([`Statistics`])와 변환기 레지스트리를 외부에서 주입할 수 있습니다.
pub struct DispatcherBuilder {
    registry: TransformerRegistry,
    statistics: Statistics,
    client_config: ClientConfig,
    http: Option<reqwest::Client>,
    outputs: Vec<(OutputKind, String, OutputSettings)>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            registry: TransformerRegistry::with_defaults(),
            statistics: Statistics::new(),
            client_config: ClientConfig::default(),
            http: None,
            outputs: Vec::new(),
        }
    }

    /// 변환기 레지스트리를 교체합니다.
    pub fn registry(mut self, registry: TransformerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// 카운터 모음을 주입합니다.
    pub fn statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = statistics;
        self
    }

    /// HTTP 클라이언트 설정 (공유 클라이언트를 주입하지 않을 때 사용)
    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    /// 이미 만들어진 HTTP 클라이언트를 공유합니다.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// 출력을 추가합니다.
    pub fn output(
        mut self,
        kind: OutputKind,
        address: impl Into<String>,
        minimum_priority: sidekick_core::Priority,
    ) -> Self {
        self.outputs
            .push((kind, address.into(), OutputSettings { minimum_priority }));
        self
    }

    /// 디스패처를 만듭니다.
    ///
    /// 주소가 잘못되었거나 변환기가 없는 출력은 에러 로그를 남기고 제외합니다.
    ///
    /// # Errors
    ///
    /// 공유 HTTP 클라이언트를 만들 수 없으면 `ClientError::HttpClient`
    pub fn build(self) -> Result<Dispatcher, ClientError> {
        let Self {
            registry,
            mut statistics,
            client_config,
            http,
            outputs: specs,
        } = self;

        let http = match http {
            Some(http) => http,
            None => client_config.build_http_client()?,
        };

        let mut outputs = Vec::with_capacity(specs.len());
        let mut rejected = Vec::new();
        for (kind, address, settings) in specs {
            let built = OutputClient::with_http_client(kind, &address, http.clone()).and_then(
                |client| {
                    let transformer = registry
                        .get(kind)
                        .ok_or_else(|| ClientError::MissingTransformer(kind.to_string()))?;
                    Ok(Output::new(client, transformer, settings, statistics.handle(kind)))
                },
            );
            match built {
                Ok(output) => {
                    info!(
                        output = %kind,
                        minimum_priority = %output.settings().minimum_priority,
                        "output enabled"
                    );
                    outputs.push(Arc::new(output));
                }
                Err(e) => {
                    error!(output = %kind, error = %e, "output disabled");
                    rejected.push((kind, e));
                }
            }
        }

        Ok(Dispatcher {
            outputs,
            statistics,
            rejected,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
