//! 출력 전송 클라이언트
//!
//! [`OutputClient`]는 출력 하나의 주소와 HTTP 클라이언트를 묶은 값입니다.
//! 생성 후에는 변경되지 않으므로 복제하여 여러 태스크에서 동시에 `post`할 수 있습니다.
//!
//! 전송은 항상 한 번만 시도합니다. 요청 타임아웃은 [`ClientConfig::timeout`]으로
//! HTTP 클라이언트에 위임됩니다.

use std::time::Duration;

use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::error::{ClientError, DeliveryError};
use crate::kind::OutputKind;
use crate::payload::Payload;

/// 기본 User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("sidekick/", env!("CARGO_PKG_VERSION"));

/// HTTP 클라이언트 설정
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 요청 타임아웃
    pub timeout: Duration,
    /// User-Agent 헤더
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ClientConfig {
    /// 이 설정으로 `reqwest::Client`를 만듭니다.
    ///
    /// 여러 출력이 하나의 클라이언트(연결 풀)를 공유할 때 사용합니다.
    pub fn build_http_client(&self) -> Result<reqwest::Client, ClientError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))
    }
}

/// 출력 하나의 전송 클라이언트
///
/// 주소의 쿼리와 비밀번호에는 자격 증명이 들어갈 수 있으므로
/// `Debug`와 에러 메시지에는 [`OutputClient::redacted_endpoint`]만 노출합니다.
#[derive(Clone)]
pub struct OutputClient {
    kind: OutputKind,
    endpoint: Url,
    http: reqwest::Client,
}

impl OutputClient {
    /// 새 HTTP 클라이언트를 만들어 출력 클라이언트를 생성합니다.
    ///
    /// 네트워크 I/O는 하지 않습니다.
    ///
    /// # Errors
    ///
    /// - 주소가 스킴과 호스트가 있는 절대 URL이 아니면 `ClientError::InvalidAddress`
    /// - HTTP 클라이언트 생성 실패 시 `ClientError::HttpClient`
    pub fn new(kind: OutputKind, address: &str, config: &ClientConfig) -> Result<Self, ClientError> {
        let endpoint = parse_address(address)?;
        let http = config.build_http_client()?;
        Ok(Self {
            kind,
            endpoint,
            http,
        })
    }

    /// 이미 만들어진 HTTP 클라이언트를 공유하여 출력 클라이언트를 생성합니다.
    pub fn with_http_client(
        kind: OutputKind,
        address: &str,
        http: reqwest::Client,
    ) -> Result<Self, ClientError> {
        let endpoint = parse_address(address)?;
        Ok(Self {
            kind,
            endpoint,
            http,
        })
    }

    /// 출력 종류
    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    /// 전송 대상 URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// 쿼리와 비밀번호를 제거한 전송 대상 URL
    pub fn redacted_endpoint(&self) -> String {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        // 호스트가 있는 URL만 허용하므로 실패하지 않습니다.
        let _ = url.set_password(None);
        url.into()
    }

    /// 페이로드를 한 번 POST하고 응답을 분류합니다.
    ///
    /// 2xx는 `Ok(())`, 그 외 상태 코드는 [`DeliveryError::classify`] 표에 따르며
    /// 응답을 받지 못하면 `DeliveryError::TransportFailure`입니다.
    pub async fn post(&self, payload: &Payload) -> Result<(), DeliveryError> {
        let body = payload.encode()?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, payload.content_type())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                warn!(
                    output = %self.kind,
                    endpoint = %self.redacted_endpoint(),
                    error = %e,
                    "request failed"
                );
                DeliveryError::TransportFailure(e.to_string())
            })?;

        let status = response.status();
        match DeliveryError::classify(status) {
            Ok(()) => {
                debug!(output = %self.kind, status = status.as_u16(), "payload delivered");
                Ok(())
            }
            Err(err) => {
                warn!(
                    output = %self.kind,
                    status = status.as_u16(),
                    error = %err,
                    "delivery rejected"
                );
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for OutputClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputClient")
            .field("kind", &self.kind)
            .field("endpoint", &self.redacted_endpoint())
            .finish_non_exhaustive()
    }
}

fn parse_address(address: &str) -> Result<Url, ClientError> {
    // 쿼리에는 API 키가 들어갈 수 있으므로 에러에는 남기지 않습니다.
    let shown = address.split_once('?').map_or(address, |(base, _)| base);
    let invalid = |reason: String| ClientError::InvalidAddress {
        address: shown.to_owned(),
        reason,
    };

    if address.trim().is_empty() {
        return Err(invalid("empty address".to_owned()));
    }
    let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(url)
}
