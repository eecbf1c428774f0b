//! 출력 에러 타입
//!
//! - [`ClientError`]: 출력 구성 시점에 발견되는 에러 (해당 출력에만 치명적)
//! - [`DeliveryError`]: 전송 시도마다 발생하는 에러 (프로세스와 다른 출력에는 영향 없음)
//!
//! `From<ClientError> for SidekickError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use reqwest::StatusCode;
use sidekick_core::error::SidekickError;

/// 출력 클라이언트 구성 에러
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 주소를 스킴과 호스트가 있는 절대 URL로 해석할 수 없음
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress {
        /// 설정된 주소
        address: String,
        /// 실패 사유
        reason: String,
    },

    /// HTTP 클라이언트 생성 실패 (TLS 백엔드 초기화 등)
    #[error("failed to build http client: {0}")]
    HttpClient(String),

    /// 출력 종류에 등록된 변환기가 없음
    #[error("no transformer registered for output '{0}'")]
    MissingTransformer(String),
}

impl From<ClientError> for SidekickError {
    fn from(err: ClientError) -> Self {
        SidekickError::Output(err.to_string())
    }
}

/// 전송 한 건의 실패 분류
///
/// 상태 코드 분류표는 고정이며 출력 종류와 무관합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// 400
    #[error("header missing")]
    HeaderMissing,

    /// 401
    #[error("authentication error")]
    AuthenticationError,

    /// 403
    #[error("forbidden")]
    Forbidden,

    /// 404
    #[error("resource not found")]
    NotFound,

    /// 422
    #[error("unprocessable entity")]
    UnprocessableEntity,

    /// 429
    #[error("exceeding post rate limit")]
    TooManyRequests,

    /// 그 외 2xx가 아닌 응답 (`"502 Bad Gateway"` 형식)
    #[error("{status} {status_text}")]
    Generic {
        /// HTTP 상태 코드
        status: u16,
        /// 상태 설명 (표준 reason phrase)
        status_text: String,
    },

    /// 응답을 받지 못함 (연결 실패, 타임아웃 등)
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// 페이로드 직렬화 실패
    #[error("failed to encode payload: {0}")]
    Encode(String),
}

impl DeliveryError {
    /// 응답 상태 코드를 분류합니다. 2xx는 `Ok(())`입니다.
    pub fn classify(status: StatusCode) -> Result<(), DeliveryError> {
        if status.is_success() {
            return Ok(());
        }
        Err(match status.as_u16() {
            400 => Self::HeaderMissing,
            401 => Self::AuthenticationError,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            code => Self::Generic {
                status: code,
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            },
        })
    }

    /// 분류 이름 (로그 필드용)
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "header_missing",
            Self::AuthenticationError => "authentication_error",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::UnprocessableEntity => "unprocessable_entity",
            Self::TooManyRequests => "too_many_requests",
            Self::Generic { .. } => "generic",
            Self::TransportFailure(_) => "transport_failure",
            Self::Encode(_) => "encode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(code: u16) -> Result<(), DeliveryError> {
        DeliveryError::classify(StatusCode::from_u16(code).unwrap())
    }

    #[test]
    fn success_codes_are_ok() {
        for code in [200, 201, 202, 204, 299] {
            assert_eq!(classify(code), Ok(()), "status {code}");
        }
    }

    #[test]
    fn fixed_table_is_honoured() {
        assert_eq!(classify(400), Err(DeliveryError::HeaderMissing));
        assert_eq!(classify(401), Err(DeliveryError::AuthenticationError));
        assert_eq!(classify(403), Err(DeliveryError::Forbidden));
        assert_eq!(classify(404), Err(DeliveryError::NotFound));
        assert_eq!(classify(422), Err(DeliveryError::UnprocessableEntity));
        assert_eq!(classify(429), Err(DeliveryError::TooManyRequests));
    }

    #[test]
    fn other_codes_are_generic() {
        let err = classify(502).unwrap_err();
        assert_eq!(
            err,
            DeliveryError::Generic {
                status: 502,
                status_text: "Bad Gateway".to_owned()
            }
        );
        assert_eq!(err.to_string(), "502 Bad Gateway");

        for code in [301, 402, 405, 409, 500, 503] {
            assert!(
                matches!(classify(code), Err(DeliveryError::Generic { status, .. }) if status == code),
                "status {code}"
            );
        }
    }

    #[test]
    fn client_error_converts_to_sidekick_error() {
        let err = ClientError::InvalidAddress {
            address: "nope".to_owned(),
            reason: "relative URL without a base".to_owned(),
        };
        let converted: SidekickError = err.into();
        assert!(matches!(converted, SidekickError::Output(ref msg) if msg.contains("nope")));
    }

    #[test]
    fn kind_str_is_snake_case() {
        assert_eq!(DeliveryError::NotFound.kind_str(), "not_found");
        assert_eq!(
            DeliveryError::TransportFailure("refused".to_owned()).kind_str(),
            "transport_failure"
        );
    }
}
