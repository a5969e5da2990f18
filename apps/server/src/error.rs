use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finsight_market_data::{ErrorKind, MarketDataError};
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Core(#[from] finsight_core::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MarketData(err) => market_data_status(err),
            Self::Core(finsight_core::Error::MarketData(err)) => market_data_status(err),
            // The posted values cannot be summed.
            Self::Core(finsight_core::Error::ValuationOverflow(_)) => StatusCode::BAD_REQUEST,
            Self::Core(finsight_core::Error::InvalidConfigValue { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::MarketData(err) => kind_code(err.kind()),
            Self::Core(finsight_core::Error::ValuationOverflow(_)) => "VALUATION_OVERFLOW",
            Self::Core(err) => kind_code(err.kind()),
        }
    }
}

fn kind_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Configuration => "CONFIGURATION_ERROR",
        ErrorKind::Transient => "TRANSIENT_PROVIDER_ERROR",
        ErrorKind::Permanent => "PERMANENT_PROVIDER_ERROR",
        ErrorKind::AllProvidersExhausted => "ALL_PROVIDERS_EXHAUSTED",
    }
}

fn market_data_status(err: &MarketDataError) -> StatusCode {
    match err {
        MarketDataError::SymbolNotFound { .. } | MarketDataError::MissingIdentifier(_) => {
            StatusCode::NOT_FOUND
        }
        MarketDataError::AllProvidersExhausted { attempts } => {
            if attempts.is_empty() {
                // No provider routed for the asset class.
                StatusCode::SERVICE_UNAVAILABLE
            } else if attempts
                .iter()
                .all(|a| matches!(a.error, MarketDataError::SymbolNotFound { .. }))
            {
                StatusCode::NOT_FOUND
            } else if err.is_retryable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            }
        }
        other => match other.kind() {
            ErrorKind::Transient | ErrorKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_market_data::ProviderAttempt;
    use std::borrow::Cow;

    fn not_found(provider: &'static str) -> MarketDataError {
        MarketDataError::SymbolNotFound {
            provider: Cow::Borrowed(provider),
            symbol: "NOPE".to_string(),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(not_found("NSE")).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(MarketDataError::RateLimited {
                provider: Cow::Borrowed("NSE")
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(MarketDataError::MalformedResponse {
                provider: Cow::Borrowed("NSE"),
                message: "bad".into()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_valuation_overflow_is_bad_request() {
        let err = ApiError::from(finsight_core::Error::ValuationOverflow("total value"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALUATION_OVERFLOW");
    }

    #[test]
    fn test_exhausted_status() {
        let empty = MarketDataError::AllProvidersExhausted { attempts: vec![] };
        assert_eq!(ApiError::from(empty).status(), StatusCode::SERVICE_UNAVAILABLE);

        let all_missing = MarketDataError::AllProvidersExhausted {
            attempts: vec![
                ProviderAttempt {
                    provider: Cow::Borrowed("CAMS"),
                    error: not_found("CAMS"),
                },
                ProviderAttempt {
                    provider: Cow::Borrowed("MFAPI"),
                    error: not_found("MFAPI"),
                },
            ],
        };
        assert_eq!(ApiError::from(all_missing).status(), StatusCode::NOT_FOUND);
    }
}
