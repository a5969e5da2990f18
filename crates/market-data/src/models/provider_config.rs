use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;

use super::types::ProviderId;

/// Longest accepted spacing between two requests to one provider.
pub const MAX_MIN_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// Request quota for one provider: `requests` per `window`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateLimit {
    pub requests: f64,
    pub window: Duration,
}

impl RateLimit {
    pub fn per_second(requests: f64) -> Self {
        Self {
            requests,
            window: Duration::from_secs(1),
        }
    }

    pub fn per_minute(requests: f64) -> Self {
        Self {
            requests,
            window: Duration::from_secs(60),
        }
    }

    /// Minimum spacing between two granted requests.
    ///
    /// Fails for a zero, negative or non-finite quota, and for a quota below
    /// one request per [`MAX_MIN_INTERVAL`].
    pub fn min_interval(&self, provider: &ProviderId) -> Result<Duration, MarketDataError> {
        let invalid = || MarketDataError::InvalidRateLimit {
            provider: provider.clone(),
            value: self.to_string(),
        };
        if !self.requests.is_finite() || self.requests <= 0.0 || self.window.is_zero() {
            return Err(invalid());
        }
        match Duration::try_from_secs_f64(self.window.as_secs_f64() / self.requests) {
            Ok(interval) if interval <= MAX_MIN_INTERVAL => Ok(interval),
            _ => Err(invalid()),
        }
    }
}

impl std::fmt::Display for RateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}s", self.requests, self.window.as_secs_f64())
    }
}

impl FromStr for RateLimit {
    type Err = String;

    /// Parses `"5/min"`, `"2/s"`, `"100/h"` or a bare number meaning per second.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (count, unit) = s.split_once('/').unwrap_or((s, "s"));
        let requests: f64 = count
            .trim()
            .parse()
            .map_err(|_| format!("invalid request count in rate limit '{}'", s))?;
        let window = match unit.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" => Duration::from_secs(1),
            "m" | "min" | "minute" => Duration::from_secs(60),
            "h" | "hr" | "hour" => Duration::from_secs(3600),
            other => return Err(format!("unknown rate limit unit '{}'", other)),
        };
        Ok(Self { requests, window })
    }
}

/// Static configuration of one external provider.
///
/// Built once at startup. The rate limiter takes ownership of a copy and pairs
/// it with the mutable last-request timestamp; adapters read the endpoint and
/// credential from it while being constructed.
#[derive(Clone)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub base_url: String,
    pub api_key: Option<String>,
    pub rate_limit: RateLimit,
}

impl ProviderConfig {
    pub fn new(id: impl Into<ProviderId>, base_url: impl Into<String>, rate_limit: RateLimit) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            api_key: None,
            rate_limit,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Returns the credential or a configuration error naming it.
    pub fn require_api_key(&self, credential: &'static str) -> Result<String, MarketDataError> {
        self.api_key
            .clone()
            .ok_or_else(|| MarketDataError::MissingCredential {
                provider: self.id.clone(),
                credential,
            })
    }

    /// Base URL without a trailing slash, ready for `format!("{}/path")`.
    pub fn endpoint(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_parse_rate_limit() {
        assert_eq!("5/min".parse::<RateLimit>(), Ok(RateLimit::per_minute(5.0)));
        assert_eq!("2/s".parse::<RateLimit>(), Ok(RateLimit::per_second(2.0)));
        assert_eq!("3".parse::<RateLimit>(), Ok(RateLimit::per_second(3.0)));
        assert!("ten/min".parse::<RateLimit>().is_err());
        assert!("5/fortnight".parse::<RateLimit>().is_err());
    }

    #[test]
    fn test_min_interval() {
        let provider: ProviderId = Cow::Borrowed("NSE");
        let interval = RateLimit::per_second(4.0).min_interval(&provider).unwrap();
        assert_eq!(interval, Duration::from_millis(250));

        let interval = RateLimit::per_minute(5.0).min_interval(&provider).unwrap();
        assert_eq!(interval, Duration::from_secs(12));
    }

    #[test]
    fn test_non_positive_rate_limit_is_configuration_error() {
        let provider: ProviderId = Cow::Borrowed("NSE");
        for requests in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = RateLimit::per_second(requests)
                .min_interval(&provider)
                .unwrap_err();
            assert!(matches!(err, MarketDataError::InvalidRateLimit { .. }));
        }
    }

    #[test]
    fn test_tiny_rate_limit_is_configuration_error() {
        let provider: ProviderId = Cow::Borrowed("NSE");
        for raw in ["1e-20/s", "1e-19/s", "1e-6/min"] {
            let rate_limit: RateLimit = raw.parse().unwrap();
            let err = rate_limit.min_interval(&provider).unwrap_err();
            assert!(matches!(err, MarketDataError::InvalidRateLimit { .. }), "{}", raw);
            assert_eq!(err.kind(), crate::errors::ErrorKind::Configuration);
        }

        let daily = RateLimit {
            requests: 1.0,
            window: MAX_MIN_INTERVAL,
        };
        assert_eq!(daily.min_interval(&provider).unwrap(), MAX_MIN_INTERVAL);
    }

    #[test]
    fn test_require_api_key() {
        let config = ProviderConfig::new("CAMS", "https://example.test", RateLimit::per_second(1.0))
            .with_api_key(Some("   ".to_string()));
        let err = config.require_api_key("api key").unwrap_err();
        assert!(matches!(err, MarketDataError::MissingCredential { .. }));

        let config = config.with_api_key(Some("secret".to_string()));
        assert_eq!(config.require_api_key("api key").unwrap(), "secret");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig::new("CAMS", "https://example.test/", RateLimit::per_second(1.0))
            .with_api_key(Some("secret".to_string()));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert_eq!(config.endpoint(), "https://example.test");
    }
}
