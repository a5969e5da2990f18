use serde::Serialize;

/// Classification of a [`MarketDataError`](super::MarketDataError).
///
/// # Behavior Summary
///
/// | Kind | When | Sync behavior |
/// |------|------|---------------|
/// | `Configuration` | wiring providers at startup | abort initialization |
/// | `Transient` | timeout, 5xx, throttling | item fails, retry next cycle |
/// | `Permanent` | unknown symbol, 4xx, bad schema | item fails, no retry |
/// | `AllProvidersExhausted` | every adapter in a chain failed | item fails |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "ConfigurationError")]
    Configuration,
    #[serde(rename = "TransientProviderError")]
    Transient,
    #[serde(rename = "PermanentProviderError")]
    Permanent,
    #[serde(rename = "AllProvidersExhausted")]
    AllProvidersExhausted,
}

impl ErrorKind {
    /// Stable name used in failure reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "ConfigurationError",
            Self::Transient => "TransientProviderError",
            Self::Permanent => "PermanentProviderError",
            Self::AllProvidersExhausted => "AllProvidersExhausted",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
