/// Errors surfaced by generation providers.
///
/// The orchestrator catches these per shot; none of them are fatal to a
/// sequence except on the first shot.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered 2xx with a body we could not interpret.
    #[error("Unexpected {provider} response: {detail}")]
    UnexpectedResponse {
        provider: &'static str,
        detail: String,
    },

    /// Provider configuration is invalid.
    #[error("Invalid provider configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Request(e) => e.is_timeout() || e.is_connect(),
            ProviderError::Api { status, .. } => crate::retry::is_retryable_status(*status),
            ProviderError::UnexpectedResponse { .. } | ProviderError::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> ProviderError {
        ProviderError::Api {
            provider: "bria",
            status,
            body: String::new(),
        }
    }

    #[test]
    fn server_and_rate_limit_errors_are_transient() {
        assert!(api(503).is_transient());
        assert!(api(429).is_transient());
    }

    #[test]
    fn client_and_config_errors_are_permanent() {
        assert!(!api(400).is_transient());
        assert!(!api(401).is_transient());
        assert!(!ProviderError::Config("bad".into()).is_transient());
        assert!(!ProviderError::UnexpectedResponse {
            provider: "fal",
            detail: "no images".into(),
        }
        .is_transient());
    }
}
