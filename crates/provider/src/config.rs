//! Provider selection from environment variables.

use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::bria::BriaProvider;
use crate::demo::DemoProvider;
use crate::error::ProviderError;
use crate::fal::FalProvider;
use crate::provider::GenerationProvider;
use crate::request::{ImageSize, DEFAULT_QUALITY_STEPS};

/// Default HTTP timeout for a single generation call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Default simulated latency of the demo provider, in milliseconds.
pub const DEFAULT_DEMO_DELAY_MS: u64 = 1000;

/// Accepted range for `QUALITY_STEPS`.
pub const QUALITY_STEPS_RANGE: RangeInclusive<u32> = 1..=100;

/// Which backend to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Bria,
    Fal,
    Demo,
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bria" => Ok(ProviderKind::Bria),
            "fal" => Ok(ProviderKind::Fal),
            "demo" => Ok(ProviderKind::Demo),
            other => Err(ProviderError::Config(format!(
                "Unknown provider '{other}' (expected bria, fal or demo)"
            ))),
        }
    }
}

/// Generation settings loaded from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Empty means no credentials; [`build_provider`] then falls back to demo.
    pub api_key: String,
    pub image_size: ImageSize,
    pub quality_steps: u32,
    pub request_timeout: Duration,
    pub demo_delay: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            api_key: String::new(),
            image_size: ImageSize::default(),
            quality_steps: DEFAULT_QUALITY_STEPS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            demo_delay: Duration::from_millis(DEFAULT_DEMO_DELAY_MS),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default     |
    /// |------------------------|-------------|
    /// | `PROVIDER`             | `bria`      |
    /// | `PROVIDER_API_KEY`     | (empty)     |
    /// | `IMAGE_SIZE`           | `1024x1024` |
    /// | `QUALITY_STEPS`        | `50`        |
    /// | `REQUEST_TIMEOUT_SECS` | `300`       |
    /// | `DEMO_DELAY_MS`        | `1000`      |
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ProviderError> {
        let defaults = Self::default();

        let kind = match lookup("PROVIDER") {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => defaults.kind,
        };

        let api_key = lookup("PROVIDER_API_KEY")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        let image_size = match lookup("IMAGE_SIZE") {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => defaults.image_size,
        };

        let quality_steps = parse_number(&lookup, "QUALITY_STEPS", defaults.quality_steps)?;
        if !QUALITY_STEPS_RANGE.contains(&quality_steps) {
            return Err(ProviderError::Config(format!(
                "QUALITY_STEPS must be between {} and {}, got {quality_steps}",
                QUALITY_STEPS_RANGE.start(),
                QUALITY_STEPS_RANGE.end(),
            )));
        }

        let timeout_secs =
            parse_number(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let demo_delay_ms = parse_number(&lookup, "DEMO_DELAY_MS", DEFAULT_DEMO_DELAY_MS)?;

        Ok(Self {
            kind,
            api_key,
            image_size,
            quality_steps,
            request_timeout: Duration::from_secs(timeout_secs),
            demo_delay: Duration::from_millis(demo_delay_ms),
        })
    }

    /// The provider actually used: demo whenever credentials are missing.
    pub fn effective_kind(&self) -> ProviderKind {
        if self.api_key.is_empty() {
            ProviderKind::Demo
        } else {
            self.kind
        }
    }
}

fn parse_number<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ProviderError> {
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|_| ProviderError::Config(format!("{key} must be a valid number (got '{v}')"))),
        _ => Ok(default),
    }
}

/// Construct the configured provider.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn GenerationProvider>, ProviderError> {
    let kind = config.effective_kind();
    if kind != config.kind {
        tracing::warn!(
            requested = ?config.kind,
            "No API key configured, falling back to demo provider",
        );
    }

    let provider: Arc<dyn GenerationProvider> = match kind {
        ProviderKind::Bria => Arc::new(BriaProvider::new(
            config.api_key.clone(),
            config.request_timeout,
        )?),
        ProviderKind::Fal => Arc::new(FalProvider::new(
            config.api_key.clone(),
            config.request_timeout,
        )?),
        ProviderKind::Demo => Arc::new(DemoProvider::new(config.demo_delay)),
    };

    tracing::info!(provider = provider.name(), "Generation provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ProviderConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.effective_kind(), ProviderKind::Demo);
    }

    #[test]
    fn reads_all_variables() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("PROVIDER", "FAL"),
            ("PROVIDER_API_KEY", " secret "),
            ("IMAGE_SIZE", "1280x720"),
            ("QUALITY_STEPS", "30"),
            ("REQUEST_TIMEOUT_SECS", "60"),
            ("DEMO_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.kind, ProviderKind::Fal);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.image_size, ImageSize::Wide);
        assert_eq!(config.quality_steps, 30);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.demo_delay, Duration::ZERO);
        assert_eq!(config.effective_kind(), ProviderKind::Fal);
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = ProviderConfig::from_lookup(lookup(&[("PROVIDER", "midjourney")])).unwrap_err();
        assert_matches!(err, ProviderError::Config(_));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(ProviderConfig::from_lookup(lookup(&[("QUALITY_STEPS", "many")])).is_err());
        assert!(ProviderConfig::from_lookup(lookup(&[("QUALITY_STEPS", "0")])).is_err());
    }

    #[test]
    fn quality_steps_must_stay_in_range() {
        let err = ProviderConfig::from_lookup(lookup(&[("QUALITY_STEPS", "500")])).unwrap_err();
        assert_matches!(err, ProviderError::Config(msg) if msg.contains("500"));
        assert_matches!(
            ProviderConfig::from_lookup(lookup(&[("QUALITY_STEPS", "101")])),
            Err(ProviderError::Config(_))
        );

        let config = ProviderConfig::from_lookup(lookup(&[("QUALITY_STEPS", "100")])).unwrap();
        assert_eq!(config.quality_steps, 100);
    }

    #[tokio::test]
    async fn missing_key_builds_demo() {
        let config = ProviderConfig {
            demo_delay: Duration::ZERO,
            ..ProviderConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "demo");
    }

    #[tokio::test]
    async fn key_builds_requested_provider() {
        let config = ProviderConfig {
            kind: ProviderKind::Bria,
            api_key: "k".to_string(),
            ..ProviderConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "bria");
        assert!(provider.supports_structured_prompt());
    }
}
