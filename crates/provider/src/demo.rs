//! Offline provider returning stock placeholder images.
//!
//! Used whenever no API key is configured so that the full pipeline can be
//! exercised without network access to a generator.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::error::ProviderError;
use crate::provider::GenerationProvider;
use crate::request::{GeneratedImage, GenerationRequest, GenerationResult};

/// Placeholder images served in demo mode.
pub const DEMO_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1534528741775-53994a69daeb?w=1024&h=1024&fit=crop",
    "https://images.unsplash.com/photo-1506794778202-cad84cf45f1d?w=1024&h=1024&fit=crop",
    "https://images.unsplash.com/photo-1531746020798-e6953c6e8e04?w=1024&h=1024&fit=crop",
    "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=1024&h=1024&fit=crop",
    "https://images.unsplash.com/photo-1544005313-94ddf0286df2?w=1024&h=1024&fit=crop",
    "https://images.unsplash.com/photo-1552058544-f2b08422138a?w=1024&h=1024&fit=crop",
    "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=1024&h=1024&fit=crop",
    "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=1024&h=1024&fit=crop",
    "https://images.unsplash.com/photo-1517841905240-472988babdf9?w=1024&h=1024&fit=crop",
];

/// Upper bound (exclusive) for seeds drawn when the request has none.
const DEMO_SEED_RANGE: u64 = 1_000_000;

/// Demo provider with a simulated latency of `delay` plus up to twice that
/// again in random jitter.
pub struct DemoProvider {
    delay: Duration,
}

impl DemoProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No simulated latency.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    fn latency(&self) -> Duration {
        let base_ms = self.delay.as_millis() as u64;
        if base_ms == 0 {
            return Duration::ZERO;
        }
        let jitter = rand::rng().random_range(0..base_ms * 2);
        Duration::from_millis(base_ms + jitter)
    }
}

#[async_trait]
impl GenerationProvider for DemoProvider {
    fn name(&self) -> &str {
        "demo"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let latency = self.latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut rng = rand::rng();
        let url = DEMO_IMAGES[rng.random_range(0..DEMO_IMAGES.len())];
        let seed = request
            .seed
            .unwrap_or_else(|| rng.random_range(0..DEMO_SEED_RANGE));

        Ok(GenerationResult {
            images: vec![GeneratedImage {
                url: url.to_string(),
                width: 1024,
                height: 1024,
                content_type: "image/jpeg".to_string(),
            }],
            seed,
            prompt: Some("Demo mode - placeholder image".to_string()),
            structured_prompt: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_known_placeholder() {
        let provider = DemoProvider::instant();
        let result = provider
            .generate(&GenerationRequest::new("a red ceramic mug"))
            .await
            .unwrap();
        let url = result.first_url().unwrap();
        assert!(DEMO_IMAGES.contains(&url));
        assert!(result.seed < DEMO_SEED_RANGE);
    }

    #[tokio::test]
    async fn echoes_request_seed() {
        let provider = DemoProvider::instant();
        let mut req = GenerationRequest::new("a red ceramic mug");
        req.seed = Some(123_456);
        let result = provider.generate(&req).await.unwrap();
        assert_eq!(result.seed, 123_456);
        assert!(result.structured_prompt.is_none());
    }

    #[test]
    fn latency_within_bounds() {
        let provider = DemoProvider::new(Duration::from_millis(10));
        for _ in 0..20 {
            let l = provider.latency();
            assert!(l >= Duration::from_millis(10) && l < Duration::from_millis(30));
        }
    }
}
