use async_trait::async_trait;

use crate::error::ProviderError;
use crate::request::{GenerationRequest, GenerationResult};

/// A text-to-image backend.
///
/// Implementations must surface every transport or HTTP failure as a
/// [`ProviderError`] so that callers can isolate failures per shot.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short provider name used in logs and reports.
    fn name(&self) -> &str;

    /// Whether the provider accepts a structured prompt plus refinement
    /// instruction. Providers that do not are sent full prompts instead.
    fn supports_structured_prompt(&self) -> bool {
        true
    }

    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResult, ProviderError>;
}
