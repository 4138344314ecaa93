use turnaround_core::CoreError;
use turnaround_provider::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The first shot failed, so there is no subject identity to carry
    /// through the rest of the sequence.
    #[error("Base shot '{shot}' failed: {source}")]
    BaseShotFailed {
        shot: String,
        #[source]
        source: ProviderError,
    },

    #[error("Shot index {index} out of range (sequence has {len} shots)")]
    ShotIndexOutOfRange { index: usize, len: usize },
}
