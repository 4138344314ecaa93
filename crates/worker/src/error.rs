use turnaround_pipeline::PipelineError;
use turnaround_provider::{ImageLoadError, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Failed to read job file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid job file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The job parsed but describes nothing runnable.
    #[error("Invalid job: {0}")]
    Job(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    ImageSource(#[from] ImageLoadError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
