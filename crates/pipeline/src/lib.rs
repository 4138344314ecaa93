//! Sequence generation pipeline.
//!
//! Drives ordered generation of a shot list through a
//! [`GenerationProvider`](turnaround_provider::GenerationProvider), reports
//! per-shot progress, scores the finished sequence for consistency, and
//! re-issues shots that drifted.

pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod regenerate;
pub mod scoring;

pub use error::PipelineError;
pub use orchestrator::{
    PromptMode, SequenceOptions, SequenceOrchestrator, SequenceRun, SequenceSeed, ShotOutcome,
};
pub use regenerate::{auto_regenerate, RegenerationOutcome};
pub use scoring::{analyse_images, validate_sequence_consistency};
pub use progress::{NoopSink, ProgressBus, ProgressEvent, ProgressPhase, ProgressSink};
