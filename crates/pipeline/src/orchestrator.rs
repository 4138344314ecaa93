//! Sequence orchestrator: ordered generation of a shot list with seed reuse
//! and structured-prompt propagation.
//!
//! Shot 0 is generated from the full text prompt and establishes the
//! subject. Every later shot reuses the same seed and, when the provider
//! returned one, the shot-0 structured prompt with its camera fields
//! rewritten plus a short refinement instruction. Shots are generated
//! strictly one after another.
//!
//! A shot-0 failure aborts the run. Failures on later shots are recorded
//! on that shot and the run continues.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use turnaround_core::composer::{
    build_refinement_instruction, build_shot_negative_prompt, build_shot_prompt,
    validate_description, validate_shots,
};
use turnaround_core::structured_prompt::mutate_structured_prompt;
use turnaround_core::types::{Seed, ShotId};
use turnaround_core::{CoreError, ProjectSnapshot, Shot};
use turnaround_provider::{
    GenerationProvider, GenerationRequest, GenerationResult, ImageSize, ProviderConfig,
    ProviderError,
};

use crate::error::PipelineError;
use crate::progress::{ProgressEvent, ProgressPhase, ProgressSink};

// ---------------------------------------------------------------------------
// Seed / options
// ---------------------------------------------------------------------------

/// Upper bound (exclusive) for randomly drawn sequence seeds.
pub const SEED_RANGE: Seed = 1_000_000;

/// Seed shared by every shot of a run. Read-only once chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceSeed(pub Seed);

impl SequenceSeed {
    pub fn random() -> Self {
        Self(rand::rng().random_range(0..SEED_RANGE))
    }
}

/// Request-level settings applied to every shot.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceOptions {
    pub image_size: ImageSize,
    pub quality_steps: u32,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            image_size: ImageSize::default(),
            quality_steps: turnaround_provider::request::DEFAULT_QUALITY_STEPS,
        }
    }
}

impl From<&ProviderConfig> for SequenceOptions {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            image_size: config.image_size,
            quality_steps: config.quality_steps,
        }
    }
}

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

/// How a shot's request was composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// Full text prompt (base prompt plus camera instruction).
    Full,
    /// Mutated structured prompt plus refinement instruction.
    Refinement,
}

/// Result of one shot's most recent generation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ShotOutcome {
    pub index: usize,
    pub shot_id: ShotId,
    /// `None` until the shot has been attempted.
    pub mode: Option<PromptMode>,
    pub result: Option<GenerationResult>,
    pub error: Option<String>,
    /// Set when the failure looks temporary (timeout, 5xx, rate limit), so a
    /// later retry may succeed.
    pub transient: bool,
}

impl ShotOutcome {
    fn pending(index: usize, shot_id: ShotId) -> Self {
        Self {
            index,
            shot_id,
            mode: None,
            result: None,
            error: None,
            transient: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.result.as_ref().and_then(GenerationResult::first_url)
    }
}

/// Everything a finished run produced. Covers every shot, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceRun {
    pub seed: Seed,
    pub base_structured_prompt: Option<String>,
    pub outcomes: Vec<ShotOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SequenceRun {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// `(shot index, image URL)` for every successful shot, in shot order.
    pub fn completed(&self) -> Vec<(usize, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.image_url().map(|url| (o.index, url)))
            .collect()
    }

    /// Image URLs of the successful shots, in shot order.
    pub fn image_urls(&self) -> Vec<&str> {
        self.completed().into_iter().map(|(_, url)| url).collect()
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives a provider through a shot list.
pub struct SequenceOrchestrator {
    provider: Arc<dyn GenerationProvider>,
    options: SequenceOptions,
}

impl SequenceOrchestrator {
    pub fn new(provider: Arc<dyn GenerationProvider>, options: SequenceOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &dyn GenerationProvider {
        self.provider.as_ref()
    }

    /// Generate every shot in order.
    ///
    /// All shots are reset to pending first. On a shot-0 failure that shot
    /// ends in `error`, the rest stay pending, and
    /// [`PipelineError::BaseShotFailed`] is returned. Later failures only
    /// mark their own shot.
    pub async fn run(
        &self,
        project: &ProjectSnapshot,
        shots: &mut [Shot],
        seed: Option<Seed>,
        sink: &dyn ProgressSink,
    ) -> Result<SequenceRun, PipelineError> {
        validate_description(&project.description)?;
        validate_shots(shots)?;

        for shot in shots.iter_mut() {
            shot.reset();
        }

        let seed = seed.unwrap_or_else(|| SequenceSeed::random().0);
        let started_at = Utc::now();
        let total = shots.len();

        tracing::info!(
            provider = self.provider.name(),
            seed,
            shot_count = total,
            "Starting sequence generation",
        );

        let mut outcomes: Vec<ShotOutcome> = shots
            .iter()
            .enumerate()
            .map(|(i, s)| ShotOutcome::pending(i, s.id()))
            .collect();

        // Shot 0 establishes the subject.
        let base = self
            .generate_shot(project, &mut shots[0], 0, seed, None, sink)
            .await;
        let base_result = match base {
            Ok(result) => result,
            Err(source) => {
                tracing::error!(
                    shot = %shots[0].name,
                    error = %source,
                    "Base shot failed, aborting sequence",
                );
                return Err(PipelineError::BaseShotFailed {
                    shot: shots[0].name.clone(),
                    source,
                });
            }
        };

        let base_structured_prompt = if self.provider.supports_structured_prompt() {
            base_result.structured_prompt.clone()
        } else {
            None
        };
        if base_structured_prompt.is_none() {
            tracing::info!("No structured prompt available, using full prompts for every shot");
        }
        outcomes[0] = ShotOutcome {
            mode: Some(PromptMode::Full),
            result: Some(base_result),
            ..ShotOutcome::pending(0, shots[0].id())
        };

        for (index, shot) in shots.iter_mut().enumerate().skip(1) {
            let mode = mode_for(base_structured_prompt.as_deref());
            let outcome = self
                .generate_shot(
                    project,
                    shot,
                    index,
                    seed,
                    base_structured_prompt.as_deref(),
                    sink,
                )
                .await;
            outcomes[index] = to_outcome(index, shot.id(), mode, outcome);
        }

        let run = SequenceRun {
            seed,
            base_structured_prompt,
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            seed,
            succeeded = run.succeeded(),
            total = run.total(),
            "Sequence generation finished",
        );
        Ok(run)
    }

    /// Re-issue a single shot of a finished run through the same path
    /// (base structured prompt when available) and record the new outcome.
    ///
    /// `seed` overrides the run seed for this attempt only.
    pub async fn regenerate_shot(
        &self,
        project: &ProjectSnapshot,
        run: &mut SequenceRun,
        shots: &mut [Shot],
        index: usize,
        seed: Option<Seed>,
        sink: &dyn ProgressSink,
    ) -> Result<ShotOutcome, PipelineError> {
        if shots.len() != run.outcomes.len() {
            return Err(CoreError::Validation(format!(
                "Shot list has {} shots but the run has {}",
                shots.len(),
                run.outcomes.len()
            ))
            .into());
        }
        let len = shots.len();
        let shot = shots
            .get_mut(index)
            .ok_or(PipelineError::ShotIndexOutOfRange { index, len })?;

        shot.reset();
        let seed = seed.unwrap_or(run.seed);
        let base = run.base_structured_prompt.as_deref();
        let mode = mode_for(base);

        tracing::info!(index, shot = %shot.name, seed, "Regenerating shot");

        let result = self
            .generate_shot(project, shot, index, seed, base, sink)
            .await;
        let outcome = to_outcome(index, shot.id(), mode, result);
        run.outcomes[index] = outcome.clone();
        run.finished_at = Utc::now();
        Ok(outcome)
    }

    /// Build the request for one shot.
    pub fn build_request(
        &self,
        project: &ProjectSnapshot,
        shot: &Shot,
        seed: Seed,
        base_structured_prompt: Option<&str>,
    ) -> GenerationRequest {
        let style = &project.style;
        let (prompt, structured_prompt) = match base_structured_prompt {
            Some(base) => {
                let mutated = mutate_structured_prompt(base, shot);
                if !mutated.applied {
                    tracing::debug!(
                        shot = %shot.name,
                        "Structured prompt is opaque, relying on refinement text",
                    );
                }
                (build_refinement_instruction(shot), Some(mutated.text))
            }
            None => (build_shot_prompt(&project.description, shot, style), None),
        };

        GenerationRequest {
            prompt,
            structured_prompt,
            negative_prompt: Some(build_shot_negative_prompt(
                style.style,
                shot.camera_angle() as i64,
            )),
            seed: Some(seed),
            image_size: self.options.image_size,
            quality_steps: self.options.quality_steps,
        }
    }

    /// One provider call with state transitions and progress events.
    async fn generate_shot(
        &self,
        project: &ProjectSnapshot,
        shot: &mut Shot,
        index: usize,
        seed: Seed,
        base_structured_prompt: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> Result<GenerationResult, ProviderError> {
        let request = self.build_request(project, shot, seed, base_structured_prompt);

        shot.mark_generating();
        sink.on_progress(&ProgressEvent::new(index, shot.id(), ProgressPhase::Start));
        tracing::debug!(index, shot = %shot.name, prompt = %request.prompt, "Generating shot");

        let result = self
            .provider
            .generate(&request)
            .await
            .and_then(|result| {
                if result.first_url().is_some() {
                    Ok(result)
                } else {
                    Err(ProviderError::UnexpectedResponse {
                        provider: "sequence",
                        detail: "provider returned no images".to_string(),
                    })
                }
            });

        match &result {
            Ok(ok) => {
                let url = ok.first_url().unwrap_or_default().to_string();
                shot.mark_complete(url);
                tracing::info!(index, shot = %shot.name, "Shot complete");
                sink.on_progress(&ProgressEvent::new(
                    index,
                    shot.id(),
                    ProgressPhase::Complete { result: ok.clone() },
                ));
            }
            Err(e) => {
                shot.mark_error(e.to_string());
                tracing::warn!(
                    index,
                    shot = %shot.name,
                    error = %e,
                    transient = e.is_transient(),
                    "Shot failed",
                );
                sink.on_progress(&ProgressEvent::new(
                    index,
                    shot.id(),
                    ProgressPhase::Error {
                        message: e.to_string(),
                    },
                ));
            }
        }
        result
    }
}

fn mode_for(base_structured_prompt: Option<&str>) -> PromptMode {
    if base_structured_prompt.is_some() {
        PromptMode::Refinement
    } else {
        PromptMode::Full
    }
}

fn to_outcome(
    index: usize,
    shot_id: ShotId,
    mode: PromptMode,
    result: Result<GenerationResult, ProviderError>,
) -> ShotOutcome {
    match result {
        Ok(result) => ShotOutcome {
            mode: Some(mode),
            result: Some(result),
            ..ShotOutcome::pending(index, shot_id)
        },
        Err(e) => ShotOutcome {
            mode: Some(mode),
            error: Some(e.to_string()),
            transient: e.is_transient(),
            ..ShotOutcome::pending(index, shot_id)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_seed_in_range() {
        for _ in 0..100 {
            assert!(SequenceSeed::random().0 < SEED_RANGE);
        }
    }

    #[test]
    fn options_from_provider_config() {
        let config = ProviderConfig {
            image_size: ImageSize::Portrait,
            quality_steps: 20,
            ..ProviderConfig::default()
        };
        let options = SequenceOptions::from(&config);
        assert_eq!(options.image_size, ImageSize::Portrait);
        assert_eq!(options.quality_steps, 20);
    }

    #[test]
    fn mode_follows_base_prompt() {
        assert_eq!(mode_for(Some("{}")), PromptMode::Refinement);
        assert_eq!(mode_for(None), PromptMode::Full);
    }
}
