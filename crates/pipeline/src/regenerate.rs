//! Targeted regeneration of shots the advisor flags as inconsistent.
//!
//! Each flagged shot is re-issued through
//! [`SequenceOrchestrator::regenerate_shot`] with a varied seed, up to
//! [`RegenerationConfig::max_attempts`] times. The better of the original
//! and the new image is kept; a worse attempt is rolled back.

use serde::Serialize;
use turnaround_core::consistency::{ImageAnalysis, ScorerConfig};
use turnaround_core::regeneration::{identify_inconsistent_shots, RegenerationConfig};
use turnaround_core::types::Seed;
use turnaround_core::{ProjectSnapshot, Shot};
use turnaround_provider::ImageSource;

use crate::error::PipelineError;
use crate::orchestrator::{SequenceOrchestrator, SequenceRun};
use crate::progress::ProgressSink;
use crate::scoring::analyse_images;

/// What happened to one flagged shot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegenerationOutcome {
    pub shot_index: usize,
    pub original_score: u8,
    /// Best score reached. Equal to `original_score` when no attempt helped.
    pub new_score: u8,
    pub improved: bool,
    pub attempts: u32,
}

/// Seed used for regeneration attempt `attempt` (1-based).
fn attempt_seed(base: Seed, attempt: u32) -> Seed {
    base.wrapping_add(attempt as Seed)
}

/// Score the completed shots of `run`, re-issue the ones flagged below the
/// threshold, and keep whichever image scores higher.
///
/// Only successful shots take part in scoring. A regenerated image that
/// cannot be loaded is rolled back. `original_score` is the shot's score
/// before any regeneration in this pass. Returns one outcome per flagged
/// shot, in shot order.
#[allow(clippy::too_many_arguments)]
pub async fn auto_regenerate(
    orchestrator: &SequenceOrchestrator,
    source: &dyn ImageSource,
    project: &ProjectSnapshot,
    run: &mut SequenceRun,
    shots: &mut [Shot],
    config: &RegenerationConfig,
    scorer: &ScorerConfig,
    sink: &dyn ProgressSink,
) -> Result<Vec<RegenerationOutcome>, PipelineError> {
    let completed: Vec<(usize, String)> = run
        .completed()
        .into_iter()
        .map(|(index, url)| (index, url.to_string()))
        .collect();
    let urls: Vec<&str> = completed.iter().map(|(_, url)| url.as_str()).collect();

    let mut analyses = analyse_images(source, &urls, scorer, |_, _| {}).await;
    let advice = identify_inconsistent_shots(&analyses, config);

    if advice.inconsistent_indices.is_empty() {
        tracing::info!(average = advice.average_score, "No inconsistent shots to regenerate");
        return Ok(Vec::new());
    }

    tracing::info!(
        flagged = ?advice.inconsistent_indices,
        average = advice.average_score,
        "Regenerating inconsistent shots",
    );

    let mut outcomes = Vec::with_capacity(advice.inconsistent_indices.len());

    for &position in &advice.inconsistent_indices {
        let shot_index = completed[position].0;
        let original_score = advice.per_shot_scores[position];
        let mut best_score = original_score;
        let mut attempts = 0;

        while attempts < config.max_attempts {
            attempts += 1;
            let previous_outcome = run.outcomes[shot_index].clone();
            let previous_shot = shots[shot_index].clone();
            let seed = attempt_seed(run.seed, attempts);

            let outcome = orchestrator
                .regenerate_shot(project, run, shots, shot_index, Some(seed), sink)
                .await?;

            let candidate = match outcome.image_url() {
                Some(url) => {
                    let fresh = analyse_images(source, &[url], scorer, |_, _| {}).await;
                    fresh.into_iter().next().unwrap_or_else(ImageAnalysis::placeholder)
                }
                None => ImageAnalysis::placeholder(),
            };

            // An unreadable image never counts as an improvement, whatever
            // the remaining shots score without it.
            let usable = outcome.is_success() && !candidate.low_confidence;

            let mut trial = analyses.clone();
            trial[position] = candidate;
            let candidate_score =
                identify_inconsistent_shots(&trial, config).per_shot_scores[position];

            if usable && candidate_score > best_score {
                tracing::info!(
                    shot_index,
                    attempt = attempts,
                    from = best_score,
                    to = candidate_score,
                    "Regeneration improved shot",
                );
                best_score = candidate_score;
                analyses = trial;
                if f64::from(best_score) >= config.flag_threshold {
                    break;
                }
            } else {
                tracing::info!(
                    shot_index,
                    attempt = attempts,
                    score = candidate_score,
                    usable,
                    "Regeneration did not improve shot, keeping previous image",
                );
                run.outcomes[shot_index] = previous_outcome;
                shots[shot_index] = previous_shot;
            }
        }

        outcomes.push(RegenerationOutcome {
            shot_index,
            original_score,
            new_score: best_score,
            improved: best_score > original_score,
            attempts,
        });
    }

    Ok(outcomes)
}
