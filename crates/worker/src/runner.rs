//! Runs one [`JobSpec`] end to end: generate, optionally regenerate drifted
//! shots, score, and assemble the [`RunReport`].

use std::sync::Arc;

use chrono::Utc;
use turnaround_core::consistency::{
    consistency_label, score_analyses, ConsistencyReport, ScorerConfig,
};
use turnaround_core::enhancer::{enhance_prompt_local, suggest_improvements};
use turnaround_core::regeneration::{identify_inconsistent_shots, suggestions, RegenerationConfig};
use turnaround_pipeline::{
    analyse_images, auto_regenerate, ProgressEvent, ProgressPhase, SequenceOptions,
    SequenceOrchestrator,
};
use turnaround_provider::{GenerationProvider, ImageSource};

use crate::error::WorkerError;
use crate::job::JobSpec;
use crate::report::{ConsistencySection, RunReport, ShotReport};

/// Tunables for scoring and regeneration.
#[derive(Debug, Clone, Default)]
pub struct RunnerSettings {
    pub options: SequenceOptions,
    pub scorer: ScorerConfig,
    pub regeneration: RegenerationConfig,
}

fn log_progress(event: &ProgressEvent) {
    match &event.phase {
        ProgressPhase::Start => {
            tracing::info!(index = event.index, "Shot started");
        }
        ProgressPhase::Complete { result } => {
            tracing::info!(
                index = event.index,
                url = result.first_url().unwrap_or_default(),
                "Shot complete",
            );
        }
        ProgressPhase::Error { message } => {
            tracing::warn!(index = event.index, error = %message, "Shot failed");
        }
    }
}

/// Execute `job` against `provider`, fetching images through `source` for
/// scoring.
///
/// Only a base-shot failure or an invalid job is an error; per-shot
/// failures are reported in the returned [`RunReport`].
pub async fn run_job(
    job: &JobSpec,
    provider: Arc<dyn GenerationProvider>,
    source: &dyn ImageSource,
    settings: &RunnerSettings,
) -> Result<RunReport, WorkerError> {
    let mut shots = job.shots()?;
    let mut project = job.project();

    let description_hints = suggest_improvements(&project.description);
    if job.enhance {
        let enhancement = enhance_prompt_local(&project.description, project.style.style);
        tracing::info!(keywords = ?enhancement.keywords, "Description enhanced");
        project.description = enhancement.enhanced;
    }

    let provider_name = provider.name().to_string();
    let orchestrator = SequenceOrchestrator::new(provider, settings.options.clone());
    let sink = log_progress;

    let mut run = orchestrator
        .run(&project, &mut shots, job.seed, &sink)
        .await?;

    let regenerations = if job.auto_regenerate {
        auto_regenerate(
            &orchestrator,
            source,
            &project,
            &mut run,
            &mut shots,
            &settings.regeneration,
            &settings.scorer,
            &sink,
        )
        .await?
    } else {
        Vec::new()
    };

    let consistency = if job.score || job.auto_regenerate {
        let urls = run.image_urls();
        let analyses = analyse_images(source, &urls, &settings.scorer, |loaded, total| {
            tracing::debug!(loaded, total, "Analysed image");
        })
        .await;
        let report = if analyses.len() < 2 {
            ConsistencyReport::perfect(analyses.len())
        } else {
            score_analyses(&analyses, &settings.scorer)
        };
        let advice = identify_inconsistent_shots(&analyses, &settings.regeneration);
        tracing::info!(
            overall = report.score.overall,
            flagged = advice.inconsistent_indices.len(),
            "Consistency scored",
        );
        Some(ConsistencySection {
            label: consistency_label(report.score.overall),
            suggestions: suggestions(&advice.per_shot_scores),
            report,
            advice,
        })
    } else {
        None
    };

    Ok(RunReport {
        provider: provider_name,
        seed: run.seed,
        succeeded: run.succeeded(),
        total: run.total(),
        shots: shots
            .iter()
            .enumerate()
            .map(|(i, shot)| ShotReport::from_shot(i, shot))
            .collect(),
        consistency,
        regenerations,
        description_hints,
        started_at: run.started_at,
        finished_at: Utc::now(),
    })
}
