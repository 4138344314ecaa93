//! Consistency scoring for a finished sequence.
//!
//! Images are fetched concurrently through an [`ImageSource`]. An image that
//! fails to load or decode is replaced by a placeholder analysis so scoring
//! never fails as a whole.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use turnaround_core::consistency::{score_analyses, ConsistencyReport, ImageAnalysis, ScorerConfig};
use turnaround_provider::ImageSource;

/// Load and analyse every image. Output order matches `urls`.
///
/// `on_progress(loaded, total)` is called once per image as it finishes,
/// successfully or not.
pub async fn analyse_images<F>(
    source: &dyn ImageSource,
    urls: &[&str],
    config: &ScorerConfig,
    on_progress: F,
) -> Vec<ImageAnalysis>
where
    F: Fn(usize, usize) + Send + Sync,
{
    let total = urls.len();
    let loaded = AtomicUsize::new(0);

    let tasks = urls.iter().enumerate().map(|(index, url)| {
        let loaded = &loaded;
        let on_progress = &on_progress;
        async move {
            let analysis = match source.load(url).await {
                Ok(image) => ImageAnalysis::from_image(&image, config),
                Err(e) => {
                    tracing::warn!(index, url, error = %e, "Image could not be analysed, using placeholder");
                    ImageAnalysis::placeholder()
                }
            };
            let done = loaded.fetch_add(1, Ordering::SeqCst) + 1;
            on_progress(done, total);
            analysis
        }
    });

    join_all(tasks).await
}

/// Fetch, analyse and score a sequence of images.
///
/// Fewer than two images score a perfect 100 without any fetch.
pub async fn validate_sequence_consistency<F>(
    source: &dyn ImageSource,
    urls: &[&str],
    config: &ScorerConfig,
    on_progress: F,
) -> ConsistencyReport
where
    F: Fn(usize, usize) + Send + Sync,
{
    if urls.len() < 2 {
        return ConsistencyReport::perfect(urls.len());
    }

    let analyses = analyse_images(source, urls, config, on_progress).await;

    let report = score_analyses(&analyses, config);
    tracing::info!(
        overall = report.score.overall,
        images = urls.len(),
        low_confidence = report.low_confidence.len(),
        "Sequence consistency scored",
    );
    report
}
