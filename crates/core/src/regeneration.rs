//! Regeneration advice: which shots drifted from the rest of the sequence
//! and what to change before re-issuing them.
//!
//! Purely advisory. Nothing here calls a provider; callers decide whether
//! to act on the flagged indices.

use serde::Serialize;

use crate::consistency::{histogram_intersection, to_score, ImageAnalysis, QuantizedColor};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Score assigned to shots whose image could not be analysed.
pub const FAILED_ANALYSIS_SCORE: u8 = 50;

/// Thresholds and weights for per-shot drift detection.
#[derive(Debug, Clone, PartialEq)]
pub struct RegenerationConfig {
    /// Shots scoring strictly below this are flagged.
    pub flag_threshold: f64,
    /// Weight of histogram similarity to the sequence average.
    pub histogram_weight: f64,
    /// Weight of brightness closeness to the sequence average.
    pub brightness_weight: f64,
    /// Re-issue attempts per flagged shot.
    pub max_attempts: u32,
}

impl Default for RegenerationConfig {
    fn default() -> Self {
        Self {
            flag_threshold: 60.0,
            histogram_weight: 0.6,
            brightness_weight: 0.4,
            max_attempts: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// identify_inconsistent_shots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegenerationAdvice {
    pub inconsistent_indices: Vec<usize>,
    pub average_score: u8,
    pub per_shot_scores: Vec<u8>,
}

impl RegenerationAdvice {
    fn all_clear(n: usize) -> Self {
        Self {
            inconsistent_indices: Vec::new(),
            average_score: 100,
            per_shot_scores: vec![100; n],
        }
    }
}

/// Score every shot against the sequence average and flag the ones below
/// the threshold.
///
/// The average histogram and brightness are taken over analysable images
/// only. Placeholder analyses score [`FAILED_ANALYSIS_SCORE`] and are
/// always flagged. With fewer than two analysable images nothing is flagged.
pub fn identify_inconsistent_shots(
    analyses: &[ImageAnalysis],
    config: &RegenerationConfig,
) -> RegenerationAdvice {
    let valid: Vec<&ImageAnalysis> = analyses.iter().filter(|a| !a.low_confidence).collect();
    if analyses.len() < 2 || valid.len() < 2 {
        return RegenerationAdvice::all_clear(analyses.len());
    }

    let len = valid[0].histogram.len();
    let mut avg_histogram = vec![0.0; len];
    for analysis in &valid {
        for (slot, v) in avg_histogram.iter_mut().zip(&analysis.histogram) {
            *slot += v / valid.len() as f64;
        }
    }
    let avg_brightness = valid.iter().map(|a| a.brightness).sum::<f64>() / valid.len() as f64;

    let mut per_shot_scores = Vec::with_capacity(analyses.len());
    let mut inconsistent_indices = Vec::new();

    for (i, analysis) in analyses.iter().enumerate() {
        if analysis.low_confidence {
            per_shot_scores.push(FAILED_ANALYSIS_SCORE);
            inconsistent_indices.push(i);
            continue;
        }

        let histogram_score = histogram_intersection(&analysis.histogram, &avg_histogram) * 100.0;
        let brightness_score = (100.0 - (analysis.brightness - avg_brightness).abs()).max(0.0);
        let combined = histogram_score * config.histogram_weight
            + brightness_score * config.brightness_weight;

        per_shot_scores.push(to_score(combined));
        if combined < config.flag_threshold {
            inconsistent_indices.push(i);
        }
    }

    let average = per_shot_scores.iter().map(|s| *s as f64).sum::<f64>()
        / per_shot_scores.len() as f64;

    RegenerationAdvice {
        inconsistent_indices,
        average_score: to_score(average),
        per_shot_scores,
    }
}

// ---------------------------------------------------------------------------
// suggestions
// ---------------------------------------------------------------------------

/// Qualitative remediation hints keyed off the per-shot score bands.
pub fn suggestions(per_shot_scores: &[u8]) -> Vec<String> {
    let low = per_shot_scores.iter().filter(|s| **s < 60).count();
    let medium = per_shot_scores
        .iter()
        .filter(|s| (60..80).contains(*s))
        .count();

    let mut out = Vec::new();
    if low * 2 > per_shot_scores.len() {
        out.push("Consider simplifying your character description for more consistency".to_string());
        out.push("Try using a fixed color palette in style settings".to_string());
    }
    if medium > 0 {
        out.push("Lock lighting direction to maintain consistent shadows".to_string());
        out.push("Use the same seed for all regeneration attempts".to_string());
    }
    if low == 0 && medium == 0 {
        out.push("Excellent! Your sequence has strong visual consistency".to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// detailed_shot_analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ShotQuality {
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => ShotQuality::Excellent,
            70..=84 => ShotQuality::Good,
            50..=69 => ShotQuality::Fair,
            _ => ShotQuality::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotAnalysis {
    pub index: usize,
    pub score: u8,
    pub status: ShotQuality,
    pub dominant_colors: Vec<QuantizedColor>,
    pub brightness: u8,
}

/// Per-image quality from brightness spread alone: flatter images score
/// higher. Placeholders score 0.
pub fn detailed_shot_analysis(analyses: &[ImageAnalysis]) -> Vec<ShotAnalysis> {
    analyses
        .iter()
        .enumerate()
        .map(|(index, analysis)| {
            if analysis.low_confidence {
                return ShotAnalysis {
                    index,
                    score: 0,
                    status: ShotQuality::Poor,
                    dominant_colors: Vec::new(),
                    brightness: 0,
                };
            }
            let score = to_score(100.0 - analysis.brightness_stddev);
            ShotAnalysis {
                index,
                score,
                status: ShotQuality::from_score(score),
                dominant_colors: analysis.dominant_colors.clone(),
                brightness: analysis.brightness.clamp(0.0, 255.0).round() as u8,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::ScorerConfig;
    use image::{DynamicImage, Rgb, RgbImage};

    fn solid(rgb: [u8; 3]) -> ImageAnalysis {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb(rgb)));
        ImageAnalysis::from_image(&img, &ScorerConfig::default())
    }

    // -- identify_inconsistent_shots --

    #[test]
    fn uniform_sequence_has_no_flags() {
        let a = solid([90, 140, 60]);
        let advice = identify_inconsistent_shots(
            &[a.clone(), a.clone(), a],
            &RegenerationConfig::default(),
        );
        assert!(advice.inconsistent_indices.is_empty());
        assert_eq!(advice.per_shot_scores, vec![100, 100, 100]);
        assert_eq!(advice.average_score, 100);
    }

    #[test]
    fn outlier_is_flagged() {
        let a = solid([90, 140, 60]);
        let odd = solid([240, 10, 200]);
        let advice = identify_inconsistent_shots(
            &[a.clone(), a.clone(), a.clone(), odd],
            &RegenerationConfig::default(),
        );
        assert_eq!(advice.inconsistent_indices, vec![3]);
        assert!(advice.per_shot_scores[3] < 60);
    }

    #[test]
    fn placeholder_scores_fifty_and_is_flagged() {
        let a = solid([90, 140, 60]);
        let advice = identify_inconsistent_shots(
            &[a.clone(), ImageAnalysis::placeholder(), a],
            &RegenerationConfig::default(),
        );
        assert_eq!(advice.per_shot_scores[1], FAILED_ANALYSIS_SCORE);
        assert_eq!(advice.inconsistent_indices, vec![1]);
    }

    #[test]
    fn too_few_valid_analyses_flags_nothing() {
        let advice = identify_inconsistent_shots(
            &[solid([1, 2, 3]), ImageAnalysis::placeholder()],
            &RegenerationConfig::default(),
        );
        assert!(advice.inconsistent_indices.is_empty());
        assert_eq!(advice.per_shot_scores, vec![100, 100]);
    }

    // -- suggestions --

    #[test]
    fn mostly_low_scores_suggest_simplifying() {
        let s = suggestions(&[30, 40, 90]);
        assert!(s[0].contains("simplifying"));
    }

    #[test]
    fn medium_scores_suggest_locking_lighting() {
        let s = suggestions(&[90, 65, 95]);
        assert!(s.iter().any(|m| m.contains("Lock lighting direction")));
    }

    #[test]
    fn high_scores_are_praised() {
        let s = suggestions(&[90, 95]);
        assert_eq!(s.len(), 1);
        assert!(s[0].starts_with("Excellent"));
    }

    // -- detailed_shot_analysis --

    #[test]
    fn detailed_analysis_grades_images() {
        let details = detailed_shot_analysis(&[solid([100, 100, 100]), ImageAnalysis::placeholder()]);
        assert_eq!(details[0].score, 100);
        assert_eq!(details[0].status, ShotQuality::Excellent);
        assert_eq!(details[0].brightness, 100);
        assert_eq!(details[1].status, ShotQuality::Poor);
        assert_eq!(details[1].score, 0);
    }
}
