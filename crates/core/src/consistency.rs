//! Post-hoc consistency scoring over a generated image sequence.
//!
//! Each decoded image is reduced to an [`ImageAnalysis`] (colour histogram,
//! mean brightness, dominant colours, brightness spread). Analyses are then
//! compared pairwise to produce palette, structure and lighting sub-scores
//! and a weighted overall score.

use std::collections::HashMap;
use std::fmt;

use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Histogram bins per RGB channel.
pub const BINS_PER_CHANNEL: usize = 16;

/// Total histogram length (three channels).
pub const HISTOGRAM_LEN: usize = BINS_PER_CHANNEL * 3;

/// Longest side an image is downscaled to before analysis.
pub const DEFAULT_MAX_DIMENSION: u32 = 256;

/// Channel bucket width for dominant-colour quantisation.
pub const DEFAULT_QUANT_STEP: u8 = 32;

/// Number of dominant colours kept per image.
pub const DEFAULT_TOP_K: usize = 5;

/// Number of worst-scoring shots reported.
pub const DEFAULT_WORST_SHOT_COUNT: usize = 3;

/// Mean brightness of the placeholder analysis.
pub const PLACEHOLDER_BRIGHTNESS: f64 = 128.0;

/// Brightness spread of the placeholder analysis.
pub const PLACEHOLDER_BRIGHTNESS_STDDEV: f64 = 50.0;

/// Palette similarity used when either side is a placeholder.
pub const NEUTRAL_PALETTE_SIMILARITY: f64 = 0.5;

pub const PALETTE_ISSUE_THRESHOLD: f64 = 60.0;
pub const LIGHTING_ISSUE_THRESHOLD: f64 = 70.0;
pub const STRUCTURE_ISSUE_THRESHOLD: f64 = 50.0;
pub const EXCELLENT_OVERALL_THRESHOLD: f64 = 80.0;
pub const GOOD_OVERALL_THRESHOLD: f64 = 60.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Weights of the sub-scores in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    pub palette: f64,
    pub structure: f64,
    pub lighting: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            palette: 0.4,
            structure: 0.35,
            lighting: 0.25,
        }
    }
}

/// Tunables for analysis and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorerConfig {
    pub max_dimension: u32,
    pub quant_step: u8,
    pub top_k: usize,
    pub worst_shot_count: usize,
    pub weights: ScoringWeights,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quant_step: DEFAULT_QUANT_STEP,
            top_k: DEFAULT_TOP_K,
            worst_shot_count: DEFAULT_WORST_SHOT_COUNT,
            weights: ScoringWeights::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// QuantizedColor
// ---------------------------------------------------------------------------

/// An RGB colour with each channel floored to a multiple of the
/// quantisation step. Serialises as `rgb(r,g,b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuantizedColor(pub [u8; 3]);

impl QuantizedColor {
    pub fn quantize(rgb: [u8; 3], step: u8) -> Self {
        let step = step.max(1);
        Self(rgb.map(|c| (c / step) * step))
    }
}

impl fmt::Display for QuantizedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "rgb({r},{g},{b})")
    }
}

impl Serialize for QuantizedColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// ImageAnalysis
// ---------------------------------------------------------------------------

/// Colour and brightness features of one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageAnalysis {
    /// 16 bins per channel (R, G, B), normalised so all 48 values sum to 1.
    pub histogram: Vec<f64>,
    /// Mean of `(R + G + B) / 3` over all pixels.
    pub brightness: f64,
    /// Most frequent quantised colours, most frequent first.
    pub dominant_colors: Vec<QuantizedColor>,
    /// Population standard deviation of per-pixel brightness.
    pub brightness_stddev: f64,
    /// Set when the image could not be decoded and a placeholder stands in.
    pub low_confidence: bool,
}

impl ImageAnalysis {
    /// Neutral stand-in for an image that failed to load or decode.
    pub fn placeholder() -> Self {
        Self {
            histogram: vec![1.0 / HISTOGRAM_LEN as f64; HISTOGRAM_LEN],
            brightness: PLACEHOLDER_BRIGHTNESS,
            dominant_colors: Vec::new(),
            brightness_stddev: PLACEHOLDER_BRIGHTNESS_STDDEV,
            low_confidence: true,
        }
    }

    /// Analyse a decoded image. Images larger than `max_dimension` on their
    /// longest side are downscaled first; a zero-sized image yields the
    /// placeholder.
    pub fn from_image(image: &DynamicImage, config: &ScorerConfig) -> Self {
        let (w, h) = (image.width(), image.height());
        if w == 0 || h == 0 {
            return Self::placeholder();
        }

        let rgb = if w.max(h) > config.max_dimension {
            image
                .resize(config.max_dimension, config.max_dimension, FilterType::Triangle)
                .to_rgb8()
        } else {
            image.to_rgb8()
        };

        let pixel_count = (rgb.width() as usize) * (rgb.height() as usize);
        if pixel_count == 0 {
            return Self::placeholder();
        }

        let bin_width = 256 / BINS_PER_CHANNEL;
        let mut counts = [0u64; HISTOGRAM_LEN];
        let mut colors: HashMap<QuantizedColor, u64> = HashMap::new();
        let mut brightness_sum = 0.0;
        let mut brightness_sq_sum = 0.0;

        for pixel in rgb.pixels() {
            let [r, g, b] = pixel.0;
            counts[r as usize / bin_width] += 1;
            counts[BINS_PER_CHANNEL + g as usize / bin_width] += 1;
            counts[2 * BINS_PER_CHANNEL + b as usize / bin_width] += 1;

            let lum = (r as f64 + g as f64 + b as f64) / 3.0;
            brightness_sum += lum;
            brightness_sq_sum += lum * lum;

            *colors
                .entry(QuantizedColor::quantize([r, g, b], config.quant_step))
                .or_insert(0) += 1;
        }

        let n = pixel_count as f64;
        let total = 3.0 * n;
        let histogram = counts.iter().map(|c| *c as f64 / total).collect();

        let brightness = brightness_sum / n;
        let variance = (brightness_sq_sum / n - brightness * brightness).max(0.0);

        let mut ranked: Vec<(QuantizedColor, u64)> = colors.into_iter().collect();
        // Frequency descending, colour ascending on ties.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let dominant_colors = ranked
            .into_iter()
            .take(config.top_k)
            .map(|(color, _)| color)
            .collect();

        Self {
            histogram,
            brightness,
            dominant_colors,
            brightness_stddev: variance.sqrt(),
            low_confidence: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Similarity measures
// ---------------------------------------------------------------------------

/// Sum of per-bin minimums. 1.0 for identical normalised histograms, 0.0
/// for disjoint ones.
pub fn histogram_intersection(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x.min(*y)).sum()
}

/// Fraction of dominant colours shared by two analyses, over the larger set.
pub fn palette_similarity(a: &ImageAnalysis, b: &ImageAnalysis) -> f64 {
    if a.low_confidence || b.low_confidence {
        return NEUTRAL_PALETTE_SIMILARITY;
    }
    let max = a.dominant_colors.len().max(b.dominant_colors.len());
    if max == 0 {
        return 1.0;
    }
    let matches = b
        .dominant_colors
        .iter()
        .filter(|c| a.dominant_colors.contains(c))
        .count();
    matches as f64 / max as f64
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Clamp to `[0, 100]` and round to the nearest integer.
pub fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Sub-scores and overall score, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsistencyScore {
    pub overall: u8,
    pub color_palette: u8,
    pub structure: u8,
    pub lighting: u8,
}

impl ConsistencyScore {
    pub const PERFECT: ConsistencyScore = ConsistencyScore {
        overall: 100,
        color_palette: 100,
        structure: 100,
        lighting: 100,
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsistencyDetails {
    /// Mean per-image brightness spread, rounded.
    pub color_variance: u32,
    /// Standard deviation of per-image mean brightness, rounded.
    pub brightness_variance: u32,
    /// First few distinct dominant colours across the sequence.
    pub dominant_colors: Vec<QuantizedColor>,
}

/// Full scoring result for a sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub score: ConsistencyScore,
    pub details: ConsistencyDetails,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    /// Per image: 100 × mean histogram intersection with every other image.
    pub per_shot: Vec<u8>,
    /// Indices of the lowest `per_shot` scores, worst first.
    pub worst_shots: Vec<usize>,
    /// Indices scored from a placeholder analysis.
    pub low_confidence: Vec<usize>,
}

impl ConsistencyReport {
    /// Report for a sequence too short to compare: 100 across the board.
    pub fn perfect(image_count: usize) -> Self {
        Self {
            score: ConsistencyScore::PERFECT,
            details: ConsistencyDetails::default(),
            issues: Vec::new(),
            recommendations: Vec::new(),
            per_shot: vec![100; image_count],
            worst_shots: Vec::new(),
            low_confidence: Vec::new(),
        }
    }
}

/// Score a sequence of analyses. Fewer than two analyses score a perfect
/// 100 across the board.
pub fn score_analyses(analyses: &[ImageAnalysis], config: &ScorerConfig) -> ConsistencyReport {
    let low_confidence: Vec<usize> = analyses
        .iter()
        .enumerate()
        .filter(|(_, a)| a.low_confidence)
        .map(|(i, _)| i)
        .collect();

    let n = analyses.len();
    if n < 2 {
        return ConsistencyReport {
            low_confidence,
            ..ConsistencyReport::perfect(n)
        };
    }

    let mut histogram_scores = Vec::with_capacity(n * (n - 1) / 2);
    let mut palette_scores = Vec::with_capacity(n * (n - 1) / 2);
    let mut per_shot_sums = vec![0.0; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let h = histogram_intersection(&analyses[i].histogram, &analyses[j].histogram);
            histogram_scores.push(h);
            palette_scores.push(palette_similarity(&analyses[i], &analyses[j]));
            per_shot_sums[i] += h;
            per_shot_sums[j] += h;
        }
    }

    let brightness: Vec<f64> = analyses.iter().map(|a| a.brightness).collect();
    let brightness_spread = population_stddev(&brightness);

    let color_palette = (mean(&palette_scores) * 100.0).clamp(0.0, 100.0);
    let structure = (mean(&histogram_scores) * 100.0).clamp(0.0, 100.0);
    let lighting = (100.0 - brightness_spread).clamp(0.0, 100.0);
    let w = &config.weights;
    let overall =
        (color_palette * w.palette + structure * w.structure + lighting * w.lighting).clamp(0.0, 100.0);

    let mut issues = Vec::new();
    let mut recommendations = Vec::new();
    if color_palette < PALETTE_ISSUE_THRESHOLD {
        issues.push("Color palette varies significantly between frames".to_string());
        recommendations.push("Consider using a fixed color palette in style settings".to_string());
    }
    if lighting < LIGHTING_ISSUE_THRESHOLD {
        issues.push("Lighting/brightness inconsistent across sequence".to_string());
        recommendations.push("Lock lighting direction and intensity in shot parameters".to_string());
    }
    if structure < STRUCTURE_ISSUE_THRESHOLD {
        issues.push("Overall visual structure differs between frames".to_string());
        recommendations
            .push("Ensure character description remains constant across shots".to_string());
    }
    if overall >= EXCELLENT_OVERALL_THRESHOLD {
        recommendations.push("Excellent consistency! Sequence is production-ready".to_string());
    } else if overall >= GOOD_OVERALL_THRESHOLD {
        recommendations.push("Good consistency with minor variations".to_string());
    }

    let per_shot: Vec<u8> = per_shot_sums
        .iter()
        .map(|sum| to_score(sum / (n - 1) as f64 * 100.0))
        .collect();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|i| (per_shot[*i], *i));
    let worst_shots = order.into_iter().take(config.worst_shot_count).collect();

    let mut dominant_colors: Vec<QuantizedColor> = Vec::new();
    for color in analyses.iter().flat_map(|a| a.dominant_colors.iter()) {
        if dominant_colors.len() == config.top_k {
            break;
        }
        if !dominant_colors.contains(color) {
            dominant_colors.push(*color);
        }
    }

    let stddevs: Vec<f64> = analyses.iter().map(|a| a.brightness_stddev).collect();

    ConsistencyReport {
        score: ConsistencyScore {
            overall: to_score(overall),
            color_palette: to_score(color_palette),
            structure: to_score(structure),
            lighting: to_score(lighting),
        },
        details: ConsistencyDetails {
            color_variance: mean(&stddevs).round() as u32,
            brightness_variance: brightness_spread.round() as u32,
            dominant_colors,
        },
        issues,
        recommendations,
        per_shot,
        worst_shots,
        low_confidence,
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Qualitative band for an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLabel {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl ConsistencyLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLabel::Excellent => "Excellent",
            ConsistencyLabel::Good => "Good",
            ConsistencyLabel::Fair => "Fair",
            ConsistencyLabel::NeedsWork => "Needs Work",
        }
    }
}

pub fn consistency_label(score: u8) -> ConsistencyLabel {
    match score {
        85.. => ConsistencyLabel::Excellent,
        70..=84 => ConsistencyLabel::Good,
        50..=69 => ConsistencyLabel::Fair,
        _ => ConsistencyLabel::NeedsWork,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(rgb)))
    }

    fn analyse(img: &DynamicImage) -> ImageAnalysis {
        ImageAnalysis::from_image(img, &ScorerConfig::default())
    }

    // -- ImageAnalysis --

    #[test]
    fn histogram_sums_to_one() {
        let mut img = RgbImage::new(40, 30);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgb([(x * 6) as u8, (y * 8) as u8, ((x + y) * 3) as u8]);
        }
        let a = analyse(&DynamicImage::ImageRgb8(img));
        assert_eq!(a.histogram.len(), HISTOGRAM_LEN);
        let sum: f64 = a.histogram.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn solid_image_features() {
        let a = analyse(&solid(10, 10, [200, 40, 120]));
        assert!((a.brightness - 120.0).abs() < 1e-9);
        assert!(a.brightness_stddev < 1e-6);
        assert_eq!(a.dominant_colors, vec![QuantizedColor([192, 32, 96])]);
        assert!(!a.low_confidence);
    }

    #[test]
    fn large_image_is_downscaled() {
        let a = analyse(&solid(1024, 512, [10, 10, 10]));
        let sum: f64 = a.histogram.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((a.brightness - 10.0).abs() < 1.0);
    }

    #[test]
    fn dominant_colors_capped_and_ordered() {
        let mut img = RgbImage::new(10, 10);
        for (x, _, p) in img.enumerate_pixels_mut() {
            // Four black columns, then six distinct lighter ones.
            let v = if x < 4 { 0 } else { (x as u8) * 25 };
            *p = Rgb([v, v, v]);
        }
        let a = analyse(&DynamicImage::ImageRgb8(img));
        assert_eq!(a.dominant_colors.len(), DEFAULT_TOP_K);
        assert_eq!(a.dominant_colors[0], QuantizedColor([0, 0, 0]));
    }

    #[test]
    fn zero_sized_image_is_placeholder() {
        let a = analyse(&DynamicImage::ImageRgb8(RgbImage::new(0, 0)));
        assert!(a.low_confidence);
        assert_eq!(a.brightness, PLACEHOLDER_BRIGHTNESS);
    }

    #[test]
    fn placeholder_is_flat() {
        let p = ImageAnalysis::placeholder();
        let sum: f64 = p.histogram.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(p.dominant_colors.is_empty());
    }

    // -- similarity --

    #[test]
    fn intersection_bounds() {
        let a = analyse(&solid(8, 8, [200, 40, 120]));
        let b = analyse(&solid(8, 8, [40, 120, 200]));
        assert!((histogram_intersection(&a.histogram, &a.histogram) - 1.0).abs() < 1e-9);
        assert!(histogram_intersection(&a.histogram, &b.histogram).abs() < 1e-9);
    }

    #[test]
    fn palette_similarity_neutral_for_placeholder() {
        let a = analyse(&solid(8, 8, [200, 40, 120]));
        let p = ImageAnalysis::placeholder();
        assert_eq!(palette_similarity(&a, &p), NEUTRAL_PALETTE_SIMILARITY);
    }

    // -- score_analyses --

    #[test]
    fn fewer_than_two_is_perfect() {
        let empty = score_analyses(&[], &ScorerConfig::default());
        assert_eq!(empty.score, ConsistencyScore::PERFECT);
        assert!(empty.per_shot.is_empty());

        let one = score_analyses(&[analyse(&solid(4, 4, [1, 2, 3]))], &ScorerConfig::default());
        assert_eq!(one.score, ConsistencyScore::PERFECT);
        assert_eq!(one.per_shot, vec![100]);
    }

    #[test]
    fn identical_images_score_high() {
        let a = analyse(&solid(64, 64, [90, 140, 60]));
        let report = score_analyses(&[a.clone(), a], &ScorerConfig::default());
        assert!(report.score.structure >= 95);
        assert!(report.score.color_palette >= 95);
        assert_eq!(report.score.lighting, 100);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn disjoint_images_score_low() {
        // Same brightness (120), disjoint channel bins and quantised colours.
        let a = analyse(&solid(32, 32, [200, 40, 120]));
        let b = analyse(&solid(32, 32, [40, 120, 200]));
        let report = score_analyses(&[a, b], &ScorerConfig::default());
        assert!(report.score.structure <= 10);
        assert!(report.score.color_palette <= 10);
        assert_eq!(report.score.lighting, 100);
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("Color palette varies")));
    }

    #[test]
    fn lighting_drops_with_brightness_spread() {
        let dark = analyse(&solid(8, 8, [20, 20, 20]));
        let bright = analyse(&solid(8, 8, [220, 220, 220]));
        let report = score_analyses(&[dark, bright], &ScorerConfig::default());
        // stddev of {20, 220} is 100.
        assert_eq!(report.score.lighting, 0);
        assert_eq!(report.details.brightness_variance, 100);
    }

    #[test]
    fn worst_shot_is_the_outlier() {
        let a = analyse(&solid(8, 8, [90, 140, 60]));
        let odd = analyse(&solid(8, 8, [240, 10, 200]));
        let report = score_analyses(
            &[a.clone(), a.clone(), odd, a],
            &ScorerConfig::default(),
        );
        assert_eq!(report.worst_shots[0], 2);
        assert_eq!(report.worst_shots.len(), DEFAULT_WORST_SHOT_COUNT);
        assert!(report.per_shot[2] < report.per_shot[0]);
    }

    #[test]
    fn placeholders_are_flagged_low_confidence() {
        let a = analyse(&solid(8, 8, [90, 140, 60]));
        let report = score_analyses(
            &[a.clone(), ImageAnalysis::placeholder(), a],
            &ScorerConfig::default(),
        );
        assert_eq!(report.low_confidence, vec![1]);
    }

    #[test]
    fn custom_weights_apply() {
        let a = analyse(&solid(8, 8, [200, 40, 120]));
        let b = analyse(&solid(8, 8, [40, 120, 200]));
        let config = ScorerConfig {
            weights: ScoringWeights {
                palette: 0.0,
                structure: 0.0,
                lighting: 1.0,
            },
            ..ScorerConfig::default()
        };
        let report = score_analyses(&[a, b], &config);
        assert_eq!(report.score.overall, 100);
    }

    #[test]
    fn scores_are_bounded() {
        let images = [
            solid(8, 8, [0, 0, 0]),
            solid(8, 8, [255, 255, 255]),
            solid(8, 8, [255, 0, 0]),
        ];
        let analyses: Vec<_> = images.iter().map(analyse).collect();
        let report = score_analyses(&analyses, &ScorerConfig::default());
        for s in [
            report.score.overall,
            report.score.color_palette,
            report.score.structure,
            report.score.lighting,
        ] {
            assert!(s <= 100);
        }
    }

    // -- consistency_label --

    #[test]
    fn label_bands() {
        assert_eq!(consistency_label(85), ConsistencyLabel::Excellent);
        assert_eq!(consistency_label(84), ConsistencyLabel::Good);
        assert_eq!(consistency_label(50), ConsistencyLabel::Fair);
        assert_eq!(consistency_label(49), ConsistencyLabel::NeedsWork);
        assert_eq!(ConsistencyLabel::NeedsWork.as_str(), "Needs Work");
    }

    #[test]
    fn quantized_color_serializes_as_css() {
        let json = serde_json::to_value(QuantizedColor([32, 64, 96])).unwrap();
        assert_eq!(json, "rgb(32,64,96)");
    }
}
