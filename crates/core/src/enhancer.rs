//! Rule-based description enhancement and improvement hints.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::style::VisualStyle;

/// Maximum number of hints returned by [`suggest_improvements`].
pub const MAX_IMPROVEMENT_HINTS: usize = 3;

/// Descriptions shorter than this get a "more detail" hint.
pub const SHORT_DESCRIPTION_LENGTH: usize = 20;

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"color|colour|red|blue|green|gold|silver|black|white|crimson|azure|amber")
        .expect("valid regex")
});

static MATERIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"glass|metal|fabric|leather|wood|plastic|ceramic|crystal|matte|glossy")
        .expect("valid regex")
});

static SETTING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(on|against|with)\b|background|surface|scene|environment").expect("valid regex")
});

static LIGHTING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"lighting|light|shadow|glow|illuminat").expect("valid regex"));

/// Output of [`enhance_prompt_local`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enhancement {
    pub enhanced: String,
    pub suggestions: Vec<String>,
    pub keywords: Vec<String>,
}

fn style_boosters(style: VisualStyle) -> &'static [&'static str] {
    match style {
        VisualStyle::Photorealistic => &[
            "photorealistic",
            "professional photography",
            "8K UHD resolution",
            "RAW photo quality",
            "DSLR captured",
            "sharp focus throughout",
            "high dynamic range",
            "professional color grading",
        ],
        VisualStyle::Cinematic => &[
            "cinematic masterpiece",
            "anamorphic lens bokeh",
            "35mm film grain",
            "dramatic chiaroscuro lighting",
            "Hollywood color grading",
            "shallow depth of field",
        ],
        VisualStyle::Product => &[
            "professional product photography",
            "commercial advertisement quality",
            "studio lighting setup",
            "perfectly lit",
            "clean gradient background",
            "magazine cover worthy",
            "sharp product details",
        ],
        VisualStyle::Anime => &[
            "anime masterpiece",
            "vibrant saturated colors",
            "clean crisp linework",
            "beautiful cel shading",
            "expressive character design",
        ],
        VisualStyle::Concept => &[
            "professional concept art",
            "digital painting masterpiece",
            "matte painting quality",
            "detailed environment design",
        ],
        VisualStyle::ThreeD => &[
            "3D render masterpiece",
            "Octane render quality",
            "volumetric lighting",
            "subsurface scattering",
            "ray traced reflections",
        ],
    }
}

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Expand a short description with style boosters and subject-aware
/// material hints.
pub fn enhance_prompt_local(prompt: &str, style: VisualStyle) -> Enhancement {
    let lower = prompt.to_lowercase();
    let mut additions: Vec<&str> = style_boosters(style).to_vec();
    let mut suggestions = Vec::new();
    let mut keywords: Vec<&str> = Vec::new();

    if mentions_any(&lower, &["bottle", "perfume", "cologne"]) {
        if !lower.contains("glass") {
            additions.push("crystal-clear premium glass with subtle refractions");
        }
        if !lower.contains("cap") {
            suggestions.push(
                "Consider describing the cap material (polished gold, brushed silver, exotic wood)",
            );
        }
        additions.push("luxury fragrance aesthetic");
        keywords.extend(["bottle", "fragrance", "luxury", "premium"]);
    }

    if mentions_any(&lower, &["character", "person", "woman", "man"]) {
        if !lower.contains("skin") {
            additions.push("detailed natural skin texture with subtle pores");
        }
        if !lower.contains("expression") {
            suggestions.push("Add specific facial expression for emotional impact");
        }
        additions.push("professional portrait lighting");
        keywords.extend(["character", "portrait", "human"]);
    }

    if mentions_any(&lower, &["watch", "jewelry", "ring"]) {
        additions.extend([
            "highly polished surface",
            "micro-detailed craftsmanship",
            "luxurious reflective surfaces",
        ]);
        keywords.extend(["luxury", "accessories", "craftsmanship"]);
    }

    if mentions_any(&lower, &["car", "vehicle", "automobile"]) {
        additions.extend(["automotive photography", "showroom lighting", "reflective paint finish"]);
        keywords.extend(["automotive", "vehicle", "transportation"]);
    }

    if mentions_any(&lower, &["food", "dish", "cuisine"]) {
        additions.extend(["food photography", "appetizing presentation", "steam and freshness"]);
        keywords.extend(["food", "culinary", "gourmet"]);
    }

    additions.extend(["masterpiece quality", "award-winning"]);

    let mut unique_keywords: Vec<String> = Vec::new();
    for k in keywords {
        if !unique_keywords.iter().any(|u| u == k) {
            unique_keywords.push(k.to_string());
        }
    }

    Enhancement {
        enhanced: format!("{}, {}", prompt.trim(), additions.join(", ")),
        suggestions: suggestions.into_iter().map(str::to_string).collect(),
        keywords: unique_keywords,
    }
}

/// Up to [`MAX_IMPROVEMENT_HINTS`] hints for missing detail in a description.
pub fn suggest_improvements(prompt: &str) -> Vec<String> {
    let lower = prompt.to_lowercase();
    let mut hints = Vec::new();

    if prompt.chars().count() < SHORT_DESCRIPTION_LENGTH {
        hints.push("Add more details for better control");
    }
    if !COLOR_RE.is_match(&lower) {
        hints.push("Add specific color descriptions");
    }
    if !MATERIAL_RE.is_match(&lower) {
        hints.push("Describe materials and textures");
    }
    if !SETTING_RE.is_match(&lower) {
        hints.push("Describe the setting or background");
    }
    if !LIGHTING_RE.is_match(&lower) {
        hints.push("Add lighting description for mood");
    }

    hints
        .into_iter()
        .take(MAX_IMPROVEMENT_HINTS)
        .map(str::to_string)
        .collect()
}
