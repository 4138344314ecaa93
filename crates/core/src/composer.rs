//! Prompt composer: base prompt, per-shot camera instruction, negative
//! prompts and refinement instructions for follow-up shots.
//!
//! Everything here is deterministic. Fragments are joined with `", "` and
//! empty fragments are skipped so that optional modifiers (`auto` palette,
//! unknown lighting) leave no dangling separators.

use crate::error::CoreError;
use crate::shot::Shot;
use crate::style::{StyleSettings, VisualStyle};
use crate::vocabulary::{
    angle_instruction, drift_band, fov_instruction, framing_instruction, height_instruction,
    light_direction_instruction, lighting_instruction, palette_instruction, style_instruction,
    DriftBand,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum description length after trimming.
pub const MIN_DESCRIPTION_LENGTH: usize = 10;

/// Maximum description length in characters.
pub const MAX_PROMPT_LENGTH: usize = 10_000;

/// Separator between prompt fragments.
pub const FRAGMENT_SEPARATOR: &str = ", ";

/// Prefix of the refinement instruction sent with follow-up shots.
pub const REFINEMENT_PREFIX: &str = "Change camera to: ";

/// Quality and identity boosters appended to every base prompt.
const BASE_BOOSTERS: &[&str] = &[
    "masterpiece quality",
    "highly detailed",
    "fixed character identity",
    "exact same face across all angles",
    "consistent outfit and colors",
];

/// Generic quality defects forbidden for every style.
pub const GENERIC_NEGATIVES: &[&str] = &[
    "blurry",
    "low quality",
    "jpeg artifacts",
    "watermark",
    "text",
    "signature",
    "cropped",
    "deformed",
    "bad anatomy",
    "extra limbs",
    "missing limbs",
    "extra fingers",
    "mutated hands",
    "disfigured",
];

/// Every class of frame-to-frame drift the generator is not allowed to make.
pub const CONSISTENCY_NEGATIVES: &[&str] = &[
    "different person",
    "different face",
    "changing identity",
    "different hairstyle",
    "different hair color",
    "different clothing",
    "different outfit",
    "different body proportions",
    "different color palette",
    "inconsistent lighting",
    "different background",
    "different pose",
    "multiple subjects",
];

/// Terms forbidding a frontal view, added for back-facing shots.
const BACK_VIEW_NEGATIVES: &[&str] = &[
    "front view",
    "face visible",
    "facing camera",
    "frontal view",
    "eyes looking at viewer",
];

/// Terms forbidding a frontal view, added for side-profile shots.
const PROFILE_NEGATIVES: &[&str] = &["front view", "facing camera", "both eyes visible"];

fn style_negatives(style: VisualStyle) -> &'static [&'static str] {
    match style {
        VisualStyle::Photorealistic => &["cartoon", "anime", "illustration", "painting", "3d render", "cgi"],
        VisualStyle::Cinematic => &["cartoon", "flat lighting", "amateur snapshot", "overexposed"],
        VisualStyle::Anime => &["photorealistic", "photograph", "3d render", "realistic skin texture"],
        VisualStyle::Concept => &["photograph", "amateur sketch", "unfinished"],
        VisualStyle::ThreeD => &["2d", "flat shading", "sketch", "photograph"],
        VisualStyle::Product => &["cluttered background", "people", "hands", "busy scene", "harsh shadows"],
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the subject description: at least [`MIN_DESCRIPTION_LENGTH`]
/// characters after trimming and no longer than [`MAX_PROMPT_LENGTH`].
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    let trimmed = description.trim();
    let len = trimmed.chars().count();
    if len < MIN_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description must be at least {MIN_DESCRIPTION_LENGTH} characters (got {len})"
        )));
    }
    if len > MAX_PROMPT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_PROMPT_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate a shot list: non-empty, every focal length positive.
pub fn validate_shots(shots: &[Shot]) -> Result<(), CoreError> {
    if shots.is_empty() {
        return Err(CoreError::Validation(
            "At least one shot is required".to_string(),
        ));
    }
    if let Some(bad) = shots.iter().find(|s| s.fov() == 0) {
        return Err(CoreError::Validation(format!(
            "Shot '{}' has a zero focal length",
            bad.name
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Positive prompts
// ---------------------------------------------------------------------------

fn join_fragments<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(FRAGMENT_SEPARATOR)
}

/// Subject description plus sequence-wide style, lighting and palette,
/// followed by the fixed boosters.
pub fn build_base_prompt(description: &str, style: &StyleSettings) -> String {
    let mut parts = vec![
        description,
        style_instruction(style.style),
        lighting_instruction(&style.lighting_type),
        light_direction_instruction(&style.light_direction),
        palette_instruction(style.color_palette),
    ];
    parts.extend_from_slice(BASE_BOOSTERS);
    join_fragments(parts)
}

/// Angle, height, lens and framing for one shot, plus the shot's free-text
/// instructions when present.
pub fn build_camera_instruction(shot: &Shot) -> String {
    join_fragments([
        angle_instruction(shot.camera_angle() as i64),
        height_instruction(shot.camera_height()),
        fov_instruction(shot.fov()),
        framing_instruction(shot.framing),
        shot.instructions.as_str(),
    ])
}

/// Full text prompt for a shot: base prompt followed by its camera
/// instruction, plus the drift directive for back and profile angles.
pub fn build_shot_prompt(description: &str, shot: &Shot, style: &StyleSettings) -> String {
    let prompt = format!(
        "{}{FRAGMENT_SEPARATOR}{}",
        build_base_prompt(description, style),
        build_camera_instruction(shot)
    );
    match drift_directive(drift_band(shot.camera_angle() as i64)) {
        Some(directive) => format!("{prompt}. {directive}"),
        None => prompt,
    }
}

/// Emphatic directive repeated after the camera instruction for angles the
/// generator tends to pull back to a frontal view.
fn drift_directive(band: DriftBand) -> Option<&'static str> {
    match band {
        DriftBand::None => None,
        DriftBand::Back => Some(
            "BACK VIEW ONLY, subject facing away from camera, do not show the face, \
             no face visible, show the back of the head and body",
        ),
        DriftBand::LeftProfile => Some(
            "STRICT SIDE PROFILE from the left, subject facing sideways, \
             only one eye visible, do not face the camera",
        ),
        DriftBand::RightProfile => Some(
            "STRICT SIDE PROFILE from the right, subject facing sideways, \
             only one eye visible, do not face the camera",
        ),
    }
}

/// Instruction sent alongside the base structured prompt for follow-up shots.
pub fn build_refinement_instruction(shot: &Shot) -> String {
    let camera = build_camera_instruction(shot);
    match drift_directive(drift_band(shot.camera_angle() as i64)) {
        Some(directive) => format!("{REFINEMENT_PREFIX}{camera}. {directive}"),
        None => format!("{REFINEMENT_PREFIX}{camera}"),
    }
}

// ---------------------------------------------------------------------------
// Negative prompts
// ---------------------------------------------------------------------------

fn union_terms<'a>(groups: &[&[&'a str]]) -> Vec<&'a str> {
    let mut terms: Vec<&str> = Vec::new();
    for term in groups.iter().flat_map(|g| g.iter().copied()) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Generic quality negatives, then consistency negatives, then style
/// negatives. Duplicates keep their first position.
pub fn build_negative_prompt(style: VisualStyle) -> String {
    union_terms(&[GENERIC_NEGATIVES, CONSISTENCY_NEGATIVES, style_negatives(style)])
        .join(FRAGMENT_SEPARATOR)
}

/// [`build_negative_prompt`] plus terms forbidding the view opposite to a
/// drift-prone angle.
pub fn build_shot_negative_prompt(style: VisualStyle, angle: i64) -> String {
    let opposition: &[&str] = match drift_band(angle) {
        DriftBand::None => &[],
        DriftBand::Back => BACK_VIEW_NEGATIVES,
        DriftBand::LeftProfile | DriftBand::RightProfile => PROFILE_NEGATIVES,
    };
    union_terms(&[
        GENERIC_NEGATIVES,
        CONSISTENCY_NEGATIVES,
        style_negatives(style),
        opposition,
    ])
    .join(FRAGMENT_SEPARATOR)
}

/// Split a comma-separated prompt into trimmed, non-empty terms.
pub fn negative_terms(prompt: &str) -> Vec<&str> {
    prompt
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
