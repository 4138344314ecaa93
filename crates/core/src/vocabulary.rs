//! Parameter vocabulary: numeric and enum shot/style parameters mapped to
//! natural-language prompt fragments.
//!
//! Every function here is total and side-effect free. Unknown string inputs
//! fall back to a default fragment (or the empty string for optional
//! modifiers) instead of erroring.

use serde::Serialize;

use crate::error::CoreError;
use crate::shot::Framing;
use crate::style::{ColorPalette, VisualStyle};

// ---------------------------------------------------------------------------
// Angle normalisation
// ---------------------------------------------------------------------------

/// Wrap any angle in degrees into `[0, 360)`.
pub fn normalize_angle(angle: i64) -> u16 {
    angle.rem_euclid(360) as u16
}

// ---------------------------------------------------------------------------
// View / AngleBandTable
// ---------------------------------------------------------------------------

/// Qualitative camera view around the subject.
///
/// Angles increase counter-clockwise when seen from above: 0 is the front,
/// 90 the subject's left side, 180 the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Front,
    ThreeQuarterLeft,
    LeftProfile,
    ThreeQuarterBackLeft,
    Back,
    ThreeQuarterBackRight,
    RightProfile,
    ThreeQuarterFrontRight,
}

/// Views in band order, starting at the front and sweeping through the left.
const VIEWS: [View; 8] = [
    View::Front,
    View::ThreeQuarterLeft,
    View::LeftProfile,
    View::ThreeQuarterBackLeft,
    View::Back,
    View::ThreeQuarterBackRight,
    View::RightProfile,
    View::ThreeQuarterFrontRight,
];

impl View {
    /// Prompt fragment describing this view.
    pub fn descriptor(&self) -> &'static str {
        match self {
            View::Front => "front view, facing the camera directly",
            View::ThreeQuarterLeft => "three-quarter view from the left side",
            View::LeftProfile => "side profile view from the left",
            View::ThreeQuarterBackLeft => "three-quarter back view from the left",
            View::Back => "back view, facing away from camera",
            View::ThreeQuarterBackRight => "three-quarter back view from the right",
            View::RightProfile => "side profile view from the right",
            View::ThreeQuarterFrontRight => "three-quarter view from the right side",
        }
    }
}

/// Canonical band boundaries in degrees.
///
/// `<= 15` or `>= 345` is the front; each following bound is the exclusive
/// upper edge of the next view in [`VIEWS`] order.
pub const DEFAULT_ANGLE_BOUNDS: [u16; 8] = [15, 60, 120, 165, 195, 240, 300, 345];

/// Alternative table with equal 45° bands centred on the canonical
/// multiples. Kept as a tuning knob.
pub const FINE_ANGLE_BOUNDS: [u16; 8] = [22, 67, 112, 157, 202, 247, 292, 337];

/// Boundary table mapping angles to [`View`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleBandTable {
    bounds: [u16; 8],
}

impl Default for AngleBandTable {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_ANGLE_BOUNDS,
        }
    }
}

impl AngleBandTable {
    /// The equal-width 45° table.
    pub fn fine() -> Self {
        Self {
            bounds: FINE_ANGLE_BOUNDS,
        }
    }

    /// Build a custom table. Bounds must be strictly ascending and below 360.
    pub fn with_bounds(bounds: [u16; 8]) -> Result<Self, CoreError> {
        if bounds.iter().any(|b| *b >= 360) {
            return Err(CoreError::Validation(
                "Angle bounds must be below 360 degrees".to_string(),
            ));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CoreError::Validation(format!(
                "Angle bounds must be strictly ascending (got {bounds:?})"
            )));
        }
        Ok(Self { bounds })
    }

    /// Classify an angle (any integer, wrapped) into exactly one view.
    pub fn view(&self, angle: i64) -> View {
        let a = normalize_angle(angle);
        if a <= self.bounds[0] || a >= self.bounds[7] {
            return View::Front;
        }
        self.bounds[1..]
            .iter()
            .position(|upper| a < *upper)
            .map(|i| VIEWS[i + 1])
            .unwrap_or(View::Front)
    }
}

/// View descriptor for an angle using the canonical band table.
pub fn angle_instruction(angle: i64) -> &'static str {
    AngleBandTable::default().view(angle).descriptor()
}

// ---------------------------------------------------------------------------
// Nearest canonical view label
// ---------------------------------------------------------------------------

/// Labels for the canonical 45° multiples, indexed by `angle / 45`.
const VIEW_LABELS: [&str; 8] = [
    "front view",
    "three-quarter left view",
    "left side profile",
    "three-quarter back left view",
    "back view",
    "three-quarter back right view",
    "right side profile",
    "three-quarter right view",
];

/// Label of the canonical 45° multiple nearest to `angle`.
pub fn view_label(angle: i64) -> &'static str {
    let a = normalize_angle(angle) as usize;
    VIEW_LABELS[((a + 22) / 45) % 8]
}

// ---------------------------------------------------------------------------
// Drift-prone bands
// ---------------------------------------------------------------------------

/// Half-width of the back-facing band around 180°.
pub const BACK_BAND_HALF_WIDTH: u16 = 45;

/// Half-width of the side-profile bands around 90° and 270°.
pub const PROFILE_BAND_HALF_WIDTH: u16 = 30;

/// Angle ranges where providers tend to drift back to a frontal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftBand {
    None,
    Back,
    LeftProfile,
    RightProfile,
}

/// Classify an angle into its drift-prone band. The back band wins where
/// bands would overlap.
pub fn drift_band(angle: i64) -> DriftBand {
    let a = normalize_angle(angle);
    if a.abs_diff(180) <= BACK_BAND_HALF_WIDTH {
        DriftBand::Back
    } else if a.abs_diff(90) <= PROFILE_BAND_HALF_WIDTH {
        DriftBand::LeftProfile
    } else if a.abs_diff(270) <= PROFILE_BAND_HALF_WIDTH {
        DriftBand::RightProfile
    } else {
        DriftBand::None
    }
}

// ---------------------------------------------------------------------------
// Height
// ---------------------------------------------------------------------------

/// Threshold bands for camera height in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightBands {
    /// At or below: strong low angle.
    pub low: i32,
    /// At or below: slight low angle.
    pub slightly_low: i32,
    /// At or above: slight high angle.
    pub slightly_high: i32,
    /// At or above: strong high angle.
    pub high: i32,
}

impl Default for HeightBands {
    fn default() -> Self {
        Self {
            low: -15,
            slightly_low: -5,
            slightly_high: 5,
            high: 15,
        }
    }
}

impl HeightBands {
    pub fn instruction(&self, height: i32) -> &'static str {
        if height <= self.low {
            "low angle shot looking up"
        } else if height <= self.slightly_low {
            "slightly low angle"
        } else if height >= self.high {
            "high angle shot looking down"
        } else if height >= self.slightly_high {
            "slightly high angle"
        } else {
            "eye level"
        }
    }
}

/// Height fragment using the default bands.
pub fn height_instruction(height: i32) -> &'static str {
    HeightBands::default().instruction(height)
}

// ---------------------------------------------------------------------------
// Lens / framing
// ---------------------------------------------------------------------------

/// Named lens for a focal length. Smaller millimetre values are wider lenses.
pub fn fov_instruction(mm: u32) -> &'static str {
    match mm {
        0..=24 => "24mm lens",
        25..=35 => "35mm lens",
        36..=50 => "50mm lens",
        51..=85 => "85mm lens",
        _ => "135mm lens",
    }
}

pub fn framing_instruction(framing: Framing) -> &'static str {
    match framing {
        Framing::Full => "full shot showing entire subject",
        Framing::Cowboy => "medium-full shot",
        Framing::Medium => "medium shot",
        Framing::Closeup => "close-up shot",
        Framing::ExtremeCloseup => "extreme close-up",
    }
}

/// Framing fragment for a wire name; unknown names read as a medium shot.
pub fn framing_instruction_str(framing: &str) -> &'static str {
    framing_instruction(Framing::parse(framing).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Style / lighting / palette
// ---------------------------------------------------------------------------

pub fn style_instruction(style: VisualStyle) -> &'static str {
    match style {
        VisualStyle::Photorealistic => "photorealistic, professional photography, 8K, sharp focus",
        VisualStyle::Cinematic => "cinematic, film still, dramatic lighting",
        VisualStyle::Anime => "anime style, vibrant colors, clean lines",
        VisualStyle::Concept => "concept art, digital painting",
        VisualStyle::ThreeD => "3D render, octane render, highly detailed",
        VisualStyle::Product => {
            "professional product photography, studio lighting, clean background"
        }
    }
}

/// Lighting preset fragment. Unknown presets yield the empty string.
pub fn lighting_instruction(lighting_type: &str) -> &'static str {
    match lighting_type.trim().to_ascii_lowercase().as_str() {
        "natural" => "natural daylight",
        "golden" => "golden hour lighting",
        "studio" => "professional studio lighting",
        "dramatic" => "dramatic rim lighting",
        "neon" => "neon lighting",
        "moonlight" => "moonlight, cool tones",
        "overcast" => "soft overcast lighting",
        _ => "",
    }
}

/// Light direction fragment. `auto` and unknown directions yield the empty
/// string.
pub fn light_direction_instruction(direction: &str) -> &'static str {
    match direction.trim().to_ascii_lowercase().as_str() {
        "front" => "even front lighting",
        "left" => "key light from the left",
        "right" => "key light from the right",
        "side" => "hard side lighting",
        "top" => "top-down lighting",
        "back" => "backlit with glowing edges",
        "rim" => "rim light outlining the silhouette",
        _ => "",
    }
}

/// Palette fragment. `Auto` yields the empty string.
pub fn palette_instruction(palette: ColorPalette) -> &'static str {
    match palette {
        ColorPalette::Auto => "",
        ColorPalette::Warm => "warm color palette",
        ColorPalette::Cool => "cool color palette",
        ColorPalette::Neon => "neon colors, high saturation",
        ColorPalette::Muted => "muted colors, desaturated",
        ColorPalette::Monochrome => "monochromatic",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- normalize_angle --

    #[test]
    fn normalize_wraps_negative_and_large() {
        assert_eq!(normalize_angle(-1), 359);
        assert_eq!(normalize_angle(360), 0);
        assert_eq!(normalize_angle(725), 5);
    }

    // -- angle_instruction --

    #[test]
    fn angle_band_edges() {
        assert_eq!(angle_instruction(0), View::Front.descriptor());
        assert_eq!(angle_instruction(15), View::Front.descriptor());
        assert_eq!(angle_instruction(16), View::ThreeQuarterLeft.descriptor());
        assert_eq!(angle_instruction(60), View::LeftProfile.descriptor());
        assert_eq!(angle_instruction(120), View::ThreeQuarterBackLeft.descriptor());
        assert_eq!(angle_instruction(165), View::Back.descriptor());
        assert_eq!(angle_instruction(194), View::Back.descriptor());
        assert_eq!(angle_instruction(195), View::ThreeQuarterBackRight.descriptor());
        assert_eq!(angle_instruction(240), View::RightProfile.descriptor());
        assert_eq!(angle_instruction(300), View::ThreeQuarterFrontRight.descriptor());
        assert_eq!(angle_instruction(344), View::ThreeQuarterFrontRight.descriptor());
        assert_eq!(angle_instruction(345), View::Front.descriptor());
    }

    #[test]
    fn angle_instruction_is_total_and_non_empty() {
        for a in 0..360 {
            assert!(!angle_instruction(a).is_empty(), "empty descriptor at {a}");
        }
    }

    #[test]
    fn angle_instruction_is_periodic() {
        for a in 0..360 {
            for k in [-3i64, -1, 1, 2, 10] {
                assert_eq!(angle_instruction(a), angle_instruction(a + 360 * k));
            }
        }
    }

    #[test]
    fn fine_table_is_total() {
        let table = AngleBandTable::fine();
        assert_eq!(table.view(22), View::Front);
        assert_eq!(table.view(23), View::ThreeQuarterLeft);
        assert_eq!(table.view(180), View::Back);
        assert_eq!(table.view(337), View::Front);
    }

    #[test]
    fn custom_bounds_must_ascend() {
        assert!(AngleBandTable::with_bounds([15, 60, 120, 165, 195, 240, 300, 345]).is_ok());
        assert!(AngleBandTable::with_bounds([15, 60, 60, 165, 195, 240, 300, 345]).is_err());
        assert!(AngleBandTable::with_bounds([15, 60, 120, 165, 195, 240, 300, 360]).is_err());
    }

    // -- view_label --

    #[test]
    fn view_label_snaps_to_nearest_multiple() {
        assert_eq!(view_label(0), "front view");
        assert_eq!(view_label(22), "front view");
        assert_eq!(view_label(23), "three-quarter left view");
        assert_eq!(view_label(180), "back view");
        assert_eq!(view_label(350), "front view");
        assert_eq!(view_label(-90), "right side profile");
    }

    // -- drift_band --

    #[test]
    fn drift_band_classification() {
        assert_eq!(drift_band(0), DriftBand::None);
        assert_eq!(drift_band(135), DriftBand::Back);
        assert_eq!(drift_band(180), DriftBand::Back);
        assert_eq!(drift_band(225), DriftBand::Back);
        assert_eq!(drift_band(90), DriftBand::LeftProfile);
        assert_eq!(drift_band(270), DriftBand::RightProfile);
        assert_eq!(drift_band(45), DriftBand::None);
        assert_eq!(drift_band(-180), DriftBand::Back);
    }

    // -- height_instruction --

    #[test]
    fn height_bands() {
        assert_eq!(height_instruction(-20), "low angle shot looking up");
        assert_eq!(height_instruction(-15), "low angle shot looking up");
        assert_eq!(height_instruction(-5), "slightly low angle");
        assert_eq!(height_instruction(0), "eye level");
        assert_eq!(height_instruction(5), "slightly high angle");
        assert_eq!(height_instruction(15), "high angle shot looking down");
    }

    // -- fov_instruction --

    #[test]
    fn fov_thresholds() {
        assert_eq!(fov_instruction(18), "24mm lens");
        assert_eq!(fov_instruction(35), "35mm lens");
        assert_eq!(fov_instruction(50), "50mm lens");
        assert_eq!(fov_instruction(85), "85mm lens");
        assert_eq!(fov_instruction(200), "135mm lens");
    }

    // -- framing / style / lighting / palette --

    #[test]
    fn unknown_framing_defaults_to_medium() {
        assert_eq!(framing_instruction_str("wide"), "medium shot");
        assert_eq!(framing_instruction_str("closeup"), "close-up shot");
    }

    #[test]
    fn unknown_lighting_is_empty() {
        assert_eq!(lighting_instruction("laser"), "");
        assert_eq!(lighting_instruction("Golden"), "golden hour lighting");
    }

    #[test]
    fn auto_palette_is_empty() {
        assert_eq!(palette_instruction(ColorPalette::Auto), "");
        assert_eq!(palette_instruction(ColorPalette::Monochrome), "monochromatic");
    }

    #[test]
    fn every_style_has_a_fragment() {
        for style in VisualStyle::ALL {
            assert!(!style_instruction(style).is_empty());
        }
    }

    #[test]
    fn auto_direction_is_empty() {
        assert_eq!(light_direction_instruction("auto"), "");
        assert_eq!(light_direction_instruction("left"), "key light from the left");
    }
}
