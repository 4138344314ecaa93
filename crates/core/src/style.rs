//! Sequence-wide style settings and the read-only project snapshot.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// VisualStyle
// ---------------------------------------------------------------------------

/// Rendering style shared by every shot in a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualStyle {
    #[default]
    #[serde(rename = "photorealistic")]
    Photorealistic,
    #[serde(rename = "cinematic")]
    Cinematic,
    #[serde(rename = "anime")]
    Anime,
    #[serde(rename = "concept")]
    Concept,
    #[serde(rename = "3d")]
    ThreeD,
    #[serde(rename = "product")]
    Product,
}

impl VisualStyle {
    pub const ALL: [VisualStyle; 6] = [
        VisualStyle::Photorealistic,
        VisualStyle::Cinematic,
        VisualStyle::Anime,
        VisualStyle::Concept,
        VisualStyle::ThreeD,
        VisualStyle::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualStyle::Photorealistic => "photorealistic",
            VisualStyle::Cinematic => "cinematic",
            VisualStyle::Anime => "anime",
            VisualStyle::Concept => "concept",
            VisualStyle::ThreeD => "3d",
            VisualStyle::Product => "product",
        }
    }
}

// ---------------------------------------------------------------------------
// ColorPalette
// ---------------------------------------------------------------------------

/// Colour palette bias. `Auto` leaves the palette to the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPalette {
    #[default]
    Auto,
    Warm,
    Cool,
    Neon,
    Muted,
    Monochrome,
}

// ---------------------------------------------------------------------------
// StyleSettings
// ---------------------------------------------------------------------------

/// Default lighting preset for new projects.
pub const DEFAULT_LIGHTING_TYPE: &str = "studio";

/// Default light direction for new projects.
pub const DEFAULT_LIGHT_DIRECTION: &str = "auto";

/// Visual configuration read by the prompt composer for every shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSettings {
    #[serde(default)]
    pub style: VisualStyle,
    /// Free-form lighting preset (`natural`, `golden`, `studio`, ...).
    #[serde(default = "default_lighting_type")]
    pub lighting_type: String,
    #[serde(default = "default_light_direction")]
    pub light_direction: String,
    #[serde(default)]
    pub color_palette: ColorPalette,
}

fn default_lighting_type() -> String {
    DEFAULT_LIGHTING_TYPE.to_string()
}

fn default_light_direction() -> String {
    DEFAULT_LIGHT_DIRECTION.to_string()
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            style: VisualStyle::default(),
            lighting_type: default_lighting_type(),
            light_direction: default_light_direction(),
            color_palette: ColorPalette::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectSnapshot
// ---------------------------------------------------------------------------

/// Read-only view of the project state consumed by the prompt pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub description: String,
    #[serde(default)]
    pub style: StyleSettings,
}

impl ProjectSnapshot {
    pub fn new(description: impl Into<String>, style: StyleSettings) -> Self {
        Self {
            description: description.into(),
            style,
        }
    }
}
