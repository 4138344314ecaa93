//! Provider-neutral request and response types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

// ---------------------------------------------------------------------------
// ImageSize
// ---------------------------------------------------------------------------

/// Output resolution presets accepted by every provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1024x768")]
    Landscape,
    #[serde(rename = "768x1024")]
    Portrait,
    #[serde(rename = "1280x720")]
    Wide,
}

impl ImageSize {
    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageSize::Square => (1024, 1024),
            ImageSize::Landscape => (1024, 768),
            ImageSize::Portrait => (768, 1024),
            ImageSize::Wide => (1280, 720),
        }
    }

    /// Aspect ratio string used by the BRIA API.
    pub fn aspect_ratio(&self) -> &'static str {
        match self {
            ImageSize::Square => "1:1",
            ImageSize::Landscape => "4:3",
            ImageSize::Portrait => "3:4",
            ImageSize::Wide => "16:9",
        }
    }

    /// Named size used by the fal.ai API.
    pub fn fal_size(&self) -> &'static str {
        match self {
            ImageSize::Square => "square_hd",
            ImageSize::Landscape => "landscape_4_3",
            ImageSize::Portrait => "portrait_4_3",
            ImageSize::Wide => "landscape_16_9",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{w}x{h}")
    }
}

impl FromStr for ImageSize {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1024x1024" => Ok(ImageSize::Square),
            "1024x768" => Ok(ImageSize::Landscape),
            "768x1024" => Ok(ImageSize::Portrait),
            "1280x720" => Ok(ImageSize::Wide),
            other => Err(ProviderError::Config(format!(
                "Unsupported image size '{other}' (expected 1024x1024, 1024x768, 768x1024 or 1280x720)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

/// Default number of diffusion steps.
pub const DEFAULT_QUALITY_STEPS: u32 = 50;

/// One generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    /// Full prompt, or a refinement instruction when `structured_prompt` is set.
    pub prompt: String,
    /// Opaque structured prompt from an earlier generation.
    pub structured_prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub seed: Option<u64>,
    pub image_size: ImageSize,
    pub quality_steps: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            structured_prompt: None,
            negative_prompt: None,
            seed: None,
            image_size: ImageSize::default(),
            quality_steps: DEFAULT_QUALITY_STEPS,
        }
    }
}

/// A single generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub content_type: String,
}

/// Provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub images: Vec<GeneratedImage>,
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_prompt: Option<String>,
}

impl GenerationResult {
    /// URL of the first image, if any.
    pub fn first_url(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }
}
