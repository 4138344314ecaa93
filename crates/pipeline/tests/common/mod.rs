#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use turnaround_core::{Framing, ProjectSnapshot, Shot, StyleSettings};
use turnaround_pipeline::{ProgressEvent, SequenceOptions, SequenceOrchestrator};
use turnaround_provider::{
    GeneratedImage, GenerationProvider, GenerationRequest, GenerationResult, ImageLoadError,
    ImageSource, ProviderError,
};

/// Structured prompt returned by [`FakeProvider`] for shot 0.
pub const BASE_STRUCTURED_PROMPT: &str =
    r#"{"subject":"a red ceramic mug","photographic_characteristics":{"camera_angle":"eye level","lens_focal_length":"50mm"}}"#;

/// Scripted in-memory provider. Records every request and returns
/// `fake://image/<n>` URLs, `n` being the 0-based call number.
pub struct FakeProvider {
    pub requests: Mutex<Vec<GenerationRequest>>,
    structured_prompt: Option<String>,
    supports_structured: bool,
    failing_calls: HashSet<usize>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            structured_prompt: Some(BASE_STRUCTURED_PROMPT.to_string()),
            supports_structured: true,
            failing_calls: HashSet::new(),
        }
    }

    pub fn with_structured_prompt(mut self, structured_prompt: Option<&str>) -> Self {
        self.structured_prompt = structured_prompt.map(str::to_string);
        self
    }

    /// Behave like a provider that cannot accept structured prompts.
    pub fn without_structured_support(mut self) -> Self {
        self.supports_structured = false;
        self
    }

    /// Fail the given 0-based call with a 500.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    pub fn recorded(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn supports_structured_prompt(&self) -> bool {
        self.supports_structured
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        if self.failing_calls.contains(&call) {
            return Err(ProviderError::Api {
                provider: "fake",
                status: 500,
                body: format!("scripted failure on call {call}"),
            });
        }

        Ok(GenerationResult {
            images: vec![GeneratedImage {
                url: format!("fake://image/{call}"),
                width: 1024,
                height: 1024,
                content_type: "image/png".to_string(),
            }],
            seed: request.seed.unwrap_or_default(),
            prompt: Some(request.prompt.clone()),
            structured_prompt: self.structured_prompt.clone(),
        })
    }
}

/// In-memory [`ImageSource`]. Unknown URLs fail to load.
#[derive(Default)]
pub struct FakeImageSource {
    images: Mutex<HashMap<String, DynamicImage>>,
}

impl FakeImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, image: DynamicImage) {
        self.images.lock().unwrap().insert(url.to_string(), image);
    }
}

#[async_trait]
impl ImageSource for FakeImageSource {
    async fn load(&self, url: &str) -> Result<DynamicImage, ImageLoadError> {
        self.images
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ImageLoadError::UnsupportedScheme(url.to_string()))
    }
}

/// Single-colour test image.
pub fn solid(rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb(rgb)))
}

pub fn mug_project() -> ProjectSnapshot {
    ProjectSnapshot::new("a red ceramic mug", StyleSettings::default())
}

/// Front and back view of the mug.
pub fn front_and_back() -> Vec<Shot> {
    vec![
        Shot::new("Front", 0, 0, 50, Framing::Medium, ""),
        Shot::new("Back", 180, 0, 50, Framing::Medium, ""),
    ]
}

/// Four shots around the subject.
pub fn turnaround() -> Vec<Shot> {
    vec![
        Shot::new("Front", 0, 0, 50, Framing::Full, ""),
        Shot::new("3/4 Left", 45, 0, 50, Framing::Full, ""),
        Shot::new("Side", 90, 0, 50, Framing::Full, ""),
        Shot::new("Back", 180, 0, 50, Framing::Full, ""),
    ]
}

pub fn orchestrator(provider: std::sync::Arc<FakeProvider>) -> SequenceOrchestrator {
    SequenceOrchestrator::new(provider, SequenceOptions::default())
}

/// Progress sink that keeps every event.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl turnaround_pipeline::ProgressSink for RecordingSink {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
