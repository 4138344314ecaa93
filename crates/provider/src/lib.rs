//! Text-to-image generation providers and the image fetch facility.
//!
//! Provides the [`GenerationProvider`] trait consumed by the sequence
//! pipeline, concrete BRIA / fal.ai HTTP clients, an offline demo
//! provider, environment-driven provider selection, and an
//! [`ImageSource`] for downloading and decoding generated images.

pub mod bria;
pub mod config;
pub mod demo;
pub mod error;
pub mod fal;
mod http;
pub mod images;
pub mod provider;
pub mod request;
pub mod retry;

pub use config::{build_provider, ProviderConfig, ProviderKind};
pub use error::ProviderError;
pub use images::{HttpImageSource, ImageLoadError, ImageSource};
pub use provider::GenerationProvider;
pub use request::{GeneratedImage, GenerationRequest, GenerationResult, ImageSize};
