//! Prompt synthesis and consistency analysis for multi-shot image sequences.
//!
//! Pure, synchronous building blocks shared by the provider, pipeline and
//! worker crates:
//!
//! - [`vocabulary`] and [`composer`]: shot and style parameters to text
//!   prompts, negative prompts and refinement instructions.
//! - [`structured_prompt`]: camera rewrite of provider structured prompts.
//! - [`consistency`] and [`regeneration`]: histogram-based scoring of a
//!   generated sequence and advice on which shots to re-issue.

pub mod composer;
pub mod consistency;
pub mod enhancer;
pub mod error;
pub mod regeneration;
pub mod shot;
pub mod structured_prompt;
pub mod style;
pub mod templates;
pub mod types;
pub mod vocabulary;

pub use error::CoreError;
pub use shot::{Framing, Shot, ShotState, ShotStatus};
pub use style::{ColorPalette, ProjectSnapshot, StyleSettings, VisualStyle};
