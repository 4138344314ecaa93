//! Structured-prompt mutation for follow-up shots.
//!
//! Providers return an opaque structured prompt describing the first shot.
//! When it parses as a JSON object the camera fields are rewritten for the
//! next shot; anything else is passed through untouched and the refinement
//! instruction alone carries the angle change.

use serde_json::{json, Map, Value};

use crate::shot::Shot;
use crate::vocabulary::{fov_instruction, height_instruction, view_label};

/// Key holding the camera block written by the mutator.
pub const CAMERA_KEY: &str = "camera";

/// Provider block that carries its own camera description, when present.
pub const PHOTOGRAPHIC_KEY: &str = "photographic_characteristics";

/// Parsed form of a provider's structured prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredPrompt {
    Object(Map<String, Value>),
    /// Non-JSON text, or JSON that is not an object.
    Opaque(String),
}

impl StructuredPrompt {
    /// Never fails: unparseable input becomes [`StructuredPrompt::Opaque`].
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => StructuredPrompt::Object(map),
            _ => StructuredPrompt::Opaque(raw.to_string()),
        }
    }
}

/// Result of [`mutate_structured_prompt`].
#[derive(Debug, Clone, PartialEq)]
pub struct MutatedPrompt {
    pub text: String,
    /// `true` when the camera fields were rewritten, `false` on pass-through.
    pub applied: bool,
}

/// Rewrite the camera fields of a structured prompt for `shot`.
pub fn mutate_structured_prompt(raw: &str, shot: &Shot) -> MutatedPrompt {
    let mut map = match StructuredPrompt::parse(raw) {
        StructuredPrompt::Object(map) => map,
        StructuredPrompt::Opaque(text) => {
            return MutatedPrompt {
                text,
                applied: false,
            }
        }
    };

    let view = view_label(shot.camera_angle() as i64);
    map.insert(
        CAMERA_KEY.to_string(),
        json!({
            "angle": shot.camera_angle(),
            "view": view,
            "height": shot.camera_height(),
            "fov": shot.fov(),
            "framing": shot.framing.as_str(),
        }),
    );

    if let Some(Value::Object(photo)) = map.get_mut(PHOTOGRAPHIC_KEY) {
        if photo.contains_key("camera_angle") {
            photo.insert(
                "camera_angle".to_string(),
                Value::String(format!("{view}, {}", height_instruction(shot.camera_height()))),
            );
        }
        if photo.contains_key("lens_focal_length") {
            photo.insert(
                "lens_focal_length".to_string(),
                Value::String(fov_instruction(shot.fov()).to_string()),
            );
        }
    }

    match serde_json::to_string(&Value::Object(map)) {
        Ok(text) => MutatedPrompt {
            text,
            applied: true,
        },
        // Serialising a `Value` only fails on non-string map keys, which a
        // parsed object cannot contain.
        Err(_) => MutatedPrompt {
            text: raw.to_string(),
            applied: false,
        },
    }
}
