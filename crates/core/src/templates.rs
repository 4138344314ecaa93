//! Preset shot lists for common sequence types.

use serde::{Deserialize, Serialize};

use crate::shot::{Framing, Shot};

/// Named preset that expands into a ready-to-run shot list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShotTemplate {
    CharacterTurnaround,
    #[serde(rename = "product-360")]
    Product360,
    Storyboard,
    ExpressionSheet,
}

/// `(name, angle, height, fov, framing, instructions)`.
type ShotRow = (&'static str, i64, i32, u32, Framing, &'static str);

const CHARACTER_TURNAROUND: &[ShotRow] = &[
    ("Front View", 0, 0, 50, Framing::Full, "facing directly at camera, front of body visible"),
    ("3/4 Left", 45, 0, 50, Framing::Full, "three-quarter view from left, slight turn"),
    ("Side View", 90, 0, 50, Framing::Full, "perfect side profile, facing left"),
    (
        "3/4 Back",
        135,
        0,
        50,
        Framing::Full,
        "three-quarter back view, showing mostly back with partial profile",
    ),
    (
        "Back View",
        180,
        0,
        50,
        Framing::Full,
        "BACK OF CHARACTER ONLY, do not show face, subject facing away from camera, show back of head and body",
    ),
];

const PRODUCT_360: &[ShotRow] = &[
    ("Front", 0, 0, 50, Framing::Medium, "front facing view"),
    ("45°", 45, 0, 50, Framing::Medium, "angled 45 degrees from front"),
    ("90°", 90, 0, 50, Framing::Medium, "side view, 90 degrees"),
    ("135°", 135, 0, 50, Framing::Medium, "rear angle, 135 degrees, showing back"),
    ("180°", 180, 0, 50, Framing::Medium, "BACK VIEW ONLY, 180 degrees, rear of subject"),
    ("225°", 225, 0, 50, Framing::Medium, "rear angle, 225 degrees, showing back"),
    ("270°", 270, 0, 50, Framing::Medium, "side view, 270 degrees"),
    ("315°", 315, 0, 50, Framing::Medium, "angled 315 degrees from front"),
];

const STORYBOARD: &[ShotRow] = &[
    ("Establishing Wide", 30, 5, 24, Framing::Full, "wide establishing shot"),
    ("Medium Shot", 0, 0, 50, Framing::Medium, ""),
    ("Close-Up", 10, 0, 85, Framing::Closeup, "emotional close-up"),
    ("Over Shoulder", 160, 5, 50, Framing::Medium, "over the shoulder perspective"),
    ("Low Angle Hero", 0, -20, 35, Framing::Cowboy, "heroic low angle shot"),
    ("Dutch Tilt Action", 45, 0, 35, Framing::Medium, "dynamic dutch angle"),
];

const EXPRESSION_SHEET: &[ShotRow] = &[
    ("Neutral", 0, 0, 85, Framing::Closeup, "neutral expression"),
    ("Happy", 10, 0, 85, Framing::Closeup, "happy, smiling expression"),
    ("Sad", -10, 5, 85, Framing::Closeup, "sad, melancholic expression"),
    ("Angry", 0, -5, 85, Framing::Closeup, "angry, intense expression"),
    ("Surprised", 5, 0, 85, Framing::Closeup, "surprised, shocked expression"),
    ("Thoughtful", 20, 0, 85, Framing::Closeup, "thoughtful, contemplative expression"),
    ("Determined", 0, -10, 85, Framing::Closeup, "determined, focused expression"),
    ("Playful", -15, 5, 85, Framing::Closeup, "playful, mischievous expression"),
    ("Confident", 0, 0, 85, Framing::Closeup, "confident, self-assured expression"),
];

impl ShotTemplate {
    pub const ALL: [ShotTemplate; 4] = [
        ShotTemplate::CharacterTurnaround,
        ShotTemplate::Product360,
        ShotTemplate::Storyboard,
        ShotTemplate::ExpressionSheet,
    ];

    fn rows(&self) -> &'static [ShotRow] {
        match self {
            ShotTemplate::CharacterTurnaround => CHARACTER_TURNAROUND,
            ShotTemplate::Product360 => PRODUCT_360,
            ShotTemplate::Storyboard => STORYBOARD,
            ShotTemplate::ExpressionSheet => EXPRESSION_SHEET,
        }
    }

    /// Fresh pending shots for this template, each with a new id.
    pub fn shots(&self) -> Vec<Shot> {
        self.rows()
            .iter()
            .map(|(name, angle, height, fov, framing, instructions)| {
                Shot::new(*name, *angle, *height, *fov, *framing, *instructions)
            })
            .collect()
    }
}
