//! Shot entity, framing enum, and the per-shot status state machine.
//!
//! A [`Shot`] is one planned camera setup in a sequence. Its lifecycle is
//! `pending -> generating -> {complete | error}`; the terminal states carry
//! their payload (image URL or error message) so that exactly one of the two
//! is present once a shot leaves `generating`.

use serde::{Deserialize, Serialize};

use crate::types::ShotId;
use crate::vocabulary::normalize_angle;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default lower bound for camera height in degrees (low angle).
pub const DEFAULT_MIN_CAMERA_HEIGHT: i32 = -30;

/// Default upper bound for camera height in degrees (high angle).
pub const DEFAULT_MAX_CAMERA_HEIGHT: i32 = 30;

/// Default focal length (mm) for shots created without one.
pub const DEFAULT_FOV_MM: u32 = 50;

// ---------------------------------------------------------------------------
// CameraLimits
// ---------------------------------------------------------------------------

/// Configured range that camera heights are clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraLimits {
    pub min_height: i32,
    pub max_height: i32,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_height: DEFAULT_MIN_CAMERA_HEIGHT,
            max_height: DEFAULT_MAX_CAMERA_HEIGHT,
        }
    }
}

impl CameraLimits {
    /// Clamp a height into `[min_height, max_height]`.
    pub fn clamp_height(&self, height: i32) -> i32 {
        height.clamp(self.min_height, self.max_height)
    }
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Shot framing, ordered from widest to tightest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    Full,
    Cowboy,
    #[default]
    Medium,
    Closeup,
    ExtremeCloseup,
}

impl Framing {
    /// Wire name of the framing (`"extreme-closeup"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::Full => "full",
            Framing::Cowboy => "cowboy",
            Framing::Medium => "medium",
            Framing::Closeup => "closeup",
            Framing::ExtremeCloseup => "extreme-closeup",
        }
    }

    /// Parse a wire name, returning `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "full" => Some(Framing::Full),
            "cowboy" => Some(Framing::Cowboy),
            "medium" => Some(Framing::Medium),
            "closeup" => Some(Framing::Closeup),
            "extreme-closeup" => Some(Framing::ExtremeCloseup),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ShotStatus / ShotState
// ---------------------------------------------------------------------------

/// Payload-free view of a shot's lifecycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotStatus {
    Pending,
    Generating,
    Complete,
    Error,
}

impl ShotStatus {
    /// Whether the status is terminal for the current run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShotStatus::Complete | ShotStatus::Error)
    }
}

/// Lifecycle state with the terminal payload attached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShotState {
    #[default]
    Pending,
    Generating,
    Complete { image_url: String },
    Error { message: String },
}

// ---------------------------------------------------------------------------
// Shot
// ---------------------------------------------------------------------------

/// One planned camera setup in a sequence.
///
/// Deserialised shots go through the same normalisation as [`Shot::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ShotRecord")]
pub struct Shot {
    id: ShotId,
    pub name: String,
    camera_angle: u16,
    camera_height: i32,
    fov: u32,
    pub framing: Framing,
    pub instructions: String,
    #[serde(flatten)]
    state: ShotState,
}

/// Wire form of [`Shot`], before angle, height and lens are normalised.
#[derive(Deserialize)]
struct ShotRecord {
    id: ShotId,
    name: String,
    camera_angle: i64,
    camera_height: i32,
    fov: u32,
    #[serde(default)]
    framing: Framing,
    #[serde(default)]
    instructions: String,
    #[serde(flatten)]
    state: ShotState,
}

impl From<ShotRecord> for Shot {
    fn from(record: ShotRecord) -> Self {
        Self {
            id: record.id,
            state: record.state,
            ..Shot::new(
                record.name,
                record.camera_angle,
                record.camera_height,
                record.fov,
                record.framing,
                record.instructions,
            )
        }
    }
}

impl Shot {
    /// Create a pending shot with a fresh id.
    ///
    /// The angle is wrapped into `[0, 360)`, the height clamped with the
    /// default [`CameraLimits`], and a zero focal length replaced by
    /// [`DEFAULT_FOV_MM`].
    pub fn new(
        name: impl Into<String>,
        camera_angle: i64,
        camera_height: i32,
        fov: u32,
        framing: Framing,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: ShotId::new_v4(),
            name: name.into(),
            camera_angle: normalize_angle(camera_angle),
            camera_height: CameraLimits::default().clamp_height(camera_height),
            fov: if fov == 0 { DEFAULT_FOV_MM } else { fov },
            framing,
            instructions: instructions.into(),
            state: ShotState::Pending,
        }
    }

    pub fn id(&self) -> ShotId {
        self.id
    }

    /// Camera angle in degrees, always within `[0, 360)`.
    pub fn camera_angle(&self) -> u16 {
        self.camera_angle
    }

    /// Camera height in signed degrees (negative = low angle).
    pub fn camera_height(&self) -> i32 {
        self.camera_height
    }

    /// Focal length in millimetre-equivalent.
    pub fn fov(&self) -> u32 {
        self.fov
    }

    pub fn set_camera_angle(&mut self, angle: i64) {
        self.camera_angle = normalize_angle(angle);
    }

    pub fn set_camera_height(&mut self, height: i32, limits: &CameraLimits) {
        self.camera_height = limits.clamp_height(height);
    }

    /// Set the focal length. Zero is ignored.
    pub fn set_fov(&mut self, fov: u32) {
        if fov > 0 {
            self.fov = fov;
        }
    }

    pub fn state(&self) -> &ShotState {
        &self.state
    }

    pub fn status(&self) -> ShotStatus {
        match self.state {
            ShotState::Pending => ShotStatus::Pending,
            ShotState::Generating => ShotStatus::Generating,
            ShotState::Complete { .. } => ShotStatus::Complete,
            ShotState::Error { .. } => ShotStatus::Error,
        }
    }

    /// Image URL, present only when the shot is complete.
    pub fn image_url(&self) -> Option<&str> {
        match &self.state {
            ShotState::Complete { image_url } => Some(image_url),
            _ => None,
        }
    }

    /// Error message, present only when the shot failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ShotState::Error { message } => Some(message),
            _ => None,
        }
    }

    // -- transitions --

    /// `pending -> generating`. Returns `false` (state untouched) from any
    /// other state.
    pub fn mark_generating(&mut self) -> bool {
        if self.state != ShotState::Pending {
            return false;
        }
        self.state = ShotState::Generating;
        true
    }

    /// `generating -> complete`. Returns `false` (state untouched) from any
    /// other state.
    pub fn mark_complete(&mut self, image_url: impl Into<String>) -> bool {
        if self.state != ShotState::Generating {
            return false;
        }
        self.state = ShotState::Complete {
            image_url: image_url.into(),
        };
        true
    }

    /// `generating -> error`. Returns `false` (state untouched) from any
    /// other state.
    pub fn mark_error(&mut self, message: impl Into<String>) -> bool {
        if self.state != ShotState::Generating {
            return false;
        }
        self.state = ShotState::Error {
            message: message.into(),
        };
        true
    }

    /// Return the shot to `pending`, dropping any previous image or error.
    pub fn reset(&mut self) {
        self.state = ShotState::Pending;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn shot() -> Shot {
        Shot::new("Front", 0, 0, 50, Framing::Full, "")
    }

    // -- construction --

    #[test]
    fn deserialize_normalises_camera() {
        let id = ShotId::new_v4();
        let json = format!(
            r#"{{"id":"{id}","name":"Over","camera_angle":400,"camera_height":90,"fov":0,
                "framing":"full","status":"complete","image_url":"https://x/1.png"}}"#
        );
        let s: Shot = serde_json::from_str(&json).unwrap();
        assert_eq!(s.id(), id);
        assert_eq!(s.camera_angle(), 40);
        assert_eq!(s.camera_height(), DEFAULT_MAX_CAMERA_HEIGHT);
        assert_eq!(s.fov(), DEFAULT_FOV_MM);
        assert_eq!(s.image_url(), Some("https://x/1.png"));
    }

    #[test]
    fn serialized_shot_reads_back_unchanged() {
        let mut s = Shot::new("Back", 180, -20, 35, Framing::Closeup, "arms crossed");
        assert!(s.mark_generating());
        assert!(s.mark_error("timeout"));
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<Shot>(&json).unwrap(), s);
    }

    #[test]
    fn new_wraps_angle() {
        let s = Shot::new("x", 370, 0, 50, Framing::Full, "");
        assert_eq!(s.camera_angle(), 10);
        let s = Shot::new("x", -10, 0, 50, Framing::Full, "");
        assert_eq!(s.camera_angle(), 350);
    }

    #[test]
    fn new_clamps_height() {
        let s = Shot::new("x", 0, 90, 50, Framing::Full, "");
        assert_eq!(s.camera_height(), DEFAULT_MAX_CAMERA_HEIGHT);
        let s = Shot::new("x", 0, -90, 50, Framing::Full, "");
        assert_eq!(s.camera_height(), DEFAULT_MIN_CAMERA_HEIGHT);
    }

    #[test]
    fn new_replaces_zero_fov() {
        let s = Shot::new("x", 0, 0, 0, Framing::Full, "");
        assert_eq!(s.fov(), DEFAULT_FOV_MM);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(shot().id(), shot().id());
    }

    #[test]
    fn framing_orders_wide_to_tight() {
        assert!(Framing::Full < Framing::Cowboy);
        assert!(Framing::Closeup < Framing::ExtremeCloseup);
    }

    #[test]
    fn framing_parse_round_trips_wire_names() {
        for f in [
            Framing::Full,
            Framing::Cowboy,
            Framing::Medium,
            Framing::Closeup,
            Framing::ExtremeCloseup,
        ] {
            assert_eq!(Framing::parse(f.as_str()), Some(f));
        }
        assert_eq!(Framing::parse("wide"), None);
    }

    // -- state machine --

    #[test]
    fn happy_path_to_complete() {
        let mut s = shot();
        assert_eq!(s.status(), ShotStatus::Pending);
        assert!(s.mark_generating());
        assert!(s.mark_complete("https://img/1.png"));
        assert_eq!(s.status(), ShotStatus::Complete);
        assert_eq!(s.image_url(), Some("https://img/1.png"));
        assert_eq!(s.error(), None);
    }

    #[test]
    fn error_path_sets_only_error() {
        let mut s = shot();
        s.mark_generating();
        assert!(s.mark_error("boom"));
        assert_eq!(s.status(), ShotStatus::Error);
        assert_eq!(s.error(), Some("boom"));
        assert_eq!(s.image_url(), None);
    }

    #[test]
    fn cannot_complete_from_pending() {
        let mut s = shot();
        assert!(!s.mark_complete("u"));
        assert_eq!(s.status(), ShotStatus::Pending);
    }

    #[test]
    fn terminal_states_are_sticky_until_reset() {
        let mut s = shot();
        s.mark_generating();
        s.mark_complete("u");
        assert!(!s.mark_error("late"));
        assert!(!s.mark_generating());
        s.reset();
        assert_eq!(s.status(), ShotStatus::Pending);
        assert_eq!(s.image_url(), None);
    }

    #[test]
    fn status_serializes_flat() {
        let mut s = shot();
        s.mark_generating();
        s.mark_complete("u");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["status"], "complete");
        assert_eq!(json["image_url"], "u");
        assert_eq!(json["framing"], "full");
    }
}
