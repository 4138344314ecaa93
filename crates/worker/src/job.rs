//! Job files: a JSON description of one sequence to generate.
//!
//! ```json
//! {
//!   "description": "a red ceramic mug with a chipped handle",
//!   "style": { "style": "product", "lighting_type": "studio" },
//!   "template": "product-360",
//!   "seed": 4242,
//!   "score": true,
//!   "auto_regenerate": true
//! }
//! ```
//!
//! Either `template` or an explicit `shots` list must be given, not both.

use std::path::Path;

use serde::Deserialize;
use turnaround_core::shot::DEFAULT_FOV_MM;
use turnaround_core::templates::ShotTemplate;
use turnaround_core::types::Seed;
use turnaround_core::{Framing, ProjectSnapshot, Shot, StyleSettings};

use crate::error::WorkerError;

/// One explicitly listed shot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShotSpec {
    pub name: String,
    pub angle: i64,
    #[serde(default)]
    pub height: i32,
    #[serde(default = "default_fov")]
    pub fov: u32,
    #[serde(default)]
    pub framing: Framing,
    #[serde(default)]
    pub instructions: String,
}

fn default_fov() -> u32 {
    DEFAULT_FOV_MM
}

fn default_true() -> bool {
    true
}

impl ShotSpec {
    fn to_shot(&self) -> Shot {
        Shot::new(
            self.name.clone(),
            self.angle,
            self.height,
            self.fov,
            self.framing,
            self.instructions.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobSpec {
    pub description: String,
    #[serde(default)]
    pub style: StyleSettings,
    #[serde(default)]
    pub shots: Vec<ShotSpec>,
    #[serde(default)]
    pub template: Option<ShotTemplate>,
    #[serde(default)]
    pub seed: Option<Seed>,
    /// Append style boosters and subject hints to the description first.
    #[serde(default)]
    pub enhance: bool,
    #[serde(default = "default_true")]
    pub score: bool,
    /// Re-issue shots the advisor flags. Implies scoring.
    #[serde(default)]
    pub auto_regenerate: bool,
}

impl JobSpec {
    pub fn from_json(json: &str) -> Result<Self, WorkerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| WorkerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn project(&self) -> ProjectSnapshot {
        ProjectSnapshot::new(self.description.clone(), self.style.clone())
    }

    /// Fresh pending shots from the template or the explicit list.
    pub fn shots(&self) -> Result<Vec<Shot>, WorkerError> {
        match (&self.template, self.shots.is_empty()) {
            (Some(_), false) => Err(WorkerError::Job(
                "Specify either a template or a shot list, not both".to_string(),
            )),
            (Some(template), true) => Ok(template.shots()),
            (None, false) => Ok(self.shots.iter().map(ShotSpec::to_shot).collect()),
            (None, true) => Err(WorkerError::Job(
                "Job needs a template or at least one shot".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn template_job_defaults() {
        let job = JobSpec::from_json(
            r#"{"description": "a red ceramic mug", "template": "character-turnaround"}"#,
        )
        .unwrap();
        assert!(job.score);
        assert!(!job.auto_regenerate);
        assert!(!job.enhance);
        assert_eq!(job.style, StyleSettings::default());
        assert_eq!(job.shots().unwrap().len(), 5);
    }

    #[test]
    fn explicit_shots_fill_defaults() {
        let job = JobSpec::from_json(
            r#"{
                "description": "a red ceramic mug",
                "shots": [{"name": "Back", "angle": -180}]
            }"#,
        )
        .unwrap();
        let shots = job.shots().unwrap();
        assert_eq!(shots[0].camera_angle(), 180);
        assert_eq!(shots[0].fov(), DEFAULT_FOV_MM);
        assert_eq!(shots[0].framing, Framing::default());
    }

    #[test]
    fn template_and_shots_conflict() {
        let job = JobSpec::from_json(
            r#"{
                "description": "a red ceramic mug",
                "template": "storyboard",
                "shots": [{"name": "Front", "angle": 0}]
            }"#,
        )
        .unwrap();
        assert_matches!(job.shots(), Err(WorkerError::Job(_)));
    }

    #[test]
    fn empty_job_is_rejected() {
        let job = JobSpec::from_json(r#"{"description": "a red ceramic mug"}"#).unwrap();
        assert_matches!(job.shots(), Err(WorkerError::Job(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert_matches!(JobSpec::from_json("{"), Err(WorkerError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = JobSpec::load(dir.path().join("nope.json"));
        assert_matches!(result, Err(WorkerError::Io { .. }));
    }
}
