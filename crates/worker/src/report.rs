//! JSON report printed at the end of a job.

use chrono::{DateTime, Utc};
use serde::Serialize;
use turnaround_core::consistency::{ConsistencyLabel, ConsistencyReport};
use turnaround_core::regeneration::RegenerationAdvice;
use turnaround_core::types::Seed;
use turnaround_core::{Shot, ShotStatus};
use turnaround_pipeline::regenerate::RegenerationOutcome;

/// Final state of one shot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotReport {
    pub index: usize,
    pub name: String,
    pub angle: u16,
    pub status: ShotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShotReport {
    pub fn from_shot(index: usize, shot: &Shot) -> Self {
        Self {
            index,
            name: shot.name.clone(),
            angle: shot.camera_angle(),
            status: shot.status(),
            image_url: shot.image_url().map(str::to_string),
            error: shot.error().map(str::to_string),
        }
    }
}

/// Consistency section, present when the job asked for scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencySection {
    pub label: ConsistencyLabel,
    pub report: ConsistencyReport,
    pub advice: RegenerationAdvice,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub provider: String,
    pub seed: Seed,
    pub succeeded: usize,
    pub total: usize,
    pub shots: Vec<ShotReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencySection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regenerations: Vec<RegenerationOutcome>,
    /// Improvement hints for the description.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub description_hints: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnaround_core::Framing;

    #[test]
    fn shot_report_reflects_state() {
        let mut shot = Shot::new("Back", 180, 0, 50, Framing::Full, "");
        shot.mark_generating();
        shot.mark_complete("https://example.com/back.png");

        let report = ShotReport::from_shot(1, &shot);
        assert_eq!(report.status, ShotStatus::Complete);
        assert_eq!(report.image_url.as_deref(), Some("https://example.com/back.png"));
        assert!(report.error.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "complete");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failed_shot_keeps_message() {
        let mut shot = Shot::new("Side", 90, 0, 50, Framing::Full, "");
        shot.mark_generating();
        shot.mark_error("timeout");

        let report = ShotReport::from_shot(2, &shot);
        assert_eq!(report.status, ShotStatus::Error);
        assert_eq!(report.error.as_deref(), Some("timeout"));
        assert!(report.image_url.is_none());
    }
}
