use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SCORE, MIN_SCORE};
use crate::error::ValidationError;

/// A student's file submitted against an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub file_name: String,
    pub submitted_at: DateTime<Utc>,
}

/// Structured feedback produced for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingRecord {
    pub submission_id: String,
    pub score: u8,
    pub remarks: Vec<String>,
    pub suggestions: Vec<String>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    pub graded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A submission with its grading record, if one has been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedSubmission {
    #[serde(flatten)]
    pub submission: Submission,
    pub grading: Option<GradingRecord>,
}

/// Normalized grading content, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GradingFeedback {
    pub score: u8,
    pub remarks: Vec<String>,
    pub suggestions: Vec<String>,
    pub errors: Vec<String>,
    pub student_name: Option<String>,
}

impl GradingFeedback {
    /// Clamp the score and split packed feedback entries into single observations.
    #[must_use]
    pub fn normalized(
        raw_score: f64,
        remarks: &[String],
        suggestions: &[String],
        errors: &[String],
        student_name: Option<String>,
    ) -> Self {
        Self {
            score: clamp_score(raw_score),
            remarks: split_feedback_entries(remarks),
            suggestions: split_feedback_entries(suggestions),
            errors: split_feedback_entries(errors),
            student_name: student_name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
        }
    }
}

/// Round and clamp a model-reported score into the valid range. NaN becomes 0.
#[must_use]
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return MIN_SCORE;
    }
    let clamped = raw.round().clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE));
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped to 0..=100")]
    let score = clamped as u8;
    score
}

/// Accept a manually entered score only when it is already in range.
pub fn validate_score(score: i64) -> Result<u8, ValidationError> {
    u8::try_from(score)
        .ok()
        .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
        .ok_or(ValidationError::ScoreOutOfRange(score))
}

/// Split entries that pack several sentences with the `".,"` delimiter.
///
/// `"Clear intro., Good examples"` becomes `["Clear intro.", "Good examples"]`.
/// Blank pieces are dropped.
#[must_use]
pub fn split_feedback_entries(entries: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for entry in entries {
        let pieces: Vec<&str> = entry.split(".,").collect();
        let last = pieces.len().saturating_sub(1);
        for (i, piece) in pieces.into_iter().enumerate() {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if i < last {
                out.push(format!("{piece}."));
            } else {
                out.push(piece.to_owned());
            }
        }
    }
    out
}
