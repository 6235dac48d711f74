use edumate_core::GradingFeedback;

use crate::ai_types::{GradingJson, Message};
use crate::assistant::Assistant;
use crate::client::truncate;
use crate::error::LlmError;

/// Submissions longer than this are cut before grading.
const MAX_SUBMISSION_BYTES: usize = 60_000;

const GRADING_PROMPT: &str = "You are an experienced teacher grading a student's submission. \
Analyze the paper and return JSON with this structure:
{\"Name\": \"roll number or name of the student if found, otherwise empty string\",
 \"marks\": integer between 0 and 100 reflecting the quality of the work and the number of errors,
 \"remarks\": [positive comments],
 \"suggestions\": [areas to improve],
 \"errors\": [problems found]}
Put one observation per array entry. Use empty arrays instead of null. If no score can be \
determined use 0.";

fn marks_value(value: Option<&serde_json::Value>) -> f64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => {
            let digits: String =
                s.trim().chars().take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-').collect();
            digits.parse().unwrap_or(0.0)
        },
        _ => 0.0,
    }
}

impl Assistant {
    /// Grade extracted submission text into normalized feedback.
    pub async fn grade_submission(&self, text: &str) -> Result<GradingFeedback, LlmError> {
        let body = truncate(text, MAX_SUBMISSION_BYTES);
        let graded: GradingJson = self
            .ask_json(
                "grading",
                vec![Message::system(GRADING_PROMPT), Message::user(format!("Submission:\n{body}"))],
            )
            .await?;
        Ok(GradingFeedback::normalized(
            marks_value(graded.marks.as_ref()),
            &graded.remarks,
            &graded.suggestions,
            &graded.errors,
            graded.name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_accept_numbers_and_strings() {
        assert!((marks_value(Some(&serde_json::json!(87))) - 87.0).abs() < f64::EPSILON);
        assert!((marks_value(Some(&serde_json::json!("72/100"))) - 72.0).abs() < f64::EPSILON);
        assert!(marks_value(Some(&serde_json::json!(null))).abs() < f64::EPSILON);
        assert!(marks_value(None).abs() < f64::EPSILON);
    }
}
