use async_trait::async_trait;
use edumate_core::{GradedSubmission, GradingFeedback, GradingRecord, Submission};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use super::{Storage, now_rfc3339, parse_json, parse_time};
use crate::error::StorageError;
use crate::traits::GradingStore;

const SUBMISSION_COLUMNS: &str = "id, assignment_id, student_id, file_name, submitted_at";
const RECORD_COLUMNS: &str = "submission_id, score, remarks_json, suggestions_json, errors_json,
                              student_name, graded_at, updated_at";

fn row_to_submission(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        assignment_id: row.get(1)?,
        student_id: row.get(2)?,
        file_name: row.get(3)?,
        submitted_at: parse_time(&row.get::<_, String>(4)?)?,
    })
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<GradingRecord> {
    Ok(GradingRecord {
        submission_id: row.get(0)?,
        score: row.get(1)?,
        remarks: parse_json(&row.get::<_, String>(2)?)?,
        suggestions: parse_json(&row.get::<_, String>(3)?)?,
        errors: parse_json(&row.get::<_, String>(4)?)?,
        student_name: row.get(5)?,
        graded_at: parse_time(&row.get::<_, String>(6)?)?,
        updated_at: parse_time(&row.get::<_, String>(7)?)?,
    })
}

fn load_submission(conn: &Connection, id: &str) -> Result<Option<Submission>, StorageError> {
    let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], row_to_submission).optional()?)
}

fn load_record(conn: &Connection, submission_id: &str) -> Result<Option<GradingRecord>, StorageError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM grading_records WHERE submission_id = ?1");
    Ok(conn.query_row(&sql, params![submission_id], row_to_record).optional()?)
}

fn save_grading(
    conn: &mut Connection,
    assignment_id: &str,
    student_id: &str,
    file_name: &str,
    feedback: &GradingFeedback,
) -> Result<(Submission, GradingRecord), StorageError> {
    let remarks = serde_json::to_string(&feedback.remarks)?;
    let suggestions = serde_json::to_string(&feedback.suggestions)?;
    let errors = serde_json::to_string(&feedback.errors)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let now = now_rfc3339();
    let existing: Option<String> = tx
        .query_row(
            "SELECT id FROM submissions WHERE assignment_id = ?1 AND student_id = ?2",
            params![assignment_id, student_id],
            |row| row.get(0),
        )
        .optional()?;
    let submission_id = match existing {
        Some(id) => {
            tx.execute(
                "UPDATE submissions SET file_name = ?1, submitted_at = ?2 WHERE id = ?3",
                params![file_name, now, id],
            )?;
            id
        },
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO submissions (id, assignment_id, student_id, file_name, submitted_at)
                   VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, assignment_id, student_id, file_name, now],
            )?;
            id
        },
    };
    tx.execute(
        "INSERT INTO grading_records
           (submission_id, score, remarks_json, suggestions_json, errors_json,
            student_name, graded_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
           ON CONFLICT(submission_id) DO UPDATE SET
             score = excluded.score,
             remarks_json = excluded.remarks_json,
             suggestions_json = excluded.suggestions_json,
             errors_json = excluded.errors_json,
             student_name = excluded.student_name,
             graded_at = excluded.graded_at,
             updated_at = excluded.updated_at",
        params![submission_id, feedback.score, remarks, suggestions, errors, feedback.student_name, now],
    )?;
    let submission = load_submission(&tx, &submission_id)?.ok_or_else(|| StorageError::NotFound {
        entity: "submission",
        id: submission_id.clone(),
    })?;
    let record = load_record(&tx, &submission_id)?.ok_or_else(|| StorageError::NotFound {
        entity: "grading record",
        id: submission_id.clone(),
    })?;
    tx.commit()?;
    Ok((submission, record))
}

fn update_score(conn: &mut Connection, submission_id: &str, score: u8) -> Result<GradingRecord, StorageError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let updated = tx.execute(
        "UPDATE grading_records SET score = ?1, updated_at = ?2 WHERE submission_id = ?3",
        params![score, now_rfc3339(), submission_id],
    )?;
    if updated == 0 {
        return Err(StorageError::NotFound { entity: "grading record", id: submission_id.to_owned() });
    }
    let record = load_record(&tx, submission_id)?.ok_or_else(|| StorageError::NotFound {
        entity: "grading record",
        id: submission_id.to_owned(),
    })?;
    tx.commit()?;
    Ok(record)
}

fn list_submissions(conn: &Connection, assignment_id: &str) -> Result<Vec<GradedSubmission>, StorageError> {
    let sql = format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE assignment_id = ?1 ORDER BY submitted_at, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let submissions = stmt
        .query_map(params![assignment_id], row_to_submission)?
        .collect::<Result<Vec<_>, _>>()?;
    submissions
        .into_iter()
        .map(|submission| {
            let grading = load_record(conn, &submission.id)?;
            Ok::<_, StorageError>(GradedSubmission { submission, grading })
        })
        .collect()
}

#[async_trait]
impl GradingStore for Storage {
    async fn save_grading(
        &self,
        assignment_id: &str,
        student_id: &str,
        file_name: &str,
        feedback: &GradingFeedback,
    ) -> Result<(Submission, GradingRecord), StorageError> {
        let assignment_id = assignment_id.to_owned();
        let student_id = student_id.to_owned();
        let file_name = file_name.to_owned();
        let feedback = feedback.clone();
        self.run(move |conn| save_grading(conn, &assignment_id, &student_id, &file_name, &feedback))
            .await
    }

    async fn get_grading(&self, submission_id: &str) -> Result<Option<GradingRecord>, StorageError> {
        let submission_id = submission_id.to_owned();
        self.run(move |conn| load_record(conn, &submission_id)).await
    }

    async fn get_submission(&self, submission_id: &str) -> Result<Option<Submission>, StorageError> {
        let submission_id = submission_id.to_owned();
        self.run(move |conn| load_submission(conn, &submission_id)).await
    }

    async fn update_score(&self, submission_id: &str, score: u8) -> Result<GradingRecord, StorageError> {
        let submission_id = submission_id.to_owned();
        self.run(move |conn| update_score(conn, &submission_id, score)).await
    }

    async fn list_submissions(&self, assignment_id: &str) -> Result<Vec<GradedSubmission>, StorageError> {
        let assignment_id = assignment_id.to_owned();
        self.run(move |conn| list_submissions(conn, &assignment_id)).await
    }
}
