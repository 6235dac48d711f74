use std::collections::BTreeMap;

use async_trait::async_trait;
use edumate_core::{
    Curriculum, CurriculumOutline, CurriculumState, CurriculumStep, CurriculumSummary, StepDetail,
};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::{Storage, format_time, now_rfc3339, parse_json, parse_time};
use crate::error::StorageError;
use crate::traits::CurriculumStore;

fn not_found(id: &str) -> StorageError {
    StorageError::NotFound { entity: "curriculum", id: id.to_owned() }
}

fn insert(conn: &Connection, c: &Curriculum) -> Result<(), StorageError> {
    let steps_json = serde_json::to_string(&c.steps)?;
    conn.execute(
        "INSERT INTO curricula
           (id, title, subject, overview, total_time, steps_json, revision,
            syllabus_url, time_constraint, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            c.id,
            c.title,
            c.subject,
            c.overview,
            c.total_time,
            steps_json,
            c.revision,
            c.syllabus_url,
            c.time_constraint,
            format_time(&c.created_at),
            format_time(&c.updated_at),
        ],
    )?;
    Ok(())
}

fn load(conn: &Connection, id: &str) -> Result<Option<Curriculum>, StorageError> {
    let curriculum = conn
        .query_row(
            "SELECT id, title, subject, overview, total_time, steps_json, revision,
                    syllabus_url, time_constraint, created_at, updated_at
               FROM curricula WHERE id = ?1",
            params![id],
            |row| {
                Ok(Curriculum {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    subject: row.get(2)?,
                    overview: row.get(3)?,
                    total_time: row.get(4)?,
                    steps: parse_json(&row.get::<_, String>(5)?)?,
                    detailed_steps: BTreeMap::new(),
                    revision: row.get(6)?,
                    syllabus_url: row.get(7)?,
                    time_constraint: row.get(8)?,
                    created_at: parse_time(&row.get::<_, String>(9)?)?,
                    updated_at: parse_time(&row.get::<_, String>(10)?)?,
                })
            },
        )
        .optional()?;
    let Some(mut curriculum) = curriculum else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT step_index, detail_json FROM curriculum_step_details
          WHERE curriculum_id = ?1 AND revision = ?2 ORDER BY step_index",
    )?;
    curriculum.detailed_steps = stmt
        .query_map(params![id, curriculum.revision], |row| {
            Ok((row.get::<_, i64>(0)? as usize, parse_json::<StepDetail>(&row.get::<_, String>(1)?)?))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(Some(curriculum))
}

fn list(conn: &Connection) -> Result<Vec<CurriculumSummary>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.title, c.steps_json, c.updated_at,
                (SELECT COUNT(*) FROM curriculum_step_details d
                  WHERE d.curriculum_id = c.id AND d.revision = c.revision)
           FROM curricula c
          ORDER BY c.updated_at DESC, c.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let steps: Vec<CurriculumStep> = parse_json(&row.get::<_, String>(2)?)?;
            let detailed = row.get::<_, i64>(4)? as usize;
            Ok(CurriculumSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                state: CurriculumState::from_counts(steps.len(), detailed),
                updated_at: parse_time(&row.get::<_, String>(3)?)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn current_revision(conn: &Connection, id: &str) -> Result<Option<(u32, usize)>, StorageError> {
    let row = conn
        .query_row(
            "SELECT revision, steps_json FROM curricula WHERE id = ?1",
            params![id],
            |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;
    row.map(|(revision, steps_json)| {
        let steps: Vec<CurriculumStep> = serde_json::from_str(&steps_json)?;
        Ok::<_, StorageError>((revision, steps.len()))
    })
    .transpose()
}

fn replace_outline(
    conn: &mut Connection,
    id: &str,
    expected_revision: u32,
    outline: &CurriculumOutline,
) -> Result<u32, StorageError> {
    let steps_json = serde_json::to_string(&outline.steps)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let (revision, _) = current_revision(&tx, id)?.ok_or_else(|| not_found(id))?;
    if revision != expected_revision {
        return Err(StorageError::Conflict(format!(
            "curriculum {id} is at revision {revision}, expected {expected_revision}"
        )));
    }
    let next = revision.saturating_add(1);
    tx.execute(
        "UPDATE curricula
            SET title = ?1, overview = ?2, total_time = ?3, steps_json = ?4,
                revision = ?5, updated_at = ?6
          WHERE id = ?7",
        params![outline.title, outline.overview, outline.total_time, steps_json, next, now_rfc3339(), id],
    )?;
    tx.execute("DELETE FROM curriculum_step_details WHERE curriculum_id = ?1", params![id])?;
    tx.commit()?;
    Ok(next)
}

fn save_detail(
    conn: &mut Connection,
    id: &str,
    revision: u32,
    step_index: usize,
    detail: &StepDetail,
) -> Result<Option<StepDetail>, StorageError> {
    let detail_json = serde_json::to_string(detail)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let (current, step_count) = current_revision(&tx, id)?.ok_or_else(|| not_found(id))?;
    if current != revision || step_index >= step_count {
        tracing::debug!(
            curriculum_id = %id,
            revision,
            current,
            step_index,
            "Discarding step detail generated for a stale outline"
        );
        return Ok(None);
    }
    let stored: Option<String> = tx
        .query_row(
            "SELECT detail_json FROM curriculum_step_details
              WHERE curriculum_id = ?1 AND step_index = ?2 AND revision = ?3",
            params![id, step_index as i64, revision],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(stored) = stored {
        tracing::debug!(curriculum_id = %id, step_index, "Step detail already stored, keeping the first");
        return Ok(Some(serde_json::from_str(&stored)?));
    }
    let now = now_rfc3339();
    tx.execute(
        "INSERT INTO curriculum_step_details (curriculum_id, step_index, revision, detail_json, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(curriculum_id, step_index)
           DO UPDATE SET revision = excluded.revision, detail_json = excluded.detail_json,
                         created_at = excluded.created_at",
        params![id, step_index as i64, revision, detail_json, now],
    )?;
    tx.execute("UPDATE curricula SET updated_at = ?1 WHERE id = ?2", params![now, id])?;
    tx.commit()?;
    Ok(Some(detail.clone()))
}

#[async_trait]
impl CurriculumStore for Storage {
    async fn save_curriculum(&self, curriculum: &Curriculum) -> Result<(), StorageError> {
        let curriculum = curriculum.clone();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            insert(&tx, &curriculum)?;
            for (index, detail) in &curriculum.detailed_steps {
                tx.execute(
                    "INSERT INTO curriculum_step_details
                       (curriculum_id, step_index, revision, detail_json, created_at)
                       VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        curriculum.id,
                        *index as i64,
                        curriculum.revision,
                        serde_json::to_string(detail)?,
                        now_rfc3339()
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_curriculum(&self, id: &str) -> Result<Option<Curriculum>, StorageError> {
        let id = id.to_owned();
        self.run(move |conn| load(conn, &id)).await
    }

    async fn list_curricula(&self) -> Result<Vec<CurriculumSummary>, StorageError> {
        self.run(|conn| list(conn)).await
    }

    async fn delete_curriculum(&self, id: &str) -> Result<bool, StorageError> {
        let id = id.to_owned();
        self.run(move |conn| {
            let deleted = conn.execute("DELETE FROM curricula WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn replace_outline(
        &self,
        id: &str,
        expected_revision: u32,
        outline: &CurriculumOutline,
    ) -> Result<u32, StorageError> {
        let id = id.to_owned();
        let outline = outline.clone();
        self.run(move |conn| replace_outline(conn, &id, expected_revision, &outline)).await
    }

    async fn save_step_detail(
        &self,
        id: &str,
        revision: u32,
        step_index: usize,
        detail: &StepDetail,
    ) -> Result<Option<StepDetail>, StorageError> {
        let id = id.to_owned();
        let detail = detail.clone();
        self.run(move |conn| save_detail(conn, &id, revision, step_index, &detail)).await
    }
}
