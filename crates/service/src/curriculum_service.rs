use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use edumate_core::{
    Curriculum, CurriculumSummary, StepDetail, UNSPECIFIED_TIME, ValidationError, validate_url,
};
use edumate_ingest::Extractor;
use edumate_llm::{Assistant, WebSearch};
use edumate_storage::Storage;
use edumate_storage::traits::CurriculumStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::deadline::bounded;
use crate::error::ServiceError;

const RESOURCE_RESULTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCurriculum {
    pub subject: String,
    pub syllabus_url: Option<String>,
    pub time_constraint: Option<String>,
}

pub struct CurriculumService {
    storage: Arc<Storage>,
    assistant: Assistant,
    extractor: Extractor,
    search: Arc<dyn WebSearch>,
    timeout: Duration,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl CurriculumService {
    #[must_use]
    pub fn new(
        storage: Arc<Storage>,
        assistant: Assistant,
        extractor: Extractor,
        search: Arc<dyn WebSearch>,
        timeout: Duration,
    ) -> Self {
        Self { storage, assistant, extractor, search, timeout }
    }

    /// Generate and store an outline. A syllabus URL is read when reachable
    /// and otherwise ignored.
    pub async fn generate(&self, request: NewCurriculum, cancel: &CancellationToken) -> Result<Curriculum, ServiceError> {
        let subject = request.subject.trim().to_owned();
        if subject.is_empty() {
            return Err(ValidationError::Empty { field: "subject" }.into());
        }
        let syllabus_url = non_blank(request.syllabus_url);
        if let Some(url) = &syllabus_url {
            validate_url(url)?;
        }
        let time_constraint = non_blank(request.time_constraint);

        bounded("curriculum generation", self.timeout, cancel, async {
            let syllabus = match &syllabus_url {
                Some(url) => match self.extractor.fetch_text(url).await {
                    Ok((_, text)) => Some(text),
                    Err(e) => {
                        warn!(url, error = %e, "Syllabus unavailable, generating without it");
                        None
                    },
                },
                None => None,
            };
            let outline = self
                .assistant
                .outline_curriculum(&subject, time_constraint.as_deref(), syllabus.as_deref())
                .await?;
            let now = Utc::now();
            let curriculum = Curriculum {
                id: uuid::Uuid::new_v4().to_string(),
                title: outline.title,
                subject: subject.clone(),
                overview: outline.overview,
                total_time: outline.total_time,
                steps: outline.steps,
                detailed_steps: BTreeMap::new(),
                revision: 0,
                syllabus_url: syllabus_url.clone(),
                time_constraint: time_constraint.clone(),
                created_at: now,
                updated_at: now,
            };
            self.storage.save_curriculum(&curriculum).await?;
            info!(curriculum_id = %curriculum.id, steps = curriculum.steps.len(), "Curriculum generated");
            Ok(curriculum)
        })
        .await
    }

    /// Store an empty draft to be filled in later.
    pub async fn create_empty(&self, name: &str) -> Result<Curriculum, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "curriculum_name" }.into());
        }
        let now = Utc::now();
        let curriculum = Curriculum {
            id: uuid::Uuid::new_v4().to_string(),
            title: name.to_owned(),
            subject: name.to_owned(),
            overview: String::new(),
            total_time: UNSPECIFIED_TIME.to_owned(),
            steps: Vec::new(),
            detailed_steps: BTreeMap::new(),
            revision: 0,
            syllabus_url: None,
            time_constraint: None,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_curriculum(&curriculum).await?;
        Ok(curriculum)
    }

    pub async fn get(&self, id: &str) -> Result<Curriculum, ServiceError> {
        self.storage.get_curriculum(id).await?.ok_or_else(|| ServiceError::not_found("curriculum", id))
    }

    pub async fn list(&self) -> Result<Vec<CurriculumSummary>, ServiceError> {
        Ok(self.storage.list_curricula().await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if self.storage.delete_curriculum(id).await? {
            info!(curriculum_id = %id, "Curriculum deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("curriculum", id))
        }
    }

    /// Regenerate the outline from instructions. Every stored detail is
    /// dropped and the revision moves forward.
    pub async fn modify(&self, id: &str, instructions: &str, cancel: &CancellationToken) -> Result<Curriculum, ServiceError> {
        let instructions = instructions.trim();
        if instructions.is_empty() {
            return Err(ValidationError::Empty { field: "modification_text" }.into());
        }
        let current = self.get(id).await?;
        bounded("curriculum modification", self.timeout, cancel, async {
            let outline = self.assistant.modify_outline(&current, instructions).await?;
            let revision = self.storage.replace_outline(id, current.revision, &outline).await?;
            info!(curriculum_id = %id, revision, steps = outline.steps.len(), "Curriculum modified");
            self.get(id).await
        })
        .await
    }

    /// Generate every missing step detail and return the complete map for
    /// the current outline. Failed steps are logged and left missing.
    pub async fn generate_details(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<usize, StepDetail>, ServiceError> {
        let curriculum = self.get(id).await?;
        bounded("step detail generation", self.timeout, cancel, async {
            for index in curriculum.missing_detail_indices() {
                let detail = match self.generate_step(&curriculum, index).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        warn!(curriculum_id = %id, step = index, error = %e, "Step detail generation failed");
                        continue;
                    },
                };
                self.store_detail(&curriculum, index, &detail).await?;
            }
            let refreshed = self.get(id).await?;
            if refreshed.revision != curriculum.revision {
                return Err(stale(id));
            }
            Ok(refreshed.detailed_steps)
        })
        .await
    }

    /// Stored detail for one step, generated on first request.
    pub async fn step_detail(
        &self,
        id: &str,
        index: usize,
        cancel: &CancellationToken,
    ) -> Result<StepDetail, ServiceError> {
        let curriculum = self.get(id).await?;
        if index >= curriculum.steps.len() {
            return Err(ServiceError::not_found("curriculum step", format!("{id}/{index}")));
        }
        if let Some(detail) = curriculum.detailed_steps.get(&index) {
            return Ok(detail.clone());
        }
        bounded("step detail generation", self.timeout, cancel, async {
            let detail = self.generate_step(&curriculum, index).await?;
            self.store_detail(&curriculum, index, &detail).await
        })
        .await
    }

    /// Mermaid flowchart of the outline.
    pub async fn roadmap(&self, id: &str) -> Result<String, ServiceError> {
        Ok(self.get(id).await?.roadmap())
    }

    async fn generate_step(&self, curriculum: &Curriculum, index: usize) -> Result<StepDetail, ServiceError> {
        let step = curriculum
            .steps
            .get(index)
            .ok_or_else(|| ServiceError::not_found("curriculum step", format!("{}/{index}", curriculum.id)))?;
        let previous = index.checked_sub(1).and_then(|i| curriculum.steps.get(i));
        let next = curriculum.steps.get(index + 1);
        let query = format!("{} learning resources tutorial {}", step.title, curriculum.subject);
        let resources = self.search.search(&query, RESOURCE_RESULTS).await.unwrap_or_else(|e| {
            warn!(curriculum_id = %curriculum.id, step = index, error = %e, "Resource search failed");
            Vec::new()
        });
        Ok(self.assistant.step_detail(&curriculum.subject, step, (previous, next), &resources).await?)
    }

    /// Write a detail against the revision it was generated for and return
    /// the detail that ends up stored for the index.
    async fn store_detail(
        &self,
        curriculum: &Curriculum,
        index: usize,
        detail: &StepDetail,
    ) -> Result<StepDetail, ServiceError> {
        self.storage
            .save_step_detail(&curriculum.id, curriculum.revision, index, detail)
            .await?
            .ok_or_else(|| stale(&curriculum.id))
    }
}

fn stale(id: &str) -> ServiceError {
    ServiceError::Conflict(format!("curriculum {id} was modified while step details were being generated"))
}
