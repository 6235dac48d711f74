use async_trait::async_trait;
use edumate_core::{Curriculum, CurriculumOutline, CurriculumSummary, StepDetail};

use crate::error::StorageError;

/// Curriculum outlines and per-step details.
#[async_trait]
pub trait CurriculumStore: Send + Sync {
    async fn save_curriculum(&self, curriculum: &Curriculum) -> Result<(), StorageError>;

    /// Curriculum with the details stored for its current revision.
    async fn get_curriculum(&self, id: &str) -> Result<Option<Curriculum>, StorageError>;

    async fn list_curricula(&self) -> Result<Vec<CurriculumSummary>, StorageError>;

    async fn delete_curriculum(&self, id: &str) -> Result<bool, StorageError>;

    /// Replace overview and steps if the stored revision still equals
    /// `expected_revision`. Drops all details and returns the new revision.
    async fn replace_outline(
        &self,
        id: &str,
        expected_revision: u32,
        outline: &CurriculumOutline,
    ) -> Result<u32, StorageError>;

    /// Store a detail generated against `revision` and return the detail
    /// now held for the index. An index that already has a detail for this
    /// revision keeps it, and that stored detail is returned instead.
    ///
    /// Returns `None` without writing when the curriculum has moved to a
    /// newer revision or the index no longer exists.
    async fn save_step_detail(
        &self,
        id: &str,
        revision: u32,
        step_index: usize,
        detail: &StepDetail,
    ) -> Result<Option<StepDetail>, StorageError>;
}
