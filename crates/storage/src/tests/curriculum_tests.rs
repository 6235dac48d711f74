#![expect(clippy::unwrap_used, reason = "test code")]

use std::collections::BTreeMap;

use chrono::Utc;
use edumate_core::{Curriculum, CurriculumOutline, CurriculumState, CurriculumStep, StepDetail};

use super::create_test_storage;
use crate::traits::CurriculumStore;

fn step(title: &str) -> CurriculumStep {
    CurriculumStep { title: title.to_owned(), estimated_time: "1 week".to_owned() }
}

fn curriculum(id: &str, steps: Vec<CurriculumStep>) -> Curriculum {
    let now = Utc::now();
    Curriculum {
        id: id.to_owned(),
        title: "Algebra".to_owned(),
        subject: "Mathematics".to_owned(),
        overview: "Foundations of algebra.".to_owned(),
        total_time: "3 weeks".to_owned(),
        steps,
        detailed_steps: BTreeMap::new(),
        revision: 0,
        syllabus_url: None,
        time_constraint: Some("3 weeks".to_owned()),
        created_at: now,
        updated_at: now,
    }
}

fn detail(title: &str) -> StepDetail {
    StepDetail {
        step_title: title.to_owned(),
        estimated_time: "1 week".to_owned(),
        learning_objectives: vec![format!("Understand {title}")],
        ..StepDetail::default()
    }
}

#[tokio::test]
async fn save_and_load_curriculum() {
    let (storage, _dir) = create_test_storage();
    let c = curriculum("c1", vec![step("Variables"), step("Equations")]);

    storage.save_curriculum(&c).await.unwrap();

    let loaded = storage.get_curriculum("c1").await.unwrap().unwrap();
    assert_eq!(loaded.steps, c.steps);
    assert_eq!(loaded.time_constraint.as_deref(), Some("3 weeks"));
    assert_eq!(loaded.state(), CurriculumState::Outlined);
    assert!(storage.get_curriculum("c2").await.unwrap().is_none());
}

#[tokio::test]
async fn step_detail_is_stored_for_current_revision() {
    let (storage, _dir) = create_test_storage();
    storage.save_curriculum(&curriculum("c1", vec![step("Variables"), step("Equations")])).await.unwrap();

    let written = storage.save_step_detail("c1", 0, 1, &detail("Equations")).await.unwrap();

    assert_eq!(written, Some(detail("Equations")));
    let loaded = storage.get_curriculum("c1").await.unwrap().unwrap();
    assert_eq!(loaded.detailed_steps.len(), 1);
    assert_eq!(loaded.detailed_steps[&1].step_title, "Equations");
    assert_eq!(loaded.state(), CurriculumState::PartiallyDetailed);
}

#[tokio::test]
async fn second_detail_for_an_index_keeps_the_first() {
    let (storage, _dir) = create_test_storage();
    storage.save_curriculum(&curriculum("c1", vec![step("Variables")])).await.unwrap();

    let first = storage.save_step_detail("c1", 0, 0, &detail("Variables")).await.unwrap();
    let second = storage.save_step_detail("c1", 0, 0, &detail("Rewritten")).await.unwrap();

    assert_eq!(first, Some(detail("Variables")));
    assert_eq!(second, first);
    let loaded = storage.get_curriculum("c1").await.unwrap().unwrap();
    assert_eq!(loaded.detailed_steps[&0].step_title, "Variables");
}

#[tokio::test]
async fn out_of_range_step_detail_is_discarded() {
    let (storage, _dir) = create_test_storage();
    storage.save_curriculum(&curriculum("c1", vec![step("Variables")])).await.unwrap();

    assert_eq!(storage.save_step_detail("c1", 0, 5, &detail("Ghost")).await.unwrap(), None);
}

#[tokio::test]
async fn modification_bumps_revision_and_drops_details() {
    let (storage, _dir) = create_test_storage();
    storage.save_curriculum(&curriculum("c1", vec![step("Variables"), step("Equations")])).await.unwrap();
    storage.save_step_detail("c1", 0, 0, &detail("Variables")).await.unwrap();
    let outline = CurriculumOutline {
        title: "Algebra II".to_owned(),
        overview: "Harder algebra.".to_owned(),
        total_time: "3 weeks".to_owned(),
        steps: vec![step("Polynomials"), step("Factoring"), step("Quadratics")],
    };

    let revision = storage.replace_outline("c1", 0, &outline).await.unwrap();

    assert_eq!(revision, 1);
    let loaded = storage.get_curriculum("c1").await.unwrap().unwrap();
    assert_eq!(loaded.title, "Algebra II");
    assert_eq!(loaded.steps.len(), 3);
    assert!(loaded.detailed_steps.is_empty());
    assert_eq!(loaded.revision, 1);
}

#[tokio::test]
async fn detail_generated_before_modification_is_rejected() {
    let (storage, _dir) = create_test_storage();
    storage.save_curriculum(&curriculum("c1", vec![step("Variables"), step("Equations")])).await.unwrap();
    let outline = CurriculumOutline {
        title: "Algebra".to_owned(),
        overview: "Changed.".to_owned(),
        total_time: "2 weeks".to_owned(),
        steps: vec![step("Sets")],
    };
    storage.replace_outline("c1", 0, &outline).await.unwrap();

    let written = storage.save_step_detail("c1", 0, 0, &detail("Variables")).await.unwrap();

    assert_eq!(written, None);
    let loaded = storage.get_curriculum("c1").await.unwrap().unwrap();
    assert!(loaded.detailed_steps.is_empty());
}

#[tokio::test]
async fn stale_outline_replacement_conflicts() {
    let (storage, _dir) = create_test_storage();
    storage.save_curriculum(&curriculum("c1", vec![step("Variables")])).await.unwrap();
    let outline = CurriculumOutline {
        title: "t".to_owned(),
        overview: "o".to_owned(),
        total_time: "1 week".to_owned(),
        steps: vec![],
    };
    storage.replace_outline("c1", 0, &outline).await.unwrap();

    let err = storage.replace_outline("c1", 0, &outline).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(storage.replace_outline("zzz", 0, &outline).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn list_reports_state_and_delete_removes() {
    let (storage, _dir) = create_test_storage();
    storage.save_curriculum(&curriculum("draft", vec![])).await.unwrap();
    storage.save_curriculum(&curriculum("full", vec![step("Only")])).await.unwrap();
    storage.save_step_detail("full", 0, 0, &detail("Only")).await.unwrap();

    let list = storage.list_curricula().await.unwrap();
    let state_of = |id: &str| list.iter().find(|c| c.id == id).map(|c| c.state);
    assert_eq!(state_of("draft"), Some(CurriculumState::Draft));
    assert_eq!(state_of("full"), Some(CurriculumState::FullyDetailed));

    assert!(storage.delete_curriculum("full").await.unwrap());
    assert!(!storage.delete_curriculum("full").await.unwrap());
    assert_eq!(storage.list_curricula().await.unwrap().len(), 1);
}
