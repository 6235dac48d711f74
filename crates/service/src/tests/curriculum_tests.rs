#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::atomic::Ordering;

use edumate_core::CurriculumState;
use tokio_util::sync::CancellationToken;

use super::harness;
use crate::{NewCurriculum, ServiceError};

fn linear_algebra() -> NewCurriculum {
    NewCurriculum { subject: "Linear Algebra".to_owned(), ..NewCurriculum::default() }
}

#[tokio::test]
async fn generate_then_detail_every_step() {
    let h = harness();
    let cancel = CancellationToken::new();
    let curriculum = h.services.curricula.generate(linear_algebra(), &cancel).await.unwrap();
    assert_eq!(curriculum.steps.len(), 3);
    assert_eq!(curriculum.state(), CurriculumState::Outlined);
    assert_eq!(curriculum.total_time, "Not specified");

    let details = h.services.curricula.generate_details(&curriculum.id, &cancel).await.unwrap();
    assert_eq!(details.len(), 3);
    assert_eq!(details[&1].step_title, "Matrices");
    assert_eq!(details[&1].estimated_time, "2 weeks");

    let stored = h.services.curricula.get(&curriculum.id).await.unwrap();
    assert_eq!(stored.state(), CurriculumState::FullyDetailed);
    assert!(h.services.curricula.roadmap(&curriculum.id).await.unwrap().contains("Eigenvalues"));
}

#[tokio::test]
async fn modification_discards_old_details() {
    let h = harness();
    let cancel = CancellationToken::new();
    let curriculum = h.services.curricula.generate(linear_algebra(), &cancel).await.unwrap();
    h.services.curricula.generate_details(&curriculum.id, &cancel).await.unwrap();

    let modified = h.services.curricula.modify(&curriculum.id, "Make it two weeks", &cancel).await.unwrap();
    assert_eq!(modified.steps.len(), 2);
    assert_eq!(modified.revision, curriculum.revision + 1);
    assert!(modified.detailed_steps.is_empty());
    assert_eq!(modified.overview, curriculum.overview);

    let details = h.services.curricula.generate_details(&curriculum.id, &cancel).await.unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[&0].step_title, "Vectors and Matrices");
}

#[tokio::test]
async fn single_step_is_generated_once() {
    let h = harness();
    let cancel = CancellationToken::new();
    let curriculum = h.services.curricula.generate(linear_algebra(), &cancel).await.unwrap();

    let first = h.services.curricula.step_detail(&curriculum.id, 0, &cancel).await.unwrap();
    let again = h.services.curricula.step_detail(&curriculum.id, 0, &cancel).await.unwrap();
    assert_eq!(first, again);
    assert_eq!(h.services.curricula.get(&curriculum.id).await.unwrap().detailed_steps.len(), 1);

    let err = h.services.curricula.step_detail(&curriculum.id, 7, &cancel).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_requests_for_one_step_agree_on_the_first_detail() {
    let h = harness();
    let cancel = CancellationToken::new();
    let curriculum = h.services.curricula.generate(linear_algebra(), &cancel).await.unwrap();

    let (a, b) = tokio::join!(
        h.services.curricula.step_detail(&curriculum.id, 1, &cancel),
        h.services.curricula.step_detail(&curriculum.id, 1, &cancel),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(h.model.details.load(Ordering::SeqCst) >= 1);
    assert_eq!(a, b);
    let stored = h.services.curricula.get(&curriculum.id).await.unwrap();
    assert_eq!(stored.detailed_steps.len(), 1);
    assert_eq!(stored.detailed_steps[&1], a);
}

#[tokio::test]
async fn unreachable_syllabus_is_ignored() {
    let h = harness();
    let request = NewCurriculum {
        syllabus_url: Some("https://example.com/missing-syllabus".to_owned()),
        time_constraint: Some("6 weeks".to_owned()),
        ..linear_algebra()
    };
    let curriculum = h.services.curricula.generate(request, &CancellationToken::new()).await.unwrap();
    assert_eq!(curriculum.total_time, "6 weeks");
    assert_eq!(curriculum.syllabus_url.as_deref(), Some("https://example.com/missing-syllabus"));
}

#[tokio::test]
async fn invalid_input_and_missing_curricula() {
    let h = harness();
    let cancel = CancellationToken::new();
    let blank = NewCurriculum { subject: " ".to_owned(), ..NewCurriculum::default() };
    assert!(matches!(h.services.curricula.generate(blank, &cancel).await, Err(ServiceError::Validation(_))));
    let bad_url = NewCurriculum { syllabus_url: Some("ftp://x".to_owned()), ..linear_algebra() };
    assert!(matches!(h.services.curricula.generate(bad_url, &cancel).await, Err(ServiceError::Validation(_))));

    assert!(h.services.curricula.get("missing").await.unwrap_err().is_not_found());
    assert!(h.services.curricula.delete("missing").await.unwrap_err().is_not_found());
    assert!(h.services.curricula.modify("missing", "shorter", &cancel).await.unwrap_err().is_not_found());

    let empty = h.services.curricula.create_empty("Draft plan").await.unwrap();
    assert_eq!(h.services.curricula.list().await.unwrap().len(), 1);
    h.services.curricula.delete(&empty.id).await.unwrap();
    assert!(h.services.curricula.list().await.unwrap().is_empty());
}
