#![expect(clippy::unwrap_used, reason = "test code")]

use edumate_core::GradingFeedback;

use super::create_test_storage;
use crate::traits::GradingStore;

fn feedback(score: u8) -> GradingFeedback {
    GradingFeedback {
        score,
        remarks: vec!["Clear structure.".to_owned()],
        suggestions: vec!["Cite sources.".to_owned()],
        errors: vec!["Typo in paragraph 2.".to_owned()],
        student_name: Some("Jordan".to_owned()),
    }
}

#[tokio::test]
async fn save_grading_creates_submission_and_record() {
    let (storage, _dir) = create_test_storage();

    let (submission, record) =
        storage.save_grading("a1", "student-1", "essay.pdf", &feedback(82)).await.unwrap();

    assert_eq!(submission.assignment_id, "a1");
    assert_eq!(record.submission_id, submission.id);
    assert_eq!(record.score, 82);
    assert_eq!(record.errors, vec!["Typo in paragraph 2."]);
    let loaded = storage.get_grading(&submission.id).await.unwrap().unwrap();
    assert_eq!(loaded, record);
}

#[tokio::test]
async fn resubmission_reuses_submission_and_replaces_record() {
    let (storage, _dir) = create_test_storage();
    let (first, _) = storage.save_grading("a1", "student-1", "v1.pdf", &feedback(50)).await.unwrap();

    let (second, record) =
        storage.save_grading("a1", "student-1", "v2.pdf", &feedback(90)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.file_name, "v2.pdf");
    assert_eq!(record.score, 90);
    assert_eq!(storage.list_submissions("a1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_score_changes_only_score() {
    let (storage, _dir) = create_test_storage();
    let (submission, before) =
        storage.save_grading("a1", "student-1", "essay.pdf", &feedback(60)).await.unwrap();

    let after = storage.update_score(&submission.id, 75).await.unwrap();

    assert_eq!(after.score, 75);
    assert_eq!(after.remarks, before.remarks);
    assert_eq!(after.suggestions, before.suggestions);
    assert_eq!(after.errors, before.errors);
    assert_eq!(after.student_name, before.student_name);
    assert_eq!(after.graded_at, before.graded_at);
}

#[tokio::test]
async fn update_score_for_unknown_submission_is_not_found() {
    let (storage, _dir) = create_test_storage();
    let err = storage.update_score("missing", 10).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_submissions_per_assignment() {
    let (storage, _dir) = create_test_storage();
    storage.save_grading("a1", "s1", "x.pdf", &feedback(10)).await.unwrap();
    storage.save_grading("a1", "s2", "y.pdf", &feedback(20)).await.unwrap();
    storage.save_grading("a2", "s1", "z.pdf", &feedback(30)).await.unwrap();

    let listed = storage.list_submissions("a1").await.unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|s| s.grading.is_some()));
    assert!(storage.get_submission(&listed[0].submission.id).await.unwrap().is_some());
}
