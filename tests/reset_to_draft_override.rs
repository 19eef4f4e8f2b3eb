
use serde_json::json;
use test_support::{error_code, request, request_ok, select_workspace, spawn_sidecar};

const MATH: &str = "subj-math-7a";

#[test]
fn reset_requires_explicit_confirmation() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _workspace = select_workspace(&mut stdin, &mut reader, "syllabusd-reset-confirm");

    let refused = request(
        &mut stdin,
        &mut reader,
        "1",
        "syllabus.resetToDraft",
        json!({ "subjectId": MATH }),
    );
    assert_eq!(error_code(&refused), Some("bad_params"));
}

#[test]
fn reset_reopens_even_an_approved_submission() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _workspace = select_workspace(&mut stdin, &mut reader, "syllabusd-reset-approved");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "syllabus.submit",
        json!({ "subjectId": MATH, "declarationAccepted": true }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "syllabus.review",
        json!({ "subjectId": MATH, "action": "approve" }),
    );

    let reset = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "syllabus.resetToDraft",
        json!({ "subjectId": MATH, "confirm": true }),
    );
    assert_eq!(reset["submission"]["status"].as_str(), Some("DRAFT"));
    assert!(reset["submission"]["reviewedAt"].is_null());
    assert!(reset["submission"]["reviewerComment"].is_null());

    // Editing works again.
    let edit = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "progress.set",
        json!({ "subjectId": MATH, "topicId": "subj-math-7a-u2-t2", "status": "COMPLETED" }),
    );
    assert_eq!(edit["written"].as_bool(), Some(true));
}

#[test]
fn reset_clears_a_rejection_comment() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _workspace = select_workspace(&mut stdin, &mut reader, "syllabusd-reset-rejected");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "syllabus.submit",
        json!({ "subjectId": MATH, "declarationAccepted": true }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "syllabus.review",
        json!({ "subjectId": MATH, "action": "reject", "comment": "needs unit 2" }),
    );

    let reset = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "syllabus.resetToDraft",
        json!({ "subjectId": MATH, "confirm": true }),
    );
    assert_eq!(reset["submission"]["status"].as_str(), Some("DRAFT"));
    assert!(reset["submission"]["reviewerComment"].is_null());
}
