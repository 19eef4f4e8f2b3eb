
use serde_json::json;
use test_support::{error_code, request, request_ok, select_workspace, spawn_sidecar};

const MATH: &str = "subj-math-7a";

#[test]
fn baseline_hints_count_toward_coverage() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _workspace = select_workspace(&mut stdin, &mut reader, "syllabusd-cov-hints");

    // Mathematics ships 4 topics, one hinted COMPLETED.
    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "subjects.get",
        json!({ "subjectId": MATH }),
    );
    assert_eq!(fetched["coverage"]["total"].as_i64(), Some(4));
    assert_eq!(fetched["coverage"]["completed"].as_i64(), Some(1));
    assert_eq!(fetched["coverage"]["percent"].as_i64(), Some(25));
    assert_eq!(fetched["locked"].as_bool(), Some(false));
    assert_eq!(fetched["lockReason"].as_str(), Some(""));
}

#[test]
fn explicit_progress_outranks_the_hint() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _workspace = select_workspace(&mut stdin, &mut reader, "syllabusd-cov-precedence");

    // The hinted-COMPLETED topic is explicitly walked back to IN_PROGRESS.
    let set = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "progress.set",
        json!({
            "subjectId": MATH,
            "topicId": "subj-math-7a-u1-t1",
            "status": "IN_PROGRESS"
        }),
    );
    assert_eq!(set["written"].as_bool(), Some(true));
    assert_eq!(set["coverage"]["completed"].as_i64(), Some(0));
    assert_eq!(set["coverage"]["percent"].as_i64(), Some(0));
}

#[test]
fn completing_topics_moves_the_percent() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _workspace = select_workspace(&mut stdin, &mut reader, "syllabusd-cov-complete");

    let set = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "progress.set",
        json!({
            "subjectId": MATH,
            "topicId": "subj-math-7a-u2-t1",
            "status": "COMPLETED",
            "dateCovered": "2026-02-10",
            "notes": "covered with worksheet 4"
        }),
    );
    assert_eq!(set["written"].as_bool(), Some(true));
    // Hinted completion plus this one: 2 of 4.
    assert_eq!(set["coverage"]["percent"].as_i64(), Some(50));
    assert_eq!(set["progress"]["status"].as_str(), Some("COMPLETED"));
    assert_eq!(set["progress"]["dateCovered"].as_str(), Some("2026-02-10"));

    // A later partial edit keeps unspecified fields.
    let patched = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "progress.set",
        json!({
            "subjectId": MATH,
            "topicId": "subj-math-7a-u2-t1",
            "notes": "re-checked homework"
        }),
    );
    assert_eq!(patched["progress"]["status"].as_str(), Some("COMPLETED"));
    assert_eq!(patched["progress"]["dateCovered"].as_str(), Some("2026-02-10"));
    assert_eq!(patched["progress"]["notes"].as_str(), Some("re-checked homework"));
    assert_eq!(patched["coverage"]["percent"].as_i64(), Some(50));
}

#[test]
fn progress_set_validates_inputs() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _workspace = select_workspace(&mut stdin, &mut reader, "syllabusd-cov-validate");

    let bad_status = request(
        &mut stdin,
        &mut reader,
        "1",
        "progress.set",
        json!({ "subjectId": MATH, "topicId": "subj-math-7a-u1-t1", "status": "DONE" }),
    );
    assert_eq!(error_code(&bad_status), Some("bad_params"));

    let bad_date = request(
        &mut stdin,
        &mut reader,
        "2",
        "progress.set",
        json!({
            "subjectId": MATH,
            "topicId": "subj-math-7a-u1-t1",
            "dateCovered": "10/02/2026"
        }),
    );
    assert_eq!(error_code(&bad_date), Some("bad_params"));

    let unknown_topic = request(
        &mut stdin,
        &mut reader,
        "3",
        "progress.set",
        json!({ "subjectId": MATH, "topicId": "nope", "status": "COMPLETED" }),
    );
    assert_eq!(error_code(&unknown_topic), Some("not_found"));

    let unknown_subject = request(
        &mut stdin,
        &mut reader,
        "4",
        "subjects.get",
        json!({ "subjectId": "nope" }),
    );
    assert_eq!(error_code(&unknown_subject), Some("not_found"));
}
