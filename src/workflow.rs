use serde::Serialize;

use crate::coverage::Coverage;
use crate::model::{submission_key, Submission, SubmissionStatus};

#[derive(Debug, Clone, Serialize)]
pub struct TransitionError {
    pub code: &'static str,
    pub message: String,
}

impl TransitionError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The lazily-created initial record for a composite key that has never been
/// touched: DRAFT, zero snapshot, declaration not accepted.
pub fn default_submission(
    year_id: &str,
    term_id: &str,
    class_id: &str,
    subject_id: &str,
    required_threshold_percent: i64,
    now: &str,
) -> Submission {
    Submission {
        id: submission_key(year_id, term_id, class_id, subject_id),
        academic_year_id: year_id.to_string(),
        term_id: term_id.to_string(),
        class_id: class_id.to_string(),
        subject_id: subject_id.to_string(),
        required_threshold_percent,
        coverage_percent_at_submit: 0,
        status: SubmissionStatus::Draft,
        declaration_accepted: false,
        submitted_at: None,
        reviewed_at: None,
        reviewer_comment: None,
        updated_at: now.to_string(),
    }
}

/// Freezes the live coverage percent into the record. Submitting below the
/// required threshold is allowed; the threshold check is advisory and lives
/// with the caller, never in here. Returns a whole replacement record.
pub fn submit(
    current: &Submission,
    live_coverage: &Coverage,
    declaration_accepted: bool,
    now: &str,
) -> Result<Submission, TransitionError> {
    match current.status {
        SubmissionStatus::Submitted => {
            return Err(TransitionError::new(
                "invalid_transition",
                "syllabus is already submitted and awaiting review",
            ));
        }
        SubmissionStatus::Approved => {
            return Err(TransitionError::new(
                "invalid_transition",
                "syllabus is already approved",
            ));
        }
        SubmissionStatus::Draft | SubmissionStatus::Rejected => {}
    }
    if !declaration_accepted {
        return Err(TransitionError::new(
            "invalid_transition",
            "declaration must be accepted before submitting",
        ));
    }

    Ok(Submission {
        status: SubmissionStatus::Submitted,
        submitted_at: Some(now.to_string()),
        coverage_percent_at_submit: live_coverage.percent,
        declaration_accepted: true,
        reviewed_at: None,
        reviewer_comment: None,
        updated_at: now.to_string(),
        ..current.clone()
    })
}

pub fn approve(current: &Submission, now: &str) -> Result<Submission, TransitionError> {
    if current.status != SubmissionStatus::Submitted {
        return Err(TransitionError::new(
            "invalid_transition",
            "only a submitted syllabus can be approved",
        ));
    }
    Ok(Submission {
        status: SubmissionStatus::Approved,
        reviewed_at: Some(now.to_string()),
        reviewer_comment: None,
        updated_at: now.to_string(),
        ..current.clone()
    })
}

/// A rejection requires a non-empty comment and puts the record back into an
/// editable state (REJECTED is not in the locked-by-submission set).
pub fn reject(
    current: &Submission,
    comment: &str,
    now: &str,
) -> Result<Submission, TransitionError> {
    if current.status != SubmissionStatus::Submitted {
        return Err(TransitionError::new(
            "invalid_transition",
            "only a submitted syllabus can be rejected",
        ));
    }
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(TransitionError::new(
            "invalid_transition",
            "a rejection comment is required",
        ));
    }
    Ok(Submission {
        status: SubmissionStatus::Rejected,
        reviewed_at: Some(now.to_string()),
        reviewer_comment: Some(comment.to_string()),
        updated_at: now.to_string(),
        ..current.clone()
    })
}

/// Administrative override: callable from any state, including APPROVED.
/// Clears review fields so the record never shows DRAFT with stale review
/// data. The IPC layer gates this behind an explicit confirmation flag.
pub fn reset_to_draft(current: &Submission, now: &str) -> Submission {
    Submission {
        status: SubmissionStatus::Draft,
        reviewed_at: None,
        reviewer_comment: None,
        updated_at: now.to_string(),
        ..current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(percent: i64) -> Coverage {
        Coverage {
            percent,
            completed: percent,
            total: 100,
        }
    }

    fn draft() -> Submission {
        default_submission("y1", "t1", "c1", "s1", 70, "2026-01-01T00:00:00Z")
    }

    #[test]
    fn default_record_is_draft_with_zero_snapshot() {
        let s = draft();
        assert_eq!(s.status, SubmissionStatus::Draft);
        assert_eq!(s.coverage_percent_at_submit, 0);
        assert!(!s.declaration_accepted);
        assert_eq!(s.id, "y1|t1|c1|s1");
    }

    #[test]
    fn submit_freezes_live_coverage_even_below_threshold() {
        let s = draft();
        assert_eq!(s.required_threshold_percent, 70);

        let submitted = submit(&s, &coverage(50), true, "now").expect("submit");
        assert_eq!(submitted.status, SubmissionStatus::Submitted);
        assert_eq!(submitted.coverage_percent_at_submit, 50);
        assert_eq!(submitted.submitted_at.as_deref(), Some("now"));
    }

    #[test]
    fn submit_requires_declaration() {
        let err = submit(&draft(), &coverage(80), false, "now").unwrap_err();
        assert_eq!(err.code, "invalid_transition");
    }

    #[test]
    fn submit_refused_when_already_submitted_or_approved() {
        let submitted = submit(&draft(), &coverage(80), true, "now").unwrap();
        assert!(submit(&submitted, &coverage(90), true, "later").is_err());

        let approved = approve(&submitted, "later").unwrap();
        assert!(submit(&approved, &coverage(90), true, "later").is_err());
    }

    #[test]
    fn snapshot_is_not_recomputed_by_later_transitions() {
        let submitted = submit(&draft(), &coverage(50), true, "now").unwrap();
        let approved = approve(&submitted, "later").unwrap();
        assert_eq!(approved.coverage_percent_at_submit, 50);
    }

    #[test]
    fn approve_only_from_submitted() {
        assert!(approve(&draft(), "now").is_err());
        let submitted = submit(&draft(), &coverage(80), true, "now").unwrap();
        let approved = approve(&submitted, "later").unwrap();
        assert_eq!(approved.status, SubmissionStatus::Approved);
        assert_eq!(approved.reviewed_at.as_deref(), Some("later"));
        assert!(approved.reviewer_comment.is_none());
    }

    #[test]
    fn reject_requires_trimmed_comment() {
        let submitted = submit(&draft(), &coverage(80), true, "now").unwrap();
        assert!(reject(&submitted, "   ", "later").is_err());

        let rejected = reject(&submitted, "  cover unit 3  ", "later").unwrap();
        assert_eq!(rejected.status, SubmissionStatus::Rejected);
        assert_eq!(rejected.reviewer_comment.as_deref(), Some("cover unit 3"));
    }

    #[test]
    fn reject_only_from_submitted() {
        assert!(reject(&draft(), "why", "now").is_err());
    }

    #[test]
    fn resubmit_after_rejection_clears_review_fields() {
        let submitted = submit(&draft(), &coverage(40), true, "now").unwrap();
        let rejected = reject(&submitted, "too little covered", "later").unwrap();

        let resubmitted = submit(&rejected, &coverage(75), true, "again").unwrap();
        assert_eq!(resubmitted.status, SubmissionStatus::Submitted);
        assert_eq!(resubmitted.coverage_percent_at_submit, 75);
        assert!(resubmitted.reviewer_comment.is_none());
        assert!(resubmitted.reviewed_at.is_none());
    }

    #[test]
    fn reset_to_draft_clears_review_fields_from_any_state() {
        let submitted = submit(&draft(), &coverage(80), true, "now").unwrap();
        let approved = approve(&submitted, "later").unwrap();

        let reset = reset_to_draft(&approved, "reset-time");
        assert_eq!(reset.status, SubmissionStatus::Draft);
        assert!(reset.reviewed_at.is_none());
        assert!(reset.reviewer_comment.is_none());
        // The past snapshot stays on the record; it is historical data.
        assert_eq!(reset.coverage_percent_at_submit, 80);
    }
}
