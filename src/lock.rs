use crate::model::SubmissionStatus;

pub const REASON_TERM_ENDED: &str = "term has ended, progress is locked";
pub const REASON_AWAITING_APPROVAL: &str = "syllabus submitted, awaiting approval";
pub const REASON_APPROVED: &str = "syllabus approved, locked";

pub fn is_locked_by_submission(status: SubmissionStatus) -> bool {
    matches!(
        status,
        SubmissionStatus::Submitted | SubmissionStatus::Approved
    )
}

pub fn is_locked(term_ended: bool, status: SubmissionStatus) -> bool {
    term_ended || is_locked_by_submission(status)
}

/// Term lifecycle outranks submission lifecycle in messaging: when both lock
/// conditions hold, the user is told about the ended term. Empty string when
/// not locked.
pub fn lock_reason(term_ended: bool, status: SubmissionStatus) -> &'static str {
    if term_ended {
        return REASON_TERM_ENDED;
    }
    match status {
        SubmissionStatus::Submitted => REASON_AWAITING_APPROVAL,
        SubmissionStatus::Approved => REASON_APPROVED,
        SubmissionStatus::Draft | SubmissionStatus::Rejected => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitted_and_approved_lock_edits() {
        assert!(is_locked_by_submission(SubmissionStatus::Submitted));
        assert!(is_locked_by_submission(SubmissionStatus::Approved));
        assert!(!is_locked_by_submission(SubmissionStatus::Draft));
        assert!(!is_locked_by_submission(SubmissionStatus::Rejected));
    }

    #[test]
    fn rejected_unlocks_when_term_is_open() {
        assert!(!is_locked(false, SubmissionStatus::Rejected));
        assert_eq!(lock_reason(false, SubmissionStatus::Rejected), "");
    }

    #[test]
    fn ended_term_locks_even_a_draft() {
        assert!(is_locked(true, SubmissionStatus::Draft));
        assert_eq!(lock_reason(true, SubmissionStatus::Draft), REASON_TERM_ENDED);
    }

    #[test]
    fn term_ended_message_outranks_submission_message() {
        assert_eq!(
            lock_reason(true, SubmissionStatus::Approved),
            REASON_TERM_ENDED
        );
        assert_eq!(
            lock_reason(true, SubmissionStatus::Submitted),
            REASON_TERM_ENDED
        );
    }

    #[test]
    fn submission_messages_are_status_specific() {
        assert_eq!(
            lock_reason(false, SubmissionStatus::Submitted),
            REASON_AWAITING_APPROVAL
        );
        assert_eq!(
            lock_reason(false, SubmissionStatus::Approved),
            REASON_APPROVED
        );
    }
}
