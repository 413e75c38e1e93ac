//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{Commitment, PrayerRequest, PrivacyLevel, RequestStatus, SessionLogEntry};

/// Validate that a request's stored state is internally consistent
pub fn assert_request_invariants(request: &PrayerRequest) {
    // Anonymous requesters are never named
    debug_assert!(
        !(request.privacy == PrivacyLevel::Anonymous && request.requester_name.is_some()),
        "Anonymous request {} carries a requester name",
        request.id
    );

    // answered_at is set exactly when the request is answered
    debug_assert!(
        request.answered_at.is_some() == (request.status == RequestStatus::Answered),
        "Request {} has status {} but answered_at {:?}",
        request.id,
        request.status,
        request.answered_at
    );

    debug_assert!(
        !request.description.trim().is_empty(),
        "Request {} has empty description",
        request.id
    );
}

/// Validate the completion flag against progress
pub fn assert_commitment_invariants(commitment: &Commitment) {
    debug_assert!(
        commitment.is_consistent(),
        "Commitment {} has completed={} but {}/{} hours",
        commitment.id,
        commitment.completed,
        commitment.accumulated_hours,
        commitment.target_hours
    );

    debug_assert!(
        commitment.accumulated_hours >= 0.0,
        "Commitment {} has negative progress {}",
        commitment.id,
        commitment.accumulated_hours
    );
}

/// Validate a log entry references the commitment it was written against
pub fn assert_session_matches(entry: &SessionLogEntry, commitment: &Commitment) {
    debug_assert!(
        entry.commitment_id == commitment.id && entry.request_id == commitment.request_id,
        "Session {} does not belong to commitment {}",
        entry.id,
        commitment.id
    );
}

/// Validate that a volunteer ID is not nil
pub fn assert_volunteer_id_valid(volunteer_id: Uuid, context: &str) {
    debug_assert!(
        volunteer_id != Uuid::nil(),
        "Nil volunteer_id in context: {}",
        context
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewRequest, DEFAULT_TARGET_HOURS};

    #[test]
    fn test_valid_request() {
        let request = NewRequest::new("Peace in our home").into_request().unwrap();
        assert_request_invariants(&request);
    }

    #[test]
    fn test_valid_commitment() {
        let request = NewRequest::new("Peace in our home").into_request().unwrap();
        let commitment = Commitment::new(&request, Uuid::new_v4(), DEFAULT_TARGET_HOURS);
        assert_commitment_invariants(&commitment);
    }

    #[test]
    #[should_panic(expected = "has completed=true")]
    fn test_inconsistent_commitment_detected() {
        let request = NewRequest::new("Peace in our home").into_request().unwrap();
        let mut commitment = Commitment::new(&request, Uuid::new_v4(), DEFAULT_TARGET_HOURS);
        commitment.completed = true;
        assert_commitment_invariants(&commitment);
    }

    #[test]
    #[should_panic(expected = "answered_at")]
    fn test_answered_without_timestamp_detected() {
        let mut request = NewRequest::new("Peace in our home").into_request().unwrap();
        request.status = RequestStatus::Answered;
        assert_request_invariants(&request);
    }
}
