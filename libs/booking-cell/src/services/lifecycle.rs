use tracing::{debug, info, warn};

use crate::models::{BookingError, BookingStatus};

pub struct BookingLifecycleService;

impl Default for BookingLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<(), BookingError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(BookingError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        info!("Status transition validated: {} -> {}", current_status, new_status);
        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: BookingStatus) -> Vec<BookingStatus> {
        match current_status {
            BookingStatus::Pending => vec![BookingStatus::Paid, BookingStatus::Failed],
            BookingStatus::Paid => vec![BookingStatus::Canceled, BookingStatus::Refunded],
            // Terminal states
            BookingStatus::Failed | BookingStatus::Canceled | BookingStatus::Refunded => vec![],
        }
    }

    /// Bookings may be moved to another date or window until they are settled.
    pub fn can_reschedule(&self, current_status: BookingStatus) -> bool {
        matches!(current_status, BookingStatus::Pending | BookingStatus::Paid)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Paid,
        BookingStatus::Failed,
        BookingStatus::Canceled,
        BookingStatus::Refunded,
    ];

    #[test]
    fn test_allowed_transitions() {
        let lifecycle = BookingLifecycleService::new();
        let allowed = [
            (BookingStatus::Pending, BookingStatus::Paid),
            (BookingStatus::Pending, BookingStatus::Failed),
            (BookingStatus::Paid, BookingStatus::Canceled),
            (BookingStatus::Paid, BookingStatus::Refunded),
        ];

        for from in ALL {
            for to in ALL {
                let result = lifecycle.validate_status_transition(from, to);
                if allowed.contains(&(from, to)) {
                    assert!(result.is_ok(), "{} -> {} should be allowed", from, to);
                } else {
                    assert_matches!(
                        result,
                        Err(BookingError::InvalidStatusTransition { from: f, to: t }) if f == from && t == to
                    );
                }
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        let lifecycle = BookingLifecycleService::new();
        for status in [BookingStatus::Failed, BookingStatus::Canceled, BookingStatus::Refunded] {
            assert!(lifecycle.get_valid_transitions(status).is_empty());
        }
        assert!(!lifecycle.get_valid_transitions(BookingStatus::Pending).is_empty());
        assert!(!lifecycle.get_valid_transitions(BookingStatus::Paid).is_empty());
    }

    #[test]
    fn test_reschedule_only_before_settlement() {
        let lifecycle = BookingLifecycleService::new();
        assert!(lifecycle.can_reschedule(BookingStatus::Pending));
        assert!(lifecycle.can_reschedule(BookingStatus::Paid));
        assert!(!lifecycle.can_reschedule(BookingStatus::Failed));
        assert!(!lifecycle.can_reschedule(BookingStatus::Refunded));
    }
}
