use crate::models::{Reservation, ReservationStatus};

/// Actions the business dashboard (and the customer update form) can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Confirm,
    Cancel,
    /// Customer edited their own reservation.
    Modify,
    /// Car picked up.
    Activate,
    /// Car returned.
    Complete,
    NoShow,
    Dispute,
}

impl DashboardAction {
    pub fn target(&self) -> ReservationStatus {
        match self {
            DashboardAction::Confirm => ReservationStatus::Confirmed,
            DashboardAction::Cancel => ReservationStatus::Cancelled,
            DashboardAction::Modify => ReservationStatus::Modified,
            DashboardAction::Activate => ReservationStatus::Active,
            DashboardAction::Complete => ReservationStatus::Completed,
            DashboardAction::NoShow => ReservationStatus::NoShow,
            DashboardAction::Dispute => ReservationStatus::Dispute,
        }
    }

    /// Statuses this action may start from.
    fn allowed_from(&self, current: ReservationStatus) -> bool {
        use ReservationStatus::*;
        match self {
            DashboardAction::Confirm => matches!(current, Pending | Modified),
            DashboardAction::Cancel => !current.is_terminal(),
            DashboardAction::Modify => matches!(current, Pending | Confirmed | Modified),
            DashboardAction::Activate => current == Confirmed,
            DashboardAction::Complete => current == Active,
            DashboardAction::NoShow => current == Confirmed,
            DashboardAction::Dispute => matches!(current, Active | Completed | NoShow),
        }
    }
}

impl ReservationStatus {
    pub fn can_transition_to(&self, target: ReservationStatus) -> bool {
        action_for(target).map(|action| action.allowed_from(*self)).unwrap_or(false)
    }
}

/// Validates a dashboard action against the current status and returns
/// the status to write.
pub fn plan_transition(
    reservation: &Reservation,
    action: DashboardAction,
) -> Result<ReservationStatus, ReservationError> {
    if !action.allowed_from(reservation.status) {
        return Err(ReservationError::InvalidTransition {
            id: reservation.id.clone(),
            from: reservation.status,
            to: action.target(),
        });
    }
    Ok(action.target())
}

/// Maps an arbitrary requested status (e.g. from a PATCH body) onto the
/// action that produces it.
pub fn action_for(target: ReservationStatus) -> Option<DashboardAction> {
    let action = match target {
        ReservationStatus::Confirmed => DashboardAction::Confirm,
        ReservationStatus::Cancelled => DashboardAction::Cancel,
        ReservationStatus::Modified => DashboardAction::Modify,
        ReservationStatus::Active => DashboardAction::Activate,
        ReservationStatus::Completed => DashboardAction::Complete,
        ReservationStatus::NoShow => DashboardAction::NoShow,
        ReservationStatus::Dispute => DashboardAction::Dispute,
        ReservationStatus::Pending => return None,
    };
    Some(action)
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Reservation not found: {0}")]
    NotFound(String),

    #[error("Reservation {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Malformed reservation from backend: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(status: ReservationStatus) -> Reservation {
        serde_json::from_value(serde_json::json!({
            "id": 42, "car": 3, "status": status.as_backend_str()
        }))
        .unwrap()
    }

    #[test]
    fn test_reservation_lifecycle() {
        let mut r = reservation(ReservationStatus::Pending);

        for action in [DashboardAction::Confirm, DashboardAction::Activate, DashboardAction::Complete] {
            r.status = plan_transition(&r, action).unwrap();
        }
        assert_eq!(r.status, ReservationStatus::Completed);

        r.status = plan_transition(&r, DashboardAction::Dispute).unwrap();
        assert_eq!(r.status, ReservationStatus::Dispute);
    }

    #[test]
    fn test_confirm_only_from_pending_or_modified() {
        assert!(plan_transition(&reservation(ReservationStatus::Modified), DashboardAction::Confirm).is_ok());

        let err = plan_transition(&reservation(ReservationStatus::Cancelled), DashboardAction::Confirm).unwrap_err();
        assert_eq!(err.to_string(), "Reservation 42 cannot move from cancelled to confirmed");
    }

    #[test]
    fn test_cancel_rejected_once_finished() {
        assert!(plan_transition(&reservation(ReservationStatus::Active), DashboardAction::Cancel).is_ok());
        assert!(plan_transition(&reservation(ReservationStatus::Completed), DashboardAction::Cancel).is_err());
        assert!(plan_transition(&reservation(ReservationStatus::Cancelled), DashboardAction::Cancel).is_err());
    }

    #[test]
    fn test_can_transition_to() {
        assert!(ReservationStatus::Pending.can_transition_to(ReservationStatus::Confirmed));
        assert!(ReservationStatus::Confirmed.can_transition_to(ReservationStatus::Active));
        assert!(!ReservationStatus::Completed.can_transition_to(ReservationStatus::Active));
        assert!(!ReservationStatus::Confirmed.can_transition_to(ReservationStatus::Pending));
    }

    #[test]
    fn test_pending_is_not_a_target() {
        assert_eq!(action_for(ReservationStatus::Pending), None);
        assert_eq!(action_for(ReservationStatus::NoShow), Some(DashboardAction::NoShow));
    }
}
