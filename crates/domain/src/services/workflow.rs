//! Submission review workflow rules.
//!
//! The rules here are pure. Executing a transition (writing the row,
//! sending emails, generating badges) happens in the API layer; this
//! module only answers "is this move allowed" and "what should happen
//! after it".

use thiserror::Error;

use crate::models::status::Status;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot move submission from '{from}' to '{to}'")]
    InvalidTransition { from: Status, to: Status },
}

/// Statuses reachable from `from` through the guided review flow.
///
/// Terminal states return an empty slice. Operators with edit rights can
/// still set any allowed status directly; side effects fire either way.
pub fn guided_targets(from: Status) -> &'static [Status] {
    match from {
        Status::Pending => &[Status::Approved, Status::Rejected],
        Status::Approved => &[Status::PaymentPending],
        Status::PaymentPending => &[Status::PaymentConfirmed, Status::Rejected],
        _ => &[],
    }
}

/// Validates a guided transition.
pub fn validate_transition(from: Status, to: Status) -> Result<(), WorkflowError> {
    if guided_targets(from).contains(&to) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition { from, to })
    }
}

/// One follow-up action triggered by a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Insert a notification row for every admin and broadcast it.
    NotifyAdmins,
    /// Email the registrant the payment-confirmed template.
    SendPaymentEmail,
    /// Record the registration fee as income.
    CreateIncomeTransaction,
    /// Render and upload the attendee badge PDF.
    GenerateBadge,
}

/// Plans the side effects for a status change, in execution order.
///
/// Effects fire on any change into a state, whether it came through the
/// guided flow or a raw edit. Saving a submission without changing its
/// status produces no effects.
pub fn side_effects(
    from: Status,
    to: Status,
    payment_amount: f64,
    badge_url: Option<&str>,
) -> Vec<SideEffect> {
    if from == to {
        return Vec::new();
    }
    let mut plan = Vec::new();
    if to == Status::PaymentConfirmed {
        plan.push(SideEffect::NotifyAdmins);
        plan.push(SideEffect::SendPaymentEmail);
        if payment_amount > 0.0 {
            plan.push(SideEffect::CreateIncomeTransaction);
        }
    }
    if matches!(to, Status::Approved | Status::PaymentConfirmed) && badge_url.is_none() {
        plan.push(SideEffect::GenerateBadge);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guided_targets_pending() {
        assert_eq!(
            guided_targets(Status::Pending),
            &[Status::Approved, Status::Rejected]
        );
    }

    #[test]
    fn test_guided_targets_approved() {
        assert_eq!(guided_targets(Status::Approved), &[Status::PaymentPending]);
    }

    #[test]
    fn test_guided_targets_payment_pending() {
        assert_eq!(
            guided_targets(Status::PaymentPending),
            &[Status::PaymentConfirmed, Status::Rejected]
        );
    }

    #[test]
    fn test_terminal_states_have_no_targets() {
        assert!(guided_targets(Status::Rejected).is_empty());
        assert!(guided_targets(Status::PaymentConfirmed).is_empty());
    }

    #[test]
    fn test_validate_transition_accepts_guided_moves() {
        assert!(validate_transition(Status::Pending, Status::Approved).is_ok());
        assert!(validate_transition(Status::PaymentPending, Status::Rejected).is_ok());
    }

    #[test]
    fn test_validate_transition_rejects_skips() {
        let err = validate_transition(Status::Pending, Status::PaymentConfirmed).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                from: Status::Pending,
                to: Status::PaymentConfirmed,
            }
        );
        assert!(validate_transition(Status::Rejected, Status::Pending).is_err());
    }

    #[test]
    fn test_no_effects_when_status_unchanged() {
        assert!(side_effects(Status::Approved, Status::Approved, 100.0, None).is_empty());
        assert!(side_effects(
            Status::PaymentConfirmed,
            Status::PaymentConfirmed,
            100.0,
            None
        )
        .is_empty());
    }

    #[test]
    fn test_payment_pending_has_no_effects() {
        assert!(side_effects(Status::Approved, Status::PaymentPending, 150.0, None).is_empty());
    }

    #[test]
    fn test_rejected_has_no_effects() {
        assert!(side_effects(Status::Pending, Status::Rejected, 150.0, None).is_empty());
    }

    #[test]
    fn test_payment_confirmed_effects_full() {
        let plan = side_effects(Status::PaymentPending, Status::PaymentConfirmed, 150.0, None);
        assert_eq!(
            plan,
            vec![
                SideEffect::NotifyAdmins,
                SideEffect::SendPaymentEmail,
                SideEffect::CreateIncomeTransaction,
                SideEffect::GenerateBadge,
            ]
        );
    }

    #[test]
    fn test_payment_confirmed_skips_income_for_zero_amount() {
        let plan = side_effects(Status::PaymentPending, Status::PaymentConfirmed, 0.0, None);
        assert_eq!(
            plan,
            vec![
                SideEffect::NotifyAdmins,
                SideEffect::SendPaymentEmail,
                SideEffect::GenerateBadge,
            ]
        );
    }

    #[test]
    fn test_payment_confirmed_skips_badge_when_present() {
        let plan = side_effects(
            Status::PaymentPending,
            Status::PaymentConfirmed,
            150.0,
            Some("/storage/badges/REG-0007.pdf"),
        );
        assert_eq!(
            plan,
            vec![
                SideEffect::NotifyAdmins,
                SideEffect::SendPaymentEmail,
                SideEffect::CreateIncomeTransaction,
            ]
        );
    }

    #[test]
    fn test_approved_only_generates_badge() {
        let plan = side_effects(Status::Pending, Status::Approved, 0.0, None);
        assert_eq!(plan, vec![SideEffect::GenerateBadge]);
        let plan = side_effects(Status::Pending, Status::Approved, 0.0, Some("url"));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_raw_edit_into_state_still_plans_effects() {
        // A direct edit from Pending straight to PaymentConfirmed is not a
        // guided move, but once saved the effects for the new state run.
        let plan = side_effects(Status::Pending, Status::PaymentConfirmed, 80.0, None);
        assert!(plan.contains(&SideEffect::SendPaymentEmail));
        assert!(plan.contains(&SideEffect::CreateIncomeTransaction));
        assert!(plan.contains(&SideEffect::GenerateBadge));
    }
}
