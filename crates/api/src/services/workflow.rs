//! Executes submission status changes and their follow-up actions.
//!
//! The rules live in `domain::services::workflow`; this service owns the
//! messy part: writing the row, then walking the planned side effects one
//! by one. Each step is best effort. A failed step is reported in the
//! response and never rolls back the status change that already landed.

use chrono::Utc;
use domain::models::{Notification, Profile, Status, Submission, TemplateModule, TransactionType};
use domain::services::template::{recipient_vars, render};
use domain::services::workflow::{side_effects, validate_transition, SideEffect};
use persistence::repositories::{
    EmailTemplateRepository, FinanceInput, FinanceRepository, NotificationRepository,
    ProfileRepository, SubmissionRepository,
};
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::services::badge::BadgeService;
use crate::services::email::{EmailMessage, EmailService};
use crate::services::realtime::NotificationHub;

/// Template looked up when a payment confirmation lands.
const PAYMENT_CONFIRMED_TEMPLATE: &str = "Payment confirmed";

/// Result of one side-effect step, reported to the operator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub step: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A committed status change plus everything that happened after it.
#[derive(Debug)]
pub struct TransitionOutcome {
    pub submission: Submission,
    pub effects: Vec<StepOutcome>,
}

/// Orchestrates status changes for submissions.
#[derive(Clone)]
pub struct WorkflowService {
    submissions: SubmissionRepository,
    profiles: ProfileRepository,
    notifications: NotificationRepository,
    finance: FinanceRepository,
    templates: EmailTemplateRepository,
    email: EmailService,
    badge: BadgeService,
    hub: NotificationHub,
}

impl WorkflowService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        submissions: SubmissionRepository,
        profiles: ProfileRepository,
        notifications: NotificationRepository,
        finance: FinanceRepository,
        templates: EmailTemplateRepository,
        email: EmailService,
        badge: BadgeService,
        hub: NotificationHub,
    ) -> Self {
        Self {
            submissions,
            profiles,
            notifications,
            finance,
            templates,
            email,
            badge,
            hub,
        }
    }

    /// Move a submission through the guided review flow.
    pub async fn transition(
        &self,
        id: i64,
        to: Status,
        actor: &Profile,
    ) -> Result<TransitionOutcome, ApiError> {
        let current = self
            .submissions
            .find_by_id(id)
            .await?
            .map(Submission::from)
            .ok_or_else(|| ApiError::NotFound(format!("Submission {} not found", id)))?;
        validate_transition(current.status, to)?;

        let updated = self
            .submissions
            .update_status(id, to)
            .await?
            .map(Submission::from)
            .ok_or_else(|| ApiError::NotFound(format!("Submission {} not found", id)))?;

        let mut submission = updated;
        let effects = self
            .run_side_effects(current.status, &mut submission, actor)
            .await;
        Ok(TransitionOutcome {
            submission,
            effects,
        })
    }

    /// Run the planned follow-up actions for a change from `from` into
    /// the submission's current status.
    ///
    /// Also called by the raw edit path, which can set any status
    /// without the guided rules; the effects fire either way. A save
    /// that kept the status produces an empty plan.
    pub async fn run_side_effects(
        &self,
        from: Status,
        submission: &mut Submission,
        actor: &Profile,
    ) -> Vec<StepOutcome> {
        let plan = side_effects(
            from,
            submission.status,
            submission.payment_amount,
            submission.badge_url.as_deref(),
        );
        let mut outcomes = Vec::with_capacity(plan.len());
        for effect in plan {
            let (step, result) = match effect {
                SideEffect::NotifyAdmins => {
                    ("notify_admins", self.notify_admins(submission).await)
                }
                SideEffect::SendPaymentEmail => {
                    ("payment_email", self.send_payment_email(submission).await)
                }
                SideEffect::CreateIncomeTransaction => (
                    "income_transaction",
                    self.create_income(submission, actor).await,
                ),
                SideEffect::GenerateBadge => ("badge", self.generate_badge(submission).await),
            };
            match result {
                Ok(detail) => outcomes.push(StepOutcome {
                    step,
                    ok: true,
                    detail,
                }),
                Err(e) => {
                    warn!(
                        submission_id = submission.id,
                        step = step,
                        error = %e,
                        "Side effect failed"
                    );
                    outcomes.push(StepOutcome {
                        step,
                        ok: false,
                        detail: Some(e),
                    });
                }
            }
        }
        outcomes
    }

    async fn notify_admins(&self, submission: &Submission) -> Result<Option<String>, String> {
        let admin_ids = self
            .profiles
            .list_admin_ids()
            .await
            .map_err(|e| e.to_string())?;
        let message = format!(
            "Payment confirmed for {} ({})",
            submission.full_name, submission.attendance_id
        );
        let rows = self
            .notifications
            .create_many(&admin_ids, &message, Some("/submissions"))
            .await
            .map_err(|e| e.to_string())?;
        let count = rows.len();
        for row in rows {
            self.hub.publish(&Notification::from(row));
        }
        Ok(Some(format!("notified {} admin(s)", count)))
    }

    async fn send_payment_email(&self, submission: &Submission) -> Result<Option<String>, String> {
        let template = self
            .templates
            .find_by_module_and_name(TemplateModule::Submissions, PAYMENT_CONFIRMED_TEMPLATE)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| {
                format!(
                    "email template '{}' is missing",
                    PAYMENT_CONFIRMED_TEMPLATE
                )
            })?;

        let mut vars = recipient_vars(&submission.full_name, &submission.email);
        vars.insert(
            "attendance_id".to_string(),
            submission.attendance_id.clone(),
        );
        vars.insert("amount".to_string(), format_amount(submission.payment_amount));
        vars.insert(
            "attendee_type".to_string(),
            submission.attendee_type.clone(),
        );

        let message = EmailMessage {
            to: submission.email.clone(),
            to_name: Some(submission.full_name.clone()),
            subject: render(&template.subject, &vars),
            body_text: render(&template.body, &vars),
            body_html: None,
        };
        self.email.send(message).await.map_err(|e| e.to_string())?;
        Ok(None)
    }

    async fn create_income(
        &self,
        submission: &Submission,
        actor: &Profile,
    ) -> Result<Option<String>, String> {
        let input = FinanceInput {
            title: format!("Registration fee {}", submission.attendance_id),
            transaction_type: TransactionType::Income,
            amount: submission.payment_amount,
            date: Utc::now().date_naive(),
            handler_id: Some(actor.id),
            account: None,
            payment_method: None,
            receipt_url: submission.payment_image_url.clone(),
            notes: Some(format!(
                "Created automatically for submission {}",
                submission.attendance_id
            )),
        };
        let row = self.finance.create(&input).await.map_err(|e| e.to_string())?;
        Ok(Some(format!("transaction #{}", row.id)))
    }

    async fn generate_badge(&self, submission: &mut Submission) -> Result<Option<String>, String> {
        let url = self
            .badge
            .generate_for(submission)
            .await
            .map_err(|e| e.to_string())?;
        submission.badge_url = Some(url.clone());
        Ok(Some(url))
    }
}

/// Render a payment amount without trailing zero noise.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_outcome_serializes_camel_case() {
        let outcome = StepOutcome {
            step: "income_transaction",
            ok: false,
            detail: Some("database unavailable".to_string()),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"step\":\"income_transaction\""));
        assert!(json.contains("\"ok\":false"));
        assert!(json.contains("\"detail\":\"database unavailable\""));
    }

    #[test]
    fn test_step_outcome_omits_empty_detail() {
        let outcome = StepOutcome {
            step: "payment_email",
            ok: true,
            detail: None,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("detail"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_500_000.0), "1500000");
        assert_eq!(format_amount(99.5), "99.50");
        assert_eq!(format_amount(0.0), "0");
    }
}
