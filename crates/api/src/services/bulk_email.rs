//! Bulk mail composition: resolve a recipient list, personalize, send in
//! fixed-size batches.
//!
//! Duplicates are deliberately kept: the operator sees exactly the list
//! they built, and the provider cap is enforced by re-batching rather
//! than by pruning.

use domain::models::Status;
use domain::services::recipients::{parse_csv, parse_manual, Recipient};
use domain::services::template::{recipient_vars, render};
use persistence::repositories::{SpeakerRepository, SubmissionRepository};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::services::email::{EmailMessage, EmailService};

/// Where the recipient list comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientSource {
    /// Approved attendee submissions.
    ApprovedSubmissions,
    /// Every speaker regardless of status.
    AllSpeakers,
    /// Speakers whose status is Approved.
    ApprovedSpeakers,
    /// Pasted CSV with an `email,name` shape.
    Csv,
    /// Manually typed addresses split on commas, semicolons or whitespace.
    Manual,
}

/// Per-batch send counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Full report returned to the operator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSendReport {
    pub recipients: usize,
    pub sent: usize,
    pub failed: usize,
    pub batches: Vec<BatchReport>,
}

/// Batched personalized sending on top of the email service.
#[derive(Clone)]
pub struct BulkEmailService {
    submissions: SubmissionRepository,
    speakers: SpeakerRepository,
    email: EmailService,
    batch_size: usize,
}

impl BulkEmailService {
    pub fn new(
        submissions: SubmissionRepository,
        speakers: SpeakerRepository,
        email: EmailService,
        batch_size: usize,
    ) -> Self {
        Self {
            submissions,
            speakers,
            email,
            // A zero batch size would loop forever in chunks().
            batch_size: batch_size.max(1),
        }
    }

    /// Materialize the recipient list for a source.
    ///
    /// `raw` carries the pasted CSV or manual text and is ignored for the
    /// predefined query sources.
    pub async fn resolve_recipients(
        &self,
        source: RecipientSource,
        raw: Option<&str>,
    ) -> Result<Vec<Recipient>, ApiError> {
        let recipients = match source {
            RecipientSource::ApprovedSubmissions => self
                .submissions
                .list_recipients(Some(Status::Approved))
                .await?
                .into_iter()
                .map(|(email, name)| Recipient::new(email, name))
                .collect(),
            RecipientSource::AllSpeakers => self
                .speakers
                .list_recipients(None)
                .await?
                .into_iter()
                .map(|(email, name)| Recipient::new(email, name))
                .collect(),
            RecipientSource::ApprovedSpeakers => self
                .speakers
                .list_recipients(Some(Status::Approved))
                .await?
                .into_iter()
                .map(|(email, name)| Recipient::new(email, name))
                .collect(),
            RecipientSource::Csv => parse_csv(raw.unwrap_or("")),
            RecipientSource::Manual => parse_manual(raw.unwrap_or("")),
        };
        Ok(recipients)
    }

    /// Resolve, personalize and send. Fails fast only when the list is
    /// empty; individual send failures are counted, not fatal.
    pub async fn send(
        &self,
        source: RecipientSource,
        raw: Option<&str>,
        subject: &str,
        body: &str,
    ) -> Result<BulkSendReport, ApiError> {
        let recipients = self.resolve_recipients(source, raw).await?;
        if recipients.is_empty() {
            return Err(ApiError::Validation(
                "No valid recipients resolved".to_string(),
            ));
        }

        let mut report = BulkSendReport {
            recipients: recipients.len(),
            sent: 0,
            failed: 0,
            batches: Vec::new(),
        };
        for (idx, chunk) in recipients.chunks(self.batch_size).enumerate() {
            let mut sent = 0;
            let mut failed = 0;
            for recipient in chunk {
                let vars = recipient_vars(&recipient.name, &recipient.email);
                let message = EmailMessage {
                    to: recipient.email.clone(),
                    to_name: (!recipient.name.is_empty()).then(|| recipient.name.clone()),
                    subject: render(subject, &vars),
                    body_text: render(body, &vars),
                    body_html: None,
                };
                match self.email.send(message).await {
                    Ok(()) => sent += 1,
                    Err(e) => {
                        warn!(to = %recipient.email, error = %e, "Bulk send failed for recipient");
                        failed += 1;
                    }
                }
            }
            report.sent += sent;
            report.failed += failed;
            report.batches.push(BatchReport {
                batch: idx + 1,
                sent,
                failed,
            });
        }
        info!(
            recipients = report.recipients,
            sent = report.sent,
            failed = report.failed,
            batches = report.batches.len(),
            "Bulk mail finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_source_deserializes_snake_case() {
        let source: RecipientSource = serde_json::from_str("\"approved_submissions\"").unwrap();
        assert_eq!(source, RecipientSource::ApprovedSubmissions);
        let source: RecipientSource = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(source, RecipientSource::Csv);
        assert!(serde_json::from_str::<RecipientSource>("\"everyone\"").is_err());
    }

    #[test]
    fn test_bulk_report_serializes_camel_case() {
        let report = BulkSendReport {
            recipients: 3,
            sent: 2,
            failed: 1,
            batches: vec![BatchReport {
                batch: 1,
                sent: 2,
                failed: 1,
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"recipients\":3"));
        assert!(json.contains("\"batches\":[{\"batch\":1"));
    }
}
