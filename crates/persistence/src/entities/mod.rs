//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod document;
pub mod email_template;
pub mod finance;
pub mod notification;
pub mod profile;
pub mod program;
pub mod role_permission;
pub mod session;
pub mod settings;
pub mod speaker;
pub mod sponsor;
pub mod submission;
pub mod task;

pub use document::EventDocumentEntity;
pub use email_template::EmailTemplateEntity;
pub use finance::FinanceTransactionEntity;
pub use notification::NotificationEntity;
pub use profile::ProfileEntity;
pub use program::ProgramItemEntity;
pub use role_permission::RolePermissionEntity;
pub use session::SessionEntity;
pub use settings::SystemSettingsEntity;
pub use speaker::SpeakerEntity;
pub use sponsor::SponsorEntity;
pub use submission::SubmissionEntity;
pub use task::TaskEntity;
