//! Repository implementations for database operations.

pub mod document;
pub mod email_template;
pub mod filter;
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

pub use document::{DocumentInput, DocumentListQuery, DocumentRepository};
pub use email_template::{EmailTemplateInput, EmailTemplateListQuery, EmailTemplateRepository};
pub use finance::{FinanceInput, FinanceListQuery, FinanceRepository};
pub use notification::{NotificationListQuery, NotificationRepository};
pub use profile::{CreateProfileInput, ProfileListQuery, ProfileRepository, UpdateProfileInput};
pub use program::{ProgramItemInput, ProgramListQuery, ProgramRepository};
pub use role_permission::RolePermissionRepository;
pub use session::SessionRepository;
pub use settings::{SettingsInput, SettingsRepository};
pub use speaker::{SpeakerInput, SpeakerListQuery, SpeakerRepository};
pub use sponsor::{SponsorInput, SponsorListQuery, SponsorRepository};
pub use submission::{
    CreateSubmissionInput, SubmissionListQuery, SubmissionRepository, UpdateSubmissionInput,
};
pub use task::{TaskInput, TaskListQuery, TaskRepository};
