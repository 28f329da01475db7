//! Domain models for Conference Manager.

pub mod document;
pub mod email_template;
pub mod finance;
pub mod notification;
pub mod profile;
pub mod program;
pub mod role;
pub mod settings;
pub mod speaker;
pub mod sponsor;
pub mod status;
pub mod submission;
pub mod task;

pub use document::{DocumentType, EventDocument};
pub use email_template::{EmailTemplate, TemplateModule};
pub use finance::{FinanceTransaction, TransactionType};
pub use notification::Notification;
pub use profile::Profile;
pub use program::ProgramItem;
pub use role::{PermissionSet, Role};
pub use settings::SystemSettings;
pub use speaker::Speaker;
pub use sponsor::Sponsor;
pub use status::{Status, StatusEntity};
pub use submission::Submission;
pub use task::Task;
