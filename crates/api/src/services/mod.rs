//! Service layer: authentication, delivery channels, file storage and
//! the submission workflow executor.

pub mod auth;
pub mod badge;
pub mod bootstrap;
pub mod bulk_email;
pub mod email;
pub mod realtime;
pub mod storage;
pub mod workflow;
pub mod zalo;

pub use auth::AuthService;
pub use badge::BadgeService;
pub use bulk_email::BulkEmailService;
pub use email::{EmailMessage, EmailService};
pub use realtime::NotificationHub;
pub use storage::StorageService;
pub use workflow::WorkflowService;
pub use zalo::ZaloClient;
