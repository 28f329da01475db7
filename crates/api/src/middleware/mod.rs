//! HTTP middleware components.

pub mod auth;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod trace_id;

pub use auth::{require_auth, require_permission, CurrentUser};
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use rate_limit::{public_rate_limit_middleware, RateLimiterState};
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
