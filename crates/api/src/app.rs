use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use persistence::repositories::{
    EmailTemplateRepository, FinanceRepository, NotificationRepository, ProfileRepository,
    RolePermissionRepository, SessionRepository, SettingsRepository, SpeakerRepository,
    SubmissionRepository,
};
use shared::jwt::JwtSigner;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, public_rate_limit_middleware, require_auth, trace_id,
    RateLimiterState,
};
use crate::routes::{
    auth, documents, emails, finance, health, notifications, program, public, roles, settings,
    speakers, sponsors, storage, submissions, tasks, users,
};
use crate::services::{
    AuthService, BadgeService, BulkEmailService, EmailService, NotificationHub, StorageService,
    WorkflowService, ZaloClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtSigner>,
    pub hub: NotificationHub,
    pub email: EmailService,
    pub zalo: ZaloClient,
    pub storage: Arc<StorageService>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    /// Auth service over the shared pool and signer.
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            ProfileRepository::new(self.pool.clone()),
            SessionRepository::new(self.pool.clone()),
            RolePermissionRepository::new(self.pool.clone()),
            NotificationRepository::new(self.pool.clone()),
            self.jwt.clone(),
            self.config.jwt.refresh_token_expiry_secs,
        )
    }

    pub fn badge_service(&self) -> BadgeService {
        BadgeService::new(self.storage.clone(), SubmissionRepository::new(self.pool.clone()))
    }

    /// Workflow orchestrator for submission status changes.
    pub fn workflow_service(&self) -> WorkflowService {
        WorkflowService::new(
            SubmissionRepository::new(self.pool.clone()),
            ProfileRepository::new(self.pool.clone()),
            NotificationRepository::new(self.pool.clone()),
            FinanceRepository::new(self.pool.clone()),
            EmailTemplateRepository::new(self.pool.clone()),
            self.email.clone(),
            self.badge_service(),
            self.hub.clone(),
        )
    }

    pub fn bulk_email_service(&self) -> BulkEmailService {
        BulkEmailService::new(
            SubmissionRepository::new(self.pool.clone()),
            SpeakerRepository::new(self.pool.clone()),
            self.email.clone(),
            self.config.limits.bulk_email_batch_size,
        )
    }
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    let jwt = Arc::new(
        JwtSigner::new(
            &config.jwt.private_key,
            &config.jwt.public_key,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        )?
        .with_leeway(config.jwt.leeway_secs),
    );

    let settings_repo = SettingsRepository::new(pool.clone());
    let storage = Arc::new(StorageService::new(&config.storage)?);
    let email = EmailService::new(config.email.clone(), settings_repo.clone())?;
    let zalo = ZaloClient::new(config.zalo.clone(), settings_repo)?;

    // Create rate limiter if rate limiting is enabled (rate_limit_per_minute > 0)
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        hub: NotificationHub::default(),
        email,
        zalo,
        storage,
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Staff routes behind the bearer-token gate.
    // Using /api/v1 prefix for versioned API
    let protected_routes = Router::new()
        .route("/api/v1/auth/session", get(auth::session))
        // Staff profiles
        .route("/api/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/v1/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/api/v1/users/:id/password", put(users::change_password))
        // Attendee submissions and their workflow
        .route(
            "/api/v1/submissions",
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .route(
            "/api/v1/submissions/:id",
            get(submissions::get_submission)
                .put(submissions::update_submission)
                .delete(submissions::delete_submission),
        )
        .route(
            "/api/v1/submissions/:id/transition",
            post(submissions::transition_submission),
        )
        .route(
            "/api/v1/submissions/:id/regenerate-badge",
            post(submissions::regenerate_badge),
        )
        // Speakers
        .route(
            "/api/v1/speakers",
            get(speakers::list_speakers).post(speakers::create_speaker),
        )
        .route(
            "/api/v1/speakers/:id",
            get(speakers::get_speaker)
                .put(speakers::update_speaker)
                .delete(speakers::delete_speaker),
        )
        // Sponsors
        .route(
            "/api/v1/sponsors",
            get(sponsors::list_sponsors).post(sponsors::create_sponsor),
        )
        .route(
            "/api/v1/sponsors/:id",
            get(sponsors::get_sponsor)
                .put(sponsors::update_sponsor)
                .delete(sponsors::delete_sponsor),
        )
        .route(
            "/api/v1/sponsors/:id/transition",
            post(sponsors::transition_sponsor),
        )
        // Tasks
        .route("/api/v1/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/v1/tasks/:id",
            get(tasks::get_task).put(tasks::update_task).delete(tasks::delete_task),
        )
        // Finance
        .route(
            "/api/v1/finance",
            get(finance::list_transactions).post(finance::create_transaction),
        )
        .route(
            "/api/v1/finance/:id",
            get(finance::get_transaction)
                .put(finance::update_transaction)
                .delete(finance::delete_transaction),
        )
        // Event documents
        .route(
            "/api/v1/documents",
            get(documents::list_documents).post(documents::upload_document),
        )
        .route(
            "/api/v1/documents/:id",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
        // Program schedule
        .route(
            "/api/v1/program",
            get(program::list_program).post(program::create_program_item),
        )
        .route(
            "/api/v1/program/:id",
            get(program::get_program_item)
                .put(program::update_program_item)
                .delete(program::delete_program_item),
        )
        // Notifications
        .route("/api/v1/notifications", get(notifications::list_notifications))
        .route(
            "/api/v1/notifications/recent",
            get(notifications::recent_notifications),
        )
        .route(
            "/api/v1/notifications/:id/read",
            post(notifications::mark_read),
        )
        .route(
            "/api/v1/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/api/v1/notifications/clear",
            delete(notifications::clear_notifications),
        )
        .route("/api/v1/notifications/stream", get(notifications::stream))
        // Email templates and sending
        .route(
            "/api/v1/emails/templates",
            get(emails::list_templates).post(emails::create_template),
        )
        .route(
            "/api/v1/emails/templates/:id",
            get(emails::get_template)
                .put(emails::update_template)
                .delete(emails::delete_template),
        )
        .route("/api/v1/emails/send", post(emails::send_email))
        .route("/api/v1/emails/bulk", post(emails::send_bulk))
        // Role permission editor
        .route("/api/v1/roles", get(roles::list_role_permissions))
        .route("/api/v1/roles/:role", put(roles::replace_role_permissions))
        // System settings and Zalo integration
        .route(
            "/api/v1/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/api/v1/settings/zalo/test", post(settings::zalo_test))
        .route(
            "/api/v1/settings/zalo/refresh-token",
            post(settings::zalo_refresh_token),
        )
        // File uploads
        .route("/api/v1/storage/:bucket", post(storage::upload))
        // Auth runs first (outermost layer = runs first)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Self-service registration, budgeted per client address
    let public_registration_routes = Router::new()
        .route("/api/v1/public/registrations", post(public::register_attendee))
        .route("/api/v1/public/speakers", post(public::register_speaker))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            public_rate_limit_middleware,
        ));

    // Anonymous routes: login flow, stored files, probes
    let public_routes = Router::new()
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/storage/:bucket/:key", get(storage::serve))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    let app = Router::new()
        .merge(protected_routes)
        .merge(public_registration_routes)
        .merge(public_routes)
        .fallback(not_found)
        // Global middleware (order matters: bottom layers run first)
        // Handlers that want caching (stored files) set their own header;
        // everything else defaults to no-store.
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state);

    Ok(app)
}

/// JSON 404 for unmatched routes.
async fn not_found() -> crate::error::ApiError {
    crate::error::ApiError::NotFound("Resource not found".to_string())
}
