//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{AppSettings, ServerConfig, SettingsError};
#[cfg(feature = "metrics")]
pub use metrics::build_metrics;
#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
pub use state_builders::{StateError, storage_backend};

use state_builders::{bootstrap_admin, build_http_state};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use campus_clubs::Trace;
#[cfg(debug_assertions)]
use campus_clubs::doc::ApiDoc;
use campus_clubs::inbound::http::health::{HealthState, live, ready};
use campus_clubs::inbound::http::state::HttpState;
use campus_clubs::inbound::http::{configure, extractor_configs};
use campus_clubs::middleware::{Csrf, RoleGate};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    #[cfg(feature = "metrics")]
    metrics: MetricsLayer,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
        #[cfg(feature = "metrics")]
        metrics,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let (json, query, path) = extractor_configs(http_state.json_body_limit());

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json)
        .app_data(query)
        .app_data(path)
        .wrap(Csrf)
        .wrap(RoleGate)
        .wrap(session)
        .wrap(Trace)
        .service(ready)
        .service(live)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;
    #[cfg(feature = "metrics")]
    let app = app.wrap(metrics);

    app
}

/// Construct an Actix HTTP server using the provided configuration.
///
/// Builds the repositories the configuration selects, ensures the bootstrap
/// admin exists, and marks `health_state` ready once the socket is bound.
///
/// # Errors
/// Returns [`StartupError`] when state cannot be prepared or the socket
/// cannot be bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
    bootstrap: Option<(&str, &str)>,
) -> Result<Server, StartupError> {
    let http_state = build_http_state(&config)?;
    if let Some((email, password)) = bootstrap {
        bootstrap_admin(http_state.accounts.as_ref(), email, password).await?;
    }
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;
    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            #[cfg(feature = "metrics")]
            metrics: metrics_layer.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Errors raised while starting the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Application state could not be prepared.
    #[error(transparent)]
    State(#[from] StateError),
    /// Binding the listener failed.
    #[error("failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),
}
