//! Application settings and the HTTP server configuration object.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use campus_clubs::inbound::http::state::ServiceLimits;
use campus_clubs::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOADS_DIR: &str = "./uploads";

/// Errors raised while interpreting [`AppSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address does not parse as `host:port`.
    #[error("invalid CLUBS_BIND_ADDR '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// Only one half of the bootstrap admin credentials was supplied.
    #[error("CLUBS_BOOTSTRAP_ADMIN_EMAIL and CLUBS_BOOTSTRAP_ADMIN_PASSWORD must be set together")]
    PartialBootstrapAdmin,
}

/// Settings loaded from `CLUBS_*` environment variables, configuration files
/// and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLUBS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the service runs on an in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Directory uploaded images are written to.
    pub uploads_dir: Option<PathBuf>,
    /// Largest accepted image in bytes.
    #[ortho_config(default = 5_242_880)]
    pub max_upload_bytes: u64,
    /// Default number of posts returned by feeds.
    #[ortho_config(default = 50)]
    pub feed_limit: usize,
    /// Email of the global university admin created at startup.
    pub bootstrap_admin_email: Option<String>,
    /// Password for that account.
    pub bootstrap_admin_password: Option<String>,
}

impl AppSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Upload directory, defaulting to `./uploads`.
    pub fn uploads_dir(&self) -> &Path {
        self.uploads_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOADS_DIR))
    }

    /// Feed and upload limits.
    pub fn limits(&self) -> ServiceLimits {
        ServiceLimits {
            feed_limit: self.feed_limit,
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    /// Bootstrap admin credentials, if configured.
    pub fn bootstrap_admin(&self) -> Result<Option<(&str, &str)>, SettingsError> {
        match (
            self.bootstrap_admin_email.as_deref(),
            self.bootstrap_admin_password.as_deref(),
        ) {
            (Some(email), Some(password)) => Ok(Some((email, password))),
            (None, None) => Ok(None),
            _ => Err(SettingsError::PartialBootstrapAdmin),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) uploads_dir: PathBuf,
    pub(crate) limits: ServiceLimits,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from session preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            limits: ServiceLimits::default(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one every repository port is served by the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Store uploads under `dir`.
    #[must_use]
    pub fn with_uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = dir.into();
        self
    }

    /// Override feed and upload limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ServiceLimits) -> Self {
        self.limits = limits;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use campus_clubs::domain::{DEFAULT_FEED_LIMIT, DEFAULT_MAX_UPLOAD_BYTES};
    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "CLUBS_BIND_ADDR",
        "CLUBS_DATABASE_URL",
        "CLUBS_DB_MAX_CONNECTIONS",
        "CLUBS_UPLOADS_DIR",
        "CLUBS_MAX_UPLOAD_BYTES",
        "CLUBS_FEED_LIMIT",
        "CLUBS_BOOTSTRAP_ADMIN_EMAIL",
        "CLUBS_BOOTSTRAP_ADMIN_PASSWORD",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("campus-clubs")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default addr"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.uploads_dir(), Path::new(DEFAULT_UPLOADS_DIR));
        assert_eq!(settings.limits().feed_limit, DEFAULT_FEED_LIMIT);
        assert_eq!(settings.limits().max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(settings.bootstrap_admin().expect("consistent").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        vars.retain(|(name, _)| {
            !matches!(
                *name,
                "CLUBS_BIND_ADDR" | "CLUBS_MAX_UPLOAD_BYTES" | "CLUBS_FEED_LIMIT"
            )
        });
        vars.push(("CLUBS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())));
        vars.push(("CLUBS_MAX_UPLOAD_BYTES", Some("1024".to_owned())));
        vars.push(("CLUBS_FEED_LIMIT", Some("10".to_owned())));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("addr"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("valid")
        );
        assert_eq!(settings.limits().max_upload_bytes, 1024);
        assert_eq!(settings.limits().feed_limit, 10);
    }

    #[rstest]
    fn half_configured_bootstrap_admin_is_rejected() {
        let mut vars = cleared();
        vars.retain(|(name, _)| *name != "CLUBS_BOOTSTRAP_ADMIN_EMAIL");
        vars.push((
            "CLUBS_BOOTSTRAP_ADMIN_EMAIL",
            Some("root@campus.example".to_owned()),
        ));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();

        assert!(matches!(
            settings.bootstrap_admin(),
            Err(SettingsError::PartialBootstrapAdmin)
        ));
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let mut vars = cleared();
        vars.retain(|(name, _)| *name != "CLUBS_BIND_ADDR");
        vars.push(("CLUBS_BIND_ADDR", Some("not an address".to_owned())));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();

        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}
