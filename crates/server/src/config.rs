use std::sync::OnceLock;
use std::time::Duration;

static CONFIG: OnceLock<ServerConfig> = OnceLock::new();

/// Server settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Origin allowed by the CORS layer.
    pub frontend_origin: String,
    /// Global sliding-window rate limit.
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    /// Stricter window applied to /api/auth.
    pub auth_rate_limit_max: u32,
}

impl ServerConfig {
    fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let frontend_origin = std::env::var("FRONTEND_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let rate_limit_max = std::env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let window_secs: u64 = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15 * 60);

        let auth_rate_limit_max = std::env::var("AUTH_RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            port,
            frontend_origin,
            rate_limit_max,
            rate_limit_window: Duration::from_secs(window_secs),
            auth_rate_limit_max,
        }
    }
}

/// Load the server config from the environment. Safe to call multiple
/// times; only the first call reads the environment.
pub fn load() -> &'static ServerConfig {
    CONFIG.get_or_init(ServerConfig::from_env)
}
