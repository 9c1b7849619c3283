use std::path::PathBuf;

/// Application configuration and constants
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub bootstrap_admin_email: String,
    pub bootstrap_admin_password: String,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5106,
            data_dir: PathBuf::from("data"),
            jwt_secret: "toolkithub-dev-secret".to_string(),
            token_ttl_days: 7,
            default_page_size: 12,
            max_page_size: 100,
            bootstrap_admin_email: "admin@toolkithub.local".to_string(),
            bootstrap_admin_password: "changeme".to_string(),
        }
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::new();
        Self {
            host: std::env::var("TOOLKITHUB_HOST").unwrap_or(defaults.host),
            port: std::env::var("TOOLKITHUB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: std::env::var("TOOLKITHUB_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            jwt_secret: std::env::var("TOOLKITHUB_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_days: std::env::var("TOOLKITHUB_TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_ttl_days),
            default_page_size: defaults.default_page_size,
            max_page_size: defaults.max_page_size,
            bootstrap_admin_email: std::env::var("TOOLKITHUB_ADMIN_EMAIL")
                .unwrap_or(defaults.bootstrap_admin_email),
            bootstrap_admin_password: std::env::var("TOOLKITHUB_ADMIN_PASSWORD")
                .unwrap_or(defaults.bootstrap_admin_password),
        }
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| std::net::SocketAddr::from(([0, 0, 0, 0], self.port)))
    }

    /// Clamp a requested page size to the configured bounds
    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::new();
        assert_eq!(config.default_page_size, 12);
        assert_eq!(config.token_ttl_days, 7);
        assert_eq!(config.socket_addr().port(), 5106);
    }

    #[test]
    fn clamp_limit_bounds() {
        let config = Config::new();
        assert_eq!(config.clamp_limit(None), 12);
        assert_eq!(config.clamp_limit(Some(0)), 1);
        assert_eq!(config.clamp_limit(Some(500)), 100);
        assert_eq!(config.clamp_limit(Some(25)), 25);
    }
}
