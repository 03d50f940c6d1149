//! Site configuration read from the environment (`.env` is loaded first by `run`).

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub site_name: String,
    pub jwt_secret: String,
    /// Upper bound on carousel slides rendered on the home page; `None` is unbounded.
    pub carousel_limit: Option<i64>,
    /// Contact submissions allowed per client IP per hour; 0 disables the limit.
    pub contact_rate_limit: u32,
    pub media_root: PathBuf,
    pub cookie_secure: bool,
}

fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(fallback)
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let is_production = environment == "production";

        let carousel_limit: i64 = env_or("CAROUSEL_LIMIT", 20);

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_or("PORT", 8000),
            site_name: std::env::var("SITE_NAME").unwrap_or_else(|_| "Grace Church".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            carousel_limit: (carousel_limit > 0).then_some(carousel_limit),
            contact_rate_limit: env_or("CONTACT_RATE_LIMIT", 5),
            media_root: std::env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            cookie_secure: env_or("COOKIE_SECURE", is_production),
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }

    /// Refuse insecure settings that must never reach production.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.is_production() && (self.jwt_secret.is_empty() || self.jwt_secret == DEFAULT_JWT_SECRET)
        {
            anyhow::bail!(
                "JWT_SECRET must be set to a secure, unique value in production; \
                 refusing to start with the default secret"
            );
        }
        Ok(())
    }
}

impl Default for SiteConfig {
    /// Development defaults, independent of the process environment.
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            site_name: "Grace Church".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            carousel_limit: Some(20),
            contact_rate_limit: 5,
            media_root: PathBuf::from("media"),
            cookie_secure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_development_and_valid() {
        let config = SiteConfig::default();
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let config = SiteConfig {
            environment: "production".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SiteConfig {
            jwt_secret: "a-long-unique-secret".to_string(),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = SiteConfig {
            host: "not a host".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.bind_addr().is_err());
    }
}
