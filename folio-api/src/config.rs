/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. The database section carries one
/// connection URL per role: the owner role for writes and administration,
/// the visitor role for public reads.
///
/// # Environment Variables
///
/// - `DATABASE_OWNER_URL`: PostgreSQL URL for the owner role (required)
/// - `DATABASE_VISITOR_URL`: PostgreSQL URL for the visitor role (required)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `JWT_SECRET`: Secret key for JWT signing (required, >= 32 chars)
/// - `JWT_TTL_HOURS`: Token lifetime in hours (default: 24)
/// - `RATE_LIMIT_PER_SECOND`: Token bucket refill rate (default: 50)
/// - `RATE_LIMIT_BURST`: Token bucket capacity (default: 100)
/// - `CORS_ORIGINS`: Comma-separated allow-list, or `*` (default: *)
/// - `BASIC_AUTH_USERNAME` / `BASIC_AUTH_PASSWORD`: login gate (required)
/// - `GOOGLE_CLIENT_ID`: expected OAuth audience (required)
/// - `PRODUCTION`: secure cookie attributes when `true` (default: false)
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use folio_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseSettings,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Rate limiter configuration
    pub rate_limit: RateLimitConfig,

    /// CORS allow-list (`*` means permissive)
    pub cors_origins: Vec<String>,

    /// Basic-auth gate on the login and reset endpoints
    pub basic_auth: BasicAuthConfig,

    /// Expected audience for Google ID tokens
    pub google_client_id: String,

    /// Production mode hardens cookie attributes (Secure, SameSite=None)
    pub production: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Database configuration: one URL per database role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Connection URL for the owner role
    pub owner_url: String,

    /// Connection URL for the visitor role
    pub visitor_url: String,

    /// Maximum number of connections per pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in hours
    pub ttl_hours: i64,
}

/// Token bucket parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Refill rate in tokens per second
    pub per_second: f64,

    /// Bucket capacity (burst size)
    pub burst: u32,
}

/// Credentials for the basic-auth gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let owner_url = env::var("DATABASE_OWNER_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_OWNER_URL environment variable is required"))?;
        let visitor_url = env::var("DATABASE_VISITOR_URL").map_err(|_| {
            anyhow::anyhow!("DATABASE_VISITOR_URL environment variable is required")
        })?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()?;

        let rate_per_second = env::var("RATE_LIMIT_PER_SECOND")
            .unwrap_or_else(|_| "50".to_string())
            .parse::<f64>()?;
        let rate_burst = env::var("RATE_LIMIT_BURST")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u32>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let basic_auth_username = env::var("BASIC_AUTH_USERNAME")
            .map_err(|_| anyhow::anyhow!("BASIC_AUTH_USERNAME environment variable is required"))?;
        let basic_auth_password = env::var("BASIC_AUTH_PASSWORD")
            .map_err(|_| anyhow::anyhow!("BASIC_AUTH_PASSWORD environment variable is required"))?;

        let google_client_id = env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_ID environment variable is required"))?;

        let production = env::var("PRODUCTION")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseSettings {
                owner_url,
                visitor_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_hours: jwt_ttl_hours,
            },
            rate_limit: RateLimitConfig {
                per_second: rate_per_second,
                burst: rate_burst,
            },
            cors_origins,
            basic_auth: BasicAuthConfig {
                username: basic_auth_username,
                password: basic_auth_password,
            },
            google_client_id,
            production,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseSettings {
                owner_url: "postgresql://owner@localhost/folio".to_string(),
                visitor_url: "postgresql://visitor@localhost/folio".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                ttl_hours: 24,
            },
            rate_limit: RateLimitConfig {
                per_second: 50.0,
                burst: 100,
            },
            cors_origins: vec!["*".to_string()],
            basic_auth: BasicAuthConfig {
                username: "gate".to_string(),
                password: "gate-password".to_string(),
            },
            google_client_id: "client-id.apps.googleusercontent.com".to_string(),
            production: false,
        }
    }

    #[test]
    fn test_bind_address() {
        let config = test_config();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_permissive_cors_flag() {
        let config = test_config();
        assert!(config.cors_origins.contains(&"*".to_string()));
    }
}
