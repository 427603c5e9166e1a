use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongo_uri: String,
    pub mongo_db: String,
    pub jwt: JwtConfig,
    pub upload_dir: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl AppConfig {
    /// Built once at startup and carried inside `AppState`; nothing reads
    /// the environment after this point.
    pub fn from_env() -> anyhow::Result<Self> {
        let mongo_uri = std::env::var("MONGO_URI").context("MONGO_URI is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
        };
        let mongo_db = std::env::var("MONGO_DB").unwrap_or_else(|_| "fundhive".into());
        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);
        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());
        Ok(Self {
            mongo_uri,
            mongo_db,
            jwt,
            upload_dir,
            host,
            port,
            cors_origin,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("invalid APP_HOST/APP_PORT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            mongo_uri: "mongodb://localhost:27017".into(),
            mongo_db: "fundhive_test".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
            },
            upload_dir: "uploads".into(),
            host: "127.0.0.1".into(),
            port: 5000,
            cors_origin: "http://localhost:5173".into(),
        }
    }

    #[test]
    fn bind_addr_combines_host_and_port() {
        let addr = test_config().bind_addr().expect("valid addr");
        assert_eq!(addr.to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn bind_addr_rejects_garbage_host() {
        let mut config = test_config();
        config.host = "not a host".into();
        assert!(config.bind_addr().is_err());
    }
}
