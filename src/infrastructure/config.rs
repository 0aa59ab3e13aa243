use std::env;
use tracing::warn;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Allowed CORS origin for the browser client; unset means same-origin only.
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using insecure development secret");
            "dev-secret".to_string()
        });

        let cors_origin = env::var("CORS_ORIGIN").ok();

        Self {
            host,
            port,
            jwt_secret,
            cors_origin,
        }
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_combines_host_and_port() {
        let config = Config {
            host: "0.0.0.0".to_string(),
            port: 5001,
            jwt_secret: "secret".to_string(),
            cors_origin: None,
        };
        assert_eq!(config.bind_addr(), ("0.0.0.0".to_string(), 5001));
    }
}
