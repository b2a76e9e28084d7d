use std::env;

/// Configuration for the database-backed services (auth, candidate, offer).
/// Every service reads the same variables; the inter-service URLs are only
/// consumed by the services that call them.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_seconds: u64,
    pub host: String,
    pub port: u16,
    /// Directory where candidate CVs are stored (candidate-service).
    pub upload_dir: String,
    /// candidate-service base URL (used by auth-service for profile sync).
    pub candidate_service_url: String,
    /// ai-service base URL (used by candidate-service for CV extraction).
    pub ai_service_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry_seconds: env::var("JWT_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "3600".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "/data/cv".into()),
            candidate_service_url: env::var("CANDIDATE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8082".into()),
            ai_service_url: env::var("AI_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8084".into()),
        })
    }
}

/// Configuration for the API gateway: no database, only the JWT secret, the
/// public path prefixes and the upstream service URLs.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Path prefixes that bypass the JWT filter (comma-separated env var).
    pub public_paths: Vec<String>,
    pub auth_service_url: String,
    pub candidate_service_url: String,
    pub offer_service_url: String,
    pub ai_service_url: String,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            jwt_secret: required("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            public_paths: env::var("PUBLIC_PATHS")
                .unwrap_or_else(|_| "/auth".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            auth_service_url: env::var("AUTH_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".into()),
            candidate_service_url: env::var("CANDIDATE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8082".into()),
            offer_service_url: env::var("OFFER_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8083".into()),
            ai_service_url: env::var("AI_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8084".into()),
        })
    }

    /// Resolve the upstream base URL for a request path from its first segment.
    pub fn upstream_for(&self, path: &str) -> Option<&str> {
        let segment = path.trim_start_matches('/').split('/').next().unwrap_or("");
        match segment {
            "auth" => Some(&self.auth_service_url),
            "candidates" => Some(&self.candidate_service_url),
            "offers" => Some(&self.offer_service_url),
            "ai" => Some(&self.ai_service_url),
            _ => None,
        }
    }
}

/// Configuration for the ai-service: JWT secret plus the Python engine URL.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub python_base_url: String,
}

impl AiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            jwt_secret: required("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8084".into())
                .parse()?,
            python_base_url: env::var("AI_PYTHON_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway_config() -> GatewayConfig {
        GatewayConfig {
            jwt_secret: "secret".into(),
            host: "0.0.0.0".into(),
            port: 8080,
            public_paths: vec!["/auth".into()],
            auth_service_url: "http://auth:8081".into(),
            candidate_service_url: "http://candidate:8082".into(),
            offer_service_url: "http://offer:8083".into(),
            ai_service_url: "http://ai:8084".into(),
        }
    }

    #[test]
    fn upstream_resolution_by_first_segment() {
        let cfg = gateway_config();
        assert_eq!(cfg.upstream_for("/auth/login"), Some("http://auth:8081"));
        assert_eq!(cfg.upstream_for("/offers/12/apply"), Some("http://offer:8083"));
        assert_eq!(cfg.upstream_for("/candidates/me"), Some("http://candidate:8082"));
        assert_eq!(cfg.upstream_for("/ai/match"), Some("http://ai:8084"));
        assert_eq!(cfg.upstream_for("/unknown"), None);
    }
}
