use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub query: QueryConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Memory,
    Firestore,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Some(StoreBackend::Memory),
            "firestore" => Some(StoreBackend::Firestore),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub project_id: Option<String>,
    pub database: String,
    pub emulator_host: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Hard ceiling on any list result size; `None` leaves resource defaults alone
    pub max_limit: Option<u32>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = lookup("API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("API_HOST") {
            self.server.host = v;
        }

        // Store overrides
        if let Some(v) = lookup("STORE_BACKEND") {
            match StoreBackend::parse(&v) {
                Some(backend) => self.store.backend = backend,
                None => tracing::warn!("Unknown STORE_BACKEND '{}', keeping {:?}", v, self.store.backend),
            }
        }
        if let Some(v) = lookup("FIRESTORE_PROJECT_ID").or_else(|| lookup("GOOGLE_CLOUD_PROJECT")) {
            self.store.project_id = Some(v);
        }
        if let Some(v) = lookup("FIRESTORE_DATABASE") {
            self.store.database = v;
        }
        if let Some(v) = lookup("FIRESTORE_EMULATOR_HOST") {
            self.store.emulator_host = Some(v);
        }
        if let Some(v) = lookup("FIRESTORE_ACCESS_TOKEN") {
            self.store.access_token = Some(v);
        }
        if let Some(v) = lookup("STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = v.parse().unwrap_or(self.store.timeout_secs);
        }

        // Query overrides
        if let Some(v) = lookup("QUERY_MAX_LIMIT") {
            self.query.max_limit = v.parse().ok().filter(|max| *max > 0);
        }
        if let Some(v) = lookup("QUERY_DEBUG_LOGGING") {
            self.query.debug_logging = v.parse().unwrap_or(self.query.debug_logging);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                project_id: None,
                database: "(default)".to_string(),
                emulator_host: None,
                access_token: None,
                timeout_secs: 30,
            },
            query: QueryConfig {
                max_limit: Some(1000),
                debug_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            store: StoreConfig {
                backend: StoreBackend::Firestore,
                project_id: None,
                database: "(default)".to_string(),
                emulator_host: None,
                access_token: None,
                timeout_secs: 10,
            },
            query: QueryConfig {
                max_limit: Some(500),
                debug_logging: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            store: StoreConfig {
                backend: StoreBackend::Firestore,
                project_id: None,
                database: "(default)".to_string(),
                emulator_host: None,
                access_token: None,
                timeout_secs: 5,
            },
            query: QueryConfig {
                max_limit: Some(500),
                debug_logging: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert!(config.is_development());
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.query.max_limit, Some(1000));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::from_lookup(lookup(&[("APP_ENV", "prod")]));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.timeout_secs, 5);
        assert!(!config.query.debug_logging);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "4000"),
            ("STORE_BACKEND", "firestore"),
            ("FIRESTORE_PROJECT_ID", "nellorieans"),
            ("QUERY_MAX_LIMIT", "0"),
            ("SECURITY_CORS_ORIGINS", "https://a.example, https://b.example,"),
        ]));
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.project_id.as_deref(), Some("nellorieans"));
        assert_eq!(config.query.max_limit, None);
        assert_eq!(config.security.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_api_port_wins_and_bad_values_keep_preset() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "4000"),
            ("API_PORT", "5000"),
            ("STORE_TIMEOUT_SECS", "soon"),
            ("STORE_BACKEND", "postgres"),
        ]));
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }
}
