use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";
const DEFAULT_MODULE_URL: &str = "http://localhost:3000";

/// How a module reaches the public API of another module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleIntegration {
    InProcess,
    Http,
}

impl ModuleIntegration {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleIntegration::InProcess => "in_process",
            ModuleIntegration::Http => "http",
        }
    }
}

impl FromStr for ModuleIntegration {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "in_process" | "in-process" | "inprocess" => Ok(ModuleIntegration::InProcess),
            "http" => Ok(ModuleIntegration::Http),
            other => bail!("Unknown MODULE_INTEGRATION '{}', expected in_process or http", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in_memory" => Ok(StorageBackend::Memory),
            other => bail!("Unknown STORAGE '{}', expected postgres or memory", other),
        }
    }
}

/// Base URLs of each module's public API when talking over HTTP
#[derive(Debug, Clone)]
pub struct ModuleUrls {
    pub identity: String,
    pub billing: String,
    pub training_plan: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_expires_in_minutes: i64,
    pub storage: StorageBackend,
    pub module_integration: ModuleIntegration,
    pub module_urls: ModuleUrls,
    pub provider_timeout: Duration,
    pub require_active_billing: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3000")
            .parse()
            .context("PORT must be a valid port number")?;
        let jwt_expires_in_minutes: i64 = var("JWT_EXPIRES_IN_MINUTES", "60")
            .parse()
            .context("JWT_EXPIRES_IN_MINUTES must be a whole number of minutes")?;
        if jwt_expires_in_minutes <= 0 {
            bail!("JWT_EXPIRES_IN_MINUTES must be positive");
        }
        let provider_timeout_secs: u64 = var("PROVIDER_TIMEOUT_SECS", "10")
            .parse()
            .context("PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?;
        let require_active_billing = parse_bool(&var("REQUIRE_ACTIVE_BILLING", "true"))
            .context("REQUIRE_ACTIVE_BILLING must be true or false")?;

        Ok(AppConfig {
            host: var("HOST", "0.0.0.0"),
            port,
            environment: var("ENVIRONMENT", "development"),
            log_level: var("LOG_LEVEL", "info"),
            jwt_secret: var("JWT_SECRET", DEFAULT_JWT_SECRET),
            jwt_expires_in_minutes,
            storage: var("STORAGE", "postgres").parse()?,
            module_integration: var("MODULE_INTEGRATION", "in_process").parse()?,
            module_urls: ModuleUrls {
                identity: var("IDENTITY_API_URL", DEFAULT_MODULE_URL),
                billing: var("BILLING_API_URL", DEFAULT_MODULE_URL),
                training_plan: var("TRAINING_PLAN_API_URL", DEFAULT_MODULE_URL),
            },
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            require_active_billing,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn jwt_expires_in(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.jwt_expires_in_minutes)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("'{}' is not a boolean", other),
    }
}
