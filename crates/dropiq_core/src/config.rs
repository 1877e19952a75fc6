//! Configuration for DropIQ
//!
//! Settings are read from a TOML file (explicit path or the first of
//! [`config_paths`] that exists), then environment overrides are applied on
//! top. Every section has defaults suitable for local development.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError, CoreResult};

/// Secret used when nothing is configured. Fine for a laptop, never for a deployment.
pub const DEV_JWT_SECRET: &str = "dropiq-dev-secret-change-me";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DropiqConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payments: PaymentsConfig,
    pub chains: ChainsConfig,
    pub security: SecurityConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration for SQLite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("dropiq")
                .join("dropiq.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Lifetime of a wallet sign-in challenge
    pub nonce_ttl_minutes: i64,
    /// Issuer shown in authenticator apps
    pub totp_issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            nonce_ttl_minutes: 10,
            totp_issuer: "DropIQ".to_string(),
        }
    }
}

/// Stripe-compatible payment provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub api_base_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
    pub success_url: String,
    pub cancel_url: String,
    pub default_currency: String,
    /// Maximum age of a webhook signature timestamp
    pub webhook_tolerance_secs: i64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
            webhook_secret: String::new(),
            success_url: "http://localhost:3000/campaigns/success".to_string(),
            cancel_url: "http://localhost:3000/campaigns/cancel".to_string(),
            default_currency: "usd".to_string(),
            webhook_tolerance_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainsConfig {
    /// Timeout applied to every outbound provider request
    pub request_timeout_secs: u64,
    pub providers: Vec<ChainProviderConfig>,
}

impl Default for ChainsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            providers: Vec::new(),
        }
    }
}

/// One Alchemy-compatible endpoint pair for a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainProviderConfig {
    pub chain_id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// JSON-RPC endpoint (API key embedded in the URL)
    pub rpc_url: String,
    /// NFT REST base URL
    #[serde(default)]
    pub nft_api_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// GoPlus-compatible token security API base
    pub risk_api_url: String,
    /// Legitimate domains checked for look-alikes
    pub popular_domains: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            risk_api_url: "https://api.gopluslabs.io".to_string(),
            popular_domains: crate::scoring::url::DEFAULT_POPULAR_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl DropiqConfig {
    /// Load configuration from a specific file
    pub async fn load_from(path: &Path) -> CoreResult<Self> {
        load_config(path).await
    }

    /// Load configuration from standard locations, falling back to defaults
    pub async fn load() -> CoreResult<Self> {
        for path in config_paths() {
            if path.exists() {
                return load_config(&path).await;
            }
        }
        Ok(Self::default())
    }

    /// Apply `DROPIQ_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("DROPIQ_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DROPIQ_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid DROPIQ_PORT: {}", port),
            }
        }
        if let Some(path) = lookup("DROPIQ_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(secret) = lookup("DROPIQ_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(key) = lookup("DROPIQ_PAYMENTS_SECRET_KEY") {
            self.payments.secret_key = key;
        }
        if let Some(secret) = lookup("DROPIQ_WEBHOOK_SECRET") {
            self.payments.webhook_secret = secret;
        }
        if let Some(url) = lookup("DROPIQ_RISK_API_URL") {
            self.security.risk_api_url = url;
        }
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(invalid("auth.jwt_secret", "non-empty secret", "must not be empty"));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(invalid("auth.token_ttl_hours", "positive integer", "must be > 0"));
        }
        if self.auth.nonce_ttl_minutes <= 0 {
            return Err(invalid("auth.nonce_ttl_minutes", "positive integer", "must be > 0"));
        }
        for provider in &self.chains.providers {
            if url::Url::parse(&provider.rpc_url).is_err() {
                return Err(invalid(
                    "chains.providers.rpc_url",
                    "absolute URL",
                    format!("chain {} has an invalid rpc_url", provider.chain_id),
                ));
            }
        }
        if self.auth.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("Using the development JWT secret; set DROPIQ_JWT_SECRET in production");
        }
        Ok(())
    }
}

fn invalid(field: &str, expected: &str, reason: impl Into<String>) -> CoreError {
    CoreError::Configuration {
        config_path: "<resolved>".to_string(),
        field: field.to_string(),
        expected: expected.to_string(),
        cause: ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        },
    }
}

/// Load configuration from a TOML file
pub async fn load_config(path: &Path) -> CoreResult<DropiqConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CoreError::Configuration {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "readable TOML file".to_string(),
            cause: ConfigError::Io(e.to_string()),
        })?;

    let mut config: DropiqConfig =
        toml::from_str(&content).map_err(|e| CoreError::Configuration {
            config_path: path.display().to_string(),
            field: "content".to_string(),
            expected: "valid TOML configuration".to_string(),
            cause: ConfigError::TomlParse(e.to_string()),
        })?;

    // Relative database paths are relative to the config file
    if config.database.path.is_relative() {
        if let Some(base_dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.database.path = base_dir.join(&config.database.path);
        }
    }

    Ok(config)
}

/// Standard config file locations, in priority order
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // Project-specific config
    paths.push(PathBuf::from("dropiq.toml"));

    // User config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("dropiq").join("config.toml"));
    }

    paths
}
