use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// HS256 keys shorter than the hash output are rejected at startup
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access-token lifetime (default: 15)
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    /// Refresh-token lifetime (default: 30)
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
}

fn default_access_ttl_minutes() -> i64 {
    15
}

fn default_refresh_ttl_days() -> i64 {
    30
}

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_DAY: i64 = 24 * 3600;

impl AuthConfig {
    /// Saturates on overflow; `ServerConfig::validate` rejects such values
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_minutes.saturating_mul(SECS_PER_MINUTE)
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_days.saturating_mul(SECS_PER_DAY)
    }
}

/// Server configuration - loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen: String, // "0.0.0.0:8080"
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Reject settings the server cannot run safely with
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            );
        }
        if self.auth.access_ttl_minutes <= 0 {
            bail!("auth.access_ttl_minutes must be positive");
        }
        if self.auth.refresh_ttl_days <= 0 {
            bail!("auth.refresh_ttl_days must be positive");
        }
        // Expiry is computed as now + ttl, so leave headroom for the timestamp
        let max_ttl_secs = i64::MAX / 2;
        if self
            .auth
            .access_ttl_minutes
            .checked_mul(SECS_PER_MINUTE)
            .map_or(true, |secs| secs > max_ttl_secs)
        {
            bail!("auth.access_ttl_minutes is too large");
        }
        if self
            .auth
            .refresh_ttl_days
            .checked_mul(SECS_PER_DAY)
            .map_or(true, |secs| secs > max_ttl_secs)
        {
            bail!("auth.refresh_ttl_days is too large");
        }
        if self.db.max_connections == 0 {
            bail!("db.max_connections must be positive");
        }
        Ok(())
    }
}

/// Load server config from a YAML file with CODEVAULT__ env var overrides.
pub fn load_config(path: &str) -> Result<ServerConfig> {
    let config: ServerConfig = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix("CODEVAULT")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to build config from: {}", path))?
        .try_deserialize()
        .with_context(|| format!("Failed to deserialize config from: {}", path))?;
    Ok(config)
}
