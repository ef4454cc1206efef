use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_port() -> u16 {
    5432
}

fn default_sslmode() -> String {
    "disable".to_string()
}

/// Upper bound for `jwt.access_token_ttl_secs` (one year)
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 365 * 24 * 3600;

fn default_access_token_ttl() -> i64 {
    3600
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl HttpConfig {
    /// Address string suitable for `TcpListener::bind`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
}

impl DbConfig {
    /// Postgres connection URL built from the individual fields
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.name, self.sslmode
        )
    }
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of issued access tokens in seconds (default: 3600)
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_secs: i64,
}

/// Server configuration - loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    pub database: DbConfig,
    pub jwt: JwtConfig,
}

/// Load server config from a YAML file with JUMYSTE__ env var overrides.
pub fn load_config(path: &str) -> anyhow::Result<ServerConfig> {
    use anyhow::Context;
    let config: ServerConfig = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix("JUMYSTE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to build config from: {}", path))?
        .try_deserialize()
        .with_context(|| format!("Failed to deserialize config from: {}", path))?;

    if config.jwt.secret.is_empty() {
        anyhow::bail!("jwt.secret must not be empty");
    }
    if !(1..=MAX_ACCESS_TOKEN_TTL_SECS).contains(&config.jwt.access_token_ttl_secs) {
        anyhow::bail!(
            "jwt.access_token_ttl_secs must be between 1 and {}",
            MAX_ACCESS_TOKEN_TTL_SECS
        );
    }
    Ok(config)
}
