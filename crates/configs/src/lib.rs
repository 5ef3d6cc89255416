use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON document holding the product array
    #[serde(default = "default_data_file")]
    pub data_file: String,
    /// Directory served under `/images`
    #[serde(default = "default_images_dir")]
    pub images_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_file: default_data_file(), images_dir: default_images_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_admin_user")]
    pub admin_user: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: default_token_ttl(),
            admin_user: default_admin_user(),
            admin_password: default_admin_password(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }
fn default_data_file() -> String { "data/productosMock.json".into() }
fn default_images_dir() -> String { "public/images".into() }
fn default_jwt_secret() -> String { "mi_secreto_dev".into() }
fn default_token_ttl() -> u64 { 3600 }
fn default_admin_user() -> String { "admin".into() }
fn default_admin_password() -> String { "1234".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Like [`load_from_file`], but a file that does not exist yields the
/// defaults. Unreadable files and TOML syntax or type errors are returned.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    match load_from_file(path) {
        Ok(cfg) => Ok(cfg),
        Err(e) if is_missing_file(&e) => Ok(AppConfig::default()),
        Err(e) => Err(e.context(format!("failed to load config from {path}"))),
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), fall back to defaults when the
    /// file is absent, then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_or_default(&config_path())?;
        cfg.apply_env_overrides();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; blank values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("SERVER_HOST") { self.server.host = host; }
        if let Some(port) = get("PORT").or_else(|| get("SERVER_PORT")).and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(w) = get("TOKIO_WORKER_THREADS").and_then(|v| v.parse().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(f) = get("DATA_FILE") { self.storage.data_file = f; }
        if let Some(d) = get("IMAGES_DIR") { self.storage.images_dir = d; }
        if let Some(s) = get("JWT_SECRET") { self.auth.jwt_secret = s; }
        if let Some(ttl) = get("TOKEN_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.auth.token_ttl_secs = ttl;
        }
        if let Some(u) = get("ADMIN_USER") { self.auth.admin_user = u; }
        if let Some(p) = get("ADMIN_PASSWORD") { self.auth.admin_password = p; }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_file.trim().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            return Err(anyhow!("auth.jwt_secret must not be empty; set it in config.toml or JWT_SECRET"));
        }
        if self.token_ttl_secs == 0 {
            return Err(anyhow!("auth.token_ttl_secs must be a positive number of seconds"));
        }
        if self.admin_user.trim().is_empty() {
            return Err(anyhow!("auth.admin_user must not be empty"));
        }
        Ok(())
    }
}
