use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use anyhow::{Result, anyhow};

/// Port the response service listens on when the origin is derived.
pub const SERVICE_PORT: u16 = 5000;

/// Path appended to the origin for every send.
pub const GENERATE_PATH: &str = "/generate-response";

/// Environment variable that overrides the configured origin.
pub const ORIGIN_ENV: &str = "DOCTHERS_ORIGIN";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub origin: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Pick the endpoint: explicit flag, then env var, then config file,
    /// then the derived local default.
    pub fn endpoint(&self, cli_origin: Option<&str>) -> Endpoint {
        let env_origin = std::env::var(ORIGIN_ENV).ok();
        self.endpoint_with(cli_origin, env_origin.as_deref())
    }

    fn endpoint_with(&self, cli_origin: Option<&str>, env_origin: Option<&str>) -> Endpoint {
        // Blank values are skipped per source, so they never shadow a later one
        [cli_origin, env_origin, self.origin.as_deref()]
            .into_iter()
            .flatten()
            .find(|o| !o.trim().is_empty())
            .map(Endpoint::from_origin)
            .unwrap_or_else(|| Endpoint::derive("http", "localhost"))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("docthers").join("config.json"))
    }
}

/// Where send cycles are posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    origin: String,
}

impl Endpoint {
    pub fn from_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Build the origin from a scheme and host plus the fixed service port.
    pub fn derive(scheme: &str, host: &str) -> Self {
        let scheme = scheme.trim_end_matches(':');
        Self::from_origin(&format!("{}://{}:{}", scheme, host, SERVICE_PORT))
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.origin, GENERATE_PATH)
    }
}
