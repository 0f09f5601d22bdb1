use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database URL, created on first use
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Fallback OpenAI key for requests that don't carry one
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Chat completion API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Root of the fan site used to verify recommendations
    #[serde(default = "default_verification_base_url")]
    pub verification_base_url: String,

    /// Timeout applied to every fan site request
    #[serde(default = "default_verification_timeout_secs")]
    pub verification_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_url() -> String {
    "sqlite://showscout.db".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_verification_base_url() -> String {
    "https://www.netflixlovers.it".to_string()
}

fn default_verification_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Configured fallback key, ignoring blank values
    pub fn default_api_key(&self) -> Option<String> {
        self.openai_api_key
            .as_ref()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}
