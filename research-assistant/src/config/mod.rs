use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config::{load_layered, ServerSettings};
use service_core::error::AppError;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub http: HttpSettings,
    pub llm: LlmSettings,
    #[serde(default)]
    pub credits: CreditSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct HttpSettings {
    /// Upper bound for a whole multipart upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Mark the session cookie `Secure` (enable behind HTTPS).
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            secure_cookies: false,
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct LlmSettings {
    /// Empty means "not configured": the mock provider is used.
    #[serde(default = "empty_secret")]
    pub api_key: Secret<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Serve the mock report (prefixed with the error) when the API call fails.
    #[serde(default)]
    pub fallback_to_mock: bool,
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_timeout_seconds() -> u64 {
    60
}

impl LlmSettings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct CreditSettings {
    #[serde(default = "default_initial_credits")]
    pub initial: f64,
    #[serde(default = "default_cost_per_report")]
    pub cost_per_report: f64,
}

fn default_initial_credits() -> f64 {
    100.0
}

fn default_cost_per_report() -> f64 {
    1.0
}

impl Default for CreditSettings {
    fn default() -> Self {
        Self {
            initial: default_initial_credits(),
            cost_per_report: default_cost_per_report(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;

    // Works from the workspace root and from inside the crate directory.
    let configuration_directory = if base_path.ends_with("research-assistant") {
        base_path.join("config")
    } else {
        base_path.join("research-assistant").join("config")
    };

    let mut settings: Settings = load_layered(&configuration_directory)?;

    if !settings.llm.has_api_key() {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            settings.llm.api_key = Secret::new(key);
        }
    }

    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), AppError> {
    let credits = &settings.credits;
    if credits.initial < 0.0 || !credits.initial.is_finite() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "credits.initial must be a non-negative number, got {}",
            credits.initial
        )));
    }
    if credits.cost_per_report <= 0.0 || !credits.cost_per_report.is_finite() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "credits.cost_per_report must be positive, got {}",
            credits.cost_per_report
        )));
    }
    Ok(())
}

impl Settings {
    /// Settings for tests and local experiments: mock provider, random port.
    pub fn for_testing() -> Self {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            http: HttpSettings::default(),
            llm: LlmSettings {
                api_key: empty_secret(),
                base_url: default_base_url(),
                model: default_model(),
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                timeout_seconds: 5,
                fallback_to_mock: false,
            },
            credits: CreditSettings::default(),
            telemetry: TelemetrySettings::default(),
        }
    }
}
