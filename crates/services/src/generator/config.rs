use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Sampling temperature for every quiz request.
pub const TEMPERATURE: f32 = 0.7;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Sent as the `OpenAI-Project` header when set.
    pub project: Option<String>,
    pub timeout: Duration,
}

impl GeneratorConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            project: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Read configuration from the process environment.
    ///
    /// Returns `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = lookup("TUTOR_AI_API_KEY")
            .or_else(|| lookup("OPENAI_API_KEY"))
            .map(|raw| clean_key(&raw))?;
        if api_key.is_empty() {
            return None;
        }
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::new(api_key);
        if let Some(base_url) = non_empty("TUTOR_AI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(model) = non_empty("TUTOR_AI_MODEL") {
            config.model = model;
        }
        config.project = non_empty("TUTOR_AI_PROJECT");
        Some(config)
    }
}

/// Strip whitespace and the quotes `.env` editors tend to leave around keys.
fn clean_key(raw: &str) -> String {
    raw.trim()
        .trim_matches('\'')
        .trim_matches('"')
        .to_string()
}
