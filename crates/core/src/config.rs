//! Client configuration.

use url::Url;

use crate::{EpaperError, Result};

pub const DEFAULT_BASE_URL: &str = "https://epaper.zeitungsverlag-aachen.de/2.0";
pub const DEFAULT_APP_SCRIPT: &str = "/js/app-b4b5468874.js";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:79.0) Gecko/20100101 Firefox/79.0";

/// Account used to log in to the e-paper service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { user: user.into(), password: password.into() }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("user", &self.user).field("password", &"***").finish()
    }
}

/// Configuration for talking to the e-paper service.
///
/// # Example
///
/// ```rust
/// use epaper_core::{Credentials, EpaperConfig};
///
/// let config = EpaperConfig::builder()
///     .timeout(10)
///     .credentials(Credentials::new("leser@example.com", "geheim"))
///     .build();
/// assert_eq!(config.timeout, 10);
/// ```
#[derive(Debug, Clone)]
pub struct EpaperConfig {
    /// Service root without trailing slash (default: the Aachen e-paper).
    pub base_url: String,

    /// Path of the site's application script, relative to the base URL.
    pub app_script: String,

    /// Request timeout in seconds (default: 30).
    pub timeout: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Login account; anonymous when `None`.
    pub credentials: Option<Credentials>,
}

impl Default for EpaperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_script: DEFAULT_APP_SCRIPT.to_string(),
            timeout: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
        }
    }
}

impl EpaperConfig {
    /// Creates a new builder for EpaperConfig.
    pub fn builder() -> EpaperConfigBuilder {
        EpaperConfigBuilder::new()
    }

    /// Parsed base URL. Fails for anything that is not an absolute http(s) URL.
    pub fn base(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| EpaperError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(EpaperError::InvalidUrl(format!("unsupported scheme {} in {}", other, self.base_url))),
        }
    }

    /// Absolute URL for a path below the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Online reader link for a page of an issue.
    pub fn reader_url(&self, paper: &str, date: &str, page_index: usize) -> String {
        format!("{}/#/read/{}/{}?page={}", self.base_url.trim_end_matches('/'), paper, date, page_index)
    }
}

/// Builder for EpaperConfig.
#[derive(Debug, Default)]
pub struct EpaperConfigBuilder {
    config: EpaperConfig,
}

impl EpaperConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: EpaperConfig::default() }
    }

    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.config.base_url = value.into();
        self
    }

    pub fn app_script(mut self, value: impl Into<String>) -> Self {
        self.config.app_script = value.into();
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, value: u64) -> Self {
        self.config.timeout = value;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.user_agent = value.into();
        self
    }

    pub fn credentials(mut self, value: Credentials) -> Self {
        self.config.credentials = Some(value);
        self
    }

    /// Builds the config.
    pub fn build(self) -> EpaperConfig {
        self.config
    }
}
