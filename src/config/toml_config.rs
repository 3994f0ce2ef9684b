use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const BB_BASE_URL: &str = "https://www.blissfulbrides.sg";
pub const TWN_ENDPOINT: &str = "https://twnprod.theweddingnotebook.com/graphql";
pub const BRIDELY_BASE_URL: &str = "https://www.bridely.sg";

/// Optional settings file. Every section and key falls back to the
/// production defaults, so an empty file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub http: HttpSettings,
    pub bb: BbSettings,
    pub twn: TwnSettings,
    pub bridely: BridelySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        );
        headers.insert("Accept-Language".to_string(), "en-US,en;q=0.9".to_string());

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
            headers,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BbSettings {
    pub base_url: String,
}

impl Default for BbSettings {
    fn default() -> Self {
        Self {
            base_url: BB_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwnSettings {
    pub endpoint: String,
    pub page_size: usize,
    pub category: String,
}

impl Default for TwnSettings {
    fn default() -> Self {
        Self {
            endpoint: TWN_ENDPOINT.to_string(),
            page_size: 50,
            category: "venues".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridelySettings {
    pub base_url: String,
}

impl Default for BridelySettings {
    fn default() -> Self {
        Self {
            base_url: BRIDELY_BASE_URL.to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScrapeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScrapeError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("http.user_agent", &self.http.user_agent)?;
        validation::validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 600)?;
        validation::validate_url("bb.base_url", &self.bb.base_url)?;
        validation::validate_url("twn.endpoint", &self.twn.endpoint)?;
        validation::validate_range("twn.page_size", self.twn.page_size, 1, 500)?;
        validation::validate_non_empty_string("twn.category", &self.twn.category)?;
        validation::validate_url("bridely.base_url", &self.bridely.base_url)?;
        Ok(())
    }
}

impl Validate for ScrapeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
