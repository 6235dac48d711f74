//! Runtime configuration read from `EDUMATE_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use edumate_core::env_config::{env_non_empty, env_parse_with_default};

const DEFAULT_LLM_API_URL: &str = "https://api.openai.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    pub db_path: PathBuf,
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    /// SearxNG base URL. Web search is disabled without one.
    pub search_url: Option<String>,
    /// Key clients must send as `X-API-Key`.
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_path", &self.db_path)
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("llm_api_url", &self.llm_api_url)
            .field("search_url", &self.search_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("edumate").join("edumate.db")
}

impl AppConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            db_path: env_non_empty("EDUMATE_DB_PATH").map_or_else(default_db_path, PathBuf::from),
            llm_api_key: env_non_empty("EDUMATE_LLM_API_KEY"),
            llm_api_url: env_non_empty("EDUMATE_LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_owned()),
            search_url: env_non_empty("EDUMATE_SEARCH_URL"),
            api_key: env_non_empty("EDUMATE_API_KEY"),
            request_timeout: Duration::from_secs(
                env_parse_with_default("EDUMATE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS).max(1),
            ),
            fetch_timeout: Duration::from_secs(
                env_parse_with_default("EDUMATE_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS).max(1),
            ),
        }
    }

    /// Create the database's parent directory if needed.
    pub(crate) fn ensure_db_dir(&self) -> std::io::Result<()> {
        match self.db_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}
