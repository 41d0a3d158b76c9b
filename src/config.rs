use std::env;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

const DEVELOPMENT_URL: &str = "http://localhost:4000";
const PRODUCTION_URL: &str = "https://gift-recommender.fly.dev";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which fixed origin the recommendation service is reached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

/// Connection settings for the recommendation service.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Config {
    /// Settings for the given mode's fixed origin.
    pub fn for_mode(mode: Mode) -> Self {
        let origin = match mode {
            Mode::Development => DEVELOPMENT_URL,
            Mode::Production => PRODUCTION_URL,
        };
        Self {
            base_url: Url::parse(origin).expect("built-in origin must be a valid URL"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Settings for an explicit origin (used by tests and self-hosters).
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Resolve settings from the environment.
    ///
    /// `GIFTWIZARD_MODE` selects `development` (default) or `production`;
    /// `GIFTWIZARD_API_URL` overrides the origin outright. Invalid values fall
    /// back to the development origin with a logged warning rather than
    /// aborting, since the wizard can run fully degraded.
    pub fn from_env() -> Self {
        if let Ok(raw) = env::var("GIFTWIZARD_API_URL") {
            match Url::parse(&raw) {
                Ok(base_url) => {
                    info!("Using API origin override: {base_url}");
                    return Self::with_base_url(base_url);
                }
                Err(e) => {
                    warn!("Invalid GIFTWIZARD_API_URL '{raw}': {e}, ignoring override");
                }
            }
        }

        let mode = match env::var("GIFTWIZARD_MODE").as_deref() {
            Ok("production") => Mode::Production,
            Ok("development") | Err(_) => Mode::Development,
            Ok(other) => {
                warn!("Unknown GIFTWIZARD_MODE '{other}', defaulting to development");
                Mode::Development
            }
        };
        info!("Resolved API mode: {mode:?}");
        Self::for_mode(mode)
    }

    /// Join an API path onto the base URL. The join is relative so a path
    /// prefix in an override like `http://host/gifts` is kept rather than
    /// replaced.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(path.trim_start_matches('/'))
            .expect("API paths are static and valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_origins() {
        let dev = Config::for_mode(Mode::Development);
        assert_eq!(dev.base_url.as_str(), "http://localhost:4000/");

        let prod = Config::for_mode(Mode::Production);
        assert!(prod.base_url.scheme() == "https");
    }

    #[test]
    fn test_endpoint_join() {
        let config = Config::for_mode(Mode::Development);
        let url = config.endpoint("/api/generate-image-pairs");
        assert_eq!(
            url.as_str(),
            "http://localhost:4000/api/generate-image-pairs"
        );
    }

    #[test]
    fn test_endpoint_keeps_override_path_prefix() {
        let base = Url::parse("http://gifts.internal/gifts").unwrap();
        let config = Config::with_base_url(base);
        let url = config.endpoint("/api/generate-final-images");
        assert_eq!(
            url.as_str(),
            "http://gifts.internal/gifts/api/generate-final-images"
        );
    }
}
