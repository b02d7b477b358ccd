// src/config.rs

/// Fallback when `FINCAST_API_URL` is unset: the local development server.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

pub const API_URL_ENV: &str = "FINCAST_API_URL";

/// Connection settings for the analysis backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let raw = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::from_base_url(raw)
    }

    pub fn from_base_url(raw: impl Into<String>) -> Self {
        let mut base_url = raw.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn analyze_endpoint(&self) -> String {
        format!("{}/api/v1/analyze", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ApiConfig::from_base_url("http://localhost:8000/");
        assert_eq!(
            config.analyze_endpoint(),
            "http://localhost:8000/api/v1/analyze"
        );
    }

    #[test]
    fn default_points_at_local_server() {
        let config = ApiConfig::from_base_url(DEFAULT_API_URL);
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
    }
}
