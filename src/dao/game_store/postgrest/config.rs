use super::error::{RestDaoError, RestResult};

/// Runtime configuration describing how to reach the PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the REST endpoint, e.g. `https://project.example.co/rest/v1`.
    pub base_url: String,
    /// API key sent as both bearer token and `apikey` header.
    pub api_key: String,
}

impl RestConfig {
    /// Construct a configuration from an explicit base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RestResult<Self> {
        let base_url =
            std::env::var("MATCHDAY_REST_URL").map_err(|_| RestDaoError::MissingEnvVar {
                var: "MATCHDAY_REST_URL",
            })?;
        let api_key =
            std::env::var("MATCHDAY_REST_KEY").map_err(|_| RestDaoError::MissingEnvVar {
                var: "MATCHDAY_REST_KEY",
            })?;

        Ok(Self::new(base_url, api_key))
    }
}
