use serde::Deserialize;
use tracing::warn;

use crate::credentials::Credentials;
use crate::error::{IuguError, IuguResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.iugu.com/v1/{path}";
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Iugu client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IuguConfig {
    pub account_id: String,
    pub test_token: String,
    pub prod_token: String,
    /// Selects the test token when true
    #[serde(default = "default_test_mode")]
    pub test_mode: bool,
    /// URL template containing a `{path}` placeholder
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Disables TLS certificate verification. Never enable outside local testing.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_test_mode() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl IuguConfig {
    pub fn new(
        account_id: impl Into<String>,
        test_token: impl Into<String>,
        prod_token: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            test_token: test_token.into(),
            prod_token: prod_token.into(),
            test_mode: default_test_mode(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
        }
    }

    /// Loads `IUGU_*` environment variables, e.g. `IUGU_ACCOUNT_ID`, `IUGU_TEST_TOKEN`,
    /// `IUGU_PROD_TOKEN`, `IUGU_TEST_MODE`.
    pub fn from_env() -> IuguResult<Self> {
        // Values stay strings; typed fields are converted on deserialization so
        // numeric-looking tokens keep their exact text.
        Self::from_source(config::Environment::with_prefix("IUGU").prefix_separator("_"))
    }

    pub fn from_source<S>(source: S) -> IuguResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: IuguConfig = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IuguResult<()> {
        if self.account_id.trim().is_empty() {
            return Err(IuguError::configuration("IUGU_ACCOUNT_ID cannot be empty"));
        }

        if self.test_token.trim().is_empty() || self.prod_token.trim().is_empty() {
            return Err(IuguError::configuration(
                "IUGU_TEST_TOKEN and IUGU_PROD_TOKEN must both be set",
            ));
        }

        if !self.endpoint.contains(PATH_PLACEHOLDER) {
            return Err(IuguError::configuration(format!(
                "Endpoint must contain a {} placeholder, got {}",
                PATH_PLACEHOLDER, self.endpoint
            )));
        }

        if self.timeout_secs == 0 {
            return Err(IuguError::configuration("Timeout must be greater than 0"));
        }

        if self.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for the Iugu client");
        }

        Ok(())
    }

    pub fn credentials(&self) -> IuguResult<Credentials> {
        Credentials::new(
            self.account_id.clone(),
            self.test_token.clone(),
            self.prod_token.clone(),
            self.test_mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn test_defaults_from_minimal_source() {
        let source = File::from_str(
            r#"{"account_id": "acc", "test_token": "t", "prod_token": "p"}"#,
            FileFormat::Json,
        );
        let config = IuguConfig::from_source(source).unwrap();
        assert!(config.test_mode);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.credentials().unwrap().active_token(), "t");
    }

    #[test]
    fn test_numeric_looking_env_tokens_keep_their_text() {
        let vars: config::Map<String, String> = [
            ("IUGU_ACCOUNT_ID", "000123"),
            ("IUGU_TEST_TOKEN", "0042"),
            ("IUGU_PROD_TOKEN", "1e5"),
            ("IUGU_TEST_MODE", "false"),
            ("IUGU_TIMEOUT_SECS", "15"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let source = config::Environment::with_prefix("IUGU")
            .prefix_separator("_")
            .source(Some(vars));

        let config = IuguConfig::from_source(source).unwrap();
        assert_eq!(config.account_id, "000123");
        assert_eq!(config.test_token, "0042");
        assert_eq!(config.prod_token, "1e5");
        assert!(!config.test_mode);
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let source = File::from_str(r#"{"account_id": "acc", "test_token": "t"}"#, FileFormat::Json);
        assert!(matches!(
            IuguConfig::from_source(source),
            Err(IuguError::Configuration { .. })
        ));

        let source = File::from_str(
            r#"{"account_id": "acc", "test_token": "t", "prod_token": ""}"#,
            FileFormat::Json,
        );
        assert!(IuguConfig::from_source(source).is_err());
    }

    #[test]
    fn test_endpoint_needs_placeholder() {
        let mut config = IuguConfig::new("acc", "t", "p");
        assert!(config.validate().is_ok());

        config.endpoint = "https://api.iugu.com/v1/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = IuguConfig::new("acc", "t", "p");
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
