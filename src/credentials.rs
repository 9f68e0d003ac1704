use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{IuguError, IuguResult};

/// Gateway identity. Holds both API tokens; `test_mode` selects which one is used.
#[derive(Clone)]
pub struct Credentials {
    account_id: String,
    test_token: String,
    prod_token: String,
    test_mode: bool,
}

impl Credentials {
    pub fn new(
        account_id: impl Into<String>,
        test_token: impl Into<String>,
        prod_token: impl Into<String>,
        test_mode: bool,
    ) -> IuguResult<Self> {
        let account_id = account_id.into();
        let test_token = test_token.into();
        let prod_token = prod_token.into();

        if account_id.trim().is_empty() {
            return Err(IuguError::configuration("Iugu account id is required"));
        }
        if test_token.trim().is_empty() || prod_token.trim().is_empty() {
            return Err(IuguError::configuration(
                "Both test and production API tokens are required",
            ));
        }

        Ok(Self {
            account_id,
            test_token,
            prod_token,
            test_mode,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// The token selected by `test_mode`
    pub fn active_token(&self) -> &str {
        if self.test_mode {
            &self.test_token
        } else {
            &self.prod_token
        }
    }

    /// HTTP Basic header value: the active token as user name and an empty password.
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.active_token())))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("test_mode", &self.test_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header_follows_mode() {
        let test = Credentials::new("acc", "test_token", "prod_token", true).unwrap();
        assert_eq!(test.authorization_header(), "Basic dGVzdF90b2tlbjo=");
        assert_eq!(test.active_token(), "test_token");

        let prod = Credentials::new("acc", "test_token", "prod_token", false).unwrap();
        assert_eq!(prod.authorization_header(), "Basic cHJvZF90b2tlbjo=");
        assert_eq!(prod.active_token(), "prod_token");
    }

    #[test]
    fn test_rejects_missing_values() {
        assert!(matches!(
            Credentials::new("", "t", "p", true),
            Err(IuguError::Configuration { .. })
        ));
        assert!(Credentials::new("acc", "", "p", true).is_err());
        assert!(Credentials::new("acc", "t", "  ", false).is_err());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let creds = Credentials::new("acc", "secret_test", "secret_prod", true).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret_test"));
        assert!(!debug.contains("secret_prod"));
    }
}
