//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Which gateway environment API calls go to.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    #[default]
    Sandbox,
    Production,
}

/// Payment gateway credentials and merchant identity.
///
/// `merchant_account_id` is the account webhook notifications must belong
/// to; notifications for any other account are dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub merchant_account_id: String,

    #[serde(default)]
    pub environment: GatewayEnvironment,

    #[serde(default)]
    pub merchant_id: String,

    #[serde(default)]
    pub public_key: String,

    /// Never logged; `Debug` prints a redaction marker.
    pub private_key: SecretString,
}

impl GatewayConfig {
    pub fn is_sandbox(&self) -> bool {
        self.environment == GatewayEnvironment::Sandbox
    }

    /// Validate gateway configuration against the server environment.
    pub fn validate(&self, server_environment: &Environment) -> Result<(), ValidationError> {
        if self.merchant_account_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__MERCHANT_ACCOUNT_ID"));
        }
        if self.private_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__PRIVATE_KEY"));
        }
        if *server_environment == Environment::Production && self.is_sandbox() {
            return Err(ValidationError::SandboxGatewayInProduction);
        }
        Ok(())
    }
}
