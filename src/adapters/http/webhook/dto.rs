//! Data Transfer Objects for the gateway webhook endpoint.

use serde::Deserialize;

/// Form-encoded body posted by the gateway.
///
/// Both fields are optional so a partial delivery can still be
/// acknowledged instead of rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayWebhookForm {
    pub bt_signature: Option<String>,
    pub bt_payload: Option<String>,
}

impl GatewayWebhookForm {
    /// Signature and payload, when both are present and non-empty.
    pub fn into_parts(self) -> Option<(String, String)> {
        match (self.bt_signature, self.bt_payload) {
            (Some(signature), Some(payload)) if !signature.is_empty() && !payload.is_empty() => {
                Some((signature, payload))
            }
            _ => None,
        }
    }
}
