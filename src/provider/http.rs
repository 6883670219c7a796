//! Shared HTTP client and status mapping.

use std::sync::OnceLock;

use crate::error::BridgeError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Map a non-200 HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> BridgeError {
    match status {
        401 | 403 => BridgeError::Authentication(body.to_string()),
        _ => BridgeError::api(status, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_authentication() {
        assert!(matches!(
            status_to_error(401, "bad key"),
            BridgeError::Authentication(message) if message == "bad key"
        ));
        assert!(matches!(status_to_error(403, ""), BridgeError::Authentication(_)));
    }

    #[test]
    fn other_statuses_map_to_api_errors() {
        assert!(matches!(
            status_to_error(500, "boom"),
            BridgeError::Api { status: 500, message } if message == "boom"
        ));
    }
}
