//! Contact backend talking to the site's REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use greenearth_core::{
    contact::{ContactReceipt, ContactRequest},
    ports::{ContactPort, PortError},
};

/// Backend used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

const CONTACT_PATH: &str = "/api/contact";

/// Error body returned with non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,

    // FastAPI-style errors carry `detail`, either a string or a list of issues.
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or_else(|| {
            self.detail
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
    }
}

/// Contact port posting JSON to `<base>/api/contact`.
pub struct HttpContactPort {
    client: Client,
    endpoint: String,
}

impl HttpContactPort {
    /// Create a port for the backend at `base_url`. A trailing slash is ignored.
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{CONTACT_PATH}", base_url.trim_end_matches('/')),
        }
    }

    /// Full URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContactPort for HttpContactPort {
    async fn submit(&self, request: &ContactRequest) -> Result<ContactReceipt, PortError> {
        debug!(endpoint = %self.endpoint, "posting contact request");
        let req = self.client.post(&self.endpoint).json(request);
        let receipt = fetch_json::<ContactReceipt>(req).await?;

        if receipt.success {
            Ok(receipt)
        } else {
            Err(PortError::NotAccepted {
                message: receipt.message,
            })
        }
    }
}

/// Build a shareable contact port for the backend at `base_url`.
#[must_use]
pub fn port(client: Client, base_url: &str) -> Arc<dyn ContactPort> {
    Arc::new(HttpContactPort::new(client, base_url))
}

// Send, then decode JSON; non-success statuses keep the backend's message.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let resp = req.send().await?;
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);
        return Err(PortError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    resp.json().await.map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let port = HttpContactPort::new(Client::new(), "https://api.greenearth.in/");
        assert_eq!(port.endpoint(), "https://api.greenearth.in/api/contact");
    }

    #[test]
    fn error_body_prefers_message_over_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"Server error","detail":"ignored"}"#).expect("json");
        assert_eq!(body.into_message().as_deref(), Some("Server error"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail":"Not Found"}"#).expect("json");
        assert_eq!(body.into_message().as_deref(), Some("Not Found"));

        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":[{"loc":["body","email"]}]}"#).expect("json");
        assert_eq!(body.into_message(), None);
    }
}
