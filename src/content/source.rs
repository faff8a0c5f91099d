use std::future::Future;

use reqwest::header::CACHE_CONTROL;
use serde_json::Value;

use super::{ContentError, View};

/// Anything that can answer `?view=<name>` with a JSON document.
pub trait ViewSource: Send + Sync {
    fn fetch_view(&self, view: View) -> impl Future<Output = Result<Value, ContentError>> + Send;
}

/// The spreadsheet-backed JSON endpoint.
pub struct HttpViewSource {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpViewSource {
    /// With no endpoint every fetch fails with `NotConfigured`.
    pub fn new(client: reqwest::Client, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }
}

impl ViewSource for HttpViewSource {
    async fn fetch_view(&self, view: View) -> Result<Value, ContentError> {
        let endpoint = self.endpoint.as_deref().ok_or(ContentError::NotConfigured)?;

        // `t` busts CDN caches in front of the script endpoint
        let cache_bust = chrono::Utc::now().timestamp_millis().to_string();
        let response = self
            .client
            .get(endpoint)
            .query(&[("view", view.name()), ("t", cache_bust.as_str())])
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
