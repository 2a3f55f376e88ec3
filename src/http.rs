use crate::forward::LineTransport;
use crate::sink::SinkError;
use async_trait::async_trait;
use reqwest::Client;

/// Transport that POSTs each line to an HTTP collector as a one-document
/// NDJSON body: `{"line": "..."}`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    /// Collector endpoint, e.g. "http://127.0.0.1:8080/logs".
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        HttpTransport {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn body(line: &str) -> Result<String, SinkError> {
        let doc = serde_json::json!({ "line": line });
        serde_json::to_string(&doc)
            .map(|s| s + "\n")
            .map_err(|e| SinkError::Transport(e.to_string()))
    }
}

#[async_trait]
impl LineTransport for HttpTransport {
    async fn deliver(&self, line: String) -> Result<(), SinkError> {
        let body = Self::body(&line)?;
        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(SinkError::Transport(format!(
                "collector responded with status {}: {}",
                status, text
            )))
        }
    }
}
