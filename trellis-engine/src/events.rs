use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{HttpClient, RequestParams};

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    #[serde(rename = "run.submitted")]
    Submitted {
        domain: String,
        #[serde(rename = "runId")]
        run_id: i64,
        #[serde(rename = "workflowId")]
        workflow_id: String,
    },
    #[serde(rename = "run.completed")]
    Completed {
        domain: String,
        #[serde(rename = "runId")]
        run_id: i64,
        #[serde(rename = "workflowId")]
        workflow_id: String,
        status: String,
    },
}

/// Observer notification channel. Delivery is best effort: failures are
/// logged and never propagated to the caller.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn broadcast(&self, event: &RunEvent);
}

pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn broadcast(&self, _event: &RunEvent) {}
}

/// Fire-and-forget POST of each event to a configured URL.
pub struct WebhookEventSink {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl WebhookEventSink {
    pub fn new(url: String, http: Arc<dyn HttpClient>) -> Self {
        Self { url, http }
    }
}

#[async_trait]
impl EventSink for WebhookEventSink {
    async fn broadcast(&self, event: &RunEvent) {
        let body = match serde_json::to_string(event) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode run event");
                return;
            }
        };

        let params = RequestParams {
            url: self.url.clone(),
            method: "POST".to_string(),
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body,
        };

        let http = self.http.clone();
        tokio::spawn(async move {
            if let Err(e) = http.send(params).await {
                tracing::warn!(error = %e, "event webhook delivery failed");
            }
        });
    }
}
