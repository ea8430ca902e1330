use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::http::client::{HttpClient, RequestParams};
use crate::runtime::{Activity, ActivityError};

pub const HTTP_ACTIVITY: &str = "http.request";

/// The activity body behind the HTTP node executor: performs one request
/// through the shared client. Runs under the runtime's retry policy, so a
/// transient transport failure here is retried transparently.
pub struct HttpActivity {
    client: Arc<dyn HttpClient>,
}

impl HttpActivity {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Activity for HttpActivity {
    fn name(&self) -> &str {
        HTTP_ACTIVITY
    }

    async fn execute(&self, input: JsonValue) -> Result<JsonValue, ActivityError> {
        let params: RequestParams = serde_json::from_value(input)
            .map_err(|e| ActivityError::InvalidInput(e.to_string()))?;

        let response = self
            .client
            .send(params)
            .await
            .map_err(|e| ActivityError::Failed(e.to_string()))?;

        serde_json::to_value(&response).map_err(|e| ActivityError::Failed(e.to_string()))
    }
}
