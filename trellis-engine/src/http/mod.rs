mod activity;
mod client;

pub use activity::{HttpActivity, HTTP_ACTIVITY};
pub use client::{HttpClient, HttpError, ReqwestHttpClient, RequestParams, ResponseData};

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};
use trellis_core::{NodeResult, ValidationError};

use crate::executor::{ExecutionError, NodeExecutor};
use crate::runtime::{ActivityOptions, RunContext};

/// Configuration for an HTTP node: optional node-level defaults plus an
/// array of per-call requests that may override them.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HttpNodeConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub requests: Vec<HttpRequestSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HttpRequestSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    // Capitalized aliases accepted for compatibility with definitions
    // written against the original wire format.
    #[serde(default, alias = "Headers")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, alias = "Body")]
    pub body: String,
}

impl HttpNodeConfig {
    /// Parse a node config. Two shapes are accepted: the object form, and
    /// (legacy) a bare array of requests.
    pub fn from_value(config: &JsonValue) -> Result<Self, ExecutionError> {
        match serde_json::from_value::<HttpNodeConfig>(config.clone()) {
            Ok(cfg) => Ok(cfg),
            Err(object_err) => {
                let requests = serde_json::from_value::<Vec<HttpRequestSpec>>(config.clone())
                    .map_err(|_| {
                        ExecutionError::InvalidConfig(format!(
                            "invalid http node config: {object_err}"
                        ))
                    })?;
                Ok(Self {
                    requests,
                    ..Default::default()
                })
            }
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.requests.is_empty() {
            if self.url.is_empty() {
                return Err(ValidationError::new(
                    "either url or requests array is required",
                ));
            }
        } else {
            for (i, req) in self.requests.iter().enumerate() {
                if req.url.is_empty() && self.url.is_empty() {
                    return Err(ValidationError::new(format!(
                        "request {i} missing url and no default url configured"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Reference executor: fans a node out into one or more HTTP requests,
/// issues them sequentially through the runtime's activity facility, and
/// aggregates a pass/fail verdict over the collected responses.
pub struct HttpNodeExecutor {
    options: ActivityOptions,
}

impl HttpNodeExecutor {
    pub fn new() -> Self {
        Self {
            options: ActivityOptions::default(),
        }
    }
}

impl Default for HttpNodeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeExecutor for HttpNodeExecutor {
    async fn execute(
        &self,
        ctx: &RunContext,
        config: &JsonValue,
    ) -> Result<NodeResult, ExecutionError> {
        let mut cfg = HttpNodeConfig::from_value(config)?;
        cfg.validate()?;

        // No requests array but a default URL: synthesize a single request
        // from the node-level defaults.
        if cfg.requests.is_empty() {
            cfg.requests.push(HttpRequestSpec {
                url: cfg.url.clone(),
                method: cfg.method.clone(),
                ..Default::default()
            });
        }

        let started = Instant::now();
        let mut results: Vec<JsonValue> = Vec::with_capacity(cfg.requests.len());

        for spec in &cfg.requests {
            let url = if spec.url.is_empty() {
                cfg.url.clone()
            } else {
                spec.url.clone()
            };
            let mut method = if spec.method.is_empty() {
                cfg.method.clone()
            } else {
                spec.method.clone()
            };
            if method.is_empty() {
                method = "GET".to_string();
            }

            let params = RequestParams {
                url,
                method,
                headers: spec.headers.clone(),
                body: spec.body.clone(),
            };
            let input = serde_json::to_value(&params)
                .map_err(|e| ExecutionError::InvalidConfig(e.to_string()))?;

            // A transport failure on one request (retries already exhausted
            // by the runtime) stops the node and is reported as a logical
            // failure, keeping the bookkeeping of the requests that did
            // complete intact.
            let payload = match ctx
                .execute_activity(HTTP_ACTIVITY, input, &self.options)
                .await
            {
                Ok(value) => value,
                Err(e) => {
                    return Ok(NodeResult::failure(format!("http activity failed: {e}")));
                }
            };

            let response: ResponseData = match serde_json::from_value(payload) {
                Ok(r) => r,
                Err(e) => {
                    return Ok(NodeResult::failure(format!("http activity failed: {e}")));
                }
            };

            results.push(json!({
                "statusCode": response.status_code,
                "headers": response.headers,
                "body": response.body,
            }));
        }

        // Post-hoc verdict: every request has already executed; the first
        // response outside [200, 299] marks the node failed.
        let mut success = true;
        let mut error = None;
        for (i, result) in results.iter().enumerate() {
            let status_code = result["statusCode"].as_u64().unwrap_or(0);
            if !(200..300).contains(&status_code) {
                success = false;
                error = Some(format!(
                    "request {i} failed with status code {status_code}"
                ));
                break;
            }
        }

        let mut data = Map::new();
        data.insert("results".to_string(), JsonValue::Array(results));
        data.insert(
            "executionTime".to_string(),
            json!(started.elapsed().as_millis() as u64),
        );

        Ok(NodeResult {
            success,
            data: Some(data),
            error,
        })
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ValidationError> {
        let cfg =
            HttpNodeConfig::from_value(config).map_err(|e| ValidationError::new(e.to_string()))?;
        cfg.validate()
    }
}
