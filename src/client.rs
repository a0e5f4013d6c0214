use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};

use crate::cancel::CancelToken;
use crate::error::{GenVrError, Result};
use crate::types::*;

/// Fixed wait between status polls. Total job latency includes response
/// time on top of this, since the interval is not measured from call start.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll cap per job. The cap counts iterations, not elapsed time, so a
/// slow but responding remote extends wall-clock duration without
/// triggering a timeout. Nominally five minutes at the default interval.
pub const MAX_POLL_ITERATIONS: u32 = 300;

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(120);
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Async client for the GenVR generation API.
///
/// Drives the three-step protocol for one job: submit via `/v2/generate`,
/// poll `/v2/status` once per interval, and fetch the output from
/// `/v2/response` once the task completes. All three calls carry the
/// bearer token and the caller's `uid`.
///
/// # Example
/// ```no_run
/// use genvr_batch::{Credentials, GenVrClient};
///
/// # async fn example() -> genvr_batch::Result<()> {
/// let client = GenVrClient::new(
///     "https://api.genvrresearch.com",
///     Credentials::new("user-123", "sk-..."),
/// );
/// let output = client
///     .generate("imgedit", "background_change", serde_json::Map::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GenVrClient {
    http: Client,
    endpoint: String,
    credentials: Credentials,
    poll_interval: Duration,
}

impl GenVrClient {
    /// Create a new client for the given API endpoint.
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http: Client::new(),
            endpoint: normalize(endpoint.into()),
            credentials,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Override the wait between status polls. The iteration cap is
    /// unchanged, so shortening the interval also shortens the nominal
    /// timeout ceiling.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    // ── Protocol calls ──────────────────────────────────────────────

    /// Submit a job. Returns a handle carrying the remote task id.
    pub async fn submit(&self, request: &JobRequest) -> Result<JobHandle> {
        let mut body = Map::new();
        body.insert("uid".into(), Value::String(self.credentials.uid.clone()));
        body.insert("category".into(), Value::String(request.category.clone()));
        body.insert(
            "subcategory".into(),
            Value::String(request.subcategory.clone()),
        );
        for (k, v) in &request.params {
            body.insert(k.clone(), v.clone());
        }

        let json = self
            .post_json("/v2/generate", &Value::Object(body), SUBMIT_TIMEOUT)
            .await?;

        let task_id = json
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                GenVrError::InvalidResponse("Generate response missing data.id".into())
            })?;

        Ok(JobHandle {
            task_id,
            category: request.category.clone(),
            subcategory: request.subcategory.clone(),
        })
    }

    /// Check a submitted job's status.
    pub async fn status(&self, handle: &JobHandle) -> Result<PollStatus> {
        let body = self.handle_payload(handle);
        let json = self
            .post_json("/v2/status", &body, STATUS_TIMEOUT)
            .await?;

        let status = json
            .pointer("/data/status")
            .and_then(|v| v.as_str())
            .map(TaskStatus::parse)
            .ok_or_else(|| {
                GenVrError::InvalidResponse("Status response missing data.status".into())
            })?;

        let error = json
            .pointer("/data/error")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(PollStatus { status, error })
    }

    /// Fetch the output of a completed job.
    pub async fn fetch_output(&self, handle: &JobHandle) -> Result<Value> {
        let body = self.handle_payload(handle);
        let json = self
            .post_json("/v2/response", &body, RESPONSE_TIMEOUT)
            .await?;

        json.pointer("/data/output").cloned().ok_or_else(|| {
            GenVrError::InvalidResponse("Response payload missing data.output".into())
        })
    }

    // ── Full workflow ───────────────────────────────────────────────

    /// Run one job to its terminal outcome.
    ///
    /// Submits, then polls at the configured interval for at most
    /// [`MAX_POLL_ITERATIONS`] iterations. The cancellation token is
    /// checked at the top of every iteration and again before each sleep.
    /// Every error, remote or local, is captured into the outcome; this
    /// never returns `Err`. A single bad status call is terminal for the
    /// job: there is no retry.
    pub async fn run_job(&self, request: &JobRequest, cancel: &CancelToken) -> JobOutcome {
        match self.run_inner(request, cancel).await {
            Ok(output) => JobOutcome::Completed(output),
            Err(GenVrError::Cancelled) => JobOutcome::Cancelled,
            Err(GenVrError::Timeout) => JobOutcome::TimedOut,
            Err(GenVrError::Remote(message)) => JobOutcome::Failed(message),
            Err(e) => JobOutcome::Failed(e.to_string()),
        }
    }

    /// Single-request convenience: run the full workflow and surface any
    /// failure as a typed error instead of an outcome. Intended for
    /// interactive call sites with no sibling work to protect.
    pub async fn generate(
        &self,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        params: Map<String, Value>,
    ) -> Result<Value> {
        let request = JobRequest::new(0, category, subcategory, params);
        self.run_inner(&request, &CancelToken::new()).await
    }

    async fn run_inner(&self, request: &JobRequest, cancel: &CancelToken) -> Result<Value> {
        if cancel.is_cancelled() {
            return Err(GenVrError::Cancelled);
        }

        let handle = self.submit(request).await?;

        for _ in 0..MAX_POLL_ITERATIONS {
            if cancel.is_cancelled() {
                return Err(GenVrError::Cancelled);
            }

            let poll = self.status(&handle).await?;
            match poll.status {
                TaskStatus::Completed => return self.fetch_output(&handle).await,
                TaskStatus::Failed => {
                    let message = poll.error.unwrap_or_else(|| "Unknown error".to_string());
                    return Err(GenVrError::Remote(message));
                }
                TaskStatus::Queued | TaskStatus::Processing => {}
            }

            if cancel.is_cancelled() {
                return Err(GenVrError::Cancelled);
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(GenVrError::Timeout)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn handle_payload(&self, handle: &JobHandle) -> Value {
        serde_json::json!({
            "id": handle.task_id,
            "uid": self.credentials.uid,
            "category": handle.category,
            "subcategory": handle.subcategory,
        })
    }

    /// POST a JSON body and validate the response envelope: non-2xx is an
    /// HTTP error, `success: false` (or a missing flag) is a remote
    /// failure carrying the response's `message`.
    async fn post_json(&self, path: &str, body: &Value, timeout: Duration) -> Result<Value> {
        let url = format!("{}{}", self.endpoint, path);
        let resp = self
            .http
            .post(&url)
            .timeout(timeout)
            .bearer_auth(&self.credentials.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenVrError::Network {
                context: format!(
                    "Cannot reach GenVR at {} - is the endpoint correct?",
                    self.endpoint
                ),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(GenVrError::Http {
                status,
                body: body_text,
            });
        }

        let json: Value = resp.json().await.map_err(|e| GenVrError::Network {
            context: format!("Failed to parse GenVR {} response", path),
            source: e,
        })?;

        let success = json
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !success {
            let message = json
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error")
                .to_string();
            return Err(GenVrError::Remote(message));
        }

        Ok(json)
    }
}

impl crate::ExecuteJob for GenVrClient {
    fn execute(
        &self,
        request: &JobRequest,
        cancel: &CancelToken,
    ) -> impl std::future::Future<Output = JobOutcome> + Send {
        self.run_job(request, cancel)
    }
}
