use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller identity and bearer token for the GenVR API.
///
/// Both values are supplied by the caller; the crate never derives or
/// persists them.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// GenVR user identifier, sent as `uid` on every call.
    pub uid: String,
    /// API key, sent as a bearer authorization header.
    pub api_key: String,
}

impl Credentials {
    pub fn new(uid: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            api_key: api_key.into(),
        }
    }
}

/// One unit of work: the parameters for a single generation job.
///
/// `index` is the job's position in the originating batch and is stable
/// for reporting. `params` holds the model parameters verbatim, including
/// any `data:...;base64,` media payloads. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub index: usize,
    /// Remote pipeline category (e.g. "imgedit").
    pub category: String,
    /// Remote pipeline subcategory (e.g. "background_change").
    pub subcategory: String,
    pub params: Map<String, Value>,
}

impl JobRequest {
    pub fn new(
        index: usize,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        params: Map<String, Value>,
    ) -> Self {
        Self {
            index,
            category: category.into(),
            subcategory: subcategory.into(),
            params,
        }
    }
}

/// Handle to a submitted job.
///
/// The remote protocol requires the category/subcategory pair on every
/// status and response call, not just on submit, so the handle carries
/// them alongside the task id.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub task_id: String,
    pub category: String,
    pub subcategory: String,
}

/// Remote task status as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Parse a status string. Unknown values are treated as still
    /// processing, matching the remote's documented terminal set.
    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => Self::Queued,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Processing,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One parsed response from the status endpoint.
#[derive(Debug, Clone)]
pub struct PollStatus {
    pub status: TaskStatus,
    /// Error message from the remote, present when the status is `failed`.
    pub error: Option<String>,
}

/// Terminal result of one job. Computed exactly once, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobOutcome {
    /// The job finished and its output was fetched. The output is opaque:
    /// a single artifact reference or a list of references.
    Completed(Value),
    /// The remote reported failure, or a call errored.
    Failed(String),
    /// Cancellation was observed before a terminal status.
    Cancelled,
    /// The poll iteration cap was exhausted.
    TimedOut,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::TimedOut)
    }
}
