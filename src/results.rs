use serde::Serialize;
use serde_json::Value;

use crate::types::{JobOutcome, JobRequest};

/// Reference to one generated artifact within a batch's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRef {
    /// Index of the originating request in the batch.
    pub request_index: usize,
    /// Position within that request's output list.
    pub position: usize,
    /// The artifact reference itself (typically a URL).
    pub reference: String,
}

/// Running totals for a batch, emitted with the final event and kept on
/// the finalized [`BatchRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// The aggregate over one batch invocation.
///
/// Owned exclusively by the coordinator while the batch runs; handed to
/// the caller once every dispatched job has reached a terminal outcome.
/// Items are ordered by original request index regardless of completion
/// order, and every submitted request contributes exactly one pair,
/// including requests skipped due to cancellation.
#[derive(Debug, Clone)]
pub struct BatchRun {
    successful: usize,
    failed: usize,
    cancelled: usize,
    items: Vec<(JobRequest, JobOutcome)>,
}

impl BatchRun {
    pub(crate) fn new() -> Self {
        Self {
            successful: 0,
            failed: 0,
            cancelled: 0,
            items: Vec::new(),
        }
    }

    /// Record one terminal outcome. Cancelled outcomes are counted
    /// separately and are not failures for reporting purposes.
    pub(crate) fn record(&mut self, request: JobRequest, outcome: JobOutcome) {
        match &outcome {
            JobOutcome::Completed(_) => self.successful += 1,
            JobOutcome::Failed(_) | JobOutcome::TimedOut => self.failed += 1,
            JobOutcome::Cancelled => self.cancelled += 1,
        }
        self.items.push((request, outcome));
    }

    pub(crate) fn finalize(&mut self) {
        self.items.sort_by_key(|(req, _)| req.index);
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    /// The (request, outcome) pairs, ordered by request index.
    pub fn items(&self) -> &[(JobRequest, JobOutcome)] {
        &self.items
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.total(),
            successful: self.successful,
            failed: self.failed,
            cancelled: self.cancelled,
        }
    }

    /// Flatten every `Completed` output into a flat, index-ordered list of
    /// artifact references. An output that is a single string yields one
    /// artifact at position 0; a list yields one per string element.
    pub fn artifacts(&self) -> Vec<ArtifactRef> {
        let mut refs = Vec::new();
        for (request, outcome) in &self.items {
            let output = match outcome {
                JobOutcome::Completed(output) => output,
                _ => continue,
            };
            match output {
                Value::String(url) => refs.push(ArtifactRef {
                    request_index: request.index,
                    position: 0,
                    reference: url.clone(),
                }),
                Value::Array(urls) => {
                    for (position, url) in urls.iter().enumerate() {
                        if let Some(url) = url.as_str() {
                            refs.push(ArtifactRef {
                                request_index: request.index,
                                position,
                                reference: url.to_string(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        refs
    }

    /// Serialize the full result set for display or file export.
    ///
    /// Embedded `data:...;base64,` payloads in the input parameters are
    /// replaced with a placeholder; the real payloads stay untouched in
    /// the retained [`JobRequest`]s for any later re-submission.
    pub fn export(&self) -> anyhow::Result<Value> {
        let entries: Vec<Value> = self
            .items
            .iter()
            .map(|(request, outcome)| {
                Ok(serde_json::json!({
                    "index": request.index,
                    "category": request.category,
                    "subcategory": request.subcategory,
                    "params": mask_embedded_data(&Value::Object(request.params.clone())),
                    "outcome": serde_json::to_value(outcome)?,
                }))
            })
            .collect::<anyhow::Result<_>>()?;

        Ok(serde_json::json!({
            "summary": serde_json::to_value(self.summary())?,
            "results": entries,
        }))
    }
}

/// Replace every `data:<mime>;base64,` string in a value tree with a
/// `[BASE64: <mime>]` placeholder, recursing through arrays and objects.
/// Non-data-URI values pass through unchanged.
pub fn mask_embedded_data(value: &Value) -> Value {
    match value {
        Value::String(s) if s.starts_with("data:") => {
            let mime = s
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .filter(|m| !m.is_empty())
                .unwrap_or("unknown");
            Value::String(format!("[BASE64: {}]", mime))
        }
        Value::Array(items) => Value::Array(items.iter().map(mask_embedded_data).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), mask_embedded_data(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
