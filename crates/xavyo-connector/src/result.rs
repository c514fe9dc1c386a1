//! Structured operation outcomes.
//!
//! An [`OperationResult`] is a tree: each node names an operation, carries a
//! status and optional message, and nests the results of its sub-steps.

use serde::{Deserialize, Serialize};

use crate::error::ConnectorResult;
use crate::types::OperationStatus;

/// Outcome record of one operation and its sub-steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    operation: String,
    status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    subresults: Vec<OperationResult>,
}

impl OperationResult {
    /// Create a result with status [`OperationStatus::Unknown`].
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: OperationStatus::Unknown,
            message: None,
            error_code: None,
            subresults: Vec::new(),
        }
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[must_use]
    pub fn status(&self) -> OperationStatus {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    #[must_use]
    pub fn subresults(&self) -> &[OperationResult] {
        &self.subresults
    }

    /// Find a direct sub-result by operation name.
    #[must_use]
    pub fn subresult(&self, operation: &str) -> Option<&OperationResult> {
        self.subresults.iter().find(|r| r.operation == operation)
    }

    pub fn record_success(&mut self) {
        self.status = OperationStatus::Success;
        self.message = None;
        self.error_code = None;
    }

    pub fn record_not_applicable(&mut self, message: impl Into<String>) {
        self.status = OperationStatus::NotApplicable;
        self.message = Some(message.into());
    }

    pub fn record_partial_error(&mut self, message: impl Into<String>) {
        self.status = OperationStatus::PartialError;
        self.message = Some(message.into());
    }

    pub fn record_fatal_error(&mut self, message: impl Into<String>) {
        self.status = OperationStatus::FatalError;
        self.message = Some(message.into());
    }

    /// Record the outcome of a fallible call: success, or a fatal error
    /// carrying the error's message and code.
    pub fn record<T>(&mut self, outcome: &ConnectorResult<T>) {
        match outcome {
            Ok(_) => self.record_success(),
            Err(e) => {
                self.record_fatal_error(e.to_string());
                self.error_code = Some(e.error_code().to_string());
            }
        }
    }

    /// Record `outcome`, fold in the sub-results and hand the outcome back.
    ///
    /// Drivers end an operation with it so the recorded tree and the
    /// returned error always agree.
    pub fn finish<T>(&mut self, outcome: ConnectorResult<T>) -> ConnectorResult<T> {
        self.record(&outcome);
        self.compute_status();
        outcome
    }

    /// Append a child result and return it for recording.
    pub fn create_subresult(&mut self, operation: impl Into<String>) -> &mut OperationResult {
        self.subresults.push(OperationResult::new(operation));
        let last = self.subresults.len() - 1;
        &mut self.subresults[last]
    }

    /// Set this node's status to the worst of its own recorded status and
    /// its children's.
    ///
    /// Children are computed first. A node without children keeps its own
    /// status, and a node still `Unknown` takes its children's. A fatal child
    /// counts as a partial error when some other child succeeded; a fatal
    /// status recorded on the node itself is kept.
    pub fn compute_status(&mut self) {
        if self.subresults.is_empty() {
            return;
        }
        for child in &mut self.subresults {
            child.compute_status();
        }

        let worst = self
            .subresults
            .iter()
            .map(|r| r.status)
            .max()
            .unwrap_or(OperationStatus::Unknown);
        let any_success = self
            .subresults
            .iter()
            .any(|r| r.status == OperationStatus::Success);
        let from_children = if worst == OperationStatus::FatalError && any_success {
            OperationStatus::PartialError
        } else {
            worst
        };

        self.status = match self.status {
            OperationStatus::Unknown => from_children,
            own => own.max(from_children),
        };

        if self.message.is_none() && self.status.is_error() {
            self.message = self
                .subresults
                .iter()
                .filter(|r| r.status.is_error())
                .find_map(|r| r.message.clone());
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            OperationStatus::Success | OperationStatus::NotApplicable
        )
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;

    #[test]
    fn test_new_result_is_unknown() {
        let result = OperationResult::new("test");
        assert_eq!(result.status(), OperationStatus::Unknown);
        assert!(!result.is_success());
        assert!(!result.is_error());
    }

    #[test]
    fn test_record_error_outcome() {
        let mut result = OperationResult::new("connect");
        let outcome: ConnectorResult<()> = Err(ConnectorError::communication("refused"));
        result.record(&outcome);

        assert_eq!(result.status(), OperationStatus::FatalError);
        assert_eq!(result.error_code(), Some("COMMUNICATION_FAILED"));
        assert!(result.message().unwrap().contains("refused"));
    }

    #[test]
    fn test_compute_status_all_success() {
        let mut result = OperationResult::new("test");
        result.create_subresult("configuration").record_success();
        result.create_subresult("connection").record_success();
        result.compute_status();
        assert!(result.is_success());
    }

    #[test]
    fn test_compute_status_mixed_is_partial() {
        let mut result = OperationResult::new("test");
        result.create_subresult("configuration").record_success();
        result
            .create_subresult("connection")
            .record_fatal_error("host unreachable");
        result.compute_status();

        assert_eq!(result.status(), OperationStatus::PartialError);
        assert_eq!(result.message(), Some("host unreachable"));
    }

    #[test]
    fn test_compute_status_all_fatal() {
        let mut result = OperationResult::new("test");
        result.create_subresult("connection").record_fatal_error("down");
        result.compute_status();
        assert_eq!(result.status(), OperationStatus::FatalError);
    }

    #[test]
    fn test_compute_status_nested() {
        let mut result = OperationResult::new("test");
        let schema = result.create_subresult("schema");
        schema.create_subresult("fetch").record_success();
        schema.create_subresult("parse").record_partial_error("2 types skipped");
        result.compute_status();

        assert_eq!(result.status(), OperationStatus::PartialError);
        assert_eq!(
            result.subresult("schema").unwrap().status(),
            OperationStatus::PartialError
        );
    }

    #[test]
    fn test_compute_status_keeps_own_fatal() {
        let mut result = OperationResult::new("modify");
        result.record_fatal_error("resource rejected the change");
        result.create_subresult("validate").record_success();
        result
            .create_subresult("script")
            .record_not_applicable("no scripts requested");
        result.compute_status();

        assert_eq!(result.status(), OperationStatus::FatalError);
        assert_eq!(result.message(), Some("resource rejected the change"));
    }

    #[test]
    fn test_compute_status_own_success_with_failing_child() {
        let mut result = OperationResult::new("add");
        result.record_success();
        result.create_subresult("script").record_partial_error("script skipped");
        result.compute_status();

        assert_eq!(result.status(), OperationStatus::PartialError);
        assert_eq!(result.message(), Some("script skipped"));
    }

    #[test]
    fn test_finish_returns_outcome() {
        let mut result = OperationResult::new("delete_object");
        result.create_subresult("script").record_success();
        let outcome: ConnectorResult<()> =
            result.finish(Err(ConnectorError::object_not_found("uid=jdoe")));

        assert!(outcome.is_err());
        assert_eq!(result.status(), OperationStatus::FatalError);
        assert_eq!(result.error_code(), Some("OBJECT_NOT_FOUND"));
    }

    #[test]
    fn test_serialization() {
        let mut result = OperationResult::new("test");
        result.create_subresult("connection").record_success();
        result.compute_status();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["subresults"][0]["operation"], "connection");
        assert!(json.get("message").is_none());
    }
}
