use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Outcome of one test as written by the in-container runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
}

impl TestRecord {
    pub fn is_skipped(&self) -> bool {
        self.skipped.unwrap_or(false)
    }

    /// A record without an explicit `"success": true` counts as failed
    pub fn passed(&self) -> bool {
        self.success.unwrap_or(false)
    }

    pub fn error_count(&self) -> usize {
        self.errors.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("output is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Result file contents: test identifier -> record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultReport {
    pub tests: BTreeMap<String, TestRecord>,
}

impl ResultReport {
    /// Decode the raw bytes read back from the container
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ReportError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(serde_json::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TestRecord)> {
        self.tests.iter()
    }
}

/// Aggregated view of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Sorted identifiers of tests that did not pass
    pub failed_tests: Vec<String>,
    pub total_errors: usize,
    pub total_tests: usize,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failed_tests.is_empty() && self.total_errors == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            crate::config::EXIT_SUCCESS
        } else {
            crate::config::EXIT_FAILURE
        }
    }
}
