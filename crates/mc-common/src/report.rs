//! Send Report Model
//!
//! Per-recipient outcome of one completed dispatch. A report with failed
//! entries is still a successful call: `sent` and `failed` are always
//! surfaced together and nothing here retries the failed recipients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope returned by `POST /send-email`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendResponse {
    pub report: SendReport,
}

/// Outcome of one dispatch. Ordering is whatever the remote service returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SendReport {
    pub sent: Vec<String>,
    pub failed: Vec<FailedRecipient>,
}

/// A recipient the remote service could not deliver to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailedRecipient {
    pub name: String,
    pub reason: String,
}

impl FailedRecipient {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Sent and failed counts of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub sent: usize,
    pub failed: usize,
}

impl SendReport {
    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// At least one recipient failed
    pub fn is_partial_failure(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            sent: self.sent_count(),
            failed: self.failed_count(),
        }
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sent, {} failed", self.sent, self.failed)
    }
}

impl fmt::Display for SendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Successfully sent ({})", self.sent_count())?;
        for name in &self.sent {
            writeln!(f, "  {}", name)?;
        }
        writeln!(f, "Failed ({})", self.failed_count())?;
        for failure in &self.failed {
            writeln!(f, "  {}: {}", failure.name, failure.reason)?;
        }
        Ok(())
    }
}
