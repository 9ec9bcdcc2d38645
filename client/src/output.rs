//! Notification log handed to the presentation layer.
//!
//! Records are newline-delimited JSON in arrival order. A consumer drains
//! the log, which clears it; nothing is replayed.

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// One notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputRecord {
    pub from: String,
    pub msg_type: String,
    /// Empty for server responses.
    #[serde(default)]
    pub channel: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Default)]
pub struct OutputSink {
    buffer: String,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record as a JSON line.
    pub fn push(&mut self, record: &OutputRecord) -> Result<(), ClientError> {
        let line = serde_json::to_string(record).map_err(|e| ClientError::Output(e.to_string()))?;
        self.buffer.push_str(&line);
        self.buffer.push('\n');
        Ok(())
    }

    /// Take everything logged so far.
    pub fn drain(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Parsed view of the pending records, without draining.
    pub fn records(&self) -> Vec<OutputRecord> {
        self.buffer
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}
