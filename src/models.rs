use serde::{Deserialize, Serialize};

/// Result of a best-effort batch: rows that failed are skipped and reported
/// here while the rest stay committed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub applied: usize,
    pub skipped: Vec<RowFailure>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// One rejected batch row, by input position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFailure {
    pub index: usize,
    pub reason: String,
}
