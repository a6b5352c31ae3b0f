use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use super::UserRecord;

/// Complete, ordered state of all users delivered in one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub records: Vec<UserRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<UserRecord>) -> Self {
        Self { records }
    }

    /// Parse a wire payload: a JSON array of `{email, password}` objects.
    pub fn parse(payload: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy with every password replaced by `mask`.
    pub fn masked(&self, mask: &str) -> Self {
        Self::new(
            self.records
                .iter()
                .map(|r| UserRecord::new(r.email.clone(), mask))
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserRecord> {
        self.records.iter()
    }
}

impl From<Vec<UserRecord>> for Snapshot {
    fn from(records: Vec<UserRecord>) -> Self {
        Self::new(records)
    }
}
