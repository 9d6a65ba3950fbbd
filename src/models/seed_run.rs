use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker recording which version of a seed dataset the store holds.
///
/// One row per source. A dataset is reapplied only when its embedded version
/// is newer than the recorded one, or when an operator forces a reseed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedRun {
    pub source: String,
    pub version: u32,
    /// Resources inserted by the last application.
    pub node_count: usize,
    pub applied_at: DateTime<Utc>,
}

/// Outcome of one dataset during a seeding pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeedStatus {
    /// Rows were deleted and reinserted.
    Applied,
    /// The recorded version already matched; nothing was written.
    UpToDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedReport {
    pub source: String,
    pub version: u32,
    pub status: SeedStatus,
    /// Resources inserted by this pass, or held from the last one when up to date.
    pub node_count: usize,
    /// Resources removed before reinserting.
    pub removed: usize,
}
