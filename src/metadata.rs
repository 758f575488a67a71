//! Acquisition metadata for the converter binary.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Provenance record for an acquired converter binary.
///
/// Stored as JSON next to the binary itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolMetadata {
    #[serde(with = "system_time_serde")]
    pub acquired_at: Option<SystemTime>,
    pub version: Option<String>,
}

mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => {
                let duration = t.duration_since(UNIX_EPOCH).unwrap_or_default();
                Some(duration.as_secs()).serialize(serializer)
            }
            None => None::<u64>.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(|s| UNIX_EPOCH + Duration::from_secs(s)))
    }
}

impl ToolMetadata {
    /// Create a record for a binary acquired now.
    pub fn now_with_version(version: impl Into<String>) -> Self {
        Self {
            acquired_at: Some(SystemTime::now()),
            version: Some(version.into()),
        }
    }

    /// Load a record from a file.
    ///
    /// Returns a default record if the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let meta: Self = serde_json::from_str(&content)?;
        Ok(meta)
    }

    /// Save the record to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Age of the recorded acquisition, if known.
    pub fn age(&self) -> Option<Duration> {
        self.acquired_at
            .and_then(|t| SystemTime::now().duration_since(t).ok())
    }
}
