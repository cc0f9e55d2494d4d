//! S3 data types

use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents an S3 bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

impl ObjectSummary {
    /// Get a human-readable size string
    pub fn size_string(&self) -> String {
        const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

        if self.size < 1024 {
            return format!("{} B", self.size);
        }

        let mut value = self.size as f64 / 1024.0;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Last non-empty `/`-separated component of an object key.
///
/// Falls back to the key itself when nothing usable remains.
pub fn file_name_of(key: &str) -> &str {
    key.split('/')
        .rev()
        .find(|part| !part.is_empty() && *part != "." && *part != "..")
        .unwrap_or(key)
}

pub(crate) fn to_chrono(timestamp: &SdkDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos()).unwrap_or_default()
}
