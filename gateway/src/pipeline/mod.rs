//! Frame processing pipeline.
//!
//! - `enrich`: runs recognition, attention and hand-raising for one face crop
//! - `frame`: localizes faces in a frame and fans enrichment out across them

mod enrich;
mod frame;

pub use enrich::enrich_face;
pub use frame::FrameOrchestrator;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Identifies the frame a face belongs to; forwarded to the attention and
/// hand-raising services.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub lecture_id: &'a str,
    pub timestamp: &'a str,
}

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Check that `timestamp` is an ISO-8601 date or date-time.
///
/// Offsets (`Z`, `+00:00`) are optional; a bare date is accepted too.
pub fn validate_timestamp(timestamp: &str) -> Result<()> {
    if timestamp.trim().is_empty() {
        return Err(Error::InvalidInput("Timestamp is required".to_string()));
    }

    let with_offset = match timestamp.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => timestamp.to_string(),
    };

    let valid = DateTime::parse_from_rfc3339(timestamp).is_ok()
        || OFFSET_DATETIME_FORMATS
            .iter()
            .any(|fmt| DateTime::parse_from_str(&with_offset, fmt).is_ok())
        || NAIVE_DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).is_ok())
        || NaiveDate::parse_from_str(timestamp, "%Y-%m-%d").is_ok();

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(
            "Invalid timestamp format. Must be ISO 8601".to_string(),
        ))
    }
}

/// Check the caller-supplied frame identifiers before any backend is called.
pub fn validate_frame_input(lecture_id: &str, timestamp: &str) -> Result<()> {
    if lecture_id.trim().is_empty() {
        return Err(Error::InvalidInput("Lecture ID is required".to_string()));
    }
    validate_timestamp(timestamp)
}
