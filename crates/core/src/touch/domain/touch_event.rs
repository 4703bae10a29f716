use std::time::Duration;

use serde::{Serialize, Serializer};

use super::key_layout::KeyId;
use crate::shared::point::Point;

/// A validated touch, emitted once per touch on entering `Touching`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TouchEvent {
    pub key: KeyId,
    pub finger: Point,
    pub shadow: Point,
    /// Fingertip-to-shadow distance in pixels.
    pub distance: f64,
    /// In `[0, 1]`.
    pub confidence: f64,
    #[serde(rename = "timestamp_ms", serialize_with = "millis")]
    pub timestamp: Duration,
    pub frame_index: u64,
    pub validated: bool,
}

fn millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}
