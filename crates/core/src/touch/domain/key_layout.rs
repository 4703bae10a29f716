use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::point::Point;

/// Identifier of a key on the virtual keyboard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(pub String);

impl KeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyboard geometry, supplied by whoever renders the keyboard.
pub trait KeyLayout: Send {
    /// Key whose hit region, grown by `margin` pixels, contains `point`.
    fn key_at(&self, point: Point, margin: f64) -> Option<KeyId>;
}
