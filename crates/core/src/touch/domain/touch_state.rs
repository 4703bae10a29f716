use serde::Serialize;

use super::key_layout::KeyId;

/// Why a frame was classified as invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// A hand is present but no fingertip was found in it.
    NoKeyDetected,
    /// The fingertip is on a key but no shadow was found.
    NoShadow,
    /// Shadow validation is on and the shadow lies on no key.
    OutsideKey,
    /// Shadow validation is on and the shadow lies on another key.
    ShadowMismatch,
    /// Contact passed debouncing but scored below the minimum confidence.
    LowConfidence,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TouchState {
    #[default]
    Idle,
    Hovering {
        key: KeyId,
        distance: f64,
    },
    Debouncing {
        key: KeyId,
        frames: u32,
    },
    Touching {
        key: KeyId,
        distance: f64,
        confidence: f64,
    },
    Invalid {
        reason: InvalidReason,
    },
}

impl TouchState {
    pub fn key(&self) -> Option<&KeyId> {
        match self {
            TouchState::Hovering { key, .. }
            | TouchState::Debouncing { key, .. }
            | TouchState::Touching { key, .. } => Some(key),
            TouchState::Idle | TouchState::Invalid { .. } => None,
        }
    }

    pub fn is_touching(&self) -> bool {
        matches!(self, TouchState::Touching { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_only_for_keyed_states() {
        let key = KeyId::new("A");
        assert_eq!(
            TouchState::Debouncing {
                key: key.clone(),
                frames: 1
            }
            .key(),
            Some(&key)
        );
        assert!(TouchState::Idle.key().is_none());
        assert!(TouchState::Invalid {
            reason: InvalidReason::LowConfidence
        }
        .key()
        .is_none());
    }

    #[test]
    fn test_serializes_with_state_tag() {
        let json = serde_json::to_value(TouchState::Invalid {
            reason: InvalidReason::ShadowMismatch,
        })
        .unwrap();
        assert_eq!(json["state"], "invalid");
        assert_eq!(json["reason"], "shadow_mismatch");
    }
}
