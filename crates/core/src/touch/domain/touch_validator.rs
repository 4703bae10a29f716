use std::time::Duration;

use super::key_layout::{KeyId, KeyLayout};
use super::touch_event::TouchEvent;
use super::touch_state::{InvalidReason, TouchState};
use crate::shared::config::ValidatorConfig;
use crate::shared::point::Point;

/// Per-frame input to [`TouchValidator::validate`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchInput {
    /// `None` when no hand was found this frame.
    pub hand_confidence: Option<f64>,
    pub fingertip: Option<Point>,
    pub shadow: Option<Point>,
    pub timestamp: Duration,
    pub frame_index: u64,
}

/// Result of one validation step. `event` is set only on the frame that
/// enters `Touching`.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchUpdate {
    pub state: TouchState,
    pub event: Option<TouchEvent>,
}

/// Key that has been under a contact-distance fingertip for `frames`
/// consecutive frames, starting at `since`.
#[derive(Clone, Debug, PartialEq)]
struct Candidate {
    key: KeyId,
    frames: u32,
    since: Duration,
}

/// Key whose touch event has been emitted and not yet released.
#[derive(Clone, Debug, PartialEq)]
struct Press {
    key: KeyId,
    confidence: f64,
}

/// Debounced touch state machine.
///
/// Transitions:
/// - hand lost, or fingertip on no key → `Idle`
/// - `d < touch` → `Debouncing`, then `Touching` once the same key has
///   been the candidate for at least `debounce_frames` frames *and*
///   `debounce_millis` of frame time. A different key restarts both.
/// - `touch ≤ d ≤ hover` → `Hovering`, `d > hover` → `Idle`
/// - `Touching` holds on the same key while `d ≤ release`, then drops
///   back to `Hovering` (or `Idle` above hover).
///
/// A press lasts until `d > release`, the hand is lost or the fingertip
/// leaves the key. Frames missing a shadow or fingertip in between are
/// reported as `Invalid` but do not end the press, so contact resuming
/// on the same key returns to `Touching` without a second event.
///
/// Both debounce gates are applied together. At low or uneven frame
/// rates they disagree, so both stay configurable.
pub struct TouchValidator {
    config: ValidatorConfig,
    state: TouchState,
    candidate: Option<Candidate>,
    pressed: Option<Press>,
}

impl TouchValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            state: TouchState::Idle,
            candidate: None,
            pressed: None,
        }
    }

    pub fn state(&self) -> &TouchState {
        &self.state
    }

    pub fn validate(&mut self, input: &TouchInput, layout: &dyn KeyLayout) -> TouchUpdate {
        let mut event = None;
        self.state = self.step(input, layout, &mut event);
        TouchUpdate {
            state: self.state.clone(),
            event,
        }
    }

    fn step(
        &mut self,
        input: &TouchInput,
        layout: &dyn KeyLayout,
        event: &mut Option<TouchEvent>,
    ) -> TouchState {
        let margin = self.config.key_hit_margin;

        let Some(hand_confidence) = input.hand_confidence else {
            return self.release(TouchState::Idle);
        };
        let Some(finger) = input.fingertip else {
            return self.abandon(invalid(InvalidReason::NoKeyDetected));
        };
        let Some(key) = layout.key_at(finger, margin) else {
            return self.release(TouchState::Idle);
        };
        if let Some(press) = self.pressed.as_ref().filter(|p| p.key != key) {
            log::debug!("fingertip moved from pressed {} to {key}", press.key);
            self.pressed = None;
        }
        let Some(shadow) = input.shadow else {
            return self.abandon(invalid(InvalidReason::NoShadow));
        };
        if self.config.require_shadow_validation {
            match layout.key_at(shadow, margin) {
                None => return self.abandon(invalid(InvalidReason::OutsideKey)),
                Some(shadow_key) if shadow_key != key => {
                    return self.abandon(invalid(InvalidReason::ShadowMismatch))
                }
                Some(_) => {}
            }
        }

        let distance = finger.distance(shadow);

        if let Some(confidence) = self.pressed.as_ref().map(|p| p.confidence) {
            if distance <= self.config.release_threshold {
                self.candidate = None;
                return TouchState::Touching {
                    key,
                    distance,
                    confidence,
                };
            }
            log::debug!("released {key} at distance {distance:.2}");
            return self.release(self.hover_or_idle(key, distance));
        }

        if distance >= self.config.touch_threshold {
            return self.abandon(self.hover_or_idle(key, distance));
        }

        let candidate = match self.candidate.take() {
            Some(c) if c.key == key => Candidate {
                frames: c.frames.saturating_add(1),
                ..c
            },
            _ => Candidate {
                key: key.clone(),
                frames: 1,
                since: input.timestamp,
            },
        };
        let elapsed = input.timestamp.saturating_sub(candidate.since);
        if candidate.frames < self.config.debounce_frames
            || elapsed < self.config.debounce_duration()
        {
            let frames = candidate.frames;
            self.candidate = Some(candidate);
            return TouchState::Debouncing { key, frames };
        }

        let proximity = (1.0 - distance / self.config.touch_threshold).clamp(0.0, 1.0);
        let confidence = (hand_confidence * proximity).clamp(0.0, 1.0);
        if confidence < self.config.min_confidence {
            log::debug!(
                "touch on {key} rejected, confidence {confidence:.2} below {:.2}",
                self.config.min_confidence
            );
            return self.abandon(invalid(InvalidReason::LowConfidence));
        }

        log::debug!(
            "touch on {key} after {} frames / {} ms, confidence {confidence:.2}",
            candidate.frames,
            elapsed.as_millis()
        );
        self.candidate = None;
        self.pressed = Some(Press {
            key: key.clone(),
            confidence,
        });
        *event = Some(TouchEvent {
            key: key.clone(),
            finger,
            shadow,
            distance,
            confidence,
            timestamp: input.timestamp,
            frame_index: input.frame_index,
            validated: true,
        });
        TouchState::Touching {
            key,
            distance,
            confidence,
        }
    }

    fn hover_or_idle(&self, key: KeyId, distance: f64) -> TouchState {
        if distance <= self.config.hover_threshold {
            TouchState::Hovering { key, distance }
        } else {
            TouchState::Idle
        }
    }

    /// Drops any debounce progress and moves to `next`.
    fn abandon(&mut self, next: TouchState) -> TouchState {
        self.candidate = None;
        next
    }

    /// Ends the current press as well.
    fn release(&mut self, next: TouchState) -> TouchState {
        self.pressed = None;
        self.abandon(next)
    }
}

impl Default for TouchValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

fn invalid(reason: InvalidReason) -> TouchState {
    TouchState::Invalid { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    /// Two keys side by side: `A` for x < 100, `B` for 100 ≤ x < 200.
    struct TwoKeys;

    impl KeyLayout for TwoKeys {
        fn key_at(&self, point: Point, margin: f64) -> Option<KeyId> {
            if point.y < -margin || point.y >= 100.0 + margin {
                return None;
            }
            match point.x {
                x if (-margin..100.0).contains(&x) => Some(KeyId::new("A")),
                x if (100.0..200.0 + margin).contains(&x) => Some(KeyId::new("B")),
                _ => None,
            }
        }
    }

    fn input(finger: (f64, f64), distance: f64, millis: u64, index: u64) -> TouchInput {
        TouchInput {
            hand_confidence: Some(0.9),
            fingertip: Some(Point::new(finger.0, finger.1)),
            shadow: Some(Point::new(finger.0, finger.1 + distance)),
            timestamp: Duration::from_millis(millis),
            frame_index: index,
        }
    }

    fn key(id: &str) -> KeyId {
        KeyId::new(id)
    }

    #[test]
    fn test_single_contact_frame_only_debounces() {
        let mut validator = TouchValidator::default();
        let update = validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        assert_eq!(
            update.state,
            TouchState::Debouncing {
                key: key("A"),
                frames: 1
            }
        );
        assert!(update.event.is_none());
    }

    #[test]
    fn test_two_frames_over_50ms_touch_with_hand_confidence() {
        let mut validator = TouchValidator::default();
        validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        let update = validator.validate(&input((50.0, 50.0), 0.0, 60, 1), &TwoKeys);

        let TouchState::Touching { key: k, confidence, .. } = &update.state else {
            panic!("expected touching, got {:?}", update.state);
        };
        assert_eq!(k, &key("A"));
        assert_relative_eq!(*confidence, 0.9);

        let event = update.event.expect("event on entering touching");
        assert_eq!(event.key, key("A"));
        assert_eq!(event.frame_index, 1);
        assert!(event.validated);
        assert_relative_eq!(event.confidence, 0.9);
    }

    #[test]
    fn test_two_frames_too_close_in_time_keep_debouncing() {
        let mut validator = TouchValidator::default();
        validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        let update = validator.validate(&input((50.0, 50.0), 0.0, 10, 1), &TwoKeys);
        assert_eq!(
            update.state,
            TouchState::Debouncing {
                key: key("A"),
                frames: 2
            }
        );
        let update = validator.validate(&input((50.0, 50.0), 0.0, 55, 2), &TwoKeys);
        assert!(update.state.is_touching());
    }

    #[test]
    fn test_key_switch_resets_debounce() {
        let mut validator = TouchValidator::default();
        validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        let update = validator.validate(&input((150.0, 50.0), 0.0, 60, 1), &TwoKeys);
        assert_eq!(
            update.state,
            TouchState::Debouncing {
                key: key("B"),
                frames: 1
            }
        );
        assert!(update.event.is_none());

        // Timer restarted at 60 ms for B.
        let update = validator.validate(&input((150.0, 50.0), 0.0, 100, 2), &TwoKeys);
        assert!(!update.state.is_touching());
        let update = validator.validate(&input((150.0, 50.0), 0.0, 110, 3), &TwoKeys);
        assert!(update.state.is_touching());
    }

    #[test]
    fn test_one_event_per_touch() {
        let mut validator = TouchValidator::default();
        let events: Vec<_> = (0..10)
            .filter_map(|i| {
                validator
                    .validate(&input((50.0, 50.0), 0.2, i * 33, i), &TwoKeys)
                    .event
            })
            .collect();
        assert_eq!(events.len(), 1);
        assert!(validator.state().is_touching());
    }

    #[test]
    fn test_release_hysteresis() {
        let mut validator = TouchValidator::default();
        validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        validator.validate(&input((50.0, 50.0), 0.0, 60, 1), &TwoKeys);

        // Above touch but within release: still touching, original confidence.
        let update = validator.validate(&input((50.0, 50.0), 1.8, 90, 2), &TwoKeys);
        let TouchState::Touching { confidence, .. } = update.state else {
            panic!("expected touching, got {:?}", update.state);
        };
        assert_relative_eq!(confidence, 0.9);
        assert!(update.event.is_none());

        let update = validator.validate(&input((50.0, 50.0), 2.5, 120, 3), &TwoKeys);
        assert_eq!(
            update.state,
            TouchState::Hovering {
                key: key("A"),
                distance: 2.5
            }
        );
    }

    #[test]
    fn test_retouch_after_release_emits_again() {
        let mut validator = TouchValidator::default();
        let mut events = 0;
        let frames = [(0.0, 0), (0.0, 60), (2.5, 90), (0.0, 120), (0.0, 180)];
        for (i, (distance, millis)) in frames.into_iter().enumerate() {
            let update = validator.validate(&input((50.0, 50.0), distance, millis, i as u64), &TwoKeys);
            events += usize::from(update.event.is_some());
        }
        assert_eq!(events, 2);
    }

    #[test]
    fn test_shadow_dropout_during_touch_emits_once() {
        let mut validator = TouchValidator::default();
        let mut events = 0;
        let mut states = Vec::new();
        let frames = [(true, 0), (true, 60), (true, 90), (false, 120), (true, 150), (true, 210)];
        for (i, (shadow_seen, millis)) in frames.into_iter().enumerate() {
            let mut frame = input((50.0, 50.0), 0.0, millis, i as u64);
            if !shadow_seen {
                frame.shadow = None;
            }
            let update = validator.validate(&frame, &TwoKeys);
            events += usize::from(update.event.is_some());
            states.push(update.state);
        }
        assert_eq!(events, 1);
        assert_eq!(
            states[3],
            TouchState::Invalid {
                reason: InvalidReason::NoShadow
            }
        );
        let TouchState::Touching { confidence, .. } = &states[4] else {
            panic!("expected touching after dropout, got {:?}", states[4]);
        };
        assert_relative_eq!(*confidence, 0.9);
        assert!(states[5].is_touching());
    }

    #[test]
    fn test_fingertip_dropout_keeps_press() {
        let mut validator = TouchValidator::default();
        validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        assert!(validator
            .validate(&input((50.0, 50.0), 0.0, 60, 1), &TwoKeys)
            .event
            .is_some());
        let no_finger = TouchInput {
            fingertip: None,
            ..input((50.0, 50.0), 0.0, 90, 2)
        };
        validator.validate(&no_finger, &TwoKeys);
        let update = validator.validate(&input((50.0, 50.0), 0.0, 120, 3), &TwoKeys);
        assert!(update.state.is_touching());
        assert!(update.event.is_none());
    }

    #[test]
    fn test_moving_to_another_key_ends_press() {
        let mut validator = TouchValidator::default();
        validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        validator.validate(&input((50.0, 50.0), 0.0, 60, 1), &TwoKeys);
        let update = validator.validate(&input((150.0, 50.0), 0.0, 90, 2), &TwoKeys);
        assert_eq!(
            update.state,
            TouchState::Debouncing {
                key: key("B"),
                frames: 1
            }
        );
        let update = validator.validate(&input((50.0, 50.0), 0.0, 120, 3), &TwoKeys);
        assert!(!update.state.is_touching());
    }

    #[test]
    fn test_hand_loss_ends_press() {
        let mut validator = TouchValidator::default();
        validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        validator.validate(&input((50.0, 50.0), 0.0, 60, 1), &TwoKeys);
        let lost = TouchInput {
            timestamp: Duration::from_millis(90),
            ..TouchInput::default()
        };
        validator.validate(&lost, &TwoKeys);
        let update = validator.validate(&input((50.0, 50.0), 0.0, 120, 3), &TwoKeys);
        assert_eq!(
            update.state,
            TouchState::Debouncing {
                key: key("A"),
                frames: 1
            }
        );
    }

    #[rstest]
    #[case::hovering(2.0, TouchState::Hovering { key: key("A"), distance: 2.0 })]
    #[case::far_above_hover(10.0, TouchState::Idle)]
    fn test_distance_bands(#[case] distance: f64, #[case] expected: TouchState) {
        let mut validator = TouchValidator::default();
        let update = validator.validate(&input((50.0, 50.0), distance, 0, 0), &TwoKeys);
        assert_eq!(update.state, expected);
    }

    #[test]
    fn test_hand_loss_resets_to_idle() {
        let mut validator = TouchValidator::default();
        validator.validate(&input((50.0, 50.0), 0.0, 0, 0), &TwoKeys);
        let lost = TouchInput {
            timestamp: Duration::from_millis(30),
            ..TouchInput::default()
        };
        assert_eq!(validator.validate(&lost, &TwoKeys).state, TouchState::Idle);
        // Debounce restarted: one more contact frame is not enough.
        let update = validator.validate(&input((50.0, 50.0), 0.0, 90, 2), &TwoKeys);
        assert!(!update.state.is_touching());
    }

    #[test]
    fn test_fingertip_off_keyboard_is_idle() {
        let mut validator = TouchValidator::default();
        let update = validator.validate(&input((500.0, 50.0), 0.0, 0, 0), &TwoKeys);
        assert_eq!(update.state, TouchState::Idle);
    }

    #[rstest]
    #[case::no_fingertip(None, Some((50.0, 50.0)), InvalidReason::NoKeyDetected)]
    #[case::no_shadow(Some((50.0, 50.0)), None, InvalidReason::NoShadow)]
    fn test_missing_observations(
        #[case] finger: Option<(f64, f64)>,
        #[case] shadow: Option<(f64, f64)>,
        #[case] reason: InvalidReason,
    ) {
        let mut validator = TouchValidator::default();
        let update = validator.validate(
            &TouchInput {
                hand_confidence: Some(0.9),
                fingertip: finger.map(|(x, y)| Point::new(x, y)),
                shadow: shadow.map(|(x, y)| Point::new(x, y)),
                ..TouchInput::default()
            },
            &TwoKeys,
        );
        assert_eq!(update.state, TouchState::Invalid { reason });
    }

    #[rstest]
    #[case::shadow_on_other_key((99.5, 50.0), (100.5, 50.0), InvalidReason::ShadowMismatch)]
    #[case::shadow_off_keyboard((50.0, 99.0), (50.0, 300.0), InvalidReason::OutsideKey)]
    fn test_shadow_validation(
        #[case] finger: (f64, f64),
        #[case] shadow: (f64, f64),
        #[case] reason: InvalidReason,
    ) {
        let mut validator = TouchValidator::new(ValidatorConfig {
            require_shadow_validation: true,
            ..ValidatorConfig::default()
        });
        let update = validator.validate(
            &TouchInput {
                hand_confidence: Some(1.0),
                fingertip: Some(Point::new(finger.0, finger.1)),
                shadow: Some(Point::new(shadow.0, shadow.1)),
                ..TouchInput::default()
            },
            &TwoKeys,
        );
        assert_eq!(update.state, TouchState::Invalid { reason });
    }

    #[test]
    fn test_low_confidence_touch_is_invalid() {
        let mut validator = TouchValidator::default();
        let weak = |millis, index| TouchInput {
            hand_confidence: Some(0.4),
            ..input((50.0, 50.0), 0.0, millis, index)
        };
        validator.validate(&weak(0, 0), &TwoKeys);
        let update = validator.validate(&weak(60, 1), &TwoKeys);
        assert_eq!(
            update.state,
            TouchState::Invalid {
                reason: InvalidReason::LowConfidence
            }
        );
        assert!(update.event.is_none());
    }

    #[rstest]
    #[case::extreme_hand_confidence(7.5, 0.0)]
    #[case::negative_hand_confidence(-3.0, 0.0)]
    #[case::near_threshold(1.0, 0.999)]
    fn test_confidence_stays_in_unit_range(#[case] hand: f64, #[case] distance: f64) {
        let mut validator = TouchValidator::new(ValidatorConfig {
            min_confidence: 0.0,
            ..ValidatorConfig::default()
        });
        let frame = |millis, index| TouchInput {
            hand_confidence: Some(hand),
            ..input((50.0, 50.0), distance, millis, index)
        };
        validator.validate(&frame(0, 0), &TwoKeys);
        let update = validator.validate(&frame(60, 1), &TwoKeys);
        let TouchState::Touching { confidence, .. } = update.state else {
            panic!("expected touching, got {:?}", update.state);
        };
        assert!((0.0..=1.0).contains(&confidence));
    }
}
