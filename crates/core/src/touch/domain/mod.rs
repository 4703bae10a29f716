pub mod key_layout;
pub mod touch_event;
pub mod touch_state;
pub mod touch_validator;
