pub mod fingertip_localizer;
pub mod hand_localizer;
pub mod observation;
pub mod shadow_localizer;
