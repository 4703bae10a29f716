pub mod contour_fingertip_localizer;
pub mod difference_shadow_localizer;
pub mod skin_color_hand_localizer;
