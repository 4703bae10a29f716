pub mod contour;
pub mod detection;
pub mod imaging;
pub mod pipeline;
pub mod shared;
pub mod touch;
pub mod video;
