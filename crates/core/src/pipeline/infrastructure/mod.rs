pub mod latest_frame_worker;
