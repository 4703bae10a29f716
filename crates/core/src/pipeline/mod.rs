pub mod infrastructure;
pub mod pipeline_logger;
pub mod touch_pipeline;
