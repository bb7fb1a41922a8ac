pub mod calib_pipeline;
pub mod logger;
