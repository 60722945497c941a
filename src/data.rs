mod conf_threshold;
mod filesystem_access;
mod input_wrapper;
mod label_table;
mod time_calc;
pub mod send_channels;

pub use conf_threshold::ConfidenceThreshold;
pub use filesystem_access::FsAccess;
pub use input_wrapper::X;
pub use label_table::LabelTable;
pub use send_channels::{frame_channel, DetectionEvent, FrameReceiver, FrameSender};
pub use time_calc::TimeCalc;
