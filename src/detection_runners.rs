pub mod inference_process;
pub mod model_info;
pub mod nms;
pub mod onnx;

pub use inference_process::InferenceProcess;
pub use model_info::OnnxModelInfo;
pub use nms::{nms, Nms, IOU_THRESHOLD};
