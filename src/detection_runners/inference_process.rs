use crate::data::X;

/// The inference engine the detector drives. Loading and executing the model happen behind it.
///
/// Dropping the engine releases whatever it holds (session, device memory, ...).
pub trait InferenceProcess: Send {
    type Input; // camera frame, already rotated and converted

    /// Declared output shape, `[1, C, N]` for a detection head.
    fn output_shape(&self) -> Vec<usize>;

    /// Runs the model on one frame and returns its raw output tensor.
    fn inference(&mut self, xs: &Self::Input) -> anyhow::Result<X>;
}
