use anyhow::Result;
use half::f16;
use ndarray::{Array, ArrayView2, IxDyn};
use crate::common::TensorLayout;

/// Model output, wrapper over [`Array<f32, IxDyn>`]
#[derive(Debug, Clone, Default)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl From<Vec<f32>> for X {
    fn from(x: Vec<f32>) -> Self {
        Self(Array::from_vec(x).into_dyn())
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    /// Widens a half precision output to `f32`.
    pub fn from_f16(xs: &[f16]) -> Self {
        Self::from(xs.iter().map(|x| x.to_f32()).collect::<Vec<f32>>())
    }

    /// Views the tensor as `(channel, anchor)`, checking it holds exactly `C * N` values.
    pub fn channels_view(&self, layout: &TensorLayout) -> Result<ArrayView2<'_, f32>> {
        if self.0.len() != layout.flat_len() {
            anyhow::bail!(
                "Output tensor has {} values, layout {:?} needs {}",
                self.0.len(),
                layout.shape(),
                layout.flat_len()
            );
        }
        let flat = self.0.as_slice().ok_or_else(|| anyhow::anyhow!("Output tensor is not contiguous"))?;
        Ok(ArrayView2::from_shape((layout.num_channels, layout.num_anchors), flat)?)
    }
}
