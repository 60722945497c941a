use anyhow::bail;

/// Number of box channels (`cx, cy, w, h`) ahead of the class scores.
pub const BOX_CHANNELS: usize = 4;

/// Shape of a `[1, C, N]` detection output: `C` channels (4 box fields + K class scores)
/// for each of `N` anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorLayout {
    pub num_channels: usize,
    pub num_anchors: usize,
}

impl TensorLayout {
    pub fn new(num_channels: usize, num_anchors: usize) -> anyhow::Result<Self> {
        if num_channels <= BOX_CHANNELS {
            bail!("Output tensor has {num_channels} channels, need box fields plus at least one class score");
        }
        if num_anchors == 0 {
            bail!("Output tensor has no anchors");
        }
        Ok(Self {
            num_channels,
            num_anchors,
        })
    }

    /// Derives the layout from a declared output shape.
    pub fn from_shape(shape: &[usize]) -> anyhow::Result<Self> {
        match shape {
            [1, c, n] => Self::new(*c, *n),
            _ => bail!("Expected an output shape of [1, C, N], got {:?}", shape),
        }
    }

    pub fn num_classes(&self) -> usize {
        self.num_channels - BOX_CHANNELS
    }

    /// Length of the flat tensor.
    pub fn flat_len(&self) -> usize {
        self.num_channels * self.num_anchors
    }

    pub fn shape(&self) -> [usize; 3] {
        [1, self.num_channels, self.num_anchors]
    }
}
