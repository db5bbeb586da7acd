use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TensorError {
    #[error("Index Out of Range: index {index:?} for shape {shape:?}")]
    IndexOutOfRange { index: Vec<usize>, shape: Vec<usize> },

    #[error("Channel Out of Range: channel {channel} for {channels} channels")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("Length Mismatch: initializer has {actual} elements, storage holds {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Dimension Mismatch: {0}")]
    DimensionMismatch(String),

    #[error(
        "Non-Integer Downsample: scale ({scale_x}, {scale_y}) does not divide extent {rows}x{cols}"
    )]
    NonIntegerDownsample {
        rows: usize,
        cols: usize,
        scale_x: usize,
        scale_y: usize,
    },

    #[error("Invalid Shape: {0:?}, every extent must be positive")]
    InvalidShape(Vec<usize>),

    #[error("Invalid Transform: {0}")]
    InvalidTransform(String),

    #[error("Lazy Output: write target has {depth} pending transforms")]
    LazyOutput { depth: usize },
}
