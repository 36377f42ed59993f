use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("invalid raster dimensions {width}x{height} with {channels} channel(s)")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("raster needs {required} bytes but scratch capacity is {capacity}")]
    BufferOverflow { required: usize, capacity: usize },
    #[error("failed to allocate {bytes} bytes of scratch memory")]
    AllocationFailure { bytes: usize },
    #[error("worker pool: {0}")]
    WorkerPool(String),
    #[error("stage {index} reads and writes the same buffer")]
    AliasedStage { index: usize },
    #[error("stage {index} reads a buffer no earlier stage has written")]
    UnwrittenInput { index: usize },
    #[error("stage {index} writes the caller's source image")]
    SourceWrite { index: usize },
    #[error("pipeline has no stages")]
    EmptyPipeline,
}

impl Error {
    /// Infrastructure failures abort a whole batch; the rest only affect the
    /// image being processed.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidArgument(_)
            | Self::AllocationFailure { .. }
            | Self::WorkerPool(_)
            | Self::AliasedStage { .. }
            | Self::UnwrittenInput { .. }
            | Self::SourceWrite { .. }
            | Self::EmptyPipeline => true,
            Self::SizeMismatch { .. }
            | Self::InvalidDimensions { .. }
            | Self::BufferOverflow { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn overflow_is_per_image_and_allocation_is_fatal() {
        let overflow = Error::BufferOverflow {
            required: 10,
            capacity: 4,
        };
        assert!(!overflow.is_fatal());
        assert!(Error::AllocationFailure { bytes: 1 }.is_fatal());
        assert!(Error::InvalidArgument("workers must be >= 1").is_fatal());
    }

    #[test]
    fn display_names_both_sizes() {
        let msg = Error::BufferOverflow {
            required: 48,
            capacity: 16,
        }
        .to_string();
        assert!(msg.contains("48"));
        assert!(msg.contains("16"));
    }
}
