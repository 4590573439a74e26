/// Error type of the relight engine.
///
/// Only asset and persistence problems surface as errors. Degenerate
/// shading parameters and stale light indices are absorbed where they occur.

use std::fmt;

/// Which input image an asset error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    BaseColor,
    NormalMap,
    DepthMap,
    Mask,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::BaseColor => "base color",
            AssetKind::NormalMap => "normal map",
            AssetKind::DepthMap => "depth map",
            AssetKind::Mask => "mask",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RelightError {
    #[error("failed to decode {asset} image: {source}")]
    AssetDecode {
        asset: AssetKind,
        #[source]
        source: image::ImageError,
    },
    #[error("{asset} image is empty")]
    EmptyAsset { asset: AssetKind },
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("scene config is not valid: {0}")]
    Config(#[from] serde_json::Error),
    #[error("pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, RelightError>;
