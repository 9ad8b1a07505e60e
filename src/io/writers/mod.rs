//! Output writers for displayed frames: 8-bit grayscale TIFF and JPEG, plus
//! the JSON metadata sidecar carrying the final display range.
pub mod jpeg;
pub mod metadata;
pub mod tiff;
