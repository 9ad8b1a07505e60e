//! I/O layer: TIFF image `reader`, imtoolrc frame buffer table (`fbconfig`),
//! display devices (`display`) and the file `writers` they use.
pub mod display;
pub mod fbconfig;
pub mod reader;
pub mod writers;

pub use display::{DisplayDevice, FileDisplay, MemoryDisplay};
pub use fbconfig::{FrameBufferConfig, FrameBufferTable};
pub use reader::read_tiff_image;
