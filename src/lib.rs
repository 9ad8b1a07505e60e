#![doc = r#"
imdisp: display-ready rendering of astronomical images.

This crate turns a 2-D array of raw pixel values into a byte image for an
image display frame buffer: it picks display limits (z1, z2) with the IRAF
zscale algorithm (or the plain min/max, or limits you give it), applies an
optional offset, scale and pixel function, crops a centered region that fits
the frame buffer and quantizes it into the display levels 1..=200. Frame
buffer sizes come from an IRAF `imtoolrc` table. It powers the `imdisp` CLI
and can be embedded in your own Rust applications.

Add dependency
--------------
```toml
[dependencies]
imdisp = "0.1"
```

Quick start: display an array in memory
---------------------------------------
```rust
use ndarray::Array2;
use imdisp::{display, DisplaySettings, FrameBufferSize, MemoryDisplay, RangeStatus};

fn main() -> imdisp::Result<()> {
    let image = Array2::from_shape_fn((600, 800), |(r, c)| (r * 800 + c) as f64);
    let mut device = MemoryDisplay::new(FrameBufferSize::new(512, 512));

    let frame = display(&mut device, image.view(), Some("ramp"), &DisplaySettings::default())?;
    assert_eq!(frame.image.dim(), (512, 512));
    assert_eq!(frame.status, RangeStatus::Fitted);
    println!("z1={} z2={}", frame.range.z1, frame.range.z2);
    Ok(())
}
```

Explicit limits and transforms
------------------------------
```rust
use ndarray::Array2;
use imdisp::{display, DisplaySettings, FrameBufferSize, MemoryDisplay, TransformFunction};

fn main() -> imdisp::Result<()> {
    let image = Array2::from_elem((64, 64), 100.0);
    let settings = DisplaySettings {
        z1: Some(1.0),
        z2: Some(1000.0),
        transform: Some(TransformFunction::Log10),
        ..DisplaySettings::default()
    };
    let mut device = MemoryDisplay::new(FrameBufferSize::default());
    let frame = display(&mut device, image.view(), None, &settings)?;
    assert!(frame.range.z1.abs() < 1e-12 && (frame.range.z2 - 3.0).abs() < 1e-12);
    Ok(())
}
```

Files and frame buffer tables
-----------------------------
```rust,no_run
use std::path::Path;
use imdisp::{display_directory_to_path, DisplaySettings, OutputFormat};

fn main() -> imdisp::Result<()> {
    let report = display_directory_to_path(
        Path::new("/data/frames"),
        Path::new("/out"),
        &DisplaySettings::default(),
        OutputFormat::TIFF,
        None, // pick a buffer per image from imtoolrc
        true, // continue_on_error
    )?;
    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `imdisp::Result<T>`. Flat images and collapsed
ranges are not errors: they show up in `DisplayFrame::status` and
`DisplayFrame::transform_fallback`.

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`core`]: range estimation, transforms, region selection and quantization.
- [`io`]: display devices, TIFF reader, writers and the `imtoolrc` table.
- [`types`]: small shared value types.
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::{DisplaySettings, ZscaleParams};
pub use core::processing::pipeline::{DisplayFrame, prepare_frame};
pub use core::processing::region::Region;
pub use core::processing::transform::{Transform, TransformSpec};
pub use core::processing::zscale::{RangeEstimate, estimate};
pub use core::session::{default_settings, reset_default_settings, set_default_settings};
pub use error::{Error, Result};
pub use types::{
    DisplayRange, FrameBufferSize, OutputFormat, RangeStatus, ScaleMode, TransformFunction,
};

// Devices and readers
pub use io::{
    DisplayDevice, FileDisplay, FrameBufferConfig, FrameBufferTable, MemoryDisplay,
    read_tiff_image,
};

// High-level API re-exports
pub use api::{
    BatchReport, display, display_directory_to_path, display_directory_with_table,
    display_file, display_with_defaults, frame_buffer_for,
};
