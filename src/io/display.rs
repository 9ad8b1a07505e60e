//! Display devices: the collaborator that owns a frame buffer and receives
//! quantized frames. The core only asks a device for its buffer size and
//! hands it finished `DisplayFrame`s.
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::processing::pipeline::DisplayFrame;
use crate::error::Result;
use crate::io::writers::jpeg::write_gray_jpeg;
use crate::io::writers::metadata::write_frame_sidecar;
use crate::io::writers::tiff::write_tiff_u8;
use crate::types::{FrameBufferSize, OutputFormat};

pub trait DisplayDevice {
    /// Size of the frame buffer frames are drawn into.
    fn frame_buffer(&self) -> FrameBufferSize;

    fn write_frame(&mut self, frame: &DisplayFrame) -> Result<()>;
}

/// Keeps every written frame in memory.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    buffer: FrameBufferSize,
    frames: Vec<DisplayFrame>,
}

impl MemoryDisplay {
    pub fn new(buffer: FrameBufferSize) -> Self {
        Self {
            buffer,
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[DisplayFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&DisplayFrame> {
        self.frames.last()
    }
}

impl DisplayDevice for MemoryDisplay {
    fn frame_buffer(&self) -> FrameBufferSize {
        self.buffer
    }

    fn write_frame(&mut self, frame: &DisplayFrame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Writes each frame as an 8-bit grayscale image plus a JSON sidecar.
#[derive(Debug, Clone)]
pub struct FileDisplay {
    output_dir: PathBuf,
    format: OutputFormat,
    buffer: FrameBufferSize,
    written: Vec<PathBuf>,
}

impl FileDisplay {
    pub fn new(output_dir: &Path, format: OutputFormat, buffer: FrameBufferSize) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            format,
            buffer,
            written: Vec::new(),
        })
    }

    /// Switch buffers between frames, e.g. per-image `imtoolrc` selection.
    pub fn set_frame_buffer(&mut self, buffer: FrameBufferSize) {
        self.buffer = buffer;
    }

    /// Image files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// `<name>_frame<N>.<ext>` inside the output directory.
    pub fn frame_path(&self, frame: &DisplayFrame) -> PathBuf {
        let stem = frame
            .name
            .as_deref()
            .map(sanitize_stem)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "image".to_string());
        self.output_dir.join(format!(
            "{}_frame{}.{}",
            stem,
            frame.frame,
            self.format.extension()
        ))
    }
}

impl DisplayDevice for FileDisplay {
    fn frame_buffer(&self) -> FrameBufferSize {
        self.buffer
    }

    fn write_frame(&mut self, frame: &DisplayFrame) -> Result<()> {
        let path = self.frame_path(frame);
        let (rows, cols) = frame.image.dim();
        let data: Vec<u8> = frame.image.iter().copied().collect();
        match self.format {
            OutputFormat::TIFF => write_tiff_u8(&path, cols, rows, &data)?,
            OutputFormat::JPEG => write_gray_jpeg(&path, cols, rows, &data)?,
        }
        write_frame_sidecar(&path, frame)?;
        info!("Wrote frame {} ({}x{}) to {:?}", frame.frame, cols, rows, path);
        self.written.push(path);
        Ok(())
    }
}

fn sanitize_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
