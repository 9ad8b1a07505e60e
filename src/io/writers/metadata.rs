use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::processing::pipeline::DisplayFrame;
use crate::core::processing::region::Region;
use crate::error::Result;
use crate::types::{FrameBufferSize, RangeStatus};

/// JSON sidecar written next to each displayed frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMetadata {
    pub name: Option<String>,
    pub frame: u32,
    pub z1: f64,
    pub z2: f64,
    pub range_status: RangeStatus,
    pub transform_fallback: bool,
    pub region: Region,
    pub source_rows: usize,
    pub source_cols: usize,
    pub buffer: FrameBufferSize,
    pub written_at: String,
}

impl FrameMetadata {
    pub fn from_frame(frame: &DisplayFrame) -> Self {
        Self {
            name: frame.name.clone(),
            frame: frame.frame,
            z1: frame.range.z1,
            z2: frame.range.z2,
            range_status: frame.status,
            transform_fallback: frame.transform_fallback,
            region: frame.region,
            source_rows: frame.source_shape.0,
            source_cols: frame.source_shape.1,
            buffer: frame.buffer,
            written_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Sidecar path for an image output: same stem, `.json` extension.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

pub fn write_frame_sidecar(image_path: &Path, frame: &DisplayFrame) -> Result<PathBuf> {
    let path = sidecar_path(image_path);
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &FrameMetadata::from_frame(frame))?;
    info!("Wrote frame metadata sidecar {:?}", path);
    Ok(path)
}

pub fn read_frame_sidecar(path: &Path) -> Result<FrameMetadata> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
