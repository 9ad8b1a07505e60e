use clap::Parser;
use std::path::PathBuf;

use imdisp::types::{FrameBufferSize, OutputFormat, ScaleMode, TransformFunction};

#[derive(Parser)]
#[command(name = "imdisp", version, about = "imdisp CLI")]
pub struct CliArgs {
    /// Input grayscale TIFF (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing TIFF images (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory that receives displayed frames and their JSON sidecars
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output format (tiff or jpeg)
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::TIFF)]
    pub format: OutputFormat,

    /// Lower display limit; disables automatic range selection
    #[arg(long, allow_negative_numbers = true)]
    pub z1: Option<f64>,

    /// Upper display limit; disables automatic range selection
    #[arg(long, allow_negative_numbers = true)]
    pub z2: Option<f64>,

    /// Zscale contrast (0 shows the full sampled range)
    #[arg(long)]
    pub contrast: Option<f64>,

    /// Automatic range selection (zscale or minmax)
    #[arg(long, value_enum)]
    pub mode: Option<ScaleMode>,

    /// Pixel function applied after offset and scale
    #[arg(long, value_enum)]
    pub transform: Option<TransformFunction>,

    /// Multiplier applied after the offset
    #[arg(long, allow_negative_numbers = true)]
    pub scale: Option<f64>,

    /// Added to every pixel before scaling
    #[arg(long, allow_negative_numbers = true)]
    pub offset: Option<f64>,

    /// Frame buffer frame to draw into (1-based)
    #[arg(long)]
    pub frame: Option<u32>,

    /// Frame buffer name from the imtoolrc table (e.g. imt1024)
    #[arg(long)]
    pub fb: Option<String>,

    /// Explicit frame buffer size as WIDTHxHEIGHT; overrides --fb
    #[arg(long)]
    pub fb_size: Option<FrameBufferSize>,

    /// imtoolrc file to use instead of the standard search path
    #[arg(long)]
    pub imtoolrc: Option<PathBuf>,

    /// JSON file with display settings; flags override its values
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue with other files when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}
