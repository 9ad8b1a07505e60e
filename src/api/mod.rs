//! High-level, ergonomic library API: display an in-memory image or a TIFF
//! file on a `DisplayDevice`, display with the session defaults, and batch
//! helpers for directories. Prefer these entrypoints over the low-level
//! processing modules when integrating imdisp.
use std::fs;
use std::path::Path;

use ndarray::ArrayView2;
use tracing::{info, warn};

use crate::core::params::DisplaySettings;
use crate::core::processing::pipeline::{DisplayFrame, prepare_frame};
use crate::core::session;
use crate::error::{Error, Result};
use crate::io::display::{DisplayDevice, FileDisplay};
use crate::io::fbconfig::FrameBufferTable;
use crate::io::reader::read_tiff_image;
use crate::types::{FrameBufferSize, OutputFormat};

/// Prepare `image` with `settings` for the device's frame buffer and send it.
pub fn display<D: DisplayDevice + ?Sized>(
    device: &mut D,
    image: ArrayView2<f64>,
    name: Option<&str>,
    settings: &DisplaySettings,
) -> Result<DisplayFrame> {
    let frame = prepare_frame(image, settings, device.frame_buffer(), name)?;
    device.write_frame(&frame)?;
    Ok(frame)
}

/// `display` with the process-wide default settings (see `core::session`).
pub fn display_with_defaults<D: DisplayDevice + ?Sized>(
    device: &mut D,
    image: ArrayView2<f64>,
    name: Option<&str>,
) -> Result<DisplayFrame> {
    let settings = session::default_settings();
    display(device, image, name, &settings)
}

/// Read a TIFF and display it, named after the file stem.
pub fn display_file<D: DisplayDevice + ?Sized>(
    device: &mut D,
    input: &Path,
    settings: &DisplaySettings,
) -> Result<DisplayFrame> {
    let image = read_tiff_image(input)?;
    let name = input.file_stem().map(|s| s.to_string_lossy().into_owned());
    display(device, image.view(), name.as_deref(), settings)
}

/// Smallest table entry holding the image, or `imt512` for an empty table.
pub fn frame_buffer_for(table: &FrameBufferTable, image: ArrayView2<f64>) -> FrameBufferSize {
    let (rows, cols) = image.dim();
    table
        .select(cols, rows)
        .map(|cfg| cfg.size())
        .unwrap_or_default()
}

/// Counts from a directory run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false)
}

/// Display every TIFF in `input_dir` into `output_dir`, one frame per file.
///
/// With `buffer` unset each image gets its own buffer from the `imtoolrc`
/// table (see `FrameBufferTable::load_or_builtin`). Non-TIFF entries are
/// skipped. With `continue_on_error` failures are counted and logged;
/// otherwise the first failure is returned.
pub fn display_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    settings: &DisplaySettings,
    format: OutputFormat,
    buffer: Option<FrameBufferSize>,
    continue_on_error: bool,
) -> Result<BatchReport> {
    match buffer {
        Some(size) => display_directory(
            input_dir,
            output_dir,
            settings,
            format,
            BufferChoice::Fixed(size),
            continue_on_error,
        ),
        None => {
            let table = FrameBufferTable::load_or_builtin()?;
            display_directory(
                input_dir,
                output_dir,
                settings,
                format,
                BufferChoice::Table(&table),
                continue_on_error,
            )
        }
    }
}

/// `display_directory_to_path` selecting each image's buffer from `table`.
pub fn display_directory_with_table(
    input_dir: &Path,
    output_dir: &Path,
    settings: &DisplaySettings,
    format: OutputFormat,
    table: &FrameBufferTable,
    continue_on_error: bool,
) -> Result<BatchReport> {
    display_directory(
        input_dir,
        output_dir,
        settings,
        format,
        BufferChoice::Table(table),
        continue_on_error,
    )
}

#[derive(Clone, Copy)]
enum BufferChoice<'a> {
    Fixed(FrameBufferSize),
    Table(&'a FrameBufferTable),
}

fn display_directory(
    input_dir: &Path,
    output_dir: &Path,
    settings: &DisplaySettings,
    format: OutputFormat,
    buffers: BufferChoice<'_>,
    continue_on_error: bool,
) -> Result<BatchReport> {
    if !input_dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input directory not found: {:?}", input_dir),
        )));
    }
    let initial = match buffers {
        BufferChoice::Fixed(size) => size,
        BufferChoice::Table(_) => FrameBufferSize::default(),
    };
    let mut device = FileDisplay::new(output_dir, format, initial)?;

    let mut paths: Vec<_> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    let mut report = BatchReport::default();
    for path in paths {
        if !path.is_file() || !is_tiff(&path) {
            info!("Skipping non-TIFF entry: {:?}", path);
            report.skipped += 1;
            continue;
        }
        match display_batch_entry(&mut device, &path, settings, buffers) {
            Ok(frame) => {
                info!(
                    "Displayed {:?} with z1={} z2={}",
                    path, frame.range.z1, frame.range.z2
                );
                report.processed += 1;
            }
            Err(e) if continue_on_error => {
                warn!("Error displaying {:?}: {}", path, e);
                report.errors += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

fn display_batch_entry(
    device: &mut FileDisplay,
    path: &Path,
    settings: &DisplaySettings,
    buffers: BufferChoice<'_>,
) -> Result<DisplayFrame> {
    let image = read_tiff_image(path)?;
    if let BufferChoice::Table(table) = buffers {
        device.set_frame_buffer(frame_buffer_for(table, image.view()));
    }
    let name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
    display(device, image.view(), name.as_deref(), settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::display::MemoryDisplay;
    use crate::io::writers::tiff::write_tiff_u8;
    use ndarray::Array2;

    #[test]
    fn display_sends_frame_to_device() {
        let mut device = MemoryDisplay::new(FrameBufferSize::new(16, 16));
        let image = Array2::from_shape_fn((32, 20), |(r, c)| (r + c) as f64 + 1.0);
        let frame = display(&mut device, image.view(), Some("ramp"), &DisplaySettings::default())
            .unwrap();
        assert_eq!(frame.image.dim(), (16, 16));
        assert_eq!(device.frames().len(), 1);
        assert_eq!(device.frames()[0].name.as_deref(), Some("ramp"));
    }

    #[test]
    fn directory_batch_counts_entries() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..64).map(|v| v as u8 + 1).collect();
        write_tiff_u8(&input.path().join("a.tiff"), 8, 8, &data).unwrap();
        write_tiff_u8(&input.path().join("b.tif"), 8, 8, &data).unwrap();
        fs::write(input.path().join("notes.txt"), "not an image").unwrap();
        fs::write(input.path().join("broken.tiff"), "not a tiff either").unwrap();

        let report = display_directory_to_path(
            input.path(),
            output.path(),
            &DisplaySettings::default(),
            OutputFormat::TIFF,
            Some(FrameBufferSize::default()),
            true,
        )
        .unwrap();
        assert_eq!(
            report,
            BatchReport {
                processed: 2,
                skipped: 1,
                errors: 1
            }
        );
        assert!(output.path().join("a_frame1.tiff").is_file());
        assert!(output.path().join("b_frame1.json").is_file());
    }

    #[test]
    fn directory_batch_stops_on_error_when_asked() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("broken.tiff"), "garbage").unwrap();
        assert!(
            display_directory_to_path(
                input.path(),
                output.path(),
                &DisplaySettings::default(),
                OutputFormat::TIFF,
                Some(FrameBufferSize::default()),
                false,
            )
            .is_err()
        );
    }

    #[test]
    fn frame_buffer_follows_image_size() {
        let table = FrameBufferTable::builtin();
        let image = Array2::<f64>::zeros((700, 600));
        assert_eq!(
            frame_buffer_for(&table, image.view()),
            FrameBufferSize::new(800, 800)
        );
        let empty = FrameBufferTable::default();
        assert_eq!(
            frame_buffer_for(&empty, image.view()),
            FrameBufferSize::default()
        );
    }
}
