use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use imdisp::api::{
    display, display_directory_to_path, display_directory_with_table, frame_buffer_for,
};
use imdisp::core::params::DisplaySettings;
use imdisp::io::{FileDisplay, FrameBufferTable, read_tiff_image};
use imdisp::types::FrameBufferSize;

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }
}

/// Settings file (if any) with the individual flags layered on top.
fn build_settings(args: &CliArgs) -> Result<DisplaySettings, AppError> {
    let mut settings = match &args.settings {
        Some(path) => DisplaySettings::from_json_file(path)?,
        None => DisplaySettings::default(),
    };
    if args.z1.is_some() {
        settings.z1 = args.z1;
    }
    if args.z2.is_some() {
        settings.z2 = args.z2;
    }
    if args.contrast.is_some() {
        settings.contrast = args.contrast;
    }
    if let Some(mode) = args.mode {
        settings.scale_mode = mode;
    }
    if args.transform.is_some() {
        settings.transform = args.transform;
    }
    if args.scale.is_some() {
        settings.scale = args.scale;
    }
    if args.offset.is_some() {
        settings.offset = args.offset;
    }
    if args.frame.is_some() {
        settings.frame = args.frame;
    }
    Ok(settings)
}

fn load_table(imtoolrc: Option<&Path>) -> Result<FrameBufferTable, AppError> {
    Ok(match imtoolrc {
        Some(path) => FrameBufferTable::load(path)?,
        None => FrameBufferTable::load_or_builtin()?,
    })
}

/// Buffer fixed by `--fb-size` or `--fb`; `None` means select per image.
fn fixed_buffer(args: &CliArgs) -> Result<Option<FrameBufferSize>, AppError> {
    if let Some(size) = args.fb_size {
        return Ok(Some(size));
    }
    match &args.fb {
        Some(name) => {
            let table = load_table(args.imtoolrc.as_deref())?;
            let config = table.by_name(name)?;
            info!("Using frame buffer {} ({})", name, config.size());
            Ok(Some(config.size()))
        }
        None => Ok(None),
    }
}

fn display_single_file(
    input: &Path,
    output_dir: &Path,
    args: &CliArgs,
    settings: &DisplaySettings,
) -> Result<(), AppError> {
    let image = read_tiff_image(input)?;
    let buffer = match fixed_buffer(args)? {
        Some(size) => size,
        None => frame_buffer_for(&load_table(args.imtoolrc.as_deref())?, image.view()),
    };

    let mut device = FileDisplay::new(output_dir, args.format, buffer)?;
    let name = input.file_stem().map(|s| s.to_string_lossy().into_owned());
    let frame = display(&mut device, image.view(), name.as_deref(), settings)?;
    info!(
        "Displayed {:?} in frame {} with z1={} z2={} ({:?})",
        input, frame.frame, frame.range.z1, frame.range.z2, frame.status
    );
    if let Some(path) = device.written().last() {
        info!("Successfully displayed: {:?} -> {:?}", input, path);
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    if args.input.is_some() && args.input_dir.is_some() {
        return Err(AppError::ConflictingArguments {
            first: "--input".to_string(),
            second: "--input-dir".to_string(),
        }
        .into());
    }

    let settings = build_settings(&args)?;
    let output_dir = args.output_dir.clone().ok_or(AppError::MissingArgument {
        arg: "--output-dir".to_string(),
    })?;

    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.clone().ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;

        info!("Starting batch display from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = match (fixed_buffer(&args)?, &args.imtoolrc) {
            (Some(size), _) => display_directory_to_path(
                &input_dir,
                &output_dir,
                &settings,
                args.format,
                Some(size),
                true,
            )?,
            (None, Some(path)) => display_directory_with_table(
                &input_dir,
                &output_dir,
                &settings,
                args.format,
                &FrameBufferTable::load(path)?,
                true,
            )?,
            (None, None) => display_directory_to_path(
                &input_dir,
                &output_dir,
                &settings,
                args.format,
                None,
                true,
            )?,
        };

        info!("Batch display complete!");
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.clone().ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        display_single_file(&input, &output_dir, &args, &settings)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use imdisp::types::{ScaleMode, TransformFunction};

    #[test]
    fn flags_override_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"z1": 10.0, "z2": 90.0, "transform": "sqrt"}"#).unwrap();
        let args = CliArgs::parse_from([
            "imdisp",
            "--settings",
            path.to_str().unwrap(),
            "--z2",
            "50",
            "--mode",
            "minmax",
        ]);
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.z1, Some(10.0));
        assert_eq!(settings.z2, Some(50.0));
        assert_eq!(settings.transform, Some(TransformFunction::Sqrt));
        assert_eq!(settings.scale_mode, ScaleMode::Minmax);
    }

    #[test]
    fn fb_size_wins_over_fb_name() {
        let args = CliArgs::parse_from(["imdisp", "--fb", "imt1024", "--fb-size", "300x200"]);
        assert_eq!(fixed_buffer(&args).unwrap(), Some(FrameBufferSize::new(300, 200)));
    }

    #[test]
    fn fb_name_resolves_through_imtoolrc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imtoolrc");
        std::fs::write(&path, "1 1 640 480 # vga|imtvga\n").unwrap();
        let args = CliArgs::parse_from([
            "imdisp",
            "--fb",
            "imtvga",
            "--imtoolrc",
            path.to_str().unwrap(),
        ]);
        assert_eq!(fixed_buffer(&args).unwrap(), Some(FrameBufferSize::new(640, 480)));
    }

    #[test]
    fn negative_limits_parse() {
        let args = CliArgs::parse_from(["imdisp", "--z1", "-5.5", "--offset", "-1"]);
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.z1, Some(-5.5));
        assert_eq!(settings.offset, Some(-1.0));
    }
}
