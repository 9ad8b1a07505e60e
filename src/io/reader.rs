use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::info;

use crate::error::{Error, Result};

/// Read a single-channel TIFF into an `f64` image of shape `(height, width)`.
/// Any integer or floating-point sample format is accepted.
pub fn read_tiff_image(path: &Path) -> Result<Array2<f64>> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let (width, height) = decoder.dimensions()?;
    let color = decoder.colortype()?;
    if !matches!(color, ColorType::Gray(_)) {
        return Err(Error::UnsupportedImage(format!(
            "{:?}: expected a single-channel grayscale TIFF, found {:?}",
            path, color
        )));
    }

    let pixels = decoding_result_to_f64(decoder.read_image()?)?;
    info!(
        "Read {}x{} {:?} image from {:?}",
        width, height, color, path
    );
    Ok(Array2::from_shape_vec(
        (height as usize, width as usize),
        pixels,
    )?)
}

fn decoding_result_to_f64(image: DecodingResult) -> Result<Vec<f64>> {
    let pixels = match image {
        DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
        DecodingResult::F64(data) => data,
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedImage(
                "unsupported TIFF sample format".to_string(),
            ));
        }
    };
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::{TiffEncoder, colortype};

    #[test]
    fn reads_u16_tiff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.tiff");
        let data: Vec<u16> = (0..12).map(|v| v * 100).collect();
        {
            let mut file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(&mut file).unwrap();
            encoder
                .write_image::<colortype::Gray16>(4, 3, &data)
                .unwrap();
        }

        let image = read_tiff_image(&path).unwrap();
        assert_eq!(image.dim(), (3, 4));
        assert_eq!(image[[2, 3]], 1100.0);
    }

    #[test]
    fn rejects_rgb_tiff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.tiff");
        {
            let mut file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(&mut file).unwrap();
            encoder
                .write_image::<colortype::RGB8>(2, 2, &[0u8; 12])
                .unwrap();
        }
        assert!(matches!(
            read_tiff_image(&path),
            Err(Error::UnsupportedImage(_))
        ));
    }
}
