use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype};

use crate::error::Result;

pub fn write_tiff_u8(output: &Path, cols: usize, rows: usize, data: &[u8]) -> Result<()> {
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let mut encoder = TiffEncoder::new(&mut writer)?;
    encoder.write_image::<colortype::Gray8>(cols as u32, rows as u32, data)?;
    Ok(())
}
