// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing the finished image.
//!
//! Pixels are grey levels: value `i` is drawn with palette entry `i`
//! of a 256-entry grayscale palette.  Paths ending in `.pgm` or `.pnm`
//! get a binary graymap; anything else gets an 8-bit indexed bitmap.

use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::bmp::BMPEncoder;
use image::pnm::{PNMEncoder, PNMSubtype, SampleEncoding};
use image::ColorType;

use crate::error::MandelError;

/// The file formats the renderer can produce.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageKind {
    /// Windows bitmap, 8 bits per pixel with a grayscale palette.
    Bitmap,
    /// Binary portable graymap.
    Graymap,
}

impl ImageKind {
    /// Chooses a format from the file extension.
    pub fn for_path(path: &Path) -> ImageKind {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pgm") || ext.eq_ignore_ascii_case("pnm") => {
                ImageKind::Graymap
            }
            _ => ImageKind::Bitmap,
        }
    }
}

/// Write a square, row-major greyscale image of `edge` pixels a side.
pub fn write_image(path: &Path, pixels: &[u8], edge: usize) -> Result<(), MandelError> {
    let side = u32::try_from(edge)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "image is too large"))?;
    if pixels.len() != edge * edge {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} pixels cannot fill a {}x{} image",
                pixels.len(),
                edge,
                edge
            ),
        )
        .into());
    }

    let mut output = BufWriter::new(File::create(path)?);
    match ImageKind::for_path(path) {
        ImageKind::Bitmap => {
            BMPEncoder::new(&mut output).encode(pixels, side, side, ColorType::Gray(8))?
        }
        ImageKind::Graymap => PNMEncoder::new(&mut output)
            .with_subtype(PNMSubtype::Graymap(SampleEncoding::Binary))
            .encode(pixels, side, side, ColorType::Gray(8))?,
    }
    output.flush()?;
    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn le_u32(bytes: &[u8]) -> u32 {
        u32::from(bytes[0])
            | u32::from(bytes[1]) << 8
            | u32::from(bytes[2]) << 16
            | u32::from(bytes[3]) << 24
    }

    #[test]
    fn picks_the_format_from_the_extension() {
        assert_eq!(ImageKind::for_path(&PathBuf::from("a.bmp")), ImageKind::Bitmap);
        assert_eq!(ImageKind::for_path(&PathBuf::from("a.PGM")), ImageKind::Graymap);
        assert_eq!(ImageKind::for_path(&PathBuf::from("a.pnm")), ImageKind::Graymap);
        assert_eq!(ImageKind::for_path(&PathBuf::from("mandel")), ImageKind::Bitmap);
    }

    #[test]
    fn writes_a_bitmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Mandelbrot.bmp");
        let pixels: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        write_image(&path, &pixels, 8).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"BM");
        assert_eq!(le_u32(&bytes[18..22]), 8);
        assert_eq!((le_u32(&bytes[22..26]) as i32).abs(), 8);
    }

    #[test]
    fn writes_a_graymap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mandel.pgm");
        write_image(&path, &[0, 64, 128, 255], 2).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"P5");
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 64, 128, 255]);
    }

    #[test]
    fn refuses_a_mismatched_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bmp");
        assert!(write_image(&path, &[1, 2, 3], 2).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn reports_unwritable_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.bmp");
        assert!(write_image(&path, &[1], 1).is_err());
    }
}
