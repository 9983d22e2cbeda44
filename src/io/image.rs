//! Fragment image loading and PNG export

use crate::io::error::{Result, StitchError};
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use ndarray::{Array2, Array3};
use std::path::Path;

/// Mask pixels above this value count as tissue
pub const MASK_THRESHOLD: u8 = 127;

/// Load an image as 8-bit RGB
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be opened or decoded
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    image::open(path)
        .map(|img| img.into_rgb8())
        .map_err(|source| StitchError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Load an image as 8-bit grayscale
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be opened or decoded
pub fn load_gray(path: &Path) -> Result<GrayImage> {
    image::open(path)
        .map(|img| img.into_luma8())
        .map_err(|source| StitchError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Load a 16-bit grayscale image as values in [0, 1]
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be opened or decoded
pub fn load_unit_gray(path: &Path) -> Result<Array2<f64>> {
    let img = image::open(path)
        .map(|img| img.into_luma16())
        .map_err(|source| StitchError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
    let (width, height) = img.dimensions();
    Ok(Array2::from_shape_fn(
        (height as usize, width as usize),
        |(row, col)| f64::from(img.get_pixel(col as u32, row as u32).0[0]) / f64::from(u16::MAX),
    ))
}

/// Binarise a grayscale mask image
pub fn mask_to_array(mask: &GrayImage) -> Array2<bool> {
    let (width, height) = mask.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        mask.get_pixel(col as u32, row as u32).0[0] > MASK_THRESHOLD
    })
}

/// Mask array as a black and white image
pub fn array_to_mask(mask: &Array2<bool>) -> GrayImage {
    let (rows, cols) = mask.dim();
    ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
        let set = mask
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(false);
        Luma([if set { u8::MAX } else { 0 }])
    })
}

/// RGB image as a (rows, cols, 3) array
pub fn rgb_to_array(img: &RgbImage) -> Array3<u8> {
    let (width, height) = img.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(row, col, channel)| {
        img.get_pixel(col as u32, row as u32)
            .0
            .get(channel)
            .copied()
            .unwrap_or(0)
    })
}

/// (rows, cols, 3) array as an RGB image
pub fn array_to_rgb(color: &Array3<u8>) -> RgbImage {
    let (rows, cols, _) = color.dim();
    ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
        let (row, col) = (y as usize, x as usize);
        let channel = |c: usize| color.get((row, col, c)).copied().unwrap_or(0);
        Rgb([channel(0), channel(1), channel(2)])
    })
}

/// Values in [0, 1] as a 16-bit grayscale image
pub fn unit_gray_to_image(gray: &Array2<f64>) -> ImageBuffer<Luma<u16>, Vec<u16>> {
    let (rows, cols) = gray.dim();
    ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
        let value = gray.get((y as usize, x as usize)).copied().unwrap_or(0.0);
        Luma([(value.clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16])
    })
}

/// Save any encodable image, creating parent directories as needed
///
/// # Errors
///
/// Returns `FileSystem` if the parent directory cannot be created and
/// `ImageExport` if encoding or writing fails
pub fn save_png<P, C>(img: &ImageBuffer<P, C>, path: &Path) -> Result<()>
where
    P: image::PixelWithColorType,
    [P::Subpixel]: image::EncodableLayout,
    C: std::ops::Deref<Target = [P::Subpixel]>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StitchError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source,
        })?;
    }
    img.save(path).map_err(|source| StitchError::ImageExport {
        path: path.to_path_buf(),
        source,
    })
}
