//! I/O helpers for grayscale images and JSON.
//!
//! - `load_grayscale`: read a PNG/JPEG/etc. into an owned 8-bit gray buffer.
//! - `save_grayscale`: write an owned 8-bit gray buffer to a PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::GrayImage;
use crate::error::OsteoError;
use image::{DynamicImage, ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, OsteoError> {
    let img = image::open(path)
        .map_err(|source| OsteoError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(GrayImage::from_raw(width, height, img.into_raw()))
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_grayscale(buffer: &GrayImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let img: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_raw(buffer.w as u32, buffer.h as u32, buffer.data.clone())
            .ok_or_else(|| "Failed to create image buffer".to_string())?;
    DynamicImage::ImageLuma8(img)
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
