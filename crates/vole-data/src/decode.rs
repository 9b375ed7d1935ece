// Image decoding shared by the file-backed datasets

use std::path::Path;

use image::imageops::FilterType;
use vole_core::{Error, Result};

/// How a dataset wants its image files decoded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecodeOptions {
    /// Target `(width, height)`, or `None` to keep the file's size.
    pub resize: Option<(u32, u32)>,
    /// Collapse to a single luma channel instead of RGB.
    pub grayscale: bool,
}

/// Decode one image file into flattened planar `[C, H, W]` pixels in
/// `[0, 1]`, plus the shape.
///
/// Any read or decode failure maps to [`Error::Decode`] carrying the path,
/// so a bad file fails the lookup instead of silently yielding zeros.
pub(crate) fn load_pixels(path: &Path, opts: DecodeOptions) -> Result<(Vec<f32>, Vec<usize>)> {
    let img = image::open(path).map_err(|e| Error::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let img = match opts.resize {
        Some((w, h)) => img.resize_exact(w, h, FilterType::Triangle),
        None => img,
    };

    if opts.grayscale {
        let gray = img.to_luma8();
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        let pixels = gray.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        Ok((pixels, vec![1, h, w]))
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        // Planar layout: all of channel 0, then channel 1, then channel 2.
        let mut pixels = vec![0.0f32; 3 * h * w];
        for (i, p) in rgb.pixels().enumerate() {
            for c in 0..3 {
                pixels[c * h * w + i] = p.0[c] as f32 / 255.0;
            }
        }
        Ok((pixels, vec![3, h, w]))
    }
}

/// File extensions recognized as images, lowercase.
pub(crate) const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Whether a path looks like an image file by extension.
pub(crate) fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
