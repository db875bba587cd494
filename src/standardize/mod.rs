//! Image standardization: rotate, rescale, crop, intensity remap.
//!
//! Stateless between calls; each call applies the criteria sections in a
//! fixed order and returns a fresh 8-bit grayscale buffer. The order and
//! the numeric conventions (bilinear sampling with replicated borders,
//! percentile-derived intensity windows, truncating quantization) follow
//! the production criteria pipeline exactly so outputs stay bit-for-bit
//! reproducible.

pub mod criteria;

pub use self::criteria::{Align, BoxKind, Criteria, Intensity, Resize, RoiBox};

use crate::image::GrayImage;
use nalgebra::{Rotation2, Vector2};
use rayon::prelude::*;

/// Apply all configured standardization steps to `gray`.
pub fn standardize(gray: &GrayImage, criteria: &Criteria) -> GrayImage {
    let mut out = match criteria.align.rotate_deg {
        Some(deg) => rotate_about_center(gray, deg),
        None => gray.clone(),
    };
    if let Some(short) = criteria.resize.short {
        out = resize_short_edge(&out, short as usize);
    }
    if let Some(roi) = &criteria.roi {
        out = crop_box(&out, roi);
    }
    apply_intensity(&mut out, &criteria.intensity, criteria.gamma);
    out
}

/// Rotate about the image centre keeping the original dimensions.
/// Bilinear sampling; out-of-range sources clamp to the border pixel.
pub fn rotate_about_center(img: &GrayImage, angle_deg: f64) -> GrayImage {
    let (w, h) = (img.w, img.h);
    if w == 0 || h == 0 || angle_deg == 0.0 {
        return img.clone();
    }
    // Positive angle rotates counter-clockwise in the y-down image frame.
    let rot = Rotation2::new(angle_deg.to_radians());
    let center = Vector2::new((w as f64) / 2.0, (h as f64) / 2.0);

    let mut out = GrayImage::new(w, h);
    out.data
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let p = Vector2::new(x as f64, y as f64) - center;
                let src = rot * p + center;
                *px = sample_bilinear_clamped(img, src.x, src.y);
            }
        });
    out
}

/// Uniform rescale so the shorter edge matches `short` (no-op when it
/// already does or when either value is zero).
pub fn resize_short_edge(img: &GrayImage, short: usize) -> GrayImage {
    let cur_short = img.w.min(img.h);
    if cur_short == 0 || short == 0 || cur_short == short {
        return img.clone();
    }
    let scale = short as f64 / cur_short as f64;
    let nw = ((img.w as f64 * scale).round() as usize).max(1);
    let nh = ((img.h as f64 * scale).round() as usize).max(1);
    resize_bilinear(img, nw, nh)
}

fn resize_bilinear(img: &GrayImage, nw: usize, nh: usize) -> GrayImage {
    let sx = img.w as f64 / nw as f64;
    let sy = img.h as f64 / nh as f64;
    let mut out = GrayImage::new(nw, nh);
    out.data
        .par_chunks_mut(nw)
        .enumerate()
        .for_each(|(y, row)| {
            let src_y = (y as f64 + 0.5) * sy - 0.5;
            for (x, px) in row.iter_mut().enumerate() {
                let src_x = (x as f64 + 0.5) * sx - 0.5;
                *px = sample_bilinear_clamped(img, src_x, src_y);
            }
        });
    out
}

fn sample_bilinear_clamped(img: &GrayImage, x: f64, y: f64) -> u8 {
    let max_x = (img.w - 1) as f64;
    let max_y = (img.h - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(img.w - 1);
    let y1 = (y0 + 1).min(img.h - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let v00 = img.get(x0, y0) as f64;
    let v10 = img.get(x1, y0) as f64;
    let v01 = img.get(x0, y1) as f64;
    let v11 = img.get(x1, y1) as f64;
    let top = v00 + (v10 - v00) * fx;
    let bot = v01 + (v11 - v01) * fx;
    let v = top + (bot - top) * fy;
    v.round().clamp(0.0, 255.0) as u8
}

/// Crop to the configured box, clamped to image bounds. An empty resulting
/// box skips the crop and returns the unmodified image.
pub fn crop_box(img: &GrayImage, roi: &RoiBox) -> GrayImage {
    let (w, h) = (img.w as f64, img.h as f64);
    let (x, y, bw, bh) = match roi.kind {
        BoxKind::Relative => (
            (roi.x * w).round(),
            (roi.y * h).round(),
            (roi.w * w).round(),
            (roi.h * h).round(),
        ),
        BoxKind::Absolute => (roi.x.round(), roi.y.round(), roi.w.round(), roi.h.round()),
    };
    let x1 = x.clamp(0.0, w) as usize;
    let y1 = y.clamp(0.0, h) as usize;
    let x2 = (x + bw).clamp(0.0, w) as usize;
    let y2 = (y + bh).clamp(0.0, h) as usize;
    if x2 > x1 && y2 > y1 {
        img.crop(x1, y1, x2 - x1, y2 - y1)
    } else {
        img.clone()
    }
}

/// Window the intensities into the destination range, optionally apply a
/// gamma curve, and quantize back to 8 bits (truncating, like the
/// reference implementation).
pub fn apply_intensity(img: &mut GrayImage, intensity: &Intensity, gamma: Option<f64>) {
    if img.data.is_empty() {
        return;
    }
    let src_lo = intensity
        .src_lo
        .unwrap_or_else(|| pixel_percentile(&img.data, 1.0));
    let mut src_hi = intensity
        .src_hi
        .unwrap_or_else(|| pixel_percentile(&img.data, 99.0));
    if src_hi <= src_lo {
        src_hi = src_lo + 1.0;
    }
    let dst_lo = intensity.dst_lo;
    let dst_hi = intensity.dst_hi;
    let span = src_hi - src_lo;

    for px in &mut img.data {
        let mut g = ((*px as f64 - src_lo) / span).clamp(0.0, 1.0) * (dst_hi - dst_lo) + dst_lo;
        if let Some(gamma) = gamma {
            if gamma != 0.0 {
                g = (g / 255.0).clamp(0.0, 1.0).powf(gamma) * 255.0;
            }
        }
        *px = g.clamp(0.0, 255.0) as u8;
    }
}

/// Linear-interpolated percentile over the pixel values (numpy semantics:
/// rank `(n-1)·p/100` interpolated between the two bracketing order
/// statistics).
pub fn pixel_percentile(data: &[u8], p: f64) -> f64 {
    debug_assert!(!data.is_empty());
    let mut sorted: Vec<u8> = data.to_vec();
    sorted.sort_unstable();
    let rank = (sorted.len() - 1) as f64 * p / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    let a = sorted[lo] as f64;
    let b = sorted[hi] as f64;
    a + (b - a) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(w: usize, h: usize) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, ((x * 255) / (w - 1).max(1)) as u8);
            }
        }
        img
    }

    #[test]
    fn zero_rotation_is_identity() {
        let img = gradient_image(20, 12);
        assert_eq!(rotate_about_center(&img, 0.0), img);
    }

    #[test]
    fn rotation_preserves_dimensions_and_flat_images() {
        let img = GrayImage::from_raw(16, 10, vec![77u8; 160]);
        let rot = rotate_about_center(&img, 13.0);
        assert_eq!((rot.w, rot.h), (16, 10));
        assert!(rot.data.iter().all(|&v| v == 77));
    }

    #[test]
    fn resize_targets_short_edge() {
        let img = gradient_image(40, 20);
        let out = resize_short_edge(&img, 10);
        assert_eq!((out.w, out.h), (20, 10));
        // same short edge: untouched
        let same = resize_short_edge(&img, 20);
        assert_eq!((same.w, same.h), (40, 20));
    }

    #[test]
    fn relative_crop_clamps_to_bounds() {
        let img = gradient_image(100, 50);
        let roi = RoiBox {
            kind: BoxKind::Relative,
            x: 0.5,
            y: 0.5,
            w: 1.0,
            h: 1.0,
        };
        let out = crop_box(&img, &roi);
        assert_eq!((out.w, out.h), (50, 25));
    }

    #[test]
    fn empty_crop_box_is_skipped() {
        let img = gradient_image(100, 50);
        let roi = RoiBox {
            kind: BoxKind::Absolute,
            x: 200.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        };
        let out = crop_box(&img, &roi);
        assert_eq!((out.w, out.h), (100, 50));
    }

    #[test]
    fn degenerate_source_window_is_coerced() {
        let mut img = GrayImage::from_raw(4, 1, vec![10, 10, 10, 10]);
        let intensity = Intensity {
            src_lo: Some(10.0),
            src_hi: Some(10.0),
            dst_lo: 0.0,
            dst_hi: 255.0,
        };
        apply_intensity(&mut img, &intensity, None);
        // window coerced to [10, 11]; all pixels sit at the low edge
        assert!(img.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn explicit_window_maps_linearly() {
        let mut img = GrayImage::from_raw(3, 1, vec![0, 128, 255]);
        let intensity = Intensity {
            src_lo: Some(0.0),
            src_hi: Some(255.0),
            dst_lo: 0.0,
            dst_hi: 255.0,
        };
        apply_intensity(&mut img, &intensity, None);
        assert_eq!(img.data, vec![0, 128, 255]);
    }

    #[test]
    fn pixel_percentile_matches_linear_interpolation() {
        let data = [0u8, 10, 20, 30, 40];
        assert_eq!(pixel_percentile(&data, 0.0), 0.0);
        assert_eq!(pixel_percentile(&data, 100.0), 40.0);
        assert_eq!(pixel_percentile(&data, 50.0), 20.0);
        assert!((pixel_percentile(&data, 62.5) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn standardize_full_chain_produces_expected_geometry() {
        let img = gradient_image(80, 40);
        let criteria = Criteria {
            align: Align {
                rotate_deg: Some(0.0),
            },
            resize: Resize { short: Some(20) },
            roi: Some(RoiBox {
                kind: BoxKind::Relative,
                x: 0.25,
                y: 0.0,
                w: 0.5,
                h: 1.0,
            }),
            intensity: Intensity::default(),
            gamma: None,
        };
        let out = standardize(&img, &criteria);
        assert_eq!((out.w, out.h), (20, 20));
    }
}
