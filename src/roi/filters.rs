//! Denoising filters for the segmentation front end.
//!
//! All filters replicate the border pixel outside the image and operate on
//! 8-bit grayscale in place of any floating-point intermediate the caller
//! would have to manage. Kernel sizes are oddized by the callers where the
//! filter requires odd dimensions.

use super::options::{oddize, Denoise};
use crate::image::GrayImage;
use rayon::prelude::*;

/// Stretch the intensities to the full 0–255 range. A flat image maps to 0.
pub fn normalize_min_max(img: &mut GrayImage) {
    let Some((lo, hi)) = img.min_max() else {
        return;
    };
    if hi == lo {
        img.data.fill(0);
        return;
    }
    let span = (hi - lo) as f64;
    for px in &mut img.data {
        *px = (((*px - lo) as f64) * 255.0 / span).round() as u8;
    }
}

/// Apply the configured denoise filter.
pub fn denoise(img: &GrayImage, filter: Denoise) -> GrayImage {
    match filter {
        Denoise::Bilateral {
            d,
            sigma_color,
            sigma_space,
        } => {
            if d == 0 {
                img.clone()
            } else {
                bilateral(img, d, sigma_color, sigma_space)
            }
        }
        Denoise::Median { k } => median_blur(img, oddize(k.max(1), 3)),
        Denoise::Gaussian { k } => gaussian_blur(img, oddize(k.max(1), 3)),
        Denoise::LocalEqualize { clip, tile } => {
            local_equalize(img, clip.max(1.0), tile.max(2))
        }
    }
}

/// Default Gaussian sigma for a given odd kernel size (OpenCV convention).
fn sigma_for_ksize(k: usize) -> f64 {
    0.3 * ((k as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

fn gaussian_taps(k: usize, sigma: f64) -> Vec<f64> {
    let half = (k / 2) as isize;
    let mut taps: Vec<f64> = (-half..=half)
        .map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Separable Gaussian blur with border replication. `k` must be odd.
pub fn gaussian_blur(img: &GrayImage, k: usize) -> GrayImage {
    gaussian_blur_with_sigma(img, k, sigma_for_ksize(k))
}

pub(crate) fn gaussian_blur_with_sigma(img: &GrayImage, k: usize, sigma: f64) -> GrayImage {
    let (w, h) = (img.w, img.h);
    if w == 0 || h == 0 || k <= 1 {
        return img.clone();
    }
    let taps = gaussian_taps(k, sigma);
    let half = (k / 2) as isize;

    // horizontal pass into f64, vertical pass back to u8
    let mut tmp = vec![0.0f64; w * h];
    tmp.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let src = img.row(y);
        for (x, out) in row.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (i, &t) in taps.iter().enumerate() {
                let sx = (x as isize + i as isize - half).clamp(0, w as isize - 1) as usize;
                acc += src[sx] as f64 * t;
            }
            *out = acc;
        }
    });

    let mut out = GrayImage::new(w, h);
    out.data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (i, &t) in taps.iter().enumerate() {
                let sy = (y as isize + i as isize - half).clamp(0, h as isize - 1) as usize;
                acc += tmp[sy * w + x] * t;
            }
            *px = acc.round().clamp(0.0, 255.0) as u8;
        }
    });
    out
}

/// Median blur over a `k × k` window. `k` must be odd.
pub fn median_blur(img: &GrayImage, k: usize) -> GrayImage {
    let (w, h) = (img.w, img.h);
    if w == 0 || h == 0 || k <= 1 {
        return img.clone();
    }
    let half = (k / 2) as isize;
    let mut out = GrayImage::new(w, h);
    out.data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let mut window = Vec::with_capacity(k * k);
        for (x, px) in row.iter_mut().enumerate() {
            window.clear();
            for dy in -half..=half {
                let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                let src = img.row(sy);
                for dx in -half..=half {
                    let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                    window.push(src[sx]);
                }
            }
            window.sort_unstable();
            *px = window[window.len() / 2];
        }
    });
    out
}

/// Edge-preserving bilateral filter with pixel diameter `d`.
pub fn bilateral(img: &GrayImage, d: usize, sigma_color: f64, sigma_space: f64) -> GrayImage {
    let (w, h) = (img.w, img.h);
    if w == 0 || h == 0 {
        return img.clone();
    }
    let radius = ((d / 2).max(1)) as isize;
    let inv_2sc = -0.5 / (sigma_color * sigma_color);
    let inv_2ss = -0.5 / (sigma_space * sigma_space);

    // range kernel over the 256 possible value differences
    let range_lut: Vec<f64> = (0..256).map(|dv| ((dv * dv) as f64 * inv_2sc).exp()).collect();

    let mut out = GrayImage::new(w, h);
    out.data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            let center = img.get(x, y) as i32;
            let mut acc = 0.0;
            let mut norm = 0.0;
            for dy in -radius..=radius {
                let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                for dx in -radius..=radius {
                    let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                    let v = img.get(sx, sy) as i32;
                    let ws = (((dx * dx + dy * dy) as f64) * inv_2ss).exp();
                    let wr = range_lut[(v - center).unsigned_abs() as usize];
                    let weight = ws * wr;
                    acc += v as f64 * weight;
                    norm += weight;
                }
            }
            *px = (acc / norm).round().clamp(0.0, 255.0) as u8;
        }
    });
    out
}

/// Tile-based local histogram equalization with a clip limit (CLAHE-style).
/// The per-tile mappings are blended bilinearly across tile centres.
pub fn local_equalize(img: &GrayImage, clip: f64, tiles: usize) -> GrayImage {
    let (w, h) = (img.w, img.h);
    if w == 0 || h == 0 {
        return img.clone();
    }
    let tiles = tiles.min(w).min(h).max(1);
    let tile_w = w.div_ceil(tiles);
    let tile_h = h.div_ceil(tiles);

    // one 256-entry LUT per tile
    let mut luts = vec![[0u8; 256]; tiles * tiles];
    for ty in 0..tiles {
        for tx in 0..tiles {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(w);
            let y1 = (y0 + tile_h).min(h);
            let count = ((x1 - x0) * (y1 - y0)).max(1);

            let mut hist = [0f64; 256];
            for y in y0..y1 {
                for &v in &img.row(y)[x0..x1] {
                    hist[v as usize] += 1.0;
                }
            }
            // clip and redistribute the excess uniformly
            let limit = (clip * count as f64 / 256.0).max(1.0);
            let mut excess = 0.0;
            for bin in &mut hist {
                if *bin > limit {
                    excess += *bin - limit;
                    *bin = limit;
                }
            }
            let bonus = excess / 256.0;
            let mut cdf = 0.0;
            let scale = 255.0 / count as f64;
            let lut = &mut luts[ty * tiles + tx];
            for (i, bin) in hist.iter().enumerate() {
                cdf += bin + bonus;
                lut[i] = (cdf * scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let mut out = GrayImage::new(w, h);
    out.data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let fy = (y as f64 - tile_h as f64 / 2.0) / tile_h as f64;
        let ty0 = fy.floor().clamp(0.0, tiles as f64 - 1.0) as usize;
        let ty1 = (ty0 + 1).min(tiles - 1);
        let wy = (fy - fy.floor()).clamp(0.0, 1.0);
        for (x, px) in row.iter_mut().enumerate() {
            let fx = (x as f64 - tile_w as f64 / 2.0) / tile_w as f64;
            let tx0 = fx.floor().clamp(0.0, tiles as f64 - 1.0) as usize;
            let tx1 = (tx0 + 1).min(tiles - 1);
            let wx = (fx - fx.floor()).clamp(0.0, 1.0);

            let v = img.get(x, y) as usize;
            let v00 = luts[ty0 * tiles + tx0][v] as f64;
            let v10 = luts[ty0 * tiles + tx1][v] as f64;
            let v01 = luts[ty1 * tiles + tx0][v] as f64;
            let v11 = luts[ty1 * tiles + tx1][v] as f64;
            let top = v00 + (v10 - v00) * wx;
            let bot = v01 + (v11 - v01) * wx;
            *px = (top + (bot - top) * wy).round().clamp(0.0, 255.0) as u8;
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_stretches_full_range() {
        let mut img = GrayImage::from_raw(4, 1, vec![50, 100, 150, 200]);
        normalize_min_max(&mut img);
        assert_eq!(img.data[0], 0);
        assert_eq!(img.data[3], 255);
    }

    #[test]
    fn normalize_flat_image_maps_to_zero() {
        let mut img = GrayImage::from_raw(3, 1, vec![90, 90, 90]);
        normalize_min_max(&mut img);
        assert_eq!(img.data, vec![0, 0, 0]);
    }

    #[test]
    fn median_removes_salt_noise() {
        let mut img = GrayImage::new(9, 9);
        img.set(4, 4, 255);
        let out = median_blur(&img, 3);
        assert_eq!(out.get(4, 4), 0);
    }

    #[test]
    fn gaussian_preserves_flat_images() {
        let img = GrayImage::from_raw(8, 8, vec![120u8; 64]);
        let out = gaussian_blur(&img, 5);
        assert!(out.data.iter().all(|&v| v == 120));
    }

    #[test]
    fn bilateral_keeps_a_hard_edge_sharper_than_gaussian() {
        let mut img = GrayImage::new(16, 16);
        for y in 0..16 {
            for x in 8..16 {
                img.set(x, y, 200);
            }
        }
        let bi = bilateral(&img, 6, 30.0, 6.0);
        let ga = gaussian_blur(&img, 7);
        // sample just left of the edge: bilateral should stay closer to 0
        assert!(bi.get(6, 8) <= ga.get(6, 8));
    }

    #[test]
    fn local_equalize_expands_low_contrast() {
        let mut img = GrayImage::new(32, 32);
        for y in 0..32 {
            for x in 0..32 {
                img.set(x, y, 100 + ((x + y) % 8) as u8);
            }
        }
        let out = local_equalize(&img, 4.0, 4);
        let (lo, hi) = out.min_max().unwrap();
        let (slo, shi) = img.min_max().unwrap();
        assert!(hi - lo > shi - slo);
    }
}
