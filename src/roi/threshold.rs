//! Binarization: adaptive (mean / Gaussian-weighted), fixed global, Otsu.
//!
//! Output masks are 0/255. The adaptive block size is oddized (≥ 3) and
//! capped below the smaller image dimension.

use super::filters::gaussian_blur_with_sigma;
use super::options::{oddize, Threshold};
use crate::image::GrayImage;

/// Binarize `img` with the configured method.
pub fn binarize(img: &GrayImage, method: Threshold, invert: bool) -> GrayImage {
    match method {
        Threshold::AdaptiveMean { block, c } => adaptive(img, block, c, false, invert),
        Threshold::AdaptiveGaussian { block, c } => adaptive(img, block, c, true, invert),
        Threshold::Global { t } => global(img, t.clamp(0, 255) as u8, invert),
        Threshold::Auto => global(img, otsu_threshold(img), invert),
    }
}

#[inline]
fn classify(above: bool, invert: bool) -> u8 {
    // binary: above-threshold pixels become foreground; inverted flips it
    if above != invert {
        255
    } else {
        0
    }
}

fn apply_threshold_map(img: &GrayImage, thresh_at: impl Fn(usize, usize) -> f64, invert: bool) -> GrayImage {
    let mut out = GrayImage::new(img.w, img.h);
    for y in 0..img.h {
        for x in 0..img.w {
            let above = (img.get(x, y) as f64) > thresh_at(x, y);
            out.set(x, y, classify(above, invert));
        }
    }
    out
}

fn adaptive(img: &GrayImage, block: usize, c: f64, gaussian: bool, invert: bool) -> GrayImage {
    let mut block = oddize(block, 3);
    let min_dim = img.w.min(img.h);
    if min_dim == 0 {
        return img.clone();
    }
    let max_odd = (min_dim / 2) * 2 - 1;
    if max_odd >= 3 && block > max_odd {
        block = max_odd;
    }

    if gaussian {
        // OpenCV derives sigma from the block size when unspecified
        let sigma = 0.3 * ((block as f64 - 1.0) * 0.5 - 1.0) + 0.8;
        let mean = gaussian_blur_with_sigma(img, block, sigma);
        apply_threshold_map(img, |x, y| mean.get(x, y) as f64 - c, invert)
    } else {
        let means = box_means(img, block);
        apply_threshold_map(img, |x, y| means[y * img.w + x] - c, invert)
    }
}

/// Box-filter means with replicated borders, via a summed-area table.
fn box_means(img: &GrayImage, block: usize) -> Vec<f64> {
    let (w, h) = (img.w, img.h);
    let half = (block / 2) as isize;
    // integral over the clamped-index extension is equivalent to replicate
    // borders only approximately; clamp the window to the image instead and
    // divide by the true window size, which matches the mean of available
    // pixels.
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += img.get(x, y) as u64;
            integral[(y + 1) * (w + 1) + (x + 1)] = integral[y * (w + 1) + (x + 1)] + row_sum;
        }
    }
    let sum_rect = |x0: usize, y0: usize, x1: usize, y1: usize| -> u64 {
        integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
            - integral[y0 * (w + 1) + x1]
            - integral[y1 * (w + 1) + x0]
    };

    let mut out = vec![0.0f64; w * h];
    for y in 0..h {
        let y0 = (y as isize - half).max(0) as usize;
        let y1 = ((y as isize + half + 1).min(h as isize)) as usize;
        for x in 0..w {
            let x0 = (x as isize - half).max(0) as usize;
            let x1 = ((x as isize + half + 1).min(w as isize)) as usize;
            let count = ((x1 - x0) * (y1 - y0)) as f64;
            out[y * w + x] = sum_rect(x0, y0, x1, y1) as f64 / count;
        }
    }
    out
}

fn global(img: &GrayImage, t: u8, invert: bool) -> GrayImage {
    apply_threshold_map(img, |_, _| t as f64, invert)
}

/// Otsu's between-class variance maximization over the 256-bin histogram.
fn otsu_threshold(img: &GrayImage) -> u8 {
    let mut hist = [0u64; 256];
    for &v in &img.data {
        hist[v as usize] += 1;
    }
    let total = img.data.len() as f64;
    if total == 0.0 {
        return 0;
    }
    let sum_all: f64 = hist.iter().enumerate().map(|(i, &n)| i as f64 * n as f64).sum();

    let mut best_t = 0u8;
    let mut best_var = -1.0f64;
    let mut w0 = 0.0;
    let mut sum0 = 0.0;
    for t in 0..256usize {
        w0 += hist[t] as f64;
        if w0 == 0.0 {
            continue;
        }
        let w1 = total - w0;
        if w1 == 0.0 {
            break;
        }
        sum0 += t as f64 * hist[t] as f64;
        let m0 = sum0 / w0;
        let m1 = (sum_all - sum0) / w1;
        let var = w0 * w1 * (m0 - m1) * (m0 - m1);
        if var > best_var {
            best_var = var;
            best_t = t as u8;
        }
    }
    best_t
}
