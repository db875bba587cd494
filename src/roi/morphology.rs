//! Morphological cleanup of binary masks (0/255) with elliptical kernels.

use super::options::Morphology;
use crate::image::GrayImage;

/// Offsets of an elliptical structuring element inscribed in a `k × k` box.
fn ellipse_offsets(k: usize) -> Vec<(isize, isize)> {
    let k = k.max(1) as isize;
    let r = ((k - 1) as f64) / 2.0;
    let anchor = k / 2;
    let mut offsets = Vec::new();
    for y in 0..k {
        for x in 0..k {
            if k == 1 {
                offsets.push((0, 0));
                continue;
            }
            let dx = x as f64 - r;
            let dy = y as f64 - r;
            // inscribed-ellipse membership with a half-pixel slack so the
            // kernel touches the box edges like OpenCV's does
            if (dx * dx + dy * dy).sqrt() <= r + 0.5 {
                offsets.push((x - anchor, y - anchor));
            }
        }
    }
    offsets
}

fn erode_with(mask: &GrayImage, offsets: &[(isize, isize)]) -> GrayImage {
    let (w, h) = (mask.w, mask.h);
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut v = 255u8;
            for &(dx, dy) in offsets {
                let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                v = v.min(mask.get(sx, sy));
                if v == 0 {
                    break;
                }
            }
            out.set(x, y, v);
        }
    }
    out
}

fn dilate_with(mask: &GrayImage, offsets: &[(isize, isize)]) -> GrayImage {
    let (w, h) = (mask.w, mask.h);
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut v = 0u8;
            for &(dx, dy) in offsets {
                let sx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
                let sy = (y as isize + dy).clamp(0, h as isize - 1) as usize;
                v = v.max(mask.get(sx, sy));
                if v == 255 {
                    break;
                }
            }
            out.set(x, y, v);
        }
    }
    out
}

pub fn erode(mask: &GrayImage, k: usize) -> GrayImage {
    erode_with(mask, &ellipse_offsets(k))
}

pub fn dilate(mask: &GrayImage, k: usize) -> GrayImage {
    dilate_with(mask, &ellipse_offsets(k))
}

pub fn open(mask: &GrayImage, k: usize) -> GrayImage {
    let offsets = ellipse_offsets(k);
    dilate_with(&erode_with(mask, &offsets), &offsets)
}

pub fn close(mask: &GrayImage, k: usize) -> GrayImage {
    let offsets = ellipse_offsets(k);
    erode_with(&dilate_with(mask, &offsets), &offsets)
}

/// Apply the configured sequence: open → close → erode → dilate, each only
/// when its kernel size is positive, each repeated `iterations` times,
/// then optional hole filling.
pub fn apply_morphology(mask: &GrayImage, opts: &Morphology) -> GrayImage {
    let iters = opts.iterations.max(1);
    let mut out = mask.clone();
    if opts.open_k > 0 {
        for _ in 0..iters {
            out = open(&out, opts.open_k);
        }
    }
    if opts.close_k > 0 {
        for _ in 0..iters {
            out = close(&out, opts.close_k);
        }
    }
    if opts.erode_k > 0 {
        for _ in 0..iters {
            out = erode(&out, opts.erode_k);
        }
    }
    if opts.dilate_k > 0 {
        for _ in 0..iters {
            out = dilate(&out, opts.dilate_k);
        }
    }
    if opts.fill_holes {
        out = fill_holes(&out);
    }
    out
}

/// Fill enclosed holes: flood the corner-connected region, then OR the mask
/// with everything the flood could not reach.
pub fn fill_holes(mask: &GrayImage) -> GrayImage {
    let (w, h) = (mask.w, mask.h);
    if w == 0 || h == 0 {
        return mask.clone();
    }
    let seed_value = mask.get(0, 0);
    let paint = if seed_value == 0 { 255u8 } else { 0u8 };

    let mut flood = mask.clone();
    let mut stack = vec![(0usize, 0usize)];
    flood.set(0, 0, paint);
    while let Some((x, y)) = stack.pop() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx < w && ny < h && flood.get(nx, ny) == seed_value {
                flood.set(nx, ny, paint);
                stack.push((nx, ny));
            }
        }
    }

    let mut out = mask.clone();
    for (o, f) in out.data.iter_mut().zip(&flood.data) {
        *o |= !f;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(size: usize, x0: usize, y0: usize, side: usize) -> GrayImage {
        let mut mask = GrayImage::new(size, size);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.set(x, y, 255);
            }
        }
        mask
    }

    #[test]
    fn open_removes_isolated_speckles() {
        let mut mask = square_mask(32, 8, 8, 12);
        mask.set(28, 2, 255);
        let out = open(&mask, 3);
        assert_eq!(out.get(28, 2), 0);
        assert_eq!(out.get(12, 12), 255);
    }

    #[test]
    fn close_bridges_small_gaps() {
        let mut mask = square_mask(32, 4, 4, 10);
        // carve a one-pixel slit through the square
        for y in 4..14 {
            mask.set(9, y, 0);
        }
        let out = close(&mask, 5);
        assert_eq!(out.get(9, 8), 255);
    }

    #[test]
    fn dilate_grows_and_erode_shrinks() {
        let mask = square_mask(32, 10, 10, 8);
        let grown = dilate(&mask, 3);
        assert_eq!(grown.get(9, 10), 255);
        let shrunk = erode(&mask, 3);
        assert_eq!(shrunk.get(10, 10), 0);
        assert_eq!(shrunk.get(13, 13), 255);
    }

    #[test]
    fn fill_holes_closes_enclosed_background() {
        let mut mask = square_mask(24, 4, 4, 16);
        for y in 9..13 {
            for x in 9..13 {
                mask.set(x, y, 0);
            }
        }
        let out = fill_holes(&mask);
        assert_eq!(out.get(10, 10), 255);
        // exterior background stays background
        assert_eq!(out.get(1, 1), 0);
    }

    #[test]
    fn zero_kernels_are_skipped() {
        let mask = square_mask(16, 4, 4, 8);
        let opts = Morphology {
            open_k: 0,
            close_k: 0,
            erode_k: 0,
            dilate_k: 0,
            iterations: 1,
            fill_holes: false,
        };
        assert_eq!(apply_morphology(&mask, &opts), mask);
    }
}
